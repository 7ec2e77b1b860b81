//! OpenAI-compatible chat client used for open-ended form questions.
//! All language-model traffic goes through this module.

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::answer;
use crate::config::LlmConfig;
use crate::resume::ResumeDocument;

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const MAX_RETRIES: u32 = 3;

const SYSTEM_PROMPT: &str = "You are a professional resume assistant helping to fill job \
    application forms. Provide concise, professional answers based on the candidate's \
    resume data.";

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("API key not found: set OPENAI_API_KEY or llm.api_key in the config")]
    MissingApiKey,

    #[error("Rate limited after {retries} retries")]
    RateLimited { retries: u32 },

    #[error("LLM returned empty content")]
    EmptyContent,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
    #[serde(default)]
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct Usage {
    #[serde(default)]
    prompt_tokens: u32,
    #[serde(default)]
    completion_tokens: u32,
}

/// Chat-completions client with retry logic. Cheap to clone.
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    config: LlmConfig,
    api_key: String,
}

impl LlmClient {
    /// Build a client from configuration. The API key comes from the config
    /// or the OPENAI_API_KEY environment variable; neither present is an
    /// error at construction time.
    pub fn new(config: LlmConfig) -> Result<Self, LlmError> {
        let api_key = config
            .api_key
            .clone()
            .or_else(|| std::env::var("OPENAI_API_KEY").ok())
            .ok_or(LlmError::MissingApiKey)?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            config,
            api_key,
        })
    }

    /// Generate a tailored answer for an open-ended question. Never fails:
    /// any client error is logged and replaced with the canned fallback.
    pub async fn generate_answer(
        &self,
        question: &str,
        resume: &ResumeDocument,
        context: &str,
    ) -> String {
        let prompt = build_prompt(question, resume, context);
        match self.complete(&prompt).await {
            Ok(text) => {
                debug!("generated answer for question: {question:.50}");
                text
            }
            Err(e) => {
                warn!("AI answer failed for {question:?}: {e}; using fallback");
                answer::fallback_answer(question, resume)
            }
        }
    }

    /// Raw chat completion. Retries on 429 and 5xx with exponential backoff.
    pub async fn complete(&self, prompt: &str) -> Result<String, LlmError> {
        let base = self
            .config
            .base_url
            .as_deref()
            .unwrap_or(DEFAULT_BASE_URL)
            .trim_end_matches('/');
        let url = format!("{base}/chat/completions");

        let request_body = ChatRequest {
            model: &self.config.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
        };

        let mut last_error: Option<LlmError> = None;

        for attempt in 0..MAX_RETRIES {
            if attempt > 0 {
                // Exponential backoff: 1s, 2s, 4s
                let delay = Duration::from_millis(1000 * (1 << (attempt - 1)));
                warn!(
                    "LLM call attempt {attempt} failed, retrying after {}ms",
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
            }

            let response = match self
                .client
                .post(&url)
                .bearer_auth(&self.api_key)
                .json(&request_body)
                .send()
                .await
            {
                Ok(r) => r,
                Err(e) => {
                    last_error = Some(LlmError::Http(e));
                    continue;
                }
            };

            let status = response.status();

            if status.as_u16() == 429 || status.is_server_error() {
                let body = response.text().await.unwrap_or_default();
                warn!("LLM API returned {status}: {body}");
                last_error = Some(LlmError::Api {
                    status: status.as_u16(),
                    message: body,
                });
                continue;
            }

            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(LlmError::Api {
                    status: status.as_u16(),
                    message: body,
                });
            }

            let parsed: ChatResponse = response.json().await?;
            if let Some(usage) = &parsed.usage {
                debug!(
                    "LLM call succeeded: prompt_tokens={}, completion_tokens={}",
                    usage.prompt_tokens, usage.completion_tokens
                );
            }

            let text = parsed
                .choices
                .into_iter()
                .next()
                .and_then(|c| c.message.content)
                .map(|t| t.trim().to_string())
                .filter(|t| !t.is_empty())
                .ok_or(LlmError::EmptyContent)?;
            return Ok(text);
        }

        Err(last_error.unwrap_or(LlmError::RateLimited {
            retries: MAX_RETRIES,
        }))
    }
}

/// Assemble the user prompt: candidate facts, the question, and fixed
/// answering instructions. Skills are capped at 10 and projects at 3.
fn build_prompt(question: &str, resume: &ResumeDocument, context: &str) -> String {
    let info = &resume.personal_info;
    let mut prompt = String::from(
        "Based on the following resume information, please provide a professional and \
         tailored answer to the question below.\n\n",
    );

    prompt.push_str("CANDIDATE INFORMATION:\n");
    prompt.push_str(&format!("Name: {}\n", or_na(&info.name)));
    prompt.push_str(&format!("Email: {}\n", or_na(&info.email)));

    prompt.push_str("\nEDUCATION:\n");
    for edu in &resume.education {
        prompt.push_str(&format!(
            "- {} from {} ({})\n",
            or_na(&edu.degree),
            or_na(&edu.institution),
            or_na(&edu.year)
        ));
    }

    prompt.push_str("\nWORK EXPERIENCE:\n");
    for exp in &resume.work_experience {
        prompt.push_str(&format!(
            "- {} at {} ({})\n",
            or_na(&exp.position),
            or_na(&exp.company),
            or_na(&exp.duration)
        ));
    }

    prompt.push_str(&format!("\nSKILLS:\n{}\n", resume.top_skills(10)));

    if !resume.projects.is_empty() {
        prompt.push_str("\nPROJECTS:\n");
        for project in resume.projects.iter().take(3) {
            prompt.push_str(&format!("- {}: {}\n", project.name, project.description));
        }
    }

    if !context.is_empty() {
        prompt.push_str(&format!("\nADDITIONAL CONTEXT:\n{context}\n"));
    }

    prompt.push_str(&format!(
        "\nQUESTION TO ANSWER:\n{question}\n\n\
         INSTRUCTIONS:\n\
         1. Provide a professional, concise answer (150-300 words)\n\
         2. Use specific examples from the candidate's experience when relevant\n\
         3. Maintain a positive and confident tone\n\
         4. Focus on how the candidate's background relates to the question\n\
         5. Do not make up information not present in the resume\n"
    ));

    prompt
}

fn or_na(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or("N/A")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resume::{EducationEntry, PersonalInfo, ProjectEntry};

    fn resume() -> ResumeDocument {
        ResumeDocument {
            personal_info: PersonalInfo {
                name: Some("John Smith".into()),
                email: Some("john@x.com".into()),
                ..Default::default()
            },
            education: vec![EducationEntry {
                degree: Some("BS Computer Science".into()),
                institution: Some("State University".into()),
                year: Some("2020".into()),
            }],
            work_experience: Vec::new(),
            skills: (1..=12).map(|i| format!("skill{i}")).collect(),
            projects: (1..=4)
                .map(|i| ProjectEntry {
                    name: format!("proj{i}"),
                    description: format!("desc{i}"),
                })
                .collect(),
            raw_text: String::new(),
        }
    }

    #[test]
    fn prompt_contains_candidate_facts_and_question() {
        let prompt = build_prompt("Why this role?", &resume(), "");
        assert!(prompt.contains("Name: John Smith"));
        assert!(prompt.contains("Email: john@x.com"));
        assert!(prompt.contains("- BS Computer Science from State University (2020)"));
        assert!(prompt.contains("QUESTION TO ANSWER:\nWhy this role?"));
    }

    #[test]
    fn prompt_caps_skills_at_ten_and_projects_at_three() {
        let prompt = build_prompt("Q", &resume(), "");
        assert!(prompt.contains("skill10"));
        assert!(!prompt.contains("skill11"));
        assert!(prompt.contains("- proj3: desc3"));
        assert!(!prompt.contains("proj4"));
    }

    #[test]
    fn prompt_includes_context_only_when_present() {
        let with = build_prompt("Q", &resume(), "remote position");
        assert!(with.contains("ADDITIONAL CONTEXT:\nremote position"));
        let without = build_prompt("Q", &resume(), "");
        assert!(!without.contains("ADDITIONAL CONTEXT"));
    }

    #[test]
    fn missing_facts_render_as_na() {
        let prompt = build_prompt("Q", &ResumeDocument::default(), "");
        assert!(prompt.contains("Name: N/A"));
        assert!(prompt.contains("Email: N/A"));
    }

    #[test]
    fn chat_response_deserializes() {
        let raw = r#"{
            "choices": [{"message": {"role": "assistant", "content": "  An answer.  "}}],
            "usage": {"prompt_tokens": 120, "completion_tokens": 45}
        }"#;
        let parsed: ChatResponse = serde_json::from_str(raw).unwrap();
        let text = parsed.choices[0].message.content.as_deref().unwrap();
        assert_eq!(text.trim(), "An answer.");
        assert_eq!(parsed.usage.unwrap().completion_tokens, 45);
    }

    #[test]
    fn chat_response_tolerates_missing_usage() {
        let raw = r#"{"choices": [{"message": {"content": "ok"}}]}"#;
        let parsed: ChatResponse = serde_json::from_str(raw).unwrap();
        assert!(parsed.usage.is_none());
    }
}
