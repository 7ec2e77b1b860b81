//! Field classification and value resolution against a parsed resume.
//!
//! All functions here are pure: plain data in, plain data or absence out.
//! Keyword lists and their check order define the behavior; both are
//! order-sensitive and kept exactly as given.

use crate::fields::FormField;
use crate::resume::ResumeDocument;

const ABSTRACT_KEYWORDS: &[&str] = &[
    "why",
    "describe",
    "explain",
    "tell us",
    "what motivates",
    "your greatest",
    "how would you",
    "what interests you",
    "your goals",
    "your passion",
    "cover letter",
    "personal statement",
    "objective",
    "summary",
];

/// How a form field's value should be produced.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    /// Answer verbatim from a resume fact.
    Direct(String),
    /// Open-ended question needing generated prose.
    Abstract,
    /// Neither: fall through to a type-based default.
    Default,
}

/// Decide the resolution path for one field: direct fact first, then the
/// abstractness test, otherwise the default path.
pub fn classify(question: &str, field_type: &str, resume: &ResumeDocument) -> Resolution {
    if let Some(value) = direct_answer(question, resume) {
        return Resolution::Direct(value);
    }
    if is_abstract_question(question, field_type) {
        return Resolution::Abstract;
    }
    Resolution::Default
}

/// True when a question needs generated prose rather than a factual lookup.
/// Pure function of the question text and input type.
pub fn is_abstract_question(question: &str, field_type: &str) -> bool {
    if field_type == "textarea" || question.chars().count() > 50 {
        return true;
    }
    let lower = question.to_lowercase();
    ABSTRACT_KEYWORDS.iter().any(|k| lower.contains(k))
}

/// Map a question to a resume fact by substring matching, first keyword
/// match wins. A matched branch whose fact is missing or empty makes the
/// whole lookup absent; later branches are never consulted.
pub fn direct_answer(question: &str, resume: &ResumeDocument) -> Option<String> {
    let q = question.to_lowercase();
    let info = &resume.personal_info;

    if q.contains("name") || q.contains("full name") {
        return non_empty(info.name.clone());
    }
    if q.contains("email") {
        return non_empty(info.email.clone());
    }
    if q.contains("phone") {
        return non_empty(info.phone.clone());
    }
    if q.contains("linkedin") {
        return non_empty(info.linkedin.clone());
    }
    if q.contains("github") {
        return non_empty(info.github.clone());
    }
    if q.contains("university") || q.contains("school") {
        return non_empty(resume.education.first().and_then(|e| e.institution.clone()));
    }
    if q.contains("degree") {
        return non_empty(resume.education.first().and_then(|e| e.degree.clone()));
    }
    if q.contains("company") || q.contains("employer") {
        return non_empty(resume.work_experience.first().and_then(|e| e.company.clone()));
    }
    if q.contains("position") || q.contains("title") {
        return non_empty(resume.work_experience.first().and_then(|e| e.position.clone()));
    }
    if q.contains("skill") {
        return non_empty(Some(resume.top_skills(5)));
    }
    None
}

/// Canned answer used when generation is unavailable or fails. Buckets are
/// checked in order; the first matching keyword wins.
pub fn fallback_answer(question: &str, resume: &ResumeDocument) -> String {
    let q = question.to_lowercase();

    if q.contains("why") {
        return format!(
            "Based on my background in {}, I am excited about this opportunity to contribute my skills and experience.",
            resume.top_skills(3)
        );
    }
    if q.contains("strength") {
        return format!(
            "My key strengths include {}, which I have developed through my professional experience.",
            resume.top_skills(5)
        );
    }
    if q.contains("experience") {
        return format!(
            "I have experience in {} and have worked in roles that involved diverse responsibilities.",
            resume.top_skills(3)
        );
    }
    if q.contains("motivation") {
        return "I am motivated by challenging opportunities that allow me to apply my skills and contribute to meaningful projects.".to_string();
    }
    if q.contains("goal") {
        return "My career goal is to continue growing professionally while making meaningful contributions to innovative projects.".to_string();
    }

    "I believe my background and experience make me a strong candidate for this position, and I am excited about the opportunity to contribute to your team.".to_string()
}

/// Best-effort value from the field's input type when no direct or abstract
/// path applied. Empty means "skip this field".
pub fn default_value(field: &FormField, resume: &ResumeDocument) -> String {
    let info = &resume.personal_info;

    match field.r#type.to_lowercase().as_str() {
        "email" => info.email.clone().unwrap_or_default(),
        "tel" => info.phone.clone().unwrap_or_default(),
        _ if field.name.to_lowercase().contains("name") => {
            info.name.clone().unwrap_or_default()
        }
        _ => String::new(),
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}
