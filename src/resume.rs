use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Structured resume data, built once per input file and never mutated.
///
/// Absent attributes are `None` and are omitted from the serialized JSON
/// artifact, so consumers can distinguish "not found" from "empty".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResumeDocument {
    pub personal_info: PersonalInfo,
    pub education: Vec<EducationEntry>,
    pub work_experience: Vec<ExperienceEntry>,
    pub skills: Vec<String>,
    pub projects: Vec<ProjectEntry>,
    /// Full extracted text, retained for traceability.
    pub raw_text: String,
}

impl ResumeDocument {
    /// Write the parse artifact as pretty-printed JSON.
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Read a previously saved parse artifact.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// The first `n` skills joined with ", ". Skills keep their detection
    /// order, so this is the "top-N" view used by answers and prompts.
    pub fn top_skills(&self, n: usize) -> String {
        self.skills
            .iter()
            .take(n)
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PersonalInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub linkedin: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub github: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EducationEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub degree: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub institution: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<String>,
}

impl EducationEntry {
    pub(crate) fn is_empty(&self) -> bool {
        self.degree.is_none() && self.institution.is_none() && self.year.is_none()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExperienceEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
}

impl ExperienceEntry {
    pub(crate) fn is_empty(&self) -> bool {
        self.position.is_none() && self.company.is_none() && self.duration.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectEntry {
    pub name: String,
    pub description: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ResumeDocument {
        ResumeDocument {
            personal_info: PersonalInfo {
                name: Some("Jane Doe".into()),
                email: Some("jane@example.com".into()),
                phone: None,
                linkedin: Some("linkedin.com/in/janedoe".into()),
                github: None,
            },
            education: vec![EducationEntry {
                degree: Some("BS Computer Science".into()),
                institution: Some("State University".into()),
                year: Some("2020".into()),
            }],
            work_experience: vec![ExperienceEntry {
                position: Some("Software Engineer".into()),
                company: Some("Acme Inc".into()),
                duration: Some("2020 - present".into()),
            }],
            skills: vec!["Rust".into(), "Python".into(), "SQL".into()],
            projects: vec![ProjectEntry {
                name: "Crawler".into(),
                description: "A polite web crawler".into(),
            }],
            raw_text: "Jane Doe\n...".into(),
        }
    }

    #[test]
    fn json_round_trip_preserves_all_fields() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("parsed_resume.json");
        let doc = sample();
        doc.save(&path).unwrap();
        let loaded = ResumeDocument::load(&path).unwrap();
        assert_eq!(doc, loaded);
    }

    #[test]
    fn absent_fields_are_omitted_from_json() {
        let json = serde_json::to_string(&sample()).unwrap();
        assert!(json.contains("\"name\""));
        assert!(!json.contains("\"phone\""));
        assert!(!json.contains("\"github\""));
    }

    #[test]
    fn top_skills_truncates_in_order() {
        let doc = sample();
        assert_eq!(doc.top_skills(2), "Rust, Python");
        assert_eq!(doc.top_skills(10), "Rust, Python, SQL");
        assert_eq!(ResumeDocument::default().top_skills(5), "");
    }
}
