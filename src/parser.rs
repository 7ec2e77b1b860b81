//! Resume text to structured data.
//!
//! Line-oriented pattern matching over the sections captured by
//! [`crate::sections`]. The heuristics are deliberately simple: whole lines
//! become field values, later matches overwrite earlier ones, and anything
//! that matches nothing is dropped.

use std::path::Path;

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::info;

use crate::document;
use crate::error::Result;
use crate::resume::{
    EducationEntry, ExperienceEntry, PersonalInfo, ProjectEntry, ResumeDocument,
};
use crate::sections;

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}\b").unwrap()
});

/// Tried in order; the first pattern that matches anywhere wins.
static PHONE_RES: Lazy<Vec<Regex>> = Lazy::new(|| {
    vec![
        Regex::new(r"\b\d{3}-\d{3}-\d{4}\b").unwrap(),
        Regex::new(r"\(\d{3}\)\s*\d{3}-\d{4}\b").unwrap(),
        Regex::new(r"\b\d{10}\b").unwrap(),
    ]
});

static LINKEDIN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)linkedin\.com/in/[\w-]+").unwrap());

static GITHUB_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)github\.com/[\w-]+").unwrap());

static DEGREE_RES: Lazy<Vec<Regex>> = Lazy::new(|| {
    vec![
        Regex::new(r"(?i)(bachelor|master|phd|doctorate|bs|ms|ba|ma|mba|degree)").unwrap(),
        Regex::new(r"(?i)(b\.s\.|m\.s\.|b\.a\.|m\.a\.|ph\.d\.)").unwrap(),
    ]
});

static YEAR_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b(19|20)\d{2}\b").unwrap());

static DURATION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(19|20)\d{2}\s*-\s*(19|20)\d{2}|\b(19|20)\d{2}\s*-\s*present").unwrap()
});

static SKILL_SPLIT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[,;|•·\n]").unwrap());

const POSITION_WORDS: &[&str] = &[
    "engineer",
    "developer",
    "manager",
    "analyst",
    "specialist",
    "coordinator",
];

const COMPANY_MARKERS: &[&str] = &["inc", "corp", "llc", "ltd"];

/// Parse a resume file into a [`ResumeDocument`].
pub fn parse_file(path: &Path) -> Result<ResumeDocument> {
    let text = document::extract_text(path)?;
    let resume = parse_text(&text);
    info!(
        "parsed {}: {} education, {} experience, {} skills, {} projects",
        path.display(),
        resume.education.len(),
        resume.work_experience.len(),
        resume.skills.len(),
        resume.projects.len()
    );
    Ok(resume)
}

/// Parse raw resume text. Deterministic: the same text always yields a
/// structurally identical document.
pub fn parse_text(text: &str) -> ResumeDocument {
    ResumeDocument {
        personal_info: extract_personal_info(text),
        education: extract_education(text),
        work_experience: extract_work_experience(text),
        skills: extract_skills(text),
        projects: extract_projects(text),
        raw_text: text.to_string(),
    }
}

/// Five independent passes over the whole text; each attribute is simply
/// omitted when its pattern finds nothing.
fn extract_personal_info(text: &str) -> PersonalInfo {
    // The name is usually one of the first few lines: short, few words,
    // no digits, and not the email or phone line.
    let name = text
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .take(5)
        .find(|line| {
            line.chars().count() > 2
                && line.split_whitespace().count() <= 4
                && !line.chars().any(|c| c.is_ascii_digit())
                && !line.contains('@')
                && !line.to_lowercase().contains("phone")
        });

    PersonalInfo {
        name: name.map(str::to_string),
        email: EMAIL_RE.find(text).map(|m| m.as_str().to_string()),
        phone: PHONE_RES
            .iter()
            .find_map(|re| re.find(text))
            .map(|m| m.as_str().to_string()),
        linkedin: LINKEDIN_RE.find(text).map(|m| m.as_str().to_string()),
        github: GITHUB_RE.find(text).map(|m| m.as_str().to_string()),
    }
}

/// Accumulates matches from every captured line into one trailing entry,
/// pushed once after the loop. Multiple schools therefore collapse into a
/// single entry whose fields come from the last matching lines.
fn extract_education(text: &str) -> Vec<EducationEntry> {
    let mut entry = EducationEntry::default();

    for line in sections::education_lines(text) {
        if DEGREE_RES.iter().any(|re| re.is_match(line)) {
            entry.degree = Some(line.to_string());
        }
        let lower = line.to_lowercase();
        if lower.contains("university") || lower.contains("college") || lower.contains("institute")
        {
            entry.institution = Some(line.to_string());
        }
        if let Some(m) = YEAR_RE.find(line) {
            entry.year = Some(m.as_str().to_string());
        }
    }

    if entry.is_empty() {
        Vec::new()
    } else {
        vec![entry]
    }
}

/// Same single-trailing-entry accumulation as education.
fn extract_work_experience(text: &str) -> Vec<ExperienceEntry> {
    let mut entry = ExperienceEntry::default();

    for line in sections::experience_lines(text) {
        let lower = line.to_lowercase();
        if POSITION_WORDS.iter().any(|w| lower.contains(w)) {
            entry.position = Some(line.to_string());
        }
        if COMPANY_MARKERS.iter().any(|m| lower.contains(m)) {
            entry.company = Some(line.to_string());
        }
        if let Some(m) = DURATION_RE.find(line) {
            entry.duration = Some(m.as_str().to_string());
        }
    }

    if entry.is_empty() {
        Vec::new()
    } else {
        vec![entry]
    }
}

fn extract_skills(text: &str) -> Vec<String> {
    let mut skills = Vec::new();
    for line in sections::skills_lines(text) {
        for item in SKILL_SPLIT_RE.split(line) {
            let item = item.trim();
            if item.chars().count() > 1 {
                skills.push(item.to_string());
            }
        }
    }
    skills
}

/// A project needs a name line and a following non-empty description line;
/// a trailing name with no description is dropped.
fn extract_projects(text: &str) -> Vec<ProjectEntry> {
    let mut projects = Vec::new();
    let mut pending_name: Option<String> = None;

    for line in sections::project_lines(text) {
        match pending_name.take() {
            None => pending_name = Some(line.to_string()),
            Some(name) => projects.push(ProjectEntry {
                name,
                description: line.to_string(),
            }),
        }
    }
    projects
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "John Smith\n\
        john@x.com\n\
        555-123-4567\n\
        linkedin.com/in/johnsmith\n\
        github.com/jsmith\n\
        \n\
        Education\n\
        BS Computer Science\n\
        State University\n\
        2020\n\
        \n\
        Work Experience\n\
        Software Engineer\n\
        Acme Inc\n\
        2020 - present\n\
        \n\
        Projects\n\
        Crawler\n\
        A polite web crawler\n\
        Visualizer\n\
        Charts for logs\n\
        \n\
        Skills\n\
        Python, Go; Rust|C++\n";

    #[test]
    fn personal_info_from_sample() {
        let info = extract_personal_info(SAMPLE);
        assert_eq!(info.name.as_deref(), Some("John Smith"));
        assert_eq!(info.email.as_deref(), Some("john@x.com"));
        assert_eq!(info.phone.as_deref(), Some("555-123-4567"));
        assert_eq!(info.linkedin.as_deref(), Some("linkedin.com/in/johnsmith"));
        assert_eq!(info.github.as_deref(), Some("github.com/jsmith"));
    }

    #[test]
    fn no_email_substring_means_no_email_key() {
        let doc = parse_text("John Smith\nno contact details here");
        assert_eq!(doc.personal_info.email, None);
        let json = serde_json::to_string(&doc).unwrap();
        assert!(!json.contains("\"email\""));
    }

    #[test]
    fn education_entry_from_sample() {
        let doc = parse_text(SAMPLE);
        assert_eq!(doc.education.len(), 1);
        let entry = &doc.education[0];
        assert_eq!(entry.degree.as_deref(), Some("BS Computer Science"));
        assert_eq!(entry.institution.as_deref(), Some("State University"));
        assert_eq!(entry.year.as_deref(), Some("2020"));
    }

    #[test]
    fn later_degree_line_overwrites_earlier() {
        let text = "Education\nBS Computer Science\nMS Computer Science\n2022";
        let education = extract_education(text);
        assert_eq!(education.len(), 1);
        assert_eq!(
            education[0].degree.as_deref(),
            Some("MS Computer Science")
        );
    }

    #[test]
    fn two_schools_collapse_into_one_trailing_entry() {
        // Known limitation: fields from both blocks land in a single entry.
        let text = "Education\n\
            BS Computer Science\n\
            2016\n\
            MS Data Science\n\
            2020";
        let education = extract_education(text);
        assert_eq!(education.len(), 1);
        assert_eq!(education[0].degree.as_deref(), Some("MS Data Science"));
        assert_eq!(education[0].year.as_deref(), Some("2020"));
    }

    #[test]
    fn experience_entry_from_sample() {
        let doc = parse_text(SAMPLE);
        assert_eq!(doc.work_experience.len(), 1);
        let entry = &doc.work_experience[0];
        assert_eq!(entry.position.as_deref(), Some("Software Engineer"));
        assert_eq!(entry.company.as_deref(), Some("Acme Inc"));
        assert_eq!(entry.duration.as_deref(), Some("2020 - present"));
    }

    #[test]
    fn duration_matches_year_ranges() {
        let text = "Experience\nDeveloper\n2015 - 2019";
        let experience = extract_work_experience(text);
        assert_eq!(experience[0].duration.as_deref(), Some("2015 - 2019"));
    }

    #[test]
    fn skills_split_on_all_delimiters_in_order() {
        let text = "Skills\nPython, Go; Rust|C++";
        assert_eq!(extract_skills(text), vec!["Python", "Go", "Rust", "C++"]);
    }

    #[test]
    fn skills_from_sample() {
        let doc = parse_text(SAMPLE);
        assert_eq!(doc.skills, vec!["Python", "Go", "Rust", "C++"]);
    }

    #[test]
    fn single_character_skill_tokens_are_dropped() {
        let text = "Skills\nC, Go, R";
        assert_eq!(extract_skills(text), vec!["Go"]);
    }

    #[test]
    fn skills_keep_duplicates() {
        let text = "Skills\nRust, Go\nGo, SQL";
        assert_eq!(extract_skills(text), vec!["Rust", "Go", "Go", "SQL"]);
    }

    #[test]
    fn projects_pair_name_with_next_line() {
        let doc = parse_text(SAMPLE);
        assert_eq!(doc.projects.len(), 2);
        assert_eq!(doc.projects[0].name, "Crawler");
        assert_eq!(doc.projects[0].description, "A polite web crawler");
        assert_eq!(doc.projects[1].name, "Visualizer");
    }

    #[test]
    fn dangling_project_name_is_dropped() {
        let text = "Projects\nCrawler\nA polite web crawler\nOrphan";
        let projects = extract_projects(text);
        assert_eq!(projects.len(), 1);
        assert_eq!(projects[0].name, "Crawler");
    }

    #[test]
    fn phone_patterns_tried_in_order() {
        let dashed = extract_personal_info("Al Bo\n555-123-4567 or (999) 888-7777");
        assert_eq!(dashed.phone.as_deref(), Some("555-123-4567"));

        let parens = extract_personal_info("Al Bo\ncall (999) 888-7777");
        assert_eq!(parens.phone.as_deref(), Some("(999) 888-7777"));

        let bare = extract_personal_info("Al Bo\n5551234567");
        assert_eq!(bare.phone.as_deref(), Some("5551234567"));
    }

    #[test]
    fn name_skips_lines_with_digits_or_email() {
        let text = "123 Main St\njane@x.com\nJane Doe\nrest";
        let info = extract_personal_info(text);
        assert_eq!(info.name.as_deref(), Some("Jane Doe"));
    }

    #[test]
    fn name_must_appear_in_first_five_nonempty_lines() {
        let text = "1\n2\n3\n4\n5\nJane Doe";
        let info = extract_personal_info(text);
        assert_eq!(info.name, None);
    }

    #[test]
    fn social_links_match_case_insensitively() {
        let info = extract_personal_info("Al Bo\nLinkedIn.com/in/al-bo\nGitHub.com/albo");
        assert_eq!(info.linkedin.as_deref(), Some("LinkedIn.com/in/al-bo"));
        assert_eq!(info.github.as_deref(), Some("GitHub.com/albo"));
    }

    #[test]
    fn parsing_is_idempotent() {
        let first = parse_text(SAMPLE);
        let second = parse_text(SAMPLE);
        assert_eq!(first, second);
    }

    #[test]
    fn raw_text_is_retained_verbatim() {
        let doc = parse_text(SAMPLE);
        assert_eq!(doc.raw_text, SAMPLE);
    }
}
