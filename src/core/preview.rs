// src/core/preview.rs
//! Preview formatting: maps a document to display-ready text

use chrono::NaiveDate;
use serde::Serialize;

use crate::types::{PersonalInfo, ResumeDocument};

pub const NAME_PLACEHOLDER: &str = "Your Name";
const EMAIL_PLACEHOLDER: &str = "your.email@example.com";
const PHONE_PLACEHOLDER: &str = "+1 (555) 123-4567";
const LOCATION_PLACEHOLDER: &str = "City, State";
const QUICK_SUMMARY_CHARS: usize = 100;

// ===== Preview Models =====

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResumePreview {
    pub name: String,
    /// Non-empty email, phone and location, in that order.
    pub contacts: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub experience: Option<Vec<ExperiencePreview>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub education: Option<Vec<EducationPreview>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skills: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExperiencePreview {
    pub position: String,
    pub company: String,
    pub dates: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EducationPreview {
    pub title: String,
    pub institution: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gpa: Option<String>,
    pub graduation: String,
}

/// Sidebar card shown next to the editor.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuickPreview {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub location: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
}

// ===== Formatting =====

/// Render a `YYYY-MM` month as `Mon YYYY`.
///
/// Empty input gives an empty string; input that is not a valid month is
/// returned as typed.
pub fn format_date(value: &str) -> String {
    if value.is_empty() {
        return String::new();
    }
    match NaiveDate::parse_from_str(&format!("{}-01", value), "%Y-%m-%d") {
        Ok(date) => date.format("%b %Y").to_string(),
        Err(_) => value.to_string(),
    }
}

pub fn format_range(start: &str, end: &str, current: bool) -> String {
    let end = if current {
        "Present".to_string()
    } else {
        format_date(end)
    };
    format!("{} – {}", format_date(start), end)
}

fn non_empty(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_string())
}

fn or_placeholder(value: &str, placeholder: &str) -> String {
    if value.is_empty() {
        placeholder.to_string()
    } else {
        value.to_string()
    }
}

pub fn build_preview(document: &ResumeDocument) -> ResumePreview {
    let info = &document.personal_info;

    let contacts = [&info.email, &info.phone, &info.location]
        .into_iter()
        .filter_map(|value| non_empty(value))
        .collect();

    let experience = (!document.experience.is_empty()).then(|| {
        document
            .experience
            .iter()
            .map(|exp| ExperiencePreview {
                position: exp.position.clone(),
                company: exp.company.clone(),
                dates: format_range(&exp.start_date, &exp.end_date, exp.current),
                description: non_empty(&exp.description),
            })
            .collect()
    });

    let education = (!document.education.is_empty()).then(|| {
        document
            .education
            .iter()
            .map(|edu| EducationPreview {
                title: format!("{} in {}", edu.degree, edu.field),
                institution: edu.institution.clone(),
                gpa: edu.gpa.as_deref().and_then(non_empty),
                graduation: format_date(&edu.graduation_date),
            })
            .collect()
    });

    let skills = (!document.skills.is_empty()).then(|| {
        document
            .skills
            .iter()
            .map(|skill| format!("{}: {}", skill.category, skill.items.join(", ")))
            .collect()
    });

    ResumePreview {
        name: or_placeholder(&info.full_name, NAME_PLACEHOLDER),
        contacts,
        summary: non_empty(&info.summary),
        experience,
        education,
        skills,
    }
}

pub fn quick_preview(info: &PersonalInfo) -> QuickPreview {
    let summary = non_empty(&info.summary).map(|summary| {
        if summary.chars().count() > QUICK_SUMMARY_CHARS {
            let head: String = summary.chars().take(QUICK_SUMMARY_CHARS).collect();
            format!("{}...", head)
        } else {
            summary
        }
    });

    QuickPreview {
        name: or_placeholder(&info.full_name, NAME_PLACEHOLDER),
        email: or_placeholder(&info.email, EMAIL_PLACEHOLDER),
        phone: or_placeholder(&info.phone, PHONE_PLACEHOLDER),
        location: or_placeholder(&info.location, LOCATION_PLACEHOLDER),
        summary,
    }
}

impl ResumePreview {
    /// Plain-text rendering, one block per section.
    pub fn to_text(&self) -> String {
        let mut out = String::new();

        out.push_str(&self.name);
        out.push('\n');
        if !self.contacts.is_empty() {
            out.push_str(&self.contacts.join(" | "));
            out.push('\n');
        }

        if let Some(summary) = &self.summary {
            push_heading(&mut out, "Professional Summary");
            out.push_str(summary);
            out.push('\n');
        }

        if let Some(experience) = &self.experience {
            push_heading(&mut out, "Work Experience");
            for exp in experience {
                out.push_str(&format!("{}\n{}\n{}\n", exp.position, exp.company, exp.dates));
                if let Some(description) = &exp.description {
                    out.push_str(description);
                    out.push('\n');
                }
                out.push('\n');
            }
        }

        if let Some(education) = &self.education {
            push_heading(&mut out, "Education");
            for edu in education {
                out.push_str(&format!("{}\n{}\n", edu.title, edu.institution));
                if let Some(gpa) = &edu.gpa {
                    out.push_str(&format!("GPA: {}\n", gpa));
                }
                if !edu.graduation.is_empty() {
                    out.push_str(&edu.graduation);
                    out.push('\n');
                }
                out.push('\n');
            }
        }

        if let Some(skills) = &self.skills {
            push_heading(&mut out, "Skills");
            for line in skills {
                out.push_str(line);
                out.push('\n');
            }
        }

        out.trim_end().to_string() + "\n"
    }
}

fn push_heading(out: &mut String, title: &str) {
    out.push('\n');
    out.push_str(title);
    out.push('\n');
    out.push_str(&"-".repeat(title.chars().count()));
    out.push('\n');
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{EducationEntry, EntryId, ExperienceEntry, SkillCategory};

    fn experience(current: bool, end: &str) -> ExperienceEntry {
        ExperienceEntry {
            id: EntryId::from("1"),
            company: "Acme".to_string(),
            position: "Engineer".to_string(),
            start_date: "2022-01".to_string(),
            end_date: end.to_string(),
            current,
            description: String::new(),
        }
    }

    #[test]
    fn test_format_date() {
        assert_eq!(format_date("2023-06"), "Jun 2023");
        assert_eq!(format_date("1999-12"), "Dec 1999");
        assert_eq!(format_date(""), "");
        assert_eq!(format_date("someday"), "someday");
    }

    #[test]
    fn test_current_range_ends_with_present() {
        assert_eq!(format_range("2022-01", "2023-06", true), "Jan 2022 – Present");
        assert_eq!(format_range("2022-01", "", true), "Jan 2022 – Present");
        assert_eq!(format_range("2022-01", "2023-06", false), "Jan 2022 – Jun 2023");
    }

    #[test]
    fn test_empty_document_omits_sections() {
        let preview = build_preview(&ResumeDocument::new());
        assert_eq!(preview.name, NAME_PLACEHOLDER);
        assert!(preview.contacts.is_empty());
        assert!(preview.summary.is_none());
        assert!(preview.experience.is_none());
        assert!(preview.education.is_none());
        assert!(preview.skills.is_none());

        let text = preview.to_text();
        assert_eq!(text, "Your Name\n");
    }

    #[test]
    fn test_contacts_skip_empty_values() {
        let mut document = ResumeDocument::new();
        document.personal_info.email = "ada@example.com".to_string();
        document.personal_info.location = "London".to_string();

        let preview = build_preview(&document);
        assert_eq!(preview.contacts, vec!["ada@example.com", "London"]);
    }

    #[test]
    fn test_current_entry_ignores_stored_end_date() {
        let mut document = ResumeDocument::new();
        document.experience.push(experience(true, "2020-01"));

        let preview = build_preview(&document);
        let dates = &preview.experience.unwrap()[0].dates;
        assert!(dates.ends_with("Present"));
        assert!(!dates.contains("2020"));
    }

    #[test]
    fn test_education_and_skills_formatting() {
        let mut document = ResumeDocument::new();
        document.education.push(EducationEntry {
            id: EntryId::from("2"),
            institution: "MIT".to_string(),
            degree: "BSc".to_string(),
            field: "Physics".to_string(),
            graduation_date: "2020-06".to_string(),
            gpa: Some(String::new()),
        });
        document.skills.push(SkillCategory {
            id: EntryId::from("3"),
            category: "Languages".to_string(),
            items: vec!["Rust".to_string(), "Go".to_string(), "Rust".to_string()],
        });

        let preview = build_preview(&document);
        let education = &preview.education.as_ref().unwrap()[0];
        assert_eq!(education.title, "BSc in Physics");
        assert_eq!(education.graduation, "Jun 2020");
        assert_eq!(education.gpa, None);
        assert_eq!(
            preview.skills.as_ref().unwrap()[0],
            "Languages: Rust, Go, Rust"
        );
    }

    #[test]
    fn test_text_rendering_contains_sections_in_order() {
        let mut document = ResumeDocument::new();
        document.personal_info.full_name = "Ada Lovelace".to_string();
        document.personal_info.summary = "Analyst".to_string();
        document.experience.push(experience(true, ""));

        let text = build_preview(&document).to_text();
        let summary_at = text.find("Professional Summary").unwrap();
        let experience_at = text.find("Work Experience").unwrap();
        assert!(text.starts_with("Ada Lovelace\n"));
        assert!(summary_at < experience_at);
        assert!(text.contains("Engineer\nAcme\nJan 2022 – Present\n"));
        assert!(!text.contains("Education"));
    }

    #[test]
    fn test_quick_preview_placeholders_and_truncation() {
        let quick = quick_preview(&PersonalInfo::default());
        assert_eq!(quick.name, "Your Name");
        assert_eq!(quick.email, "your.email@example.com");
        assert_eq!(quick.phone, "+1 (555) 123-4567");
        assert_eq!(quick.location, "City, State");
        assert_eq!(quick.summary, None);

        let info = PersonalInfo {
            summary: "x".repeat(120),
            ..Default::default()
        };
        let summary = quick_preview(&info).summary.unwrap();
        assert_eq!(summary, format!("{}...", "x".repeat(100)));

        let info = PersonalInfo {
            summary: "y".repeat(100),
            ..Default::default()
        };
        assert_eq!(quick_preview(&info).summary.unwrap(), "y".repeat(100));
    }
}
