// src/core/reducer.rs
//! Single writer for the resume document

use serde::Serialize;

use crate::types::{EducationEntry, ExperienceEntry, PersonalInfo, ResumeDocument, SkillCategory};

/// A section of the document replaced by one of the editors.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "section", content = "value", rename_all = "camelCase")]
pub enum SectionChange {
    PersonalInfo(PersonalInfo),
    Experience(Vec<ExperienceEntry>),
    Education(Vec<EducationEntry>),
    Skills(Vec<SkillCategory>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Section {
    PersonalInfo,
    Experience,
    Education,
    Skills,
}

impl SectionChange {
    pub fn section(&self) -> Section {
        match self {
            SectionChange::PersonalInfo(_) => Section::PersonalInfo,
            SectionChange::Experience(_) => Section::Experience,
            SectionChange::Education(_) => Section::Education,
            SectionChange::Skills(_) => Section::Skills,
        }
    }
}

/// Produce the next document; every section other than the changed one carries over.
pub fn reduce(document: ResumeDocument, change: SectionChange) -> ResumeDocument {
    match change {
        SectionChange::PersonalInfo(personal_info) => ResumeDocument {
            personal_info,
            ..document
        },
        SectionChange::Experience(experience) => ResumeDocument {
            experience,
            ..document
        },
        SectionChange::Education(education) => ResumeDocument {
            education,
            ..document
        },
        SectionChange::Skills(skills) => ResumeDocument { skills, ..document },
    }
}
