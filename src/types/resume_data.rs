// src/types/resume_data.rs
//! Resume document model shared by the builder session, the preview and the collaborators

use serde::{Deserialize, Serialize};
use std::fmt;

// ===== Identifiers =====

/// Identifier of one entry inside a repeatable section.
///
/// Serialized as a plain decimal string, the shape the browser builder uses.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntryId(String);

impl EntryId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Numeric value of ids produced by the time source, if this id is one.
    pub fn as_millis(&self) -> Option<i64> {
        self.0.parse().ok()
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EntryId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

// ===== Resume Document =====

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResumeDocument {
    pub personal_info: PersonalInfo,
    #[serde(default)]
    pub experience: Vec<ExperienceEntry>,
    #[serde(default)]
    pub education: Vec<EducationEntry>,
    #[serde(default)]
    pub skills: Vec<SkillCategory>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PersonalInfo {
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub location: String,
    pub summary: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExperienceEntry {
    pub id: EntryId,
    #[serde(default)]
    pub company: String,
    #[serde(default)]
    pub position: String,
    #[serde(default)]
    pub start_date: String,
    /// Ignored for display while `current` is set.
    #[serde(default)]
    pub end_date: String,
    #[serde(default)]
    pub current: bool,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EducationEntry {
    pub id: EntryId,
    #[serde(default)]
    pub institution: String,
    #[serde(default)]
    pub degree: String,
    #[serde(default)]
    pub field: String,
    #[serde(default)]
    pub graduation_date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gpa: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillCategory {
    pub id: EntryId,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub items: Vec<String>,
}

impl ResumeDocument {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every entry id across all sections, in section order.
    pub fn entry_ids(&self) -> impl Iterator<Item = &EntryId> {
        self.experience
            .iter()
            .map(|e| &e.id)
            .chain(self.education.iter().map(|e| &e.id))
            .chain(self.skills.iter().map(|s| &s.id))
    }

    pub fn is_blank(&self) -> bool {
        self.personal_info == PersonalInfo::default()
            && self.experience.is_empty()
            && self.education.is_empty()
            && self.skills.is_empty()
    }
}

// ===== Typed Field Updates =====

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "field", content = "value", rename_all = "camelCase")]
pub enum PersonalField {
    FullName(String),
    Email(String),
    Phone(String),
    Location(String),
    Summary(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "field", content = "value", rename_all = "camelCase")]
pub enum ExperienceField {
    Company(String),
    Position(String),
    StartDate(String),
    EndDate(String),
    Current(bool),
    Description(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "field", content = "value", rename_all = "camelCase")]
pub enum EducationField {
    Institution(String),
    Degree(String),
    Field(String),
    GraduationDate(String),
    Gpa(Option<String>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "field", content = "value", rename_all = "camelCase")]
pub enum SkillCategoryField {
    Category(String),
    Items(Vec<String>),
}

impl PersonalInfo {
    pub fn with_field(mut self, field: PersonalField) -> Self {
        match field {
            PersonalField::FullName(v) => self.full_name = v,
            PersonalField::Email(v) => self.email = v,
            PersonalField::Phone(v) => self.phone = v,
            PersonalField::Location(v) => self.location = v,
            PersonalField::Summary(v) => self.summary = v,
        }
        self
    }
}
