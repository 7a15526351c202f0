// src/core/session.rs
//! Builder session: owns one document and routes commands to the section editors

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;
use uuid::Uuid;

use crate::core::editor::SectionEditor;
use crate::core::ids::IdGenerator;
use crate::core::preview::{build_preview, quick_preview, QuickPreview, ResumePreview};
use crate::core::reducer::{reduce, Section, SectionChange};
use crate::types::{
    EducationField, EntryId, ExperienceField, PersonalField, PersonalInfo, ResumeDocument,
    SkillCategoryField,
};

/// Edit requested by the builder UI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum BuilderCommand {
    SetPersonalInfo { info: PersonalInfo },
    UpdatePersonalInfo { update: PersonalField },
    AddExperience,
    UpdateExperience { id: EntryId, update: ExperienceField },
    RemoveExperience { id: EntryId },
    AddEducation,
    UpdateEducation { id: EntryId, update: EducationField },
    RemoveEducation { id: EntryId },
    AddSkillCategory,
    UpdateSkillCategory { id: EntryId, update: SkillCategoryField },
    RemoveSkillCategory { id: EntryId },
    AddSkillItem { category_id: EntryId, text: String },
    RemoveSkillItem { category_id: EntryId, index: usize },
    SetSkillDraft { category_id: EntryId, text: String },
    CommitSkillDraft { category_id: EntryId },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandOutcome {
    /// Section replaced by the command, if any.
    pub section: Option<Section>,
    /// Id of the entry created by an `add*` command.
    pub created_id: Option<EntryId>,
}

#[derive(Debug)]
pub struct BuilderSession {
    id: Uuid,
    owner: String,
    created_at: DateTime<Utc>,
    document: ResumeDocument,
    ids: IdGenerator,
    skill_drafts: HashMap<EntryId, String>,
}

impl BuilderSession {
    pub fn new(owner: impl Into<String>) -> Self {
        Self::with_document(owner, Uuid::new_v4(), ResumeDocument::new())
    }

    /// Resume editing a previously saved document; the session keeps the document's id
    /// so saving overwrites it.
    pub fn with_document(owner: impl Into<String>, id: Uuid, document: ResumeDocument) -> Self {
        Self {
            id,
            owner: owner.into(),
            created_at: Utc::now(),
            ids: IdGenerator::resuming(&document),
            document,
            skill_drafts: HashMap::new(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn document(&self) -> &ResumeDocument {
        &self.document
    }

    pub fn skill_draft(&self, category_id: &EntryId) -> &str {
        self.skill_drafts
            .get(category_id)
            .map(String::as_str)
            .unwrap_or("")
    }

    pub fn preview(&self) -> ResumePreview {
        build_preview(&self.document)
    }

    pub fn quick_preview(&self) -> QuickPreview {
        quick_preview(&self.document.personal_info)
    }

    pub fn apply(&mut self, command: BuilderCommand) -> CommandOutcome {
        debug!("Session {} applying {:?}", self.id, command);

        let doc = &self.document;
        let mut created_id = None;

        let change = match command {
            BuilderCommand::SetPersonalInfo { info } => Some(SectionChange::PersonalInfo(info)),
            BuilderCommand::UpdatePersonalInfo { update } => Some(SectionChange::PersonalInfo(
                doc.personal_info.clone().with_field(update),
            )),

            BuilderCommand::AddExperience => {
                let (entries, id) = SectionEditor::new(&doc.experience).add(&mut self.ids);
                created_id = Some(id);
                Some(SectionChange::Experience(entries))
            }
            BuilderCommand::UpdateExperience { id, update } => Some(SectionChange::Experience(
                SectionEditor::new(&doc.experience).update(&id, update),
            )),
            BuilderCommand::RemoveExperience { id } => Some(SectionChange::Experience(
                SectionEditor::new(&doc.experience).remove(&id),
            )),

            BuilderCommand::AddEducation => {
                let (entries, id) = SectionEditor::new(&doc.education).add(&mut self.ids);
                created_id = Some(id);
                Some(SectionChange::Education(entries))
            }
            BuilderCommand::UpdateEducation { id, update } => Some(SectionChange::Education(
                SectionEditor::new(&doc.education).update(&id, update),
            )),
            BuilderCommand::RemoveEducation { id } => Some(SectionChange::Education(
                SectionEditor::new(&doc.education).remove(&id),
            )),

            BuilderCommand::AddSkillCategory => {
                let (entries, id) = SectionEditor::new(&doc.skills).add(&mut self.ids);
                created_id = Some(id);
                Some(SectionChange::Skills(entries))
            }
            BuilderCommand::UpdateSkillCategory { id, update } => Some(SectionChange::Skills(
                SectionEditor::new(&doc.skills).update(&id, update),
            )),
            BuilderCommand::RemoveSkillCategory { id } => {
                self.skill_drafts.remove(&id);
                Some(SectionChange::Skills(
                    SectionEditor::new(&doc.skills).remove(&id),
                ))
            }
            BuilderCommand::AddSkillItem { category_id, text } => Some(SectionChange::Skills(
                SectionEditor::new(&doc.skills).add_item(&category_id, &text),
            )),
            BuilderCommand::RemoveSkillItem { category_id, index } => Some(SectionChange::Skills(
                SectionEditor::new(&doc.skills).remove_item(&category_id, index),
            )),

            BuilderCommand::SetSkillDraft { category_id, text } => {
                if SectionEditor::new(&doc.skills).contains(&category_id) {
                    self.skill_drafts.insert(category_id, text);
                }
                None
            }
            BuilderCommand::CommitSkillDraft { category_id } => {
                // The draft is cleared even when it was blank.
                let draft = self.skill_drafts.remove(&category_id).unwrap_or_default();
                Some(SectionChange::Skills(
                    SectionEditor::new(&doc.skills).add_item(&category_id, &draft),
                ))
            }
        };

        let section = change.map(|change| {
            let section = change.section();
            let document = std::mem::take(&mut self.document);
            self.document = reduce(document, change);
            section
        });

        CommandOutcome {
            section,
            created_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn add_experience(session: &mut BuilderSession) -> EntryId {
        session
            .apply(BuilderCommand::AddExperience)
            .created_id
            .unwrap()
    }

    #[test]
    fn test_new_session_is_blank() {
        let session = BuilderSession::new("ada@example.com");
        assert!(session.document().is_blank());
        assert_eq!(session.owner(), "ada@example.com");
    }

    #[test]
    fn test_current_experience_preview_scenario() {
        let mut session = BuilderSession::new("ada@example.com");
        let id = add_experience(&mut session);

        for update in [
            ExperienceField::Company("Acme".to_string()),
            ExperienceField::Position("Engineer".to_string()),
            ExperienceField::StartDate("2022-01".to_string()),
            ExperienceField::Current(true),
        ] {
            let outcome = session.apply(BuilderCommand::UpdateExperience {
                id: id.clone(),
                update,
            });
            assert_eq!(outcome.section, Some(Section::Experience));
        }

        let preview = session.preview();
        let experience = preview.experience.expect("experience section");
        assert_eq!(experience[0].position, "Engineer");
        assert_eq!(experience[0].company, "Acme");
        assert_eq!(experience[0].dates, "Jan 2022 – Present");
    }

    #[test]
    fn test_commands_leave_other_sections_untouched() {
        let mut session = BuilderSession::new("ada@example.com");
        add_experience(&mut session);
        session.apply(BuilderCommand::UpdatePersonalInfo {
            update: PersonalField::FullName("Ada".to_string()),
        });
        let before = session.document().clone();

        session.apply(BuilderCommand::AddEducation);

        assert_eq!(session.document().experience, before.experience);
        assert_eq!(session.document().personal_info, before.personal_info);
        assert_eq!(session.document().education.len(), 1);
    }

    #[test]
    fn test_skill_draft_commit_appends_and_clears() {
        let mut session = BuilderSession::new("ada@example.com");
        let category = session
            .apply(BuilderCommand::AddSkillCategory)
            .created_id
            .unwrap();

        session.apply(BuilderCommand::SetSkillDraft {
            category_id: category.clone(),
            text: " Rust ".to_string(),
        });
        assert_eq!(session.skill_draft(&category), " Rust ");

        session.apply(BuilderCommand::CommitSkillDraft {
            category_id: category.clone(),
        });
        assert_eq!(session.document().skills[0].items, vec!["Rust".to_string()]);
        assert_eq!(session.skill_draft(&category), "");

        // Committing an empty draft adds nothing
        session.apply(BuilderCommand::CommitSkillDraft {
            category_id: category.clone(),
        });
        assert_eq!(session.document().skills[0].items.len(), 1);
    }

    #[test]
    fn test_removing_category_drops_its_draft() {
        let mut session = BuilderSession::new("ada@example.com");
        let category = session
            .apply(BuilderCommand::AddSkillCategory)
            .created_id
            .unwrap();
        session.apply(BuilderCommand::SetSkillDraft {
            category_id: category.clone(),
            text: "Go".to_string(),
        });

        session.apply(BuilderCommand::RemoveSkillCategory {
            id: category.clone(),
        });

        assert!(session.document().skills.is_empty());
        assert_eq!(session.skill_draft(&category), "");
    }

    #[test]
    fn test_draft_for_unknown_category_is_ignored() {
        let mut session = BuilderSession::new("ada@example.com");
        let outcome = session.apply(BuilderCommand::SetSkillDraft {
            category_id: EntryId::from("nope"),
            text: "Go".to_string(),
        });
        assert_eq!(outcome, CommandOutcome::default());
        assert_eq!(session.skill_draft(&EntryId::from("nope")), "");
    }

    #[test]
    fn test_ids_unique_across_sections() {
        let mut session = BuilderSession::new("ada@example.com");
        let a = add_experience(&mut session);
        let b = session
            .apply(BuilderCommand::AddEducation)
            .created_id
            .unwrap();
        let c = session
            .apply(BuilderCommand::AddSkillCategory)
            .created_id
            .unwrap();
        assert_ne!(a, b);
        assert_ne!(b, c);
        assert_ne!(a, c);
    }

    #[test]
    fn test_reopened_document_keeps_id_and_never_reuses_entry_ids() {
        let mut session = BuilderSession::new("ada@example.com");
        let existing = add_experience(&mut session);
        let document = session.document().clone();
        let document_id = Uuid::new_v4();

        let mut reopened = BuilderSession::with_document("ada@example.com", document_id, document);
        let created = add_experience(&mut reopened);

        assert_eq!(reopened.id(), document_id);
        assert_ne!(created, existing);
        assert_eq!(reopened.document().experience.len(), 2);
    }

    #[test]
    fn test_command_wire_format() {
        let command: BuilderCommand = serde_json::from_value(serde_json::json!({
            "type": "updateExperience",
            "id": "42",
            "update": { "field": "position", "value": "Engineer" }
        }))
        .unwrap();
        assert_eq!(
            command,
            BuilderCommand::UpdateExperience {
                id: EntryId::from("42"),
                update: ExperienceField::Position("Engineer".to_string()),
            }
        );

        let command: BuilderCommand = serde_json::from_value(serde_json::json!({
            "type": "removeSkillItem",
            "categoryId": "7",
            "index": 1
        }))
        .unwrap();
        assert_eq!(
            command,
            BuilderCommand::RemoveSkillItem {
                category_id: EntryId::from("7"),
                index: 1,
            }
        );
    }
}
