// src/core/editor.rs
//! CRUD-by-id section editors
//!
//! Every operation takes the current collection by reference and returns a new
//! one. The input is never mutated, so observers holding the old value see the
//! change as a replacement.

use crate::core::ids::IdGenerator;
use crate::types::{
    EducationEntry, EducationField, EntryId, ExperienceEntry, ExperienceField, SkillCategory,
    SkillCategoryField,
};

/// An entry of a repeatable resume section.
pub trait SectionEntry: Clone {
    type Field;

    fn id(&self) -> &EntryId;

    /// Fresh entry with empty/default values.
    fn blank(id: EntryId) -> Self;

    fn apply(&mut self, field: Self::Field);
}

pub struct SectionEditor<'a, T> {
    entries: &'a [T],
}

impl<'a, T: SectionEntry> SectionEditor<'a, T> {
    pub fn new(entries: &'a [T]) -> Self {
        Self { entries }
    }

    /// Append a blank entry; returns the new collection and the new entry's id.
    pub fn add(&self, ids: &mut IdGenerator) -> (Vec<T>, EntryId) {
        let id = ids.next_id();
        let mut updated = Vec::with_capacity(self.entries.len() + 1);
        updated.extend_from_slice(self.entries);
        updated.push(T::blank(id.clone()));
        (updated, id)
    }

    /// Replace one field of the entry matching `id`. Unknown ids leave the collection as is.
    pub fn update(&self, id: &EntryId, field: T::Field) -> Vec<T> {
        let mut field = Some(field);
        self.entries
            .iter()
            .map(|entry| {
                let mut entry = entry.clone();
                if entry.id() == id {
                    if let Some(field) = field.take() {
                        entry.apply(field);
                    }
                }
                entry
            })
            .collect()
    }

    pub fn remove(&self, id: &EntryId) -> Vec<T> {
        self.entries
            .iter()
            .filter(|entry| entry.id() != id)
            .cloned()
            .collect()
    }

    pub fn contains(&self, id: &EntryId) -> bool {
        self.entries.iter().any(|entry| entry.id() == id)
    }
}

impl SectionEditor<'_, SkillCategory> {
    /// Append a skill to a category. Text that trims to nothing is ignored.
    pub fn add_item(&self, category_id: &EntryId, text: &str) -> Vec<SkillCategory> {
        let skill = text.trim();
        if skill.is_empty() {
            return self.entries.to_vec();
        }
        self.map_category(category_id, |category| category.items.push(skill.to_string()))
    }

    /// Remove the skill at `index`; duplicates are removed one position at a time.
    pub fn remove_item(&self, category_id: &EntryId, index: usize) -> Vec<SkillCategory> {
        self.map_category(category_id, |category| {
            if index < category.items.len() {
                category.items.remove(index);
            }
        })
    }

    fn map_category(
        &self,
        category_id: &EntryId,
        f: impl FnOnce(&mut SkillCategory),
    ) -> Vec<SkillCategory> {
        let mut f = Some(f);
        self.entries
            .iter()
            .map(|category| {
                let mut category = category.clone();
                if &category.id == category_id {
                    if let Some(f) = f.take() {
                        f(&mut category);
                    }
                }
                category
            })
            .collect()
    }
}

// ===== Section Entries =====

impl SectionEntry for ExperienceEntry {
    type Field = ExperienceField;

    fn id(&self) -> &EntryId {
        &self.id
    }

    fn blank(id: EntryId) -> Self {
        Self {
            id,
            company: String::new(),
            position: String::new(),
            start_date: String::new(),
            end_date: String::new(),
            current: false,
            description: String::new(),
        }
    }

    fn apply(&mut self, field: ExperienceField) {
        match field {
            ExperienceField::Company(v) => self.company = v,
            ExperienceField::Position(v) => self.position = v,
            ExperienceField::StartDate(v) => self.start_date = v,
            ExperienceField::EndDate(v) => self.end_date = v,
            ExperienceField::Current(v) => self.current = v,
            ExperienceField::Description(v) => self.description = v,
        }
    }
}

impl SectionEntry for EducationEntry {
    type Field = EducationField;

    fn id(&self) -> &EntryId {
        &self.id
    }

    fn blank(id: EntryId) -> Self {
        Self {
            id,
            institution: String::new(),
            degree: String::new(),
            field: String::new(),
            graduation_date: String::new(),
            gpa: None,
        }
    }

    fn apply(&mut self, field: EducationField) {
        match field {
            EducationField::Institution(v) => self.institution = v,
            EducationField::Degree(v) => self.degree = v,
            EducationField::Field(v) => self.field = v,
            EducationField::GraduationDate(v) => self.graduation_date = v,
            EducationField::Gpa(v) => self.gpa = v,
        }
    }
}

impl SectionEntry for SkillCategory {
    type Field = SkillCategoryField;

    fn id(&self) -> &EntryId {
        &self.id
    }

    fn blank(id: EntryId) -> Self {
        Self {
            id,
            category: String::new(),
            items: Vec::new(),
        }
    }

    fn apply(&mut self, field: SkillCategoryField) {
        match field {
            SkillCategoryField::Category(v) => self.category = v,
            SkillCategoryField::Items(v) => self.items = v,
        }
    }
}
