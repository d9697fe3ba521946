//! Profile record -> placeholder map

use crate::profile::record::{text, ProfileRecord, SkillsSection};
use serde::Serialize;
use std::collections::BTreeMap;

/// Token name (without braces) -> replacement text
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PlaceholderMap {
    values: BTreeMap<String, String>,
}

impl PlaceholderMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.values.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    /// Braced form of every token, e.g. `{{NAME}}`
    pub fn tokens(&self) -> impl Iterator<Item = String> + '_ {
        self.names().map(token)
    }
}

/// `NAME` -> `{{NAME}}`
pub fn token(name: &str) -> String {
    format!("{{{{{}}}}}", name)
}

/// `{{NAME}}` -> `NAME`
pub fn token_name(token: &str) -> &str {
    token
        .strip_prefix("{{")
        .and_then(|t| t.strip_suffix("}}"))
        .unwrap_or(token)
}

/// Flatten a profile into every placeholder token it can fill
pub fn flatten(profile: &ProfileRecord) -> PlaceholderMap {
    let mut map = PlaceholderMap::new();

    if let Some(personal) = &profile.personal_info {
        let name = text(&personal.name);
        map.insert("NAME", name.as_str());
        map.insert("Name", name);
        map.insert("LOCATION", text(&personal.location));
        map.insert("EMAIL", text(&personal.email));
        map.insert("PHONE", text(&personal.phone));
        map.insert("GITHUB", text(&personal.github));
        map.insert("LINKEDIN", text(&personal.linkedin));
    }

    for (idx, edu) in profile.education.iter().flatten().enumerate() {
        let prefix = format!("EDU_{}", idx + 1);
        map.insert(format!("{}_SCHOOL", prefix), edu.school_name());
        map.insert(format!("{}_LOCATION", prefix), text(&edu.location));
        map.insert(format!("{}_DEGREE", prefix), text(&edu.degree));
        map.insert(format!("{}_DATE", prefix), edu.date_span().to_string());
        map.insert(
            format!("{}_COURSES", prefix),
            edu.courses
                .as_ref()
                .map(|c| c.joined(", "))
                .unwrap_or_default(),
        );
    }

    for (idx, exp) in profile.experience.iter().flatten().enumerate() {
        let prefix = format!("EXP_{}", idx + 1);
        map.insert(format!("{}_COMPANY", prefix), text(&exp.company));
        map.insert(format!("{}_LOCATION", prefix), text(&exp.location));
        map.insert(format!("{}_TITLE", prefix), text(&exp.title));
        map.insert(format!("{}_DATE", prefix), exp.date_span().to_string());

        let achievements = exp.achievement_list();
        for (ach_idx, achievement) in achievements.iter().enumerate() {
            map.insert(
                format!("{}_ACHIEVEMENT_{}", prefix, ach_idx + 1),
                achievement.as_str(),
            );
        }
        if let [only] = achievements.as_slice() {
            map.insert(format!("{}_ACHIEVEMENT", prefix), only.as_str());
        }
        map.insert(format!("{}_ACHIEVEMENTS", prefix), achievements.join("\n"));
    }

    if let Some(SkillsSection::Grouped(skills)) = &profile.skills {
        if let Some(languages) = &skills.languages {
            let joined = languages.joined(", ");
            map.insert("SKILL_LANGUAGE", joined.as_str());
            map.insert("SKILLS_LANGUAGES", joined);
        }
        if let Some(frameworks) = &skills.frameworks_tools {
            let joined = frameworks.joined(", ");
            map.insert("SKILL_FRAME_TOOL", joined.as_str());
            map.insert("SKILLS_FRAMEWORKS_TOOLS", joined);
        }
        if skills.language_processing.is_some() {
            map.insert("SKILLS_LANGUAGE_PROCESSING", text(&skills.language_processing));
        }
        if skills.data_visualization.is_some() {
            map.insert("SKILLS_DATA_VIZ", text(&skills.data_visualization));
        }
    }

    for (idx, proj) in profile.projects.iter().flatten().enumerate() {
        let prefix = format!("PROJ_{}", idx + 1);
        map.insert(format!("{}_NAME", prefix), text(&proj.name));
        map.insert(format!("{}_DATE", prefix), text(&proj.date));

        let descriptions = proj.description_list();
        for (desc_idx, description) in descriptions.iter().enumerate() {
            map.insert(
                format!("{}_DESC_{}", prefix, desc_idx + 1),
                description.as_str(),
            );
        }
        map.insert(format!("{}_DESC", prefix), descriptions.join("\n"));
    }

    map
}
