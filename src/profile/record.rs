//! Candidate profile record
//!
//! Fields that appear in more than one equivalent shape are modelled as
//! explicit variants and resolved by the accessor methods, so the flattener
//! never has to look keys up itself.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProfileRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub personal_info: Option<PersonalInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub education: Option<Vec<Education>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub experience: Option<Vec<Experience>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skills: Option<SkillsSection>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub projects: Option<Vec<Project>>,
    /// Sections the filler does not use, kept for round-tripping
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_yaml::Value>,
}

/// A YAML scalar rendered as text (`phone: 5551234567`, `start_date: 2020`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Boolean(bool),
    Integer(i64),
    Float(f64),
    Text(String),
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Boolean(b) => write!(f, "{}", b),
            Scalar::Integer(i) => write!(f, "{}", i),
            Scalar::Float(x) => write!(f, "{}", x),
            Scalar::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for Scalar {
    fn from(s: &str) -> Self {
        Scalar::Text(s.to_string())
    }
}

/// Either a single scalar or a list of scalars
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TextOrList {
    List(Vec<Scalar>),
    Single(Scalar),
}

impl TextOrList {
    pub fn items(&self) -> Vec<String> {
        match self {
            TextOrList::List(items) => items.iter().map(Scalar::to_string).collect(),
            TextOrList::Single(item) => vec![item.to_string()],
        }
    }

    /// List items joined with `separator`; a single value is returned as is
    pub fn joined(&self, separator: &str) -> String {
        match self {
            TextOrList::List(items) => items
                .iter()
                .map(Scalar::to_string)
                .collect::<Vec<_>>()
                .join(separator),
            TextOrList::Single(item) => item.to_string(),
        }
    }
}

/// The two accepted ways of writing a date
#[derive(Debug, Clone, PartialEq)]
pub enum DateSpan {
    Single(String),
    Range { start: String, end: String },
    Missing,
}

impl DateSpan {
    pub fn resolve(date: Option<&Scalar>, start: Option<&Scalar>, end: Option<&Scalar>) -> Self {
        match (date.map(Scalar::to_string), start, end) {
            (Some(date), _, _) if !date.is_empty() => DateSpan::Single(date),
            (_, Some(start), Some(end)) => DateSpan::Range {
                start: start.to_string(),
                end: end.to_string(),
            },
            _ => DateSpan::Missing,
        }
    }
}

impl fmt::Display for DateSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DateSpan::Single(date) => f.write_str(date),
            DateSpan::Range { start, end } => write!(f, "{} – {}", start, end),
            DateSpan::Missing => Ok(()),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PersonalInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<Scalar>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<Scalar>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<Scalar>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<Scalar>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub github: Option<Scalar>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub linkedin: Option<Scalar>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_yaml::Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Education {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub school: Option<Scalar>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub institution: Option<Scalar>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<Scalar>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub degree: Option<Scalar>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<Scalar>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<Scalar>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<Scalar>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub courses: Option<TextOrList>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_yaml::Value>,
}

impl Education {
    /// `school`, falling back to `institution`
    pub fn school_name(&self) -> String {
        self.school
            .as_ref()
            .or(self.institution.as_ref())
            .map(Scalar::to_string)
            .unwrap_or_default()
    }

    pub fn date_span(&self) -> DateSpan {
        DateSpan::resolve(
            self.date.as_ref(),
            self.start_date.as_ref(),
            self.end_date.as_ref(),
        )
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Experience {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<Scalar>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<Scalar>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<Scalar>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<Scalar>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<Scalar>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<Scalar>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub achievements: Option<TextOrList>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_yaml::Value>,
}

impl Experience {
    pub fn date_span(&self) -> DateSpan {
        DateSpan::resolve(
            self.date.as_ref(),
            self.start_date.as_ref(),
            self.end_date.as_ref(),
        )
    }

    pub fn achievement_list(&self) -> Vec<String> {
        self.achievements
            .as_ref()
            .map(TextOrList::items)
            .unwrap_or_default()
    }
}

/// Skills either as groups of lists, free-text categories, or anything else
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SkillsSection {
    Grouped(SkillGroups),
    Unstructured(serde_yaml::Value),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SkillGroups {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub languages: Option<TextOrList>,
    #[serde(
        default,
        alias = "frameworks_and_tools",
        alias = "frameworks",
        skip_serializing_if = "Option::is_none"
    )]
    pub frameworks_tools: Option<TextOrList>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language_processing: Option<Scalar>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_visualization: Option<Scalar>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_yaml::Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Project {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<Scalar>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<Scalar>,
    #[serde(
        default,
        alias = "description",
        skip_serializing_if = "Option::is_none"
    )]
    pub descriptions: Option<TextOrList>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_yaml::Value>,
}

impl Project {
    pub fn description_list(&self) -> Vec<String> {
        self.descriptions
            .as_ref()
            .map(TextOrList::items)
            .unwrap_or_default()
    }
}

/// Render an optional scalar, empty when absent
pub fn text(value: &Option<Scalar>) -> String {
    value.as_ref().map(Scalar::to_string).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_scalars_render_as_text() {
        let info: PersonalInfo = serde_yaml::from_str("name: Jane\nphone: 5551234567\n").unwrap();
        assert_eq!(text(&info.phone), "5551234567");
        assert_eq!(text(&info.name), "Jane");
        assert_eq!(text(&info.email), "");
    }

    #[test]
    fn test_date_span_variants() {
        let single: Experience = serde_yaml::from_str("date: Summer 2023\n").unwrap();
        assert_eq!(single.date_span(), DateSpan::Single("Summer 2023".to_string()));

        let range: Experience =
            serde_yaml::from_str("start_date: Jan 2020\nend_date: Present\n").unwrap();
        assert_eq!(range.date_span().to_string(), "Jan 2020 – Present");

        let years: Education = serde_yaml::from_str("start_date: 2018\nend_date: 2022\n").unwrap();
        assert_eq!(years.date_span().to_string(), "2018 – 2022");

        let empty_date: Education =
            serde_yaml::from_str("date: ''\nstart_date: 2018\nend_date: 2022\n").unwrap();
        assert_eq!(empty_date.date_span().to_string(), "2018 – 2022");

        let start_only: Education = serde_yaml::from_str("start_date: 2018\n").unwrap();
        assert_eq!(start_only.date_span(), DateSpan::Missing);
    }

    #[test]
    fn test_institution_alias() {
        let edu: Education = serde_yaml::from_str("institution: MIT\n").unwrap();
        assert_eq!(edu.school_name(), "MIT");

        let both: Education = serde_yaml::from_str("school: Stanford\ninstitution: MIT\n").unwrap();
        assert_eq!(both.school_name(), "Stanford");
    }

    #[test]
    fn test_text_or_list() {
        let list: TextOrList = serde_yaml::from_str("[Algorithms, Databases]").unwrap();
        assert_eq!(list.joined(", "), "Algorithms, Databases");

        let single: TextOrList = serde_yaml::from_str("Algorithms and Databases").unwrap();
        assert_eq!(single.items(), vec!["Algorithms and Databases".to_string()]);
    }

    #[test]
    fn test_skills_shapes() {
        let grouped: SkillsSection =
            serde_yaml::from_str("languages: [Rust, Python]\nframeworks_and_tools: [Tokio]\n")
                .unwrap();
        match grouped {
            SkillsSection::Grouped(groups) => {
                assert_eq!(groups.languages.unwrap().joined(", "), "Rust, Python");
                assert_eq!(groups.frameworks_tools.unwrap().joined(", "), "Tokio");
            }
            other => panic!("expected grouped skills, got {:?}", other),
        }

        let listed: SkillsSection = serde_yaml::from_str("[Rust, Python]").unwrap();
        assert!(matches!(listed, SkillsSection::Unstructured(_)));
    }
}
