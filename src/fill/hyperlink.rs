//! Construction of new hyperlink elements

use crate::config::HyperlinkConfig;
use crate::docx::model::{Formatting, HYPERLINK, RUN, RUN_PROPERTIES, TEXT};
use crate::docx::relationships::Relationships;
use crate::docx::xml::XmlElement;
use regex::Regex;
use std::sync::OnceLock;

/// Fixed visual style of inserted links
#[derive(Debug, Clone, PartialEq)]
pub struct HyperlinkStyle {
    pub color: String,
    pub underline: String,
    pub default_scheme: String,
}

impl Default for HyperlinkStyle {
    fn default() -> Self {
        Self::from(&HyperlinkConfig::default())
    }
}

impl From<&HyperlinkConfig> for HyperlinkStyle {
    fn from(config: &HyperlinkConfig) -> Self {
        Self {
            color: config.color.clone(),
            underline: config.underline.clone(),
            default_scheme: config.default_scheme.clone(),
        }
    }
}

fn scheme_regex() -> &'static Regex {
    static SCHEME: OnceLock<Regex> = OnceLock::new();
    SCHEME.get_or_init(|| {
        Regex::new(r"^(?i)(?:[a-z][a-z0-9+.\-]*://|mailto:|tel:)").expect("Invalid scheme regex")
    })
}

/// Prefix `default_scheme` unless the URL already names one
pub fn normalize_url(url: &str, default_scheme: &str) -> String {
    let url = url.trim();
    if scheme_regex().is_match(url) {
        url.to_string()
    } else {
        format!("{}://{}", default_scheme, url)
    }
}

/// Build `<w:hyperlink r:id=..>` holding one styled run, registering the target
pub fn build_hyperlink(
    display_text: &str,
    target_url: &str,
    template: &Formatting,
    style: &HyperlinkStyle,
    relationships: &mut Relationships,
) -> XmlElement {
    let url = normalize_url(target_url, &style.default_scheme);
    let relationship_id = relationships.add_external_hyperlink(&url);

    // Children in CT_RPr sequence order: rFonts, color, sz, szCs, u
    let mut properties = XmlElement::new(RUN_PROPERTIES);
    if let Some(font) = &template.font_name {
        properties = properties.with_child(
            XmlElement::new("w:rFonts")
                .with_attribute("w:ascii", font.as_str())
                .with_attribute("w:hAnsi", font.as_str()),
        );
    }
    properties = properties
        .with_child(XmlElement::new("w:color").with_attribute("w:val", style.color.as_str()));
    if let Some(size) = template.size {
        properties = properties
            .with_child(XmlElement::new("w:sz").with_attribute("w:val", size.to_string()))
            .with_child(XmlElement::new("w:szCs").with_attribute("w:val", size.to_string()));
    }
    properties = properties
        .with_child(XmlElement::new("w:u").with_attribute("w:val", style.underline.as_str()));

    let mut text = XmlElement::new(TEXT).with_text(display_text);
    if display_text.starts_with(char::is_whitespace) || display_text.ends_with(char::is_whitespace) {
        text.set_attribute("xml:space", "preserve");
    }

    let run = XmlElement::new(RUN).with_child(properties).with_child(text);

    XmlElement::new(HYPERLINK)
        .with_attribute("r:id", relationship_id)
        .with_child(run)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::docx::model::{HyperlinkElement, RunElement};

    #[test]
    fn test_scheme_is_added_when_missing() {
        assert_eq!(normalize_url("jdoe", "https"), "https://jdoe");
        assert_eq!(
            normalize_url("github.com/jdoe", "https"),
            "https://github.com/jdoe"
        );
        assert_eq!(
            normalize_url("http://example.com", "https"),
            "http://example.com"
        );
        assert_eq!(
            normalize_url("HTTPS://example.com", "https"),
            "HTTPS://example.com"
        );
        assert_eq!(normalize_url("mailto:a@b.c", "https"), "mailto:a@b.c");
        assert_eq!(normalize_url(" linkedin.com/in/x ", "https"), "https://linkedin.com/in/x");
    }

    #[test]
    fn test_hyperlink_uses_template_font_and_fixed_style() {
        let template = Formatting {
            font_name: Some("Arial".to_string()),
            size: Some(22),
            bold: Some(true),
            ..Formatting::default()
        };
        let mut rels = Relationships::default();
        let element = build_hyperlink(
            "Github",
            "jdoe",
            &template,
            &HyperlinkStyle::default(),
            &mut rels,
        );

        let link = HyperlinkElement::read(&element);
        assert_eq!(link.display_text, "Github");
        let rel_id = link.relationship_id.unwrap();
        assert_eq!(rels.get(&rel_id).unwrap().target, "https://jdoe");

        let run = RunElement::read(element.child(RUN).unwrap());
        let formatting = run.formatting();
        assert_eq!(formatting.font_name.as_deref(), Some("Arial"));
        assert_eq!(formatting.size, Some(22));
        assert_eq!(formatting.color.as_deref(), Some("0563C1"));
        assert_eq!(formatting.underline.as_deref(), Some("single"));
        // Link style does not inherit weight
        assert_eq!(formatting.bold, None);

        let order: Vec<&str> = run
            .properties()
            .unwrap()
            .elements()
            .map(|e| e.name.as_str())
            .collect();
        assert_eq!(order, vec!["w:rFonts", "w:color", "w:sz", "w:szCs", "w:u"]);
    }

    #[test]
    fn test_hyperlink_without_template_formatting() {
        let mut rels = Relationships::default();
        let element = build_hyperlink(
            "Linkedin",
            "https://linkedin.com/in/jdoe",
            &Formatting::default(),
            &HyperlinkStyle::default(),
            &mut rels,
        );
        let run = RunElement::read(element.child(RUN).unwrap());
        let order: Vec<&str> = run
            .properties()
            .unwrap()
            .elements()
            .map(|e| e.name.as_str())
            .collect();
        assert_eq!(order, vec!["w:color", "w:u"]);
        assert_eq!(rels.iter().count(), 1);
    }
}
