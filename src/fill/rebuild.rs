//! Splitting runs at token boundaries and rebuilding the paragraph
//!
//! One call resolves one token. The paragraph is read and indexed afresh on
//! every call; nothing derived from a previous call is reused.

use crate::docx::model::{build_run, Formatting, InlineElement, Paragraph};
use crate::docx::relationships::Relationships;
use crate::docx::xml::{XmlElement, XmlNode};
use crate::fill::hyperlink::{build_hyperlink, HyperlinkStyle};
use log::debug;

/// What replaces a matched token
#[derive(Debug, Clone, PartialEq)]
pub enum Replacement {
    Text(String),
    Hyperlink { display: String, url: String },
}

#[derive(Debug, Clone, PartialEq)]
pub enum ApplyOutcome {
    Replaced,
    Linked { relationship_id: String },
    /// The offset no longer points at the token; nothing was changed
    StaleIndex,
}

/// Replace `token` found at char offset `start` of `paragraph` with `replacement`
pub fn apply(
    paragraph: &mut XmlElement,
    start: usize,
    token: &str,
    replacement: &Replacement,
    relationships: &mut Relationships,
    style: &HyperlinkStyle,
) -> ApplyOutcome {
    let content = Paragraph::read(paragraph);
    let index = content.index();
    let token_len = token.chars().count();
    if token_len == 0 {
        return ApplyOutcome::StaleIndex;
    }

    let (Some(first), Some(last)) = (index.get(start), index.get(start + token_len - 1)) else {
        debug!("Offset {} for {} is outside the paragraph index", start, token);
        return ApplyOutcome::StaleIndex;
    };

    let text = content.text();
    let at_start: String = text.chars().skip(start).take(token_len).collect();
    if at_start != token {
        debug!("Offset {} no longer holds {}", start, token);
        return ApplyOutcome::StaleIndex;
    }

    let template = match &content.elements[first.element] {
        InlineElement::Run(run) => Some(run),
        _ => content.first_run(),
    };
    let template_properties = template.and_then(|run| run.properties());
    let template_attributes = template.map(|run| run.node.attributes.as_slice()).unwrap_or(&[]);

    let mut rebuilt: Vec<XmlNode> = Vec::with_capacity(content.elements.len() + 2);

    for element in &content.elements[..first.element] {
        rebuilt.push(element.to_node());
    }

    if let Some(leading) = content.elements[first.element].before(first.offset) {
        rebuilt.push(leading);
    }

    let outcome = match replacement {
        Replacement::Text(value) => {
            if !value.is_empty() {
                rebuilt.push(XmlNode::Element(build_run(
                    template_attributes,
                    template_properties,
                    value,
                )));
            }
            ApplyOutcome::Replaced
        }
        Replacement::Hyperlink { display, url } => {
            let formatting = Formatting::from_run_properties(template_properties);
            let link = build_hyperlink(display, url, &formatting, style, relationships);
            let relationship_id = link.attribute("r:id").unwrap_or_default().to_string();
            rebuilt.push(XmlNode::Element(link));
            ApplyOutcome::Linked { relationship_id }
        }
    };

    // Bookmarks and similar markers inside the span stay; text inside it goes
    if last.element > first.element {
        for element in &content.elements[first.element + 1..last.element] {
            if let InlineElement::Passthrough(node) = element {
                rebuilt.push(node.clone());
            }
        }
    }

    if let Some(trailing) = content.elements[last.element].after(last.offset + 1) {
        rebuilt.push(trailing);
    }

    for element in &content.elements[last.element + 1..] {
        rebuilt.push(element.to_node());
    }

    content.write_content(paragraph, rebuilt);
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::docx::model::{HyperlinkElement, RunElement, RUN};
    use crate::docx::xml::XmlDocument;

    fn paragraph(xml: &str) -> XmlElement {
        let wrapped = format!(r#"<w:p xmlns:w="urn:w" xmlns:r="urn:r">{}</w:p>"#, xml);
        XmlDocument::parse_str(&wrapped).unwrap().root
    }

    fn replace(p: &mut XmlElement, token: &str, value: &str) -> ApplyOutcome {
        let text = Paragraph::read(p).text();
        let byte = text.find(token).expect("token present");
        apply(
            p,
            text[..byte].chars().count(),
            token,
            &Replacement::Text(value.to_string()),
            &mut Relationships::default(),
            &HyperlinkStyle::default(),
        )
    }

    fn runs(p: &XmlElement) -> Vec<RunElement> {
        p.elements()
            .filter(|e| e.is(RUN))
            .map(RunElement::read)
            .collect()
    }

    #[test]
    fn test_formatting_is_preserved() {
        let mut p = paragraph(
            r#"<w:r><w:rPr><w:rFonts w:ascii="Arial" w:hAnsi="Arial"/><w:b/><w:sz w:val="22"/></w:rPr><w:t xml:space="preserve">Name: {{NAME}}</w:t></w:r>"#,
        );
        assert_eq!(replace(&mut p, "{{NAME}}", "John Doe"), ApplyOutcome::Replaced);

        assert_eq!(Paragraph::read(&p).text(), "Name: John Doe");
        let runs = runs(&p);
        assert_eq!(runs.len(), 2);
        assert_eq!(runs[1].text, "John Doe");

        let formatting = runs[1].formatting();
        assert_eq!(formatting.bold, Some(true));
        assert_eq!(formatting.font_name.as_deref(), Some("Arial"));
        assert_eq!(formatting.size, Some(22));
        assert_eq!(runs[0].formatting(), formatting);
    }

    #[test]
    fn test_token_spanning_runs_uses_first_run_formatting() {
        let mut p = paragraph(
            r#"<w:r><w:rPr><w:b/></w:rPr><w:t>{{NA</w:t></w:r><w:r><w:rPr><w:i/></w:rPr><w:t>ME}}</w:t></w:r>"#,
        );
        replace(&mut p, "{{NAME}}", "John Doe");

        let runs = runs(&p);
        assert_eq!(runs.len(), 1);
        assert_eq!(runs[0].text, "John Doe");
        assert_eq!(runs[0].formatting().bold, Some(true));
        assert_eq!(runs[0].formatting().italic, None);
    }

    #[test]
    fn test_partial_boundary_runs_keep_their_own_formatting() {
        let mut q = paragraph(
            r#"<w:r><w:rPr><w:b/></w:rPr><w:t>Hi {{N</w:t></w:r><w:r><w:t>A</w:t></w:r><w:r><w:rPr><w:i/></w:rPr><w:t>ME}}!</w:t></w:r>"#,
        );
        replace(&mut q, "{{NAME}}", "Jo");

        let runs = runs(&q);
        let texts: Vec<&str> = runs.iter().map(|r| r.text.as_str()).collect();
        assert_eq!(texts, vec!["Hi ", "Jo", "!"]);
        assert_eq!(runs[0].formatting().bold, Some(true));
        assert_eq!(runs[1].formatting().bold, Some(true));
        assert_eq!(runs[2].formatting().italic, Some(true));
    }

    #[test]
    fn test_offset_not_holding_token_is_noop() {
        let mut p = paragraph(
            r#"<w:r><w:t>Hi {{NA</w:t></w:r><w:r><w:t>x</w:t></w:r><w:r><w:t>ME}}!</w:t></w:r>"#,
        );
        let before = p.clone();
        let outcome = apply(
            &mut p,
            3,
            "{{NAME}}",
            &Replacement::Text("Jo".to_string()),
            &mut Relationships::default(),
            &HyperlinkStyle::default(),
        );
        assert_eq!(outcome, ApplyOutcome::StaleIndex);
        assert_eq!(p, before);
    }

    #[test]
    fn test_paragraph_properties_survive_verbatim() {
        let mut p = paragraph(
            r#"<w:pPr><w:pStyle w:val="ListBullet"/><w:numPr><w:ilvl w:val="0"/><w:numId w:val="3"/></w:numPr><w:jc w:val="both"/></w:pPr><w:r><w:t>{{EXP_1_ACHIEVEMENT_1}}</w:t></w:r>"#,
        );
        let properties_before = p.child("w:pPr").cloned();
        replace(&mut p, "{{EXP_1_ACHIEVEMENT_1}}", "Led X");

        assert_eq!(p.child("w:pPr").cloned(), properties_before);
        assert!(p.children[0].as_element().unwrap().is("w:pPr"));
        assert_eq!(Paragraph::read(&p).text(), "Led X");
    }

    #[test]
    fn test_out_of_bounds_offset_is_noop() {
        let mut p = paragraph(r#"<w:r><w:t>{{NAME}}</w:t></w:r>"#);
        let before = p.clone();
        let outcome = apply(
            &mut p,
            40,
            "{{NAME}}",
            &Replacement::Text("x".to_string()),
            &mut Relationships::default(),
            &HyperlinkStyle::default(),
        );
        assert_eq!(outcome, ApplyOutcome::StaleIndex);
        assert_eq!(p, before);
    }

    #[test]
    fn test_multiline_value_becomes_breaks() {
        let mut p = paragraph(r#"<w:r><w:t>{{EXP_1_ACHIEVEMENTS}}</w:t></w:r>"#);
        replace(&mut p, "{{EXP_1_ACHIEVEMENTS}}", "Led X\nBuilt Y");
        assert_eq!(Paragraph::read(&p).text(), "Led X\nBuilt Y");
        assert_eq!(p.descendants("w:br").len(), 1);
    }

    #[test]
    fn test_empty_value_removes_token() {
        let mut p = paragraph(r#"<w:r><w:t xml:space="preserve">Tel: {{PHONE}} </w:t></w:r>"#);
        replace(&mut p, "{{PHONE}}", "");
        assert_eq!(Paragraph::read(&p).text(), "Tel:  ");
    }

    #[test]
    fn test_existing_hyperlinks_are_kept() {
        let mut p = paragraph(
            r#"<w:hyperlink r:id="rId5"><w:r><w:t>Site</w:t></w:r></w:hyperlink><w:r><w:t xml:space="preserve"> | {{EMAIL}}</w:t></w:r>"#,
        );
        let original_link = p.child("w:hyperlink").cloned();
        replace(&mut p, "{{EMAIL}}", "jane@example.com");

        assert_eq!(p.child("w:hyperlink").cloned(), original_link);
        assert_eq!(Paragraph::read(&p).text(), "Site | jane@example.com");
    }

    #[test]
    fn test_token_inside_existing_hyperlink_uses_first_run_template() {
        let mut p = paragraph(
            r#"<w:r><w:rPr><w:i/></w:rPr><w:t xml:space="preserve">See </w:t></w:r><w:hyperlink r:id="rId2"><w:r><w:t>my {{NAME}} page</w:t></w:r></w:hyperlink>"#,
        );
        replace(&mut p, "{{NAME}}", "Jane");
        assert_eq!(Paragraph::read(&p).text(), "See my Jane page");

        let links: Vec<HyperlinkElement> = p
            .elements()
            .filter(|e| e.is("w:hyperlink"))
            .map(HyperlinkElement::read)
            .collect();
        assert_eq!(links.len(), 2);
        assert_eq!(links[0].display_text, "my ");
        assert_eq!(links[1].display_text, " page");
        assert!(links.iter().all(|l| l.relationship_id.as_deref() == Some("rId2")));

        let runs = runs(&p);
        assert_eq!(runs[1].text, "Jane");
        assert_eq!(runs[1].formatting().italic, Some(true));
    }

    #[test]
    fn test_token_running_into_hyperlink() {
        let mut p = paragraph(
            r#"<w:r><w:t xml:space="preserve">Hi {{NA</w:t></w:r><w:hyperlink r:id="rId1"><w:r><w:t xml:space="preserve">ME}} site</w:t></w:r></w:hyperlink><w:r><w:t>!</w:t></w:r>"#,
        );
        replace(&mut p, "{{NAME}}", "Jane");
        assert_eq!(Paragraph::read(&p).text(), "Hi Jane site!");

        let texts: Vec<String> = runs(&p).into_iter().map(|r| r.text).collect();
        assert_eq!(texts, vec!["Hi ", "Jane", "!"]);

        let link = HyperlinkElement::read(p.child("w:hyperlink").unwrap());
        assert_eq!(link.display_text, " site");
        assert_eq!(link.relationship_id.as_deref(), Some("rId1"));
    }

    #[test]
    fn test_token_running_out_of_hyperlink() {
        let mut p = paragraph(
            r#"<w:hyperlink r:id="rId1"><w:r><w:t xml:space="preserve">see {{NA</w:t></w:r></w:hyperlink><w:r><w:rPr><w:b/></w:rPr><w:t xml:space="preserve">ME}} end</w:t></w:r>"#,
        );
        replace(&mut p, "{{NAME}}", "Jane");
        assert_eq!(Paragraph::read(&p).text(), "see Jane end");

        let links: Vec<HyperlinkElement> = p
            .elements()
            .filter(|e| e.is("w:hyperlink"))
            .map(HyperlinkElement::read)
            .collect();
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].display_text, "see ");
        assert_eq!(links[0].relationship_id.as_deref(), Some("rId1"));

        let runs = runs(&p);
        assert_eq!(runs[0].text, "Jane");
        assert_eq!(runs[0].formatting().bold, Some(true));
        assert_eq!(runs[1].text, " end");
    }

    #[test]
    fn test_drawings_and_fields_beside_token_are_kept() {
        let mut p = paragraph(
            r#"<w:r><w:rPr><w:b/></w:rPr><w:drawing/><w:t>{{NAME}}</w:t><w:fldChar w:fldCharType="begin"/><w:t xml:space="preserve"> x</w:t></w:r>"#,
        );
        replace(&mut p, "{{NAME}}", "Jane");
        assert_eq!(Paragraph::read(&p).text(), "Jane x");

        let runs = runs(&p);
        assert_eq!(runs.len(), 3);
        assert!(runs[0].node.child("w:drawing").is_some());
        assert_eq!(runs[0].text, "");
        assert_eq!(runs[1].text, "Jane");
        assert_eq!(runs[1].formatting().bold, Some(true));
        assert!(runs[2].node.child("w:fldChar").is_some());
        assert_eq!(runs[2].text, " x");
        assert_eq!(p.descendants("w:drawing").len(), 1);
        assert_eq!(p.descendants("w:fldChar").len(), 1);
    }

    #[test]
    fn test_hyperlink_replacement() {
        let mut p = paragraph(
            r#"<w:r><w:rPr><w:rFonts w:ascii="Calibri"/><w:sz w:val="20"/></w:rPr><w:t xml:space="preserve">Profile: {{GITHUB}}</w:t></w:r>"#,
        );
        let mut rels = Relationships::default();
        let outcome = apply(
            &mut p,
            9,
            "{{GITHUB}}",
            &Replacement::Hyperlink {
                display: "Github".to_string(),
                url: "jdoe".to_string(),
            },
            &mut rels,
            &HyperlinkStyle::default(),
        );

        let ApplyOutcome::Linked { relationship_id } = outcome else {
            panic!("expected a hyperlink, got {:?}", outcome);
        };
        assert_eq!(rels.get(&relationship_id).unwrap().target, "https://jdoe");
        assert_eq!(Paragraph::read(&p).text(), "Profile: Github");

        let link = HyperlinkElement::read(p.child("w:hyperlink").unwrap());
        assert_eq!(link.display_text, "Github");
        let run = RunElement::read(p.child("w:hyperlink").unwrap().child(RUN).unwrap());
        assert_eq!(run.formatting().font_name.as_deref(), Some("Calibri"));
        assert_eq!(run.formatting().size, Some(20));
    }

    #[test]
    fn test_bookmarks_inside_span_are_kept() {
        let mut p = paragraph(
            r#"<w:r><w:t>{{NA</w:t></w:r><w:bookmarkStart w:id="1" w:name="n"/><w:r><w:t>ME}}</w:t></w:r><w:bookmarkEnd w:id="1"/>"#,
        );
        replace(&mut p, "{{NAME}}", "Jane");
        assert!(p.child("w:bookmarkStart").is_some());
        assert!(p.child("w:bookmarkEnd").is_some());
        assert_eq!(Paragraph::read(&p).text(), "Jane");
    }
}
