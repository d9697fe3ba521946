//! Document filler: drives scanning and rebuilding over every paragraph

use crate::config::{Config, LinkToken};
use crate::docx::model::{Paragraph, PARAGRAPH};
use crate::docx::package::DocxPackage;
use crate::docx::relationships::{Relationships, OFFICE_RELATIONSHIPS_NS};
use crate::docx::xml::XmlElement;
use crate::error::Result;
use crate::fill::hyperlink::HyperlinkStyle;
use crate::fill::rebuild::{self, ApplyOutcome, Replacement};
use crate::fill::scanner::{PlaceholderMatch, PlaceholderScanner};
use crate::profile::flatten::{token_name, PlaceholderMap};
use log::{debug, info, warn};
use serde::Serialize;
use std::collections::BTreeSet;

/// Block-level containers whose paragraphs are filled as well
const CONTAINERS: &[&str] = &["w:tbl", "w:tr", "w:tc", "w:sdt", "w:sdtContent"];

const SUGGESTION_THRESHOLD: f64 = 0.85;

#[derive(Debug, Clone)]
pub struct FillOptions {
    pub max_passes: usize,
    pub clear_unresolved: bool,
    pub style: HyperlinkStyle,
    pub link_tokens: Vec<LinkToken>,
}

impl Default for FillOptions {
    fn default() -> Self {
        Self::from(&Config::default())
    }
}

impl From<&Config> for FillOptions {
    fn from(config: &Config) -> Self {
        Self {
            max_passes: config.filler.max_passes,
            clear_unresolved: config.filler.clear_unresolved,
            style: HyperlinkStyle::from(&config.hyperlinks),
            link_tokens: config.hyperlinks.tokens.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FillReport {
    pub paragraphs_scanned: usize,
    pub paragraphs_changed: usize,
    pub replacements: usize,
    pub hyperlinks: usize,
    pub stale_misses: usize,
    pub capped_paragraphs: usize,
    /// Token names found in the document with no profile value
    pub unresolved: BTreeSet<String>,
}

impl FillReport {
    pub fn total_substitutions(&self) -> usize {
        self.replacements + self.hyperlinks
    }
}

pub struct DocumentFiller<'a> {
    values: &'a PlaceholderMap,
    options: FillOptions,
    scanner: PlaceholderScanner,
}

impl<'a> DocumentFiller<'a> {
    pub fn new(values: &'a PlaceholderMap, options: FillOptions) -> Self {
        // Unresolved markers are always detected so they can be reported
        let scanner = PlaceholderScanner::new(values.tokens(), true);
        Self {
            values,
            options,
            scanner,
        }
    }

    pub fn fill(&self, package: &mut DocxPackage) -> Result<FillReport> {
        let report = {
            let (body, relationships) = package.body_mut()?;
            self.fill_body(body, relationships)
        };
        // Injected hyperlinks carry r:id, which needs the prefix bound on the root
        if report.hyperlinks > 0 && package.ensure_namespace("r", OFFICE_RELATIONSHIPS_NS) {
            debug!("Declared xmlns:r on the document root");
        }

        info!(
            "Filled {} placeholder(s) ({} hyperlink(s)) across {} of {} paragraph(s)",
            report.total_substitutions(),
            report.hyperlinks,
            report.paragraphs_changed,
            report.paragraphs_scanned
        );
        if !report.unresolved.is_empty() {
            warn!(
                "{} placeholder(s) had no profile value",
                report.unresolved.len()
            );
        }
        Ok(report)
    }

    /// Fill every paragraph under `body`, including table cells at any depth
    pub fn fill_body(&self, body: &mut XmlElement, relationships: &mut Relationships) -> FillReport {
        let mut report = FillReport::default();
        self.visit(body, relationships, &mut report);
        report
    }

    fn visit(&self, container: &mut XmlElement, relationships: &mut Relationships, report: &mut FillReport) {
        for element in container.elements_mut() {
            if element.is(PARAGRAPH) {
                self.fill_paragraph(element, relationships, report);
            } else if CONTAINERS.contains(&element.name.as_str()) {
                self.visit(element, relationships, report);
            }
        }
    }

    fn fill_paragraph(&self, paragraph: &mut XmlElement, relationships: &mut Relationships, report: &mut FillReport) {
        report.paragraphs_scanned += 1;

        let text = Paragraph::read(paragraph).text();
        let occurrences = self.scanner.count(&text);
        if occurrences == 0 {
            return;
        }
        if occurrences > self.options.max_passes {
            warn!(
                "Paragraph holds {} placeholder occurrences but at most {} pass(es) run",
                occurrences, self.options.max_passes
            );
        }

        // Unresolved markers come from the template text only. They are cleared
        // before any value is inserted, so profile text is never swept.
        for unresolved in self.scanner.scan(&text).iter().filter(|m| !m.resolved) {
            self.note_unresolved(token_name(&unresolved.token), report);
        }
        let mut pending_markers = if self.options.clear_unresolved {
            self.scanner.count_unresolved(&text)
        } else {
            0
        };

        let mut changed = false;
        let mut passes = 0;
        while passes < self.options.max_passes {
            let clearing = pending_markers > 0;
            let Some(found) = self.next_match(paragraph, clearing) else {
                break;
            };
            passes += 1;
            if clearing {
                pending_markers -= 1;
            }

            let replacement = self.replacement_for(&found);
            match rebuild::apply(
                paragraph,
                found.start,
                &found.token,
                &replacement,
                relationships,
                &self.options.style,
            ) {
                ApplyOutcome::Replaced => {
                    debug!("Replaced {} at offset {}", found.token, found.start);
                    report.replacements += 1;
                    changed = true;
                }
                ApplyOutcome::Linked { relationship_id } => {
                    debug!("Linked {} via {}", found.token, relationship_id);
                    report.hyperlinks += 1;
                    changed = true;
                }
                ApplyOutcome::StaleIndex => {
                    warn!("Skipped {}: index no longer matches the paragraph", found.token);
                    report.stale_misses += 1;
                    break;
                }
            }
        }

        if passes == self.options.max_passes
            && (pending_markers > 0 || self.next_match(paragraph, false).is_some())
        {
            warn!(
                "Paragraph still holds placeholders after {} pass(es)",
                self.options.max_passes
            );
            report.capped_paragraphs += 1;
        }
        if changed {
            report.paragraphs_changed += 1;
        }
    }

    /// Rescan the paragraph and pick the earliest unresolved marker while
    /// `clearing`, otherwise the earliest token with a value
    fn next_match(&self, paragraph: &XmlElement, clearing: bool) -> Option<PlaceholderMatch> {
        let text = Paragraph::read(paragraph).text();
        self.scanner
            .scan(&text)
            .into_iter()
            .find(|m| m.resolved != clearing)
    }

    fn replacement_for(&self, found: &PlaceholderMatch) -> Replacement {
        if !found.resolved {
            return Replacement::Text(String::new());
        }

        let name = token_name(&found.token);
        let value = self.values.get(name).unwrap_or_default();
        match self.link_label(name) {
            Some(label) if !value.trim().is_empty() => Replacement::Hyperlink {
                display: label.to_string(),
                url: value.to_string(),
            },
            _ => Replacement::Text(value.to_string()),
        }
    }

    fn link_label(&self, name: &str) -> Option<&str> {
        self.options
            .link_tokens
            .iter()
            .find(|t| t.token == name)
            .map(|t| t.label.as_str())
    }

    fn note_unresolved(&self, name: &str, report: &mut FillReport) {
        if !report.unresolved.insert(name.to_string()) {
            return;
        }
        match self.suggest(name) {
            Some(close) => warn!(
                "No profile value for {{{{{}}}}}; did you mean {{{{{}}}}}?",
                name, close
            ),
            None => warn!("No profile value for {{{{{}}}}}", name),
        }
    }

    fn suggest(&self, name: &str) -> Option<&str> {
        self.values
            .names()
            .map(|known| (known, strsim::jaro_winkler(name, known)))
            .filter(|(_, score)| *score >= SUGGESTION_THRESHOLD)
            .max_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(known, _)| known)
    }
}
