//! Placeholder scanning over a paragraph's rendered text

use aho_corasick::AhoCorasick;
use regex::Regex;
use std::collections::HashSet;

/// First occurrence of a token in the paragraph text
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct PlaceholderMatch {
    /// Offset in chars
    pub start: usize,
    pub token: String,
    /// False when the token has no value in the placeholder map
    pub resolved: bool,
}

pub struct PlaceholderScanner {
    tokens: Vec<String>,
    known: HashSet<String>,
    matcher: Option<AhoCorasick>,
    marker: Option<Regex>,
}

impl PlaceholderScanner {
    /// `tokens` are braced (`{{NAME}}`); with `detect_unresolved` any other
    /// `{{TOKEN}}` marker is reported as an unresolved match
    pub fn new(tokens: impl IntoIterator<Item = String>, detect_unresolved: bool) -> Self {
        let tokens: Vec<String> = tokens.into_iter().collect();
        let known = tokens.iter().cloned().collect();
        let matcher = if tokens.is_empty() {
            None
        } else {
            AhoCorasick::new(&tokens).ok()
        };
        let marker = if detect_unresolved {
            Some(Regex::new(r"\{\{[A-Za-z0-9_]+\}\}").expect("Invalid placeholder regex"))
        } else {
            None
        };

        Self {
            tokens,
            known,
            matcher,
            marker,
        }
    }

    /// Every distinct token present, at its first occurrence, sorted by offset
    pub fn scan(&self, text: &str) -> Vec<PlaceholderMatch> {
        let mut first_seen: Vec<Option<usize>> = vec![None; self.tokens.len()];
        if let Some(matcher) = &self.matcher {
            for found in matcher.find_overlapping_iter(text) {
                let slot = &mut first_seen[found.pattern().as_usize()];
                if slot.is_none() {
                    *slot = Some(found.start());
                }
            }
        }

        let mut matches: Vec<PlaceholderMatch> = first_seen
            .iter()
            .enumerate()
            .filter_map(|(pattern, start)| {
                start.map(|byte| PlaceholderMatch {
                    start: char_offset(text, byte),
                    token: self.tokens[pattern].clone(),
                    resolved: true,
                })
            })
            .collect();

        if let Some(marker) = &self.marker {
            let mut unresolved_seen = HashSet::new();
            for found in marker.find_iter(text) {
                let token = found.as_str();
                if !self.known.contains(token) && unresolved_seen.insert(token) {
                    matches.push(PlaceholderMatch {
                        start: char_offset(text, found.start()),
                        token: token.to_string(),
                        resolved: false,
                    });
                }
            }
        }

        matches.sort();
        matches
    }

    /// The earliest match, which is the only one resolved per pass
    pub fn next(&self, text: &str) -> Option<PlaceholderMatch> {
        self.scan(text).into_iter().next()
    }

    /// Total occurrences of known and unresolved tokens
    pub fn count(&self, text: &str) -> usize {
        let known = self
            .matcher
            .as_ref()
            .map(|m| m.find_overlapping_iter(text).count())
            .unwrap_or(0);
        known + self.count_unresolved(text)
    }

    /// Occurrences of `{{TOKEN}}` markers with no value, 0 when detection is off
    pub fn count_unresolved(&self, text: &str) -> usize {
        self.marker
            .as_ref()
            .map(|m| {
                m.find_iter(text)
                    .filter(|found| !self.known.contains(found.as_str()))
                    .count()
            })
            .unwrap_or(0)
    }
}

fn char_offset(text: &str, byte: usize) -> usize {
    text[..byte].chars().count()
}
