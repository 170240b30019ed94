use anyhow::{Context, Result};
use regex::Regex;
use tracing::debug;

pub const SIZE_PAIR_DELIM: char = ':';

#[derive(Debug)]
pub struct MarkdownNormalizer {
    rules: Vec<(Regex, &'static str)>,
    loose_marker: Regex,
}

impl MarkdownNormalizer {
    pub fn new() -> Result<Self> {
        let rule = |pattern: &str, replacement: &'static str, name: &str| {
            Regex::new(pattern)
                .with_context(|| format!("failed to compile markdown {name} regex"))
                .map(|regex| (regex, replacement))
        };

        Ok(Self {
            rules: vec![
                rule(r"^\s*(?:[-*_]\s*){3,}$", "", "horizontal rule")?,
                rule(r"^\s*#{1,6}\s*", "", "heading")?,
                rule(r"^\s*(?:>\s*)+", "", "blockquote")?,
                rule(r"^\s*(?:[-*+]|\d+\.)\s+", "", "list marker")?,
                rule(r"!?\[([^\]]*)\]\([^)]*\)", "$1", "link")?,
                rule(r"\*\*(.+?)\*\*|__(.+?)__", "${1}${2}", "strong emphasis")?,
                rule(r"\*([^*]+)\*", "$1", "emphasis")?,
                rule(r"\b_([^_]+)_\b", "$1", "underscore emphasis")?,
                rule(r"~~(.+?)~~", "$1", "strikethrough")?,
                rule(r"`([^`]*)`", "$1", "inline code")?,
            ],
            // List symbols with no following space are not list items in
            // markdown, but are common in hand-typed replies.
            loose_marker: Regex::new(r"^\s*[-+*>]")
                .context("failed to compile loose list marker regex")?,
        })
    }

    pub fn normalize<'a>(&'a self, markdown: &'a str) -> impl Iterator<Item = String> + 'a {
        markdown.lines().filter_map(|line| self.normalize_line(line))
    }

    pub fn normalize_line(&self, line: &str) -> Option<String> {
        let mut text = html_escape::decode_html_entities(line).into_owned();

        for (pattern, replacement) in &self.rules {
            text = pattern.replace_all(&text, *replacement).into_owned();
        }
        text = self.loose_marker.replace(&text, "").into_owned();

        let collapsed = condense_whitespace(&text);
        (!collapsed.is_empty()).then_some(collapsed)
    }

    pub fn size_pairs(&self, markdown: &str) -> Vec<(String, String)> {
        self.normalize(markdown)
            .filter_map(|line| split_sizing_pair(&line))
            .collect()
    }
}

fn condense_whitespace(input: &str) -> String {
    input.split_whitespace().collect::<Vec<&str>>().join(" ")
}

pub fn split_sizing_pair(line: &str) -> Option<(String, String)> {
    let parts = line.split(SIZE_PAIR_DELIM).map(str::trim).collect::<Vec<&str>>();
    let [label, text] = parts.as_slice() else {
        return None;
    };

    if label.to_lowercase().contains("note") {
        debug!(line, "skipping note line");
        return None;
    }

    Some((label.to_string(), text.to_string()))
}
