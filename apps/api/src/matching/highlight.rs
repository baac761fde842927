//! Keyword highlighting: wraps whole-word, case-insensitive occurrences of the
//! shared terms in `<mark>` annotations, keeping the original surface form.

use std::collections::BTreeSet;
use std::str::FromStr;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::warn;

const MARK_OPEN: &str = "<mark>";
const MARK_CLOSE: &str = "</mark>";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HighlightMode {
    /// All terms matched in one scan, longest term wins at a position,
    /// annotations applied once.
    #[default]
    SinglePass,
    /// One substitution per term in sorted order. A later term can match
    /// inside annotations written by an earlier one.
    Sequential,
}

impl FromStr for HighlightMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "single_pass" | "single-pass" => Ok(Self::SinglePass),
            "sequential" => Ok(Self::Sequential),
            other => Err(format!(
                "unknown highlight mode '{other}' (expected 'single_pass' or 'sequential')"
            )),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Highlighter {
    mode: HighlightMode,
    /// HTML-escape text outside and inside marks. Ignored in sequential mode.
    escape_html: bool,
}

impl Default for Highlighter {
    fn default() -> Self {
        Self::new(HighlightMode::SinglePass, true)
    }
}

impl Highlighter {
    pub fn new(mode: HighlightMode, escape_html: bool) -> Self {
        Self { mode, escape_html }
    }

    pub fn apply(&self, text: &str, terms: &BTreeSet<String>) -> String {
        match self.mode {
            HighlightMode::SinglePass => single_pass(text, terms, self.escape_html),
            HighlightMode::Sequential => sequential(text, terms),
        }
    }
}

fn single_pass(text: &str, terms: &BTreeSet<String>, escape: bool) -> String {
    let render = |s: &str| if escape { escape_html(s) } else { s.to_string() };

    let mut alternatives: Vec<String> = terms
        .iter()
        .map(|t| t.trim().to_lowercase())
        .filter(|t| !t.is_empty())
        .collect();
    if alternatives.is_empty() {
        return render(text);
    }
    // Longest first so the alternation prefers the longest term at a position.
    alternatives.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
    alternatives.dedup();

    let pattern = format!(
        r"(?i)\b(?:{})\b",
        alternatives
            .iter()
            .map(|t| regex::escape(t))
            .collect::<Vec<_>>()
            .join("|")
    );
    let re = match Regex::new(&pattern) {
        Ok(re) => re,
        Err(e) => {
            warn!("Highlight pattern rejected ({} terms): {e}", alternatives.len());
            return render(text);
        }
    };

    let mut out = String::with_capacity(text.len() + 16);
    let mut last = 0;
    for m in re.find_iter(text) {
        out.push_str(&render(&text[last..m.start()]));
        out.push_str(MARK_OPEN);
        out.push_str(&render(m.as_str()));
        out.push_str(MARK_CLOSE);
        last = m.end();
    }
    out.push_str(&render(&text[last..]));
    out
}

fn sequential(text: &str, terms: &BTreeSet<String>) -> String {
    let mut out = text.to_string();
    for term in terms.iter().map(|t| t.trim()).filter(|t| !t.is_empty()) {
        let pattern = format!(r"(?i)\b({})\b", regex::escape(term));
        match Regex::new(&pattern) {
            Ok(re) => {
                out = re
                    .replace_all(&out, format!("{MARK_OPEN}${{1}}{MARK_CLOSE}").as_str())
                    .into_owned();
            }
            Err(e) => warn!("Skipping highlight term '{term}': {e}"),
        }
    }
    out
}

fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
