//! Display-name hygiene and search matching.
//!
//! Names come straight out of foreign memory and can be garbage; they are
//! filtered here, at the consumption site, never at the read site.

/// Replace non-breaking spaces, trim, and collapse internal whitespace
/// runs to single spaces.
pub fn normalize_name(raw: &str) -> String {
    let replaced = raw.replace('\u{00a0}', " ");
    let trimmed = replaced.trim();
    let mut out = String::with_capacity(trimmed.len());
    let mut prev_space = false;
    for ch in trimmed.chars() {
        if ch.is_whitespace() {
            if !prev_space {
                out.push(' ');
            }
            prev_space = true;
        } else {
            out.push(ch);
            prev_space = false;
        }
    }
    out
}

/// Whether a decoded name looks like real text rather than a partial or
/// garbage read: non-empty, not all '?'/whitespace, no replacement
/// characters, no control/format/private-use codepoints.
pub fn is_printable(name: &str) -> bool {
    if name.is_empty() {
        return false;
    }
    if name.chars().all(|ch| ch == '?' || ch.is_whitespace()) {
        return false;
    }
    !name.chars().any(|ch| {
        ch == '\u{fffd}'
            || ch.is_control()
            || is_format_char(ch)
            || is_private_use(ch)
    })
}

fn is_format_char(ch: char) -> bool {
    matches!(
        ch,
        '\u{200b}'..='\u{200f}' | '\u{202a}'..='\u{202e}' | '\u{2060}'..='\u{2064}' | '\u{feff}'
    )
}

fn is_private_use(ch: char) -> bool {
    matches!(
        ch,
        '\u{e000}'..='\u{f8ff}' | '\u{f0000}'..='\u{ffffd}' | '\u{100000}'..='\u{10fffd}'
    )
}

/// Comma-separated, case-insensitive substring matcher over node names.
#[derive(Debug, Clone, Default)]
pub struct SearchFilter {
    terms: Vec<String>,
}

impl SearchFilter {
    pub fn parse(query: &str) -> Self {
        let terms = query
            .split(',')
            .map(|term| normalize_name(term).to_lowercase())
            .filter(|term| !term.is_empty())
            .collect();
        Self { terms }
    }

    /// No usable terms: path queries are disabled for the frame.
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn matches(&self, name: &str) -> bool {
        let lowered = name.to_lowercase();
        self.terms.iter().any(|term| lowered.contains(term))
    }
}
