//! Spreadsheet wildcard patterns
//!
//! `*` matches any run of characters and `?` exactly one character. A tilde makes the
//! next `*`, `?` or `~` literal. Matching is whole-cell and case-insensitive.

use regex::{Regex, RegexBuilder};

/// Whether text would be read as a wildcard pattern rather than a literal
pub fn has_wildcards(text: &str) -> bool {
    text.contains(['*', '?'])
}

/// A compiled wildcard pattern
#[derive(Debug, Clone)]
pub struct WildcardPattern {
    source: String,
    regex: Regex,
}

impl WildcardPattern {
    /// Compile a pattern
    pub fn new(pattern: &str) -> Result<Self, regex::Error> {
        let regex = RegexBuilder::new(&to_regex(pattern))
            .case_insensitive(true)
            .build()?;
        Ok(Self {
            source: pattern.to_string(),
            regex,
        })
    }

    /// Test a cell's text against the pattern
    pub fn is_match(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }

    /// The pattern as written
    pub fn as_str(&self) -> &str {
        &self.source
    }
}

fn to_regex(pattern: &str) -> String {
    let mut out = String::with_capacity(pattern.len() + 8);
    out.push_str("^(?s:");

    let mut literal = String::new();
    let mut chars = pattern.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '~' => match chars.peek() {
                Some(&next @ ('*' | '?' | '~')) => {
                    chars.next();
                    literal.push(next);
                }
                _ => literal.push('~'),
            },
            '*' | '?' => {
                out.push_str(&regex::escape(&literal));
                literal.clear();
                out.push_str(if c == '*' { ".*" } else { "." });
            }
            other => literal.push(other),
        }
    }
    out.push_str(&regex::escape(&literal));
    out.push_str(")$");
    out
}
