//! Authorship citation comparison
//!
//! Two datasets rarely format "(Krefft, 1868)" the same way. [`normalize`]
//! produces a comparison key that ignores case and spacing around punctuation;
//! [`compare`] additionally tells apart citations that differ only in the
//! recombination brackets.

use crate::record::non_blank;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Comparison key for an authorship string
///
/// Lower-cases, collapses whitespace, drops spaces before `,` and `)` and after
/// `(`, and puts exactly one space after each comma. Idempotent.
pub fn normalize(text: &str) -> String {
    let collapsed = text
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    let chars: Vec<char> = collapsed.chars().collect();
    let mut out = String::with_capacity(collapsed.len());

    for (i, &c) in chars.iter().enumerate() {
        let next = chars.get(i + 1).copied();
        match c {
            ' ' => {
                let before_closer = matches!(next, None | Some(',') | Some(')'));
                let after_opener = matches!(out.chars().last(), None | Some('(') | Some(' '));
                if !before_closer && !after_opener {
                    out.push(' ');
                }
            },
            ',' => {
                while out.ends_with(' ') {
                    out.pop();
                }
                out.push(',');
                if !matches!(next, None | Some(' ') | Some(',') | Some(')')) {
                    out.push(' ');
                }
            },
            _ => out.push(c),
        }
    }
    out
}

/// True when both are blank or both normalize to the same key
pub fn equivalent(a: Option<&str>, b: Option<&str>) -> bool {
    matches!(compare(a, b), AuthorityVerdict::BothMissing | AuthorityVerdict::Equivalent)
}

/// Outcome of comparing two authorship citations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthorityVerdict {
    BothMissing,
    Equivalent,
    /// Same author and year, but only one side is bracketed
    BracketsOnly,
    OneMissing,
    Different,
}

impl AuthorityVerdict {
    /// Whether a report should flag this pair
    pub fn is_mismatch(self) -> bool {
        matches!(self, Self::OneMissing | Self::Different)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::BothMissing => "both missing",
            Self::Equivalent => "equivalent",
            Self::BracketsOnly => "brackets only",
            Self::OneMissing => "one missing",
            Self::Different => "different",
        }
    }
}

impl fmt::Display for AuthorityVerdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub fn compare(a: Option<&str>, b: Option<&str>) -> AuthorityVerdict {
    match (non_blank(a), non_blank(b)) {
        (None, None) => AuthorityVerdict::BothMissing,
        (Some(_), None) | (None, Some(_)) => AuthorityVerdict::OneMissing,
        (Some(a), Some(b)) => {
            let (a, b) = (normalize(a), normalize(b));
            if a == b {
                AuthorityVerdict::Equivalent
            } else if strip_brackets(&a) == strip_brackets(&b) {
                AuthorityVerdict::BracketsOnly
            } else {
                AuthorityVerdict::Different
            }
        },
    }
}

fn strip_brackets(normalized: &str) -> String {
    normalize(&normalized.replace(['(', ')'], " "))
}
