//! Input admission policy: input-type character classes and the user regex.
//!
//! Filters act per grapheme cluster so a multi-unit cluster is kept or
//! dropped as a whole. Normalizations that depend on the whole value (single
//! decimal point, single `@`) are not filters; [`InputType::collapse_char`]
//! names the character the buffer collapses after an insert.

use crate::error::EditResult;
use regex::Regex;
use serde::Deserialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputType {
    #[default]
    Normal,
    Number,
    NumberDecimal,
    Phone,
    Email,
    /// Any content; copy and cut are refused.
    Password,
}

impl InputType {
    /// Built-in character class for this input type.
    pub fn admits(self, cluster: &str) -> bool {
        match self {
            Self::Normal | Self::Password => true,
            Self::Number => cluster.chars().all(|c| c.is_ascii_digit()),
            Self::NumberDecimal => cluster.chars().all(|c| c.is_ascii_digit() || c == '.'),
            Self::Phone => cluster.chars().all(|c| {
                c.is_ascii_digit() || matches!(c, ' ' | '+' | '-' | '*' | '#' | '(' | ')')
            }),
            Self::Email => !cluster.chars().any(char::is_whitespace),
        }
    }

    pub fn allows_copy(self) -> bool {
        self != Self::Password
    }

    /// Character that may appear at most once in the value.
    pub fn collapse_char(self) -> Option<char> {
        match self {
            Self::NumberDecimal => Some('.'),
            Self::Email => Some('@'),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterMode {
    /// Keep clusters the pattern matches.
    #[default]
    Allow,
    /// Drop clusters the pattern matches.
    Deny,
}

/// User-supplied regex filter.
#[derive(Debug, Clone)]
pub struct InputFilter {
    pattern: Regex,
    mode: FilterMode,
}

impl InputFilter {
    pub fn new(pattern: &str, mode: FilterMode) -> EditResult<Self> {
        Ok(Self {
            pattern: Regex::new(pattern)?,
            mode,
        })
    }

    pub fn pattern(&self) -> &str {
        self.pattern.as_str()
    }

    pub fn mode(&self) -> FilterMode {
        self.mode
    }

    pub fn admits(&self, cluster: &str) -> bool {
        let matched = self.pattern.is_match(cluster);
        match self.mode {
            FilterMode::Allow => matched,
            FilterMode::Deny => !matched,
        }
    }
}
