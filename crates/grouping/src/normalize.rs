//! Field normalization: raw value + matcher type -> canonical comparable key.
//!
//! Normalization never validates. A malformed email or a phone number of the
//! wrong length still produces a key; it simply won't collide with anything
//! that isn't the same after normalization.

use std::fmt;
use std::str::FromStr;

use crate::error::GroupError;

/// Base (non-composite) normalization rule family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MatcherType {
    Email,
    Phone,
}

impl MatcherType {
    pub const EMAIL: &'static str = "email";
    pub const PHONE: &'static str = "phone";

    /// Parse a type name. Surrounding whitespace and case are ignored.
    pub fn parse(name: &str) -> Result<Self, GroupError> {
        match canonical_type_name(name).as_str() {
            Self::EMAIL => Ok(Self::Email),
            Self::PHONE => Ok(Self::Phone),
            _ => Err(GroupError::UnknownMatcherType(name.to_string())),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Email => Self::EMAIL,
            Self::Phone => Self::PHONE,
        }
    }
}

impl FromStr for MatcherType {
    type Err = GroupError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for MatcherType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Type names are compared trimmed and lower-cased.
pub(crate) fn canonical_type_name(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Normalize one raw field value under the given rule.
pub fn normalize_field(matcher_type: MatcherType, raw: &str) -> String {
    match matcher_type {
        MatcherType::Email => normalize_email(raw),
        MatcherType::Phone => normalize_phone(raw),
    }
}

/// Normalize by type name. Anything other than a base type name fails,
/// including the composite `email_or_phone`.
pub fn normalize_named(type_name: &str, raw: &str) -> Result<String, GroupError> {
    Ok(normalize_field(MatcherType::parse(type_name)?, raw))
}

pub fn normalize_email(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Keep ASCII decimal digits only.
pub fn normalize_phone(raw: &str) -> String {
    raw.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// Blank keys never identify anything.
pub fn is_blank(key: &str) -> bool {
    key.trim().is_empty()
}
