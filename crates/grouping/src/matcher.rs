use std::fmt;

use crate::error::GroupError;
use crate::normalize::{canonical_type_name, normalize_field, MatcherType};

/// How the matcher as a whole normalizes its fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchAs {
    /// Every field uses the same rule.
    Single(MatcherType),
    /// Each field carries its own base rule.
    EmailOrPhone,
}

impl MatchAs {
    pub const EMAIL_OR_PHONE: &'static str = "email_or_phone";

    pub fn parse(name: &str) -> Result<Self, GroupError> {
        if canonical_type_name(name) == Self::EMAIL_OR_PHONE {
            return Ok(Self::EmailOrPhone);
        }
        MatcherType::parse(name)
            .map(Self::Single)
            .map_err(|_| GroupError::InvalidConfiguration(format!("unknown matcher type: \"{}\"", name.trim())))
    }

    pub fn is_composite(&self) -> bool {
        matches!(self, Self::EmailOrPhone)
    }
}

impl fmt::Display for MatchAs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Single(t) => write!(f, "{t}"),
            Self::EmailOrPhone => f.write_str(Self::EMAIL_OR_PHONE),
        }
    }
}

/// One identifying field: lower-cased name plus its base rule, if declared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldEntry {
    pub name: String,
    pub matcher_type: Option<MatcherType>,
}

/// Identifying fields in declaration order. Declaration order is the
/// processing order, which decides the first-match tie-break.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldSpec {
    entries: Vec<FieldEntry>,
}

impl FieldSpec {
    pub fn entries(&self) -> &[FieldEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Case-insensitive lookup.
    pub fn get(&self, name: &str) -> Option<&FieldEntry> {
        let name = name.trim().to_lowercase();
        self.entries.iter().find(|e| e.name == name)
    }
}

/// Validated matcher configuration. Construction is the only place type
/// names are checked; everything downstream works on enums.
#[derive(Debug, Clone)]
pub struct Matcher {
    match_as: MatchAs,
    fields: FieldSpec,
}

impl Matcher {
    /// Validate and build a matcher.
    ///
    /// `fields` yields `(field name, optional sub-type name)` in processing
    /// order. Composite matchers need a sub-type on every field; for the
    /// others a sub-type is optional and, when present, only validated.
    pub fn new<I, N, T>(match_as: &str, fields: I) -> Result<Self, GroupError>
    where
        I: IntoIterator<Item = (N, Option<T>)>,
        N: AsRef<str>,
        T: AsRef<str>,
    {
        let match_as = MatchAs::parse(match_as)?;

        let mut entries: Vec<FieldEntry> = Vec::new();
        for (name, sub_type) in fields {
            let name = name.as_ref().trim().to_lowercase();
            if name.is_empty() {
                return Err(GroupError::InvalidConfiguration("field name cannot be empty".into()));
            }
            if entries.iter().any(|e| e.name == name) {
                return Err(GroupError::InvalidConfiguration(format!(
                    "field '{name}' is listed more than once"
                )));
            }

            let matcher_type = match sub_type {
                Some(t) => Some(MatcherType::parse(t.as_ref()).map_err(|_| {
                    GroupError::InvalidConfiguration(format!(
                        "field '{name}': unknown matcher type \"{}\" (expected \"email\" or \"phone\")",
                        t.as_ref().trim()
                    ))
                })?),
                None if match_as.is_composite() => {
                    return Err(GroupError::InvalidConfiguration(format!(
                        "field '{name}': {} requires a matcher type per field",
                        MatchAs::EMAIL_OR_PHONE
                    )));
                }
                None => None,
            };

            entries.push(FieldEntry { name, matcher_type });
        }

        if entries.is_empty() {
            return Err(GroupError::InvalidConfiguration(
                "at least one field is required".into(),
            ));
        }

        Ok(Self {
            match_as,
            fields: FieldSpec { entries },
        })
    }

    pub fn match_as(&self) -> MatchAs {
        self.match_as
    }

    pub fn is_composite(&self) -> bool {
        self.match_as.is_composite()
    }

    pub fn fields(&self) -> &FieldSpec {
        &self.fields
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.entries.iter().map(|e| e.name.as_str())
    }

    /// The base rule that normalizes `field_name`.
    pub fn resolve_field_type(&self, field_name: &str) -> Result<MatcherType, GroupError> {
        match self.match_as {
            MatchAs::Single(t) => Ok(t),
            MatchAs::EmailOrPhone => self
                .fields
                .get(field_name)
                .and_then(|e| e.matcher_type)
                .ok_or_else(|| {
                    GroupError::UnknownMatcherType(format!("no matcher type for field '{field_name}'"))
                }),
        }
    }

    /// One key per input pair, in input order. Blanks and duplicates are kept.
    pub fn normalize_row<N, V>(&self, values: &[(N, V)]) -> Result<Vec<String>, GroupError>
    where
        N: AsRef<str>,
        V: AsRef<str>,
    {
        values
            .iter()
            .map(|(name, raw)| {
                let t = self.resolve_field_type(name.as_ref())?;
                Ok(normalize_field(t, raw.as_ref()))
            })
            .collect()
    }
}
