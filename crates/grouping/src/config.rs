use serde::Deserialize;

use crate::error::GroupError;
use crate::matcher::Matcher;

pub const DEFAULT_OUTPUT_SUFFIX: &str = "grouped";

// ---------------------------------------------------------------------------
// File format
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    match_as: String,
    fields: RawFields,
    #[serde(default)]
    output_suffix: Option<String>,
}

/// `fields = ["a", "b"]` or a `[fields]` table of name -> matcher type.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawFields {
    Names(Vec<String>),
    Typed(toml::Table),
}

// ---------------------------------------------------------------------------
// Validated config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct GroupingConfig {
    matcher: Matcher,
    output_suffix: String,
}

impl GroupingConfig {
    pub fn from_toml(input: &str) -> Result<Self, GroupError> {
        let raw: RawConfig =
            toml::from_str(input).map_err(|e| GroupError::ConfigParse(e.to_string()))?;

        let fields: Vec<(String, Option<String>)> = match raw.fields {
            RawFields::Names(names) => names.into_iter().map(|n| (n, None)).collect(),
            RawFields::Typed(table) => table
                .into_iter()
                .map(|(name, value)| match value {
                    toml::Value::String(t) => Ok((name, Some(t))),
                    other => Err(GroupError::InvalidConfiguration(format!(
                        "field '{name}': matcher type must be a string, got {}",
                        other.type_str()
                    ))),
                })
                .collect::<Result<_, _>>()?,
        };

        let matcher = Matcher::new(&raw.match_as, fields)?;

        let output_suffix = raw
            .output_suffix
            .map(|s| s.trim().to_string())
            .unwrap_or_else(|| DEFAULT_OUTPUT_SUFFIX.to_string());
        if output_suffix.is_empty() {
            return Err(GroupError::InvalidConfiguration("output_suffix cannot be empty".into()));
        }

        Ok(Self {
            matcher,
            output_suffix,
        })
    }

    pub fn matcher(&self) -> &Matcher {
        &self.matcher
    }

    /// Suffix appended to the input path for the default output file.
    pub fn output_suffix(&self) -> &str {
        &self.output_suffix
    }

    pub fn into_parts(self) -> (Matcher, String) {
        (self.matcher, self.output_suffix)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
