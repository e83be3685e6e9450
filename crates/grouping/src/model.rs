use serde::Serialize;

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

/// One input record: header names paired with raw values, in file order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    fields: Vec<(String, String)>,
}

impl Row {
    /// Pair a header with a record. Header names are trimmed and lower-cased
    /// for matching; values are kept verbatim.
    pub fn new<H, V>(header: &[H], values: &[V]) -> Self
    where
        H: AsRef<str>,
        V: AsRef<str>,
    {
        let fields = header
            .iter()
            .zip(values)
            .map(|(h, v)| (h.as_ref().trim().to_lowercase(), v.as_ref().to_string()))
            .collect();
        Self { fields }
    }

    pub fn from_pairs<N, V>(pairs: impl IntoIterator<Item = (N, V)>) -> Self
    where
        N: AsRef<str>,
        V: Into<String>,
    {
        let fields = pairs
            .into_iter()
            .map(|(n, v)| (n.as_ref().trim().to_lowercase(), v.into()))
            .collect();
        Self { fields }
    }

    /// First value under `name` (case-insensitive).
    pub fn get(&self, name: &str) -> Option<&str> {
        let name = name.trim().to_lowercase();
        self.fields
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, v)| v.as_str())
    }
}

// ---------------------------------------------------------------------------
// Summary
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    /// Data rows seen (header excluded).
    pub rows_processed: u64,
    pub groups_created: u64,
    pub keys_stored: usize,
    /// Rows whose keys hit two or more different existing groups.
    pub conflicts: u64,
}
