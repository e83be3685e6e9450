use thiserror::Error;

#[derive(Debug, Error)]
pub enum GroupError {
    /// Unknown matcher type, bad per-field sub-type, or an unusable field list.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
    /// Normalization reached a type that configuration should have rejected.
    #[error("unknown matcher type: {0}")]
    UnknownMatcherType(String),
    /// TOML parse / deserialization error.
    #[error("config parse error: {0}")]
    ConfigParse(String),
    /// Structurally invalid input record (e.g. wrong column count).
    #[error("malformed record at line {line}: {message}")]
    MalformedRecord { line: u64, message: String },
    /// Read or write failure on the record source or sink.
    #[error("IO error: {0}")]
    Io(String),
}

impl From<csv::Error> for GroupError {
    fn from(err: csv::Error) -> Self {
        let line = err.position().map(|p| p.line()).unwrap_or(0);
        match err.kind() {
            csv::ErrorKind::Io(e) => Self::Io(e.to_string()),
            csv::ErrorKind::UnequalLengths { expected_len, len, .. } => Self::MalformedRecord {
                line,
                message: format!("expected {expected_len} field(s), found {len}"),
            },
            _ => Self::MalformedRecord {
                line,
                message: err.to_string(),
            },
        }
    }
}

impl From<std::io::Error> for GroupError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unequal_lengths_become_malformed_record() {
        let data = "email,name\na@x.com,Ann\nb@x.com\n";
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .from_reader(data.as_bytes());
        let err = reader
            .byte_records()
            .find_map(|r| r.err())
            .expect("third line has too few fields");

        match GroupError::from(err) {
            GroupError::MalformedRecord { line, message } => {
                assert_eq!(line, 3);
                assert!(message.contains("expected 2"), "{message}");
            }
            other => panic!("expected MalformedRecord, got {other:?}"),
        }
    }
}
