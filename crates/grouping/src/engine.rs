use std::ffi::OsString;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use csv::ByteRecord;

use crate::error::GroupError;
use crate::matcher::Matcher;
use crate::model::{Row, RunSummary};
use crate::store::{GroupId, IdMinter, KeyStore, RandomHexIds};

/// Name of the column prepended to every output row.
pub const ID_HEADER: &str = "UUID";

/// Streaming grouping engine. Owns the key store for one pass over one
/// dataset; build a new engine per run.
pub struct Engine {
    matcher: Matcher,
    store: KeyStore,
    minter: Box<dyn IdMinter>,
    rows_processed: u64,
    groups_created: u64,
    conflicts: u64,
}

impl Engine {
    pub fn new(matcher: Matcher) -> Self {
        Self::with_minter(matcher, Box::new(RandomHexIds))
    }

    pub fn with_minter(matcher: Matcher, minter: Box<dyn IdMinter>) -> Self {
        Self {
            matcher,
            store: KeyStore::new(),
            minter,
            rows_processed: 0,
            groups_created: 0,
            conflicts: 0,
        }
    }

    pub fn matcher(&self) -> &Matcher {
        &self.matcher
    }

    pub fn store(&self) -> &KeyStore {
        &self.store
    }

    pub fn rows_processed(&self) -> u64 {
        self.rows_processed
    }

    pub fn summary(&self) -> RunSummary {
        RunSummary {
            rows_processed: self.rows_processed,
            groups_created: self.groups_created,
            keys_stored: self.store.len(),
            conflicts: self.conflicts,
        }
    }

    /// Assign a group id to one row.
    ///
    /// The first normalized key (in field order) already in the store picks
    /// the group; otherwise a new id is minted. Every non-blank key not yet
    /// stored is then mapped to that id. Existing mappings never change, so
    /// when a row touches two existing groups they stay separate.
    pub fn process_row(&mut self, row: &Row) -> Result<GroupId, GroupError> {
        self.rows_processed += 1;

        let values: Vec<(&str, &str)> = self
            .matcher
            .field_names()
            .filter_map(|name| row.get(name).map(|v| (name, v)))
            .collect();
        let keys = self.matcher.normalize_row(&values)?;

        let mut hits = keys.iter().filter_map(|k| self.store.get(k));
        let active_id = match hits.next() {
            Some(first) => {
                let first = first.clone();
                if let Some(other) = hits.find(|id| **id != first) {
                    self.conflicts += 1;
                    log::warn!(
                        "row {}: keys belong to groups {} and {}; keeping {}",
                        self.rows_processed,
                        first,
                        other,
                        first
                    );
                }
                first
            }
            None => {
                let id = self.minter.mint();
                self.groups_created += 1;
                log::debug!("row {}: new group {}", self.rows_processed, id);
                id
            }
        };

        for key in &keys {
            self.store.insert_if_absent(key, &active_id);
        }

        Ok(active_id)
    }

    /// Configured fields no header column matches.
    pub fn missing_fields<H: AsRef<str>>(&self, header: &[H]) -> Vec<&str> {
        self.matcher
            .field_names()
            .filter(|f| !header.iter().any(|h| h.as_ref().trim().to_lowercase() == *f))
            .collect()
    }

    /// One full pass: CSV in, CSV out with a leading [`ID_HEADER`] column.
    ///
    /// The first record is the header. Output values are the input bytes
    /// untouched. A record with the wrong field count or bytes that are not
    /// UTF-8 aborts the run; rows written before it stay written.
    pub fn run<R: Read, W: Write>(&mut self, reader: R, writer: W) -> Result<RunSummary, GroupError> {
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(false)
            .from_reader(reader);
        let mut wtr = csv::WriterBuilder::new().from_writer(writer);

        let mut records = rdr.byte_records();

        let header = match records.next() {
            Some(header) => header?,
            None => {
                log::info!("empty input, nothing to group");
                wtr.flush()?;
                return Ok(self.summary());
            }
        };

        let mut header_names: Vec<String> = decode_record(&header)?
            .into_iter()
            .map(String::from)
            .collect();
        if let Some(first) = header_names.first_mut() {
            if let Some(stripped) = first.strip_prefix('\u{feff}') {
                *first = stripped.to_string();
            }
        }

        for missing in self.missing_fields(&header_names) {
            log::warn!("field '{missing}' not found in header; it will not be matched");
        }

        let mut out = ByteRecord::with_capacity(header.as_slice().len() + ID_HEADER.len(), header.len() + 1);
        out.push_field(ID_HEADER.as_bytes());
        out.extend(header.iter());
        wtr.write_byte_record(&out)?;

        log::info!(
            "grouping as {} on {} field(s)",
            self.matcher.match_as(),
            self.matcher.fields().len()
        );

        for result in records {
            let record = result?;
            let values = decode_record(&record)?;
            let row = Row::new(&header_names, &values);
            let id = self.process_row(&row)?;

            out.clear();
            out.push_field(id.as_str().as_bytes());
            out.extend(record.iter());
            wtr.write_byte_record(&out)?;
        }

        wtr.flush()?;

        let summary = self.summary();
        log::info!(
            "processed {} row(s) into {} group(s), {} conflict(s)",
            summary.rows_processed,
            summary.groups_created,
            summary.conflicts
        );
        Ok(summary)
    }
}

/// Borrow every field as UTF-8. Invalid bytes are an error rather than
/// replacement characters, which would make distinct values compare equal.
fn decode_record(record: &ByteRecord) -> Result<Vec<&str>, GroupError> {
    record
        .iter()
        .enumerate()
        .map(|(i, field)| {
            std::str::from_utf8(field).map_err(|e| GroupError::MalformedRecord {
                line: record.position().map(|p| p.line()).unwrap_or(0),
                message: format!("field {} is not valid UTF-8: {e}", i + 1),
            })
        })
        .collect()
}

/// Default output location: `<input>.<suffix>`.
pub fn output_path(input: &Path, suffix: &str) -> PathBuf {
    let mut name = OsString::from(input.as_os_str());
    name.push(".");
    name.push(suffix);
    PathBuf::from(name)
}
