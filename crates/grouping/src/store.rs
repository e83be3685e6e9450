use std::collections::HashMap;
use std::fmt;

use rand::rngs::OsRng;
use rand::RngCore;
use serde::Serialize;

use crate::normalize::is_blank;

/// Random bytes behind each generated id.
pub const GROUP_ID_BYTES: usize = 16;

/// Opaque identifier shared by every row of one group.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct GroupId(String);

impl GroupId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Source of fresh group ids. Every call must return an id never returned
/// before within the run.
pub trait IdMinter {
    fn mint(&mut self) -> GroupId;
}

/// 16 bytes from the OS CSPRNG, lower-case hex.
#[derive(Debug, Default)]
pub struct RandomHexIds;

impl IdMinter for RandomHexIds {
    fn mint(&mut self) -> GroupId {
        let mut bytes = [0u8; GROUP_ID_BYTES];
        OsRng.fill_bytes(&mut bytes);
        GroupId(hex::encode(bytes))
    }
}

/// Deterministic `g000001`, `g000002`, ... ids for reproducible output.
#[derive(Debug, Default)]
pub struct SequentialIds {
    next: u64,
}

impl IdMinter for SequentialIds {
    fn mint(&mut self) -> GroupId {
        self.next += 1;
        GroupId(format!("g{:06}", self.next))
    }
}

/// Run-scoped map from normalized key to group id. Insert-only.
#[derive(Debug, Default)]
pub struct KeyStore {
    keys: HashMap<String, GroupId>,
}

impl KeyStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&GroupId> {
        self.keys.get(key)
    }

    /// Map `key` to `id` unless the key is blank or already owned.
    /// Returns whether an insert happened.
    pub fn insert_if_absent(&mut self, key: &str, id: &GroupId) -> bool {
        if is_blank(key) || self.keys.contains_key(key) {
            return false;
        }
        self.keys.insert(key.to_string(), id.clone());
        true
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}
