//! `rowlink-grouping`: streaming record grouping engine.
//!
//! Assigns a shared group id to rows that agree on any normalized
//! identifying field (email, phone). Single pass, in memory, first match
//! wins. No CLI dependencies; the record source and sink are any
//! `Read`/`Write` carrying CSV.

pub mod config;
pub mod engine;
pub mod error;
pub mod matcher;
pub mod model;
pub mod normalize;
pub mod store;

pub use config::GroupingConfig;
pub use engine::{output_path, Engine, ID_HEADER};
pub use error::GroupError;
pub use matcher::{FieldSpec, MatchAs, Matcher};
pub use model::{Row, RunSummary};
pub use normalize::{normalize_field, MatcherType};
pub use store::{GroupId, IdMinter, KeyStore, RandomHexIds, SequentialIds};
