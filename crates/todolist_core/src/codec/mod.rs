//! Interchange codecs for the account database.
//!
//! # Responsibility
//! - Define the `Codec` contract shared by the delimited and markup formats.
//! - Route a file name to its codec (`.csv` -> delimited, anything else -> markup).
//! - Carry codec configuration (time zone used for due dates).
//!
//! # Invariants
//! - Decoding is all-or-nothing: the first bad record aborts the whole import.
//! - Encoding builds the complete document in memory before returning it.
//! - Codecs build the model only through its public constructors.
//! - Decoders do not apply the name/email/password syntax rules.

use crate::model::accounts::Accounts;
use chrono::{FixedOffset, Offset, Utc};
use log::{error, info};
use std::path::Path;
use std::time::Instant;

pub mod csv_codec;
pub mod due_date;
pub mod error;
pub mod xml_codec;
mod xml_tree;

pub use csv_codec::DelimitedCodec;
pub use error::{DecodeError, DecodeResult, EncodeError, EncodeResult};
pub use xml_codec::MarkupCodec;

/// File extension routed to the delimited codec.
pub const DELIMITED_EXTENSION: &str = ".csv";

/// Time zone used to render and interpret persisted due dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DueDateZone {
    /// The process's local time zone.
    #[default]
    Local,
    /// A fixed UTC offset, for reproducible output.
    Fixed(FixedOffset),
}

/// Options shared by both codecs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CodecConfig {
    pub due_date_zone: DueDateZone,
}

impl CodecConfig {
    /// Due dates rendered and read as UTC.
    pub fn utc() -> Self {
        Self {
            due_date_zone: DueDateZone::Fixed(Utc.fix()),
        }
    }
}

/// Paired encoder/decoder for one on-disk format.
pub trait Codec {
    /// Short format name used in log events.
    fn format_name(&self) -> &'static str;
    fn encode(&self, accounts: &Accounts) -> EncodeResult<Vec<u8>>;
    fn decode(&self, bytes: &[u8]) -> DecodeResult<Accounts>;
}

/// The two supported formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodecKind {
    Delimited,
    Markup,
}

impl CodecKind {
    /// Picks the codec for a file name by its suffix.
    pub fn for_path(path: impl AsRef<Path>) -> Self {
        let is_delimited = path
            .as_ref()
            .file_name()
            .map(|name| name.to_string_lossy().ends_with(DELIMITED_EXTENSION))
            .unwrap_or(false);
        if is_delimited {
            Self::Delimited
        } else {
            Self::Markup
        }
    }

    pub fn codec(self, config: CodecConfig) -> Box<dyn Codec> {
        match self {
            Self::Delimited => Box::new(DelimitedCodec::with_config(config)),
            Self::Markup => Box::new(MarkupCodec::with_config(config)),
        }
    }
}

/// Account/list/task totals, used for log events.
pub(crate) fn model_counts(accounts: &Accounts) -> (usize, usize, usize) {
    let mut lists = 0;
    let mut tasks = 0;
    for account in accounts {
        lists += account.task_lists().len();
        tasks += account
            .task_lists()
            .iter()
            .map(|list| list.len())
            .sum::<usize>();
    }
    (accounts.len(), lists, tasks)
}

pub(crate) fn log_decode_outcome(
    format: &str,
    started_at: Instant,
    result: &DecodeResult<Accounts>,
) {
    match result {
        Ok(accounts) => {
            let (account_count, list_count, task_count) = model_counts(accounts);
            info!(
                "event=codec_decode module=codec status=ok format={} duration_ms={} accounts={} lists={} tasks={}",
                format,
                started_at.elapsed().as_millis(),
                account_count,
                list_count,
                task_count
            );
        }
        Err(err) => {
            error!(
                "event=codec_decode module=codec status=error format={} duration_ms={} error={}",
                format,
                started_at.elapsed().as_millis(),
                err
            );
        }
    }
}

pub(crate) fn log_encode_outcome(
    format: &str,
    started_at: Instant,
    result: &EncodeResult<Vec<u8>>,
) {
    match result {
        Ok(bytes) => info!(
            "event=codec_encode module=codec status=ok format={} duration_ms={} bytes={}",
            format,
            started_at.elapsed().as_millis(),
            bytes.len()
        ),
        Err(err) => error!(
            "event=codec_encode module=codec status=error format={} duration_ms={} error={}",
            format,
            started_at.elapsed().as_millis(),
            err
        ),
    }
}

pub(crate) fn bool_token(value: bool) -> &'static str {
    if value {
        "true"
    } else {
        "false"
    }
}

/// Only the exact token `true` is truthy.
pub(crate) fn parse_bool_token(value: &str) -> bool {
    value == "true"
}
