//! Whole-file load/save for account databases.
//!
//! # Responsibility
//! - Pick the codec from the file name and run it over the file contents.
//! - Surface I/O failures unchanged and separately from codec failures.
//!
//! # Invariants
//! - Files are read and written as one buffer; there is no streaming.
//! - Saving encodes completely in memory before the file is touched, so an
//!   encode failure never leaves a partial document behind.
//! - A write that fails midway is not rolled back.

use crate::codec::{CodecConfig, CodecKind, DecodeError, EncodeError};
use crate::model::accounts::Accounts;
use log::{error, info};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::Path;
use std::time::Instant;

pub type StoreResult<T> = Result<T, StoreError>;

/// Failure while loading or saving a database file.
#[derive(Debug)]
pub enum StoreError {
    Io(std::io::Error),
    Decode(DecodeError),
    Encode(EncodeError),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(err) => write!(f, "{err}"),
            Self::Decode(err) => write!(f, "{err}"),
            Self::Encode(err) => write!(f, "{err}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Decode(err) => Some(err),
            Self::Encode(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for StoreError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<DecodeError> for StoreError {
    fn from(value: DecodeError) -> Self {
        Self::Decode(value)
    }
}

impl From<EncodeError> for StoreError {
    fn from(value: EncodeError) -> Self {
        Self::Encode(value)
    }
}

/// Loads a database file with local-time due dates.
pub fn load_accounts(path: impl AsRef<Path>) -> StoreResult<Accounts> {
    load_accounts_with(path, CodecConfig::default())
}

/// Loads a database file, choosing the codec by file name.
///
/// # Errors
/// - `StoreError::Io` when the file cannot be read.
/// - `StoreError::Decode` when its contents are rejected.
pub fn load_accounts_with(path: impl AsRef<Path>, config: CodecConfig) -> StoreResult<Accounts> {
    let path = path.as_ref();
    let kind = CodecKind::for_path(path);
    let started_at = Instant::now();
    info!("event=store_load module=store status=start codec={kind:?}");

    let result = std::fs::read(path)
        .map_err(StoreError::from)
        .and_then(|bytes| Ok(kind.codec(config).decode(&bytes)?));

    match &result {
        Ok(accounts) => info!(
            "event=store_load module=store status=ok codec={kind:?} duration_ms={} accounts={}",
            started_at.elapsed().as_millis(),
            accounts.len()
        ),
        Err(err) => error!(
            "event=store_load module=store status=error codec={kind:?} duration_ms={} error={}",
            started_at.elapsed().as_millis(),
            err
        ),
    }
    result
}

/// Saves a database file with local-time due dates.
pub fn save_accounts(path: impl AsRef<Path>, accounts: &Accounts) -> StoreResult<()> {
    save_accounts_with(path, accounts, CodecConfig::default())
}

/// Encodes `accounts` with the codec chosen by file name and writes the file.
///
/// # Errors
/// - `StoreError::Encode` when serialization fails; the file is untouched.
/// - `StoreError::Io` when the file cannot be written.
pub fn save_accounts_with(
    path: impl AsRef<Path>,
    accounts: &Accounts,
    config: CodecConfig,
) -> StoreResult<()> {
    let path = path.as_ref();
    let kind = CodecKind::for_path(path);
    let started_at = Instant::now();
    info!("event=store_save module=store status=start codec={kind:?}");

    let result = kind
        .codec(config)
        .encode(accounts)
        .map_err(StoreError::from)
        .and_then(|bytes| Ok(std::fs::write(path, bytes)?));

    match &result {
        Ok(()) => info!(
            "event=store_save module=store status=ok codec={kind:?} duration_ms={} accounts={}",
            started_at.elapsed().as_millis(),
            accounts.len()
        ),
        Err(err) => error!(
            "event=store_save module=store status=error codec={kind:?} duration_ms={} error={}",
            started_at.elapsed().as_millis(),
            err
        ),
    }
    result
}
