//! Persistence core for the TodoList account database.
//! Owns the account/list/task model, its validation rules and the two
//! interchangeable file formats.

pub mod codec;
pub mod logging;
pub mod model;
pub mod store;
pub mod validation;

pub use codec::{
    Codec, CodecConfig, CodecKind, DecodeError, DecodeResult, DelimitedCodec, DueDateZone,
    EncodeError, EncodeResult, MarkupCodec,
};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::account::{hash_credential, Account, ModelError, ModelResult};
pub use model::accounts::{Accounts, ConsistencyIssue};
pub use model::ids::{IdSource, SequentialIds, UuidIds};
pub use model::task::{Task, DEFAULT_TASK_TITLE};
pub use model::task_list::{TaskList, DEFAULT_LIST_NAME};
pub use store::{
    load_accounts, load_accounts_with, save_accounts, save_accounts_with, StoreError, StoreResult,
};
pub use validation::{
    is_valid_credential, is_valid_email, is_valid_identifier, parse_time_of_day,
    validate_registration, ValidationError,
};

/// Minimal health-check API for front-end wiring probes.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
