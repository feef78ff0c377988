//! Account/task-list/task domain model.
//!
//! # Responsibility
//! - Define the in-memory shape both codecs populate and read.
//! - Enforce name uniqueness and default-list protection on mutation.
//!
//! # Invariants
//! - Ownership is strictly hierarchical: `Accounts` -> `Account` ->
//!   `TaskList` -> `Task`; nothing is shared between two owners.
//! - Fresh entities take ids from an `IdSource`; restored ones keep theirs.

pub mod account;
pub mod accounts;
pub mod ids;
pub mod task;
pub mod task_list;
