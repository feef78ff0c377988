//! Account domain model.
//!
//! # Responsibility
//! - Own an account's credential, email and task lists.
//! - Derive and check salted credential hashes.
//! - Enforce per-account list-name uniqueness and default-list protection.
//!
//! # Invariants
//! - `id` and `name` never change after construction.
//! - No two owned lists share a name.
//! - A registered account owns exactly one immutable `Default` list. A restored
//!   account owns whatever its source data declared.
//! - `credential` is `hex(sha256(id + password))` and is never logged.

use crate::model::ids::IdSource;
use crate::model::task_list::{TaskList, DEFAULT_LIST_NAME};
use crate::validation::{is_valid_email, ValidationError};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type ModelResult<T> = Result<T, ModelError>;

/// Errors from account and account-collection mutations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelError {
    /// An account with this name already exists.
    DuplicateAccount(String),
    /// The account already owns a list with this name.
    DuplicateTaskList(String),
    /// The account owns no list with this name.
    TaskListNotFound(String),
    /// The list is protected against rename/delete.
    ImmutableTaskList(String),
    /// User input failed a syntax rule.
    Validation(ValidationError),
}

impl Display for ModelError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DuplicateAccount(name) => write!(f, "account already exists: {name}"),
            Self::DuplicateTaskList(name) => write!(f, "task list already exists: {name}"),
            Self::TaskListNotFound(name) => write!(f, "task list not found: {name}"),
            Self::ImmutableTaskList(name) => {
                write!(f, "task list cannot be renamed or deleted: {name}")
            }
            Self::Validation(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ModelError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ValidationError> for ModelError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

/// Registered user together with everything it owns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    id: String,
    name: String,
    credential: String,
    email: String,
    task_lists: Vec<TaskList>,
}

impl Account {
    /// Creates a fresh account from a clear-text password.
    ///
    /// The email starts empty and the immutable `Default` list is created with
    /// its welcome task. Name and password syntax are not checked here; use
    /// `validate_registration` or `Accounts::register` for that.
    pub fn register(ids: &dyn IdSource, name: impl Into<String>, password: &str) -> Self {
        let id = ids.next_id();
        let credential = hash_credential(&id, password);
        Self {
            id,
            name: name.into(),
            credential,
            email: String::new(),
            task_lists: vec![TaskList::new_with_welcome_task(
                ids,
                DEFAULT_LIST_NAME,
                false,
            )],
        }
    }

    /// Rebuilds an account from persisted fields.
    ///
    /// Nothing is validated and no lists are created; decoders add them.
    pub fn restore(
        id: impl Into<String>,
        name: impl Into<String>,
        hashed_credential: impl Into<String>,
        email: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            credential: hashed_credential.into(),
            email: email.into(),
            task_lists: Vec::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Stored credential hash, as persisted by the codecs.
    pub fn credential(&self) -> &str {
        &self.credential
    }

    /// Returns whether `password` hashes to the stored credential.
    pub fn check_credential(&self, password: &str) -> bool {
        hash_credential(&self.id, password) == self.credential
    }

    /// Replaces the credential with the hash of a new clear-text password.
    pub fn set_password(&mut self, password: &str) {
        self.credential = hash_credential(&self.id, password);
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    /// Updates the email address.
    ///
    /// # Errors
    /// - `ValidationError::InvalidEmail` when the address is empty or malformed;
    ///   the stored address is kept.
    pub fn set_email(&mut self, email: impl Into<String>) -> Result<(), ValidationError> {
        let email = email.into();
        if !is_valid_email(&email) {
            return Err(ValidationError::InvalidEmail(email));
        }
        self.email = email;
        Ok(())
    }

    pub fn task_lists(&self) -> &[TaskList] {
        &self.task_lists
    }

    pub fn task_list(&self, name: &str) -> Option<&TaskList> {
        self.task_lists.iter().find(|list| list.name() == name)
    }

    pub fn task_list_mut(&mut self, name: &str) -> Option<&mut TaskList> {
        self.task_lists.iter_mut().find(|list| list.name() == name)
    }

    /// The reserved `Default` list, if this account has one.
    pub fn default_list(&self) -> Option<&TaskList> {
        self.task_list(DEFAULT_LIST_NAME)
    }

    /// Appends `list`. Returns `false` without mutation on a name clash.
    pub fn add_task_list(&mut self, list: TaskList) -> bool {
        if self.task_list(list.name()).is_some() {
            return false;
        }
        self.task_lists.push(list);
        true
    }

    /// Renames the list called `current` to `new_name`.
    ///
    /// # Errors
    /// - `TaskListNotFound` when `current` is unknown.
    /// - `ImmutableTaskList` for the protected default list.
    /// - `DuplicateTaskList` when a sibling already uses `new_name`.
    pub fn rename_task_list(&mut self, current: &str, new_name: &str) -> ModelResult<()> {
        if current == new_name {
            return match self.task_list(current) {
                Some(_) => Ok(()),
                None => Err(ModelError::TaskListNotFound(current.to_string())),
            };
        }
        if self.task_list(new_name).is_some() {
            return Err(ModelError::DuplicateTaskList(new_name.to_string()));
        }
        let list = self
            .task_list_mut(current)
            .ok_or_else(|| ModelError::TaskListNotFound(current.to_string()))?;
        if !list.rename(new_name) {
            return Err(ModelError::ImmutableTaskList(current.to_string()));
        }
        Ok(())
    }

    /// Removes and returns the list called `name`.
    ///
    /// # Errors
    /// - `TaskListNotFound` when `name` is unknown.
    /// - `ImmutableTaskList` for the protected default list.
    pub fn remove_task_list(&mut self, name: &str) -> ModelResult<TaskList> {
        let index = self
            .task_lists
            .iter()
            .position(|list| list.name() == name)
            .ok_or_else(|| ModelError::TaskListNotFound(name.to_string()))?;
        if !self.task_lists[index].is_mutable() {
            return Err(ModelError::ImmutableTaskList(name.to_string()));
        }
        Ok(self.task_lists.remove(index))
    }
}

/// Salted one-way hash shared by registration and login checks.
pub fn hash_credential(account_id: &str, password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(account_id.as_bytes());
    hasher.update(password.as_bytes());
    hex::encode(hasher.finalize())
}
