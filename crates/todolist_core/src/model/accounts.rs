//! Top-level account collection.
//!
//! # Responsibility
//! - Map account names to accounts for one loaded database.
//! - Offer registration and login lookups over that map.
//! - Report inconsistencies that decoding deliberately leaves in place.
//!
//! # Invariants
//! - Keys equal the owning account's `name`.
//! - Iteration is in ascending name order.
//! - Holding several `Accounts` values at once is fine; there is no global
//!   "current database".

use crate::model::account::{Account, ModelError, ModelResult};
use crate::model::ids::IdSource;
use crate::model::task_list::DEFAULT_LIST_NAME;
use crate::validation::{is_valid_email, is_valid_identifier, validate_registration};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};

/// Name-keyed set of accounts making up one database.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Accounts {
    by_name: BTreeMap<String, Account>,
}

/// A model inconsistency found by `Accounts::consistency_issues`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsistencyIssue {
    MissingDefaultList { account: String },
    MutableDefaultList { account: String },
    InvalidAccountName { account: String },
    InvalidEmail { account: String, email: String },
}

impl Display for ConsistencyIssue {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingDefaultList { account } => {
                write!(f, "account `{account}` has no `{DEFAULT_LIST_NAME}` list")
            }
            Self::MutableDefaultList { account } => write!(
                f,
                "account `{account}` has a renamable `{DEFAULT_LIST_NAME}` list"
            ),
            Self::InvalidAccountName { account } => {
                write!(f, "account name `{account}` is not a valid identifier")
            }
            Self::InvalidEmail { account, email } => {
                write!(f, "account `{account}` has invalid email `{email}`")
            }
        }
    }
}

impl Accounts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&Account> {
        self.by_name.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Account> {
        self.by_name.get_mut(name)
    }

    /// Accounts in ascending name order.
    pub fn iter(&self) -> impl Iterator<Item = &Account> {
        self.by_name.values()
    }

    /// Adds `account`. Returns `false` without mutation when its name is taken.
    pub fn insert(&mut self, account: Account) -> bool {
        if self.by_name.contains_key(account.name()) {
            return false;
        }
        self.by_name.insert(account.name().to_string(), account);
        true
    }

    /// Validates and registers a new account.
    ///
    /// # Errors
    /// - `ModelError::Validation` when name or password syntax is rejected.
    /// - `ModelError::DuplicateAccount` when the name is taken.
    pub fn register(
        &mut self,
        ids: &dyn IdSource,
        name: &str,
        password: &str,
    ) -> ModelResult<&mut Account> {
        validate_registration(name, password)?;
        if self.by_name.contains_key(name) {
            return Err(ModelError::DuplicateAccount(name.to_string()));
        }
        let account = Account::register(ids, name, password);
        Ok(self.by_name.entry(name.to_string()).or_insert(account))
    }

    /// Looks up `name` and checks `password` against its credential.
    pub fn authenticate(&self, name: &str, password: &str) -> Option<&Account> {
        self.by_name
            .get(name)
            .filter(|account| account.check_credential(password))
    }

    /// Lists every invariant violation a decoded database may carry.
    ///
    /// Decoders do not validate names, emails or the presence of the default
    /// list; callers that care inspect this report after loading.
    pub fn consistency_issues(&self) -> Vec<ConsistencyIssue> {
        let mut issues = Vec::new();
        for account in self.iter() {
            let name = account.name().to_string();
            match account.default_list() {
                None => issues.push(ConsistencyIssue::MissingDefaultList {
                    account: name.clone(),
                }),
                Some(list) if list.is_mutable() => {
                    issues.push(ConsistencyIssue::MutableDefaultList {
                        account: name.clone(),
                    })
                }
                Some(_) => {}
            }
            if !is_valid_identifier(account.name()) {
                issues.push(ConsistencyIssue::InvalidAccountName {
                    account: name.clone(),
                });
            }
            // Fresh registrations legitimately carry an empty email.
            if !account.email().is_empty() && !is_valid_email(account.email()) {
                issues.push(ConsistencyIssue::InvalidEmail {
                    account: name,
                    email: account.email().to_string(),
                });
            }
        }
        issues
    }
}

impl<'a> IntoIterator for &'a Accounts {
    type Item = &'a Account;
    type IntoIter = std::collections::btree_map::Values<'a, String, Account>;

    fn into_iter(self) -> Self::IntoIter {
        self.by_name.values()
    }
}
