//! Delimited-record codec (`.csv` files).
//!
//! # Responsibility
//! - Flatten the account tree into typed records, one per line.
//! - Rebuild the tree in a single forward pass over those records.
//!
//! # Invariants
//! - Record shapes are positional and fixed:
//!   - `USER,id,name,credential,email` (5 fields)
//!   - `TODOLIST,accountName,listId,listName,changeable` (5 fields)
//!   - `TODO,accountName,listName,taskId,title,comment,due,done,starred` (9 fields)
//! - A record may only reference accounts/lists declared on earlier lines.
//! - An absent due date is the literal `0`.
//! - A missing `Default` list is not backfilled.

use crate::codec::due_date::{format_due_date, parse_due_date, NO_DUE_DATE};
use crate::codec::error::{DecodeError, DecodeResult, EncodeError, EncodeResult};
use crate::codec::{
    bool_token, log_decode_outcome, log_encode_outcome, parse_bool_token, Codec, CodecConfig,
};
use crate::model::account::Account;
use crate::model::accounts::Accounts;
use crate::model::task::Task;
use crate::model::task_list::TaskList;
use csv::{ReaderBuilder, StringRecord, Terminator, WriterBuilder};
use log::debug;
use std::time::Instant;

pub const USER_TAG: &str = "USER";
pub const TODOLIST_TAG: &str = "TODOLIST";
pub const TODO_TAG: &str = "TODO";

const USER_FIELDS: usize = 5;
const TODOLIST_FIELDS: usize = 5;
const TODO_FIELDS: usize = 9;

const FORMAT_NAME: &str = "delimited";

/// Codec for the flat, one-record-per-line format.
#[derive(Debug, Clone, Copy, Default)]
pub struct DelimitedCodec {
    config: CodecConfig,
}

impl DelimitedCodec {
    /// Codec rendering due dates in the local time zone.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: CodecConfig) -> Self {
        Self { config }
    }

    fn encode_records(&self, accounts: &Accounts) -> EncodeResult<Vec<u8>> {
        let mut writer = WriterBuilder::new()
            .flexible(true)
            .terminator(Terminator::Any(b'\n'))
            .from_writer(Vec::new());

        for account in accounts {
            writer.write_record([
                USER_TAG,
                account.id(),
                account.name(),
                account.credential(),
                account.email(),
            ])?;
            for list in account.task_lists() {
                writer.write_record([
                    TODOLIST_TAG,
                    account.name(),
                    list.id(),
                    list.name(),
                    bool_token(list.is_mutable()),
                ])?;
                for task in list.tasks() {
                    let due = match task.due_at() {
                        Some(due_at) => format_due_date(due_at, self.config.due_date_zone)?,
                        None => NO_DUE_DATE.to_string(),
                    };
                    writer.write_record([
                        TODO_TAG,
                        account.name(),
                        list.name(),
                        task.id(),
                        task.title(),
                        task.comment(),
                        due.as_str(),
                        bool_token(task.is_done()),
                        bool_token(task.is_starred()),
                    ])?;
                }
            }
        }

        writer
            .into_inner()
            .map_err(|err| EncodeError::Io(err.into_error()))
    }

    fn decode_records(&self, bytes: &[u8]) -> DecodeResult<Accounts> {
        let mut reader = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(bytes);
        let mut accounts = Accounts::new();
        let mut record = StringRecord::new();

        loop {
            match reader.read_record(&mut record) {
                Ok(true) => {}
                Ok(false) => break,
                Err(err) => {
                    let line = err.position().map(|position| position.line());
                    return Err(DecodeError::invalid_record_at(
                        line,
                        format!("unreadable record: {err}"),
                    ));
                }
            }
            // Blank lines never reach here; the reader drops them.
            let line = record.position().map(|position| position.line());
            self.apply_record(&mut accounts, &record)
                .map_err(|reason| DecodeError::invalid_record_at(line, reason))?;
        }

        Ok(accounts)
    }

    fn apply_record(&self, accounts: &mut Accounts, record: &StringRecord) -> Result<(), String> {
        match &record[0] {
            USER_TAG => apply_user(accounts, record),
            TODOLIST_TAG => apply_list(accounts, record),
            TODO_TAG => self.apply_task(accounts, record),
            other => Err(format!("unexpected record type `{other}`")),
        }
    }

    fn apply_task(&self, accounts: &mut Accounts, record: &StringRecord) -> Result<(), String> {
        expect_fields(record, TODO_FIELDS, "task")?;
        let account_name = &record[1];
        let list_name = &record[2];
        let due_at = match &record[6] {
            NO_DUE_DATE => None,
            text => Some(parse_due_date(text, self.config.due_date_zone)?),
        };
        let task = Task::restore(
            &record[3],
            &record[4],
            &record[5],
            due_at,
            parse_bool_token(&record[7]),
            parse_bool_token(&record[8]),
        );

        let account = accounts
            .get_mut(account_name)
            .ok_or_else(|| format!("task references unknown account `{account_name}`"))?;
        let list = account.task_list_mut(list_name).ok_or_else(|| {
            format!("task references unknown list `{list_name}` of account `{account_name}`")
        })?;
        let task_id = task.id().to_string();
        if !list.add_task(task) {
            return Err(format!(
                "duplicate task `{task_id}` in list `{list_name}` of account `{account_name}`"
            ));
        }
        Ok(())
    }
}

impl Codec for DelimitedCodec {
    fn format_name(&self) -> &'static str {
        FORMAT_NAME
    }

    fn encode(&self, accounts: &Accounts) -> EncodeResult<Vec<u8>> {
        let started_at = Instant::now();
        debug!("event=codec_encode module=codec status=start format={FORMAT_NAME}");
        let result = self.encode_records(accounts);
        log_encode_outcome(FORMAT_NAME, started_at, &result);
        result
    }

    fn decode(&self, bytes: &[u8]) -> DecodeResult<Accounts> {
        let started_at = Instant::now();
        debug!(
            "event=codec_decode module=codec status=start format={FORMAT_NAME} bytes={}",
            bytes.len()
        );
        let result = self.decode_records(bytes);
        log_decode_outcome(FORMAT_NAME, started_at, &result);
        result
    }
}

fn apply_user(accounts: &mut Accounts, record: &StringRecord) -> Result<(), String> {
    expect_fields(record, USER_FIELDS, "user")?;
    let account = Account::restore(&record[1], &record[2], &record[3], &record[4]);
    if !accounts.insert(account) {
        return Err(format!("duplicate account `{}`", &record[2]));
    }
    Ok(())
}

fn apply_list(accounts: &mut Accounts, record: &StringRecord) -> Result<(), String> {
    expect_fields(record, TODOLIST_FIELDS, "task list")?;
    let account_name = &record[1];
    let list_name = &record[3];
    let account = accounts
        .get_mut(account_name)
        .ok_or_else(|| format!("task list references unknown account `{account_name}`"))?;
    let list = TaskList::restore(&record[2], list_name, parse_bool_token(&record[4]));
    if !account.add_task_list(list) {
        return Err(format!(
            "duplicate task list `{list_name}` in account `{account_name}`"
        ));
    }
    Ok(())
}

fn expect_fields(record: &StringRecord, expected: usize, kind: &str) -> Result<(), String> {
    if record.len() != expected {
        return Err(format!(
            "{kind} record must have {expected} fields, got {}",
            record.len()
        ));
    }
    Ok(())
}
