//! Tree-markup codec (every non-`.csv` file).
//!
//! # Responsibility
//! - Render the account tree as nested XML elements.
//! - Rebuild the tree by walking the document with the mirror-image structure.
//!
//! # Invariants
//! - Root element is `todolistapp`; its children are `user` elements.
//! - `user` -> `username`, `password`, `uuid`, `email`, `TodoList*`.
//! - `TodoList[changeable]` -> `name`, `uuid`, `item*`.
//! - `item[starred, done]` -> `title`, `uuid`, `comment`, optional `duedate`.
//! - A missing `duedate` element means "no due date".
//! - Missing boolean attributes fall back to defaults instead of failing.
//! - Duplicate account names, duplicate list names per account and duplicate
//!   task ids per list are rejected, exactly like the delimited codec.

use crate::codec::due_date::{format_due_date, parse_due_date};
use crate::codec::error::{DecodeError, DecodeResult, EncodeResult};
use crate::codec::xml_tree::{parse_document, XmlElement};
use crate::codec::{
    bool_token, log_decode_outcome, log_encode_outcome, parse_bool_token, Codec, CodecConfig,
};
use crate::model::account::Account;
use crate::model::accounts::Accounts;
use crate::model::task::{Task, DEFAULT_TASK_TITLE};
use crate::model::task_list::TaskList;
use log::debug;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use std::time::Instant;

pub const ROOT_ELEMENT: &str = "todolistapp";

const USER_ELEMENT: &str = "user";
const USERNAME_ELEMENT: &str = "username";
const PASSWORD_ELEMENT: &str = "password";
const UUID_ELEMENT: &str = "uuid";
const EMAIL_ELEMENT: &str = "email";
const LIST_ELEMENT: &str = "TodoList";
const NAME_ELEMENT: &str = "name";
const ITEM_ELEMENT: &str = "item";
const TITLE_ELEMENT: &str = "title";
const COMMENT_ELEMENT: &str = "comment";
const DUE_DATE_ELEMENT: &str = "duedate";

const CHANGEABLE_ATTR: &str = "changeable";
const DONE_ATTR: &str = "done";
const STARRED_ATTR: &str = "starred";
const LEGACY_STARRED_ATTR: &str = "prio";

const USER_CHILDREN: &[&str] = &[
    USERNAME_ELEMENT,
    PASSWORD_ELEMENT,
    UUID_ELEMENT,
    EMAIL_ELEMENT,
    LIST_ELEMENT,
];
const LIST_CHILDREN: &[&str] = &[NAME_ELEMENT, UUID_ELEMENT, ITEM_ELEMENT];
const ITEM_CHILDREN: &[&str] = &[
    TITLE_ELEMENT,
    UUID_ELEMENT,
    COMMENT_ELEMENT,
    DUE_DATE_ELEMENT,
];

const DEFAULT_CHANGEABLE: bool = true;
const DEFAULT_DONE: bool = false;
const DEFAULT_STARRED: bool = false;

const FORMAT_NAME: &str = "markup";
const INDENT_WIDTH: usize = 2;

/// Codec for the nested element format.
#[derive(Debug, Clone, Copy, Default)]
pub struct MarkupCodec {
    config: CodecConfig,
}

impl MarkupCodec {
    /// Codec rendering due dates in the local time zone.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: CodecConfig) -> Self {
        Self { config }
    }

    fn encode_document(&self, accounts: &Accounts) -> EncodeResult<Vec<u8>> {
        let mut writer = Writer::new_with_indent(Vec::new(), b' ', INDENT_WIDTH);
        writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
        writer.write_event(Event::Start(BytesStart::new(ROOT_ELEMENT)))?;

        for account in accounts {
            writer.write_event(Event::Start(BytesStart::new(USER_ELEMENT)))?;
            write_leaf(&mut writer, USERNAME_ELEMENT, account.name())?;
            write_leaf(&mut writer, PASSWORD_ELEMENT, account.credential())?;
            write_leaf(&mut writer, UUID_ELEMENT, account.id())?;
            write_leaf(&mut writer, EMAIL_ELEMENT, account.email())?;

            for list in account.task_lists() {
                let mut list_start = BytesStart::new(LIST_ELEMENT);
                list_start.push_attribute((CHANGEABLE_ATTR, bool_token(list.is_mutable())));
                writer.write_event(Event::Start(list_start))?;
                write_leaf(&mut writer, NAME_ELEMENT, list.name())?;
                write_leaf(&mut writer, UUID_ELEMENT, list.id())?;

                for task in list.tasks() {
                    self.write_task(&mut writer, task)?;
                }
                writer.write_event(Event::End(BytesEnd::new(LIST_ELEMENT)))?;
            }
            writer.write_event(Event::End(BytesEnd::new(USER_ELEMENT)))?;
        }

        writer.write_event(Event::End(BytesEnd::new(ROOT_ELEMENT)))?;
        let mut bytes = writer.into_inner();
        bytes.push(b'\n');
        Ok(bytes)
    }

    fn write_task(&self, writer: &mut Writer<Vec<u8>>, task: &Task) -> EncodeResult<()> {
        let mut item_start = BytesStart::new(ITEM_ELEMENT);
        item_start.push_attribute((STARRED_ATTR, bool_token(task.is_starred())));
        item_start.push_attribute((DONE_ATTR, bool_token(task.is_done())));
        writer.write_event(Event::Start(item_start))?;
        write_leaf(writer, TITLE_ELEMENT, task.title())?;
        write_leaf(writer, UUID_ELEMENT, task.id())?;
        write_leaf(writer, COMMENT_ELEMENT, task.comment())?;
        if let Some(due_at) = task.due_at() {
            let due = format_due_date(due_at, self.config.due_date_zone)?;
            write_leaf(writer, DUE_DATE_ELEMENT, &due)?;
        }
        writer.write_event(Event::End(BytesEnd::new(ITEM_ELEMENT)))?;
        Ok(())
    }

    fn decode_document(&self, bytes: &[u8]) -> DecodeResult<Accounts> {
        let text = std::str::from_utf8(bytes)
            .map_err(|err| DecodeError::invalid_record(format!("document is not UTF-8: {err}")))?;
        let root = parse_document(text).map_err(DecodeError::invalid_record)?;
        if root.name != ROOT_ELEMENT {
            return Err(DecodeError::invalid_record(format!(
                "expected `{ROOT_ELEMENT}` as root element, found `{}`",
                root.name
            )));
        }

        let mut accounts = Accounts::new();
        for user in &root.children {
            if user.name != USER_ELEMENT {
                return Err(DecodeError::invalid_record(format!(
                    "unexpected element `{}` in `{ROOT_ELEMENT}`",
                    user.name
                )));
            }
            let account = self.decode_user(user)?;
            let name = account.name().to_string();
            if !accounts.insert(account) {
                return Err(DecodeError::invalid_record(format!(
                    "duplicate account `{name}`"
                )));
            }
        }
        Ok(accounts)
    }

    fn decode_user(&self, user: &XmlElement) -> DecodeResult<Account> {
        expect_children(user, USER_CHILDREN)?;
        let mut account = Account::restore(
            required_text(user, UUID_ELEMENT)?,
            required_text(user, USERNAME_ELEMENT)?,
            required_text(user, PASSWORD_ELEMENT)?,
            optional_text(user, EMAIL_ELEMENT).unwrap_or_default(),
        );

        for list_element in user.children_named(LIST_ELEMENT) {
            let list = self.decode_list(list_element)?;
            let list_name = list.name().to_string();
            if !account.add_task_list(list) {
                return Err(DecodeError::invalid_record(format!(
                    "duplicate task list `{list_name}` in account `{}`",
                    account.name()
                )));
            }
        }
        Ok(account)
    }

    fn decode_list(&self, list_element: &XmlElement) -> DecodeResult<TaskList> {
        expect_children(list_element, LIST_CHILDREN)?;
        let mut list = TaskList::restore(
            required_text(list_element, UUID_ELEMENT)?,
            required_text(list_element, NAME_ELEMENT)?,
            bool_attribute(list_element, CHANGEABLE_ATTR, DEFAULT_CHANGEABLE),
        );

        for item in list_element.children_named(ITEM_ELEMENT) {
            let task = self.decode_task(item)?;
            let task_id = task.id().to_string();
            if !list.add_task(task) {
                return Err(DecodeError::invalid_record(format!(
                    "duplicate task `{task_id}` in list `{}`",
                    list.name()
                )));
            }
        }
        Ok(list)
    }

    fn decode_task(&self, item: &XmlElement) -> DecodeResult<Task> {
        expect_children(item, ITEM_CHILDREN)?;
        let due_at = match optional_text(item, DUE_DATE_ELEMENT) {
            Some(text) => Some(
                parse_due_date(&text, self.config.due_date_zone)
                    .map_err(DecodeError::invalid_record)?,
            ),
            None => None,
        };
        let starred = match item.attribute(STARRED_ATTR) {
            Some(value) => parse_bool_token(value),
            None => bool_attribute(item, LEGACY_STARRED_ATTR, DEFAULT_STARRED),
        };
        Ok(Task::restore(
            required_text(item, UUID_ELEMENT)?,
            optional_text(item, TITLE_ELEMENT).unwrap_or_else(|| DEFAULT_TASK_TITLE.to_string()),
            optional_text(item, COMMENT_ELEMENT).unwrap_or_default(),
            due_at,
            bool_attribute(item, DONE_ATTR, DEFAULT_DONE),
            starred,
        ))
    }
}

impl Codec for MarkupCodec {
    fn format_name(&self) -> &'static str {
        FORMAT_NAME
    }

    fn encode(&self, accounts: &Accounts) -> EncodeResult<Vec<u8>> {
        let started_at = Instant::now();
        debug!("event=codec_encode module=codec status=start format={FORMAT_NAME}");
        let result = self.encode_document(accounts);
        log_encode_outcome(FORMAT_NAME, started_at, &result);
        result
    }

    fn decode(&self, bytes: &[u8]) -> DecodeResult<Accounts> {
        let started_at = Instant::now();
        debug!(
            "event=codec_decode module=codec status=start format={FORMAT_NAME} bytes={}",
            bytes.len()
        );
        let result = self.decode_document(bytes);
        log_decode_outcome(FORMAT_NAME, started_at, &result);
        result
    }
}

fn write_leaf(writer: &mut Writer<Vec<u8>>, name: &str, value: &str) -> EncodeResult<()> {
    writer.write_event(Event::Start(BytesStart::new(name)))?;
    // Always emit the text event, even when empty, so the closing tag stays on
    // the same line and no indentation leaks into the value.
    writer.write_event(Event::Text(BytesText::new(value)))?;
    writer.write_event(Event::End(BytesEnd::new(name)))?;
    Ok(())
}

fn expect_children(element: &XmlElement, allowed: &[&str]) -> DecodeResult<()> {
    match element
        .children
        .iter()
        .find(|child| !allowed.contains(&child.name.as_str()))
    {
        Some(unexpected) => Err(DecodeError::invalid_record(format!(
            "unexpected element `{}` in `{}`",
            unexpected.name, element.name
        ))),
        None => Ok(()),
    }
}

fn required_text(element: &XmlElement, name: &str) -> DecodeResult<String> {
    optional_text(element, name).ok_or_else(|| {
        DecodeError::invalid_record(format!(
            "missing `{name}` element in `{}`",
            element.name
        ))
    })
}

fn optional_text(element: &XmlElement, name: &str) -> Option<String> {
    element.child(name).map(|child| child.text.clone())
}

fn bool_attribute(element: &XmlElement, name: &str, default: bool) -> bool {
    element
        .attribute(name)
        .map(parse_bool_token)
        .unwrap_or(default)
}
