//! Task domain model.
//!
//! # Responsibility
//! - Hold one to-do entry and its flags.
//! - Apply due-date mutations from a calendar date plus free-form time text.
//!
//! # Invariants
//! - `id` is stable for the task lifetime.
//! - `due_at`, when set, has minute resolution (seconds are always zero).
//! - `due_at`, when set, exists in the local time zone: wall-clock times that
//!   fall into a DST gap are moved forward past it when stored.
//! - `done`/`starred` are independent of `due_at`.

use crate::model::ids::IdSource;
use crate::validation::{parse_time_of_day, ValidationError};
use chrono::{Local, NaiveDate, NaiveDateTime, NaiveTime, Offset, TimeDelta, TimeZone, Timelike};
use serde::{Deserialize, Serialize};

/// Title used when a task is created without one.
pub const DEFAULT_TASK_TITLE: &str = "No title";

/// Single to-do entry owned by a `TaskList`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    id: String,
    title: String,
    comment: String,
    done: bool,
    starred: bool,
    due_at: Option<NaiveDateTime>,
}

impl Task {
    /// Creates a fresh task with no due date and both flags cleared.
    pub fn new(ids: &dyn IdSource, title: impl Into<String>, comment: impl Into<String>) -> Self {
        Self {
            id: ids.next_id(),
            title: title.into(),
            comment: comment.into(),
            done: false,
            starred: false,
            due_at: None,
        }
    }

    /// Creates a fresh task titled `No title` with an empty comment.
    pub fn untitled(ids: &dyn IdSource) -> Self {
        Self::new(ids, DEFAULT_TASK_TITLE, "")
    }

    /// Rebuilds a task from persisted fields.
    ///
    /// Used by decoders; nothing is validated. A due date carrying seconds is
    /// truncated to the minute and a nonexistent local time is shifted forward.
    pub fn restore(
        id: impl Into<String>,
        title: impl Into<String>,
        comment: impl Into<String>,
        due_at: Option<NaiveDateTime>,
        done: bool,
        starred: bool,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            comment: comment.into(),
            done,
            starred,
            due_at: due_at.map(normalize_due_at),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    pub fn comment(&self) -> &str {
        &self.comment
    }

    pub fn set_comment(&mut self, comment: impl Into<String>) {
        self.comment = comment.into();
    }

    pub fn is_done(&self) -> bool {
        self.done
    }

    pub fn set_done(&mut self, done: bool) {
        self.done = done;
    }

    /// High-priority marker.
    pub fn is_starred(&self) -> bool {
        self.starred
    }

    pub fn set_starred(&mut self, starred: bool) {
        self.starred = starred;
    }

    /// Due date in the local wall-clock time of whoever created it.
    pub fn due_at(&self) -> Option<NaiveDateTime> {
        self.due_at
    }

    /// Sets the due date from a calendar day and time text.
    ///
    /// See `parse_time_of_day` for the accepted grammar. Out-of-range hours or
    /// minutes are clamped to zero rather than rejected. A time skipped by a
    /// DST change (02:30 when clocks jump from 02:00 to 03:00) lands after the
    /// gap (03:30).
    ///
    /// # Errors
    /// - `ValidationError::InvalidTimeText` when `time_text` matches no grammar.
    ///   The stored due date is left untouched.
    pub fn set_due_date(&mut self, date: NaiveDate, time_text: &str) -> Result<(), ValidationError> {
        let (hour, minute) = parse_time_of_day(time_text)?;
        let time = NaiveTime::from_hms_opt(hour, minute, 0)
            .ok_or_else(|| ValidationError::InvalidTimeText(time_text.to_string()))?;
        self.due_at = Some(normalize_due_at(date.and_time(time)));
        Ok(())
    }

    /// Replaces the due date directly; seconds are dropped and a nonexistent
    /// local time is shifted forward.
    pub fn set_due_at(&mut self, due_at: Option<NaiveDateTime>) {
        self.due_at = due_at.map(normalize_due_at);
    }

    pub fn clear_due_date(&mut self) {
        self.due_at = None;
    }

    /// Due time formatted as `HH:MM`, or `00:00` without a due date.
    pub fn due_time_text(&self) -> String {
        match self.due_at {
            Some(due_at) => due_at.format("%H:%M").to_string(),
            None => "00:00".to_string(),
        }
    }
}

fn normalize_due_at(value: NaiveDateTime) -> NaiveDateTime {
    skip_local_gap(truncate_to_minute(value))
}

/// Moves a wall-clock time that does not exist locally past the DST gap.
///
/// The time is read with the offset in force a day earlier, turned into an
/// instant, and rendered back in local time.
fn skip_local_gap(value: NaiveDateTime) -> NaiveDateTime {
    if Local.from_local_datetime(&value).earliest().is_some() {
        return value;
    }
    let before_gap = value
        .checked_sub_signed(TimeDelta::hours(24))
        .map(|earlier| Local.offset_from_utc_datetime(&earlier).fix())
        .unwrap_or_else(|| Local.offset_from_utc_datetime(&value).fix());
    match value.checked_sub_signed(TimeDelta::seconds(i64::from(before_gap.local_minus_utc()))) {
        Some(instant) => Local.from_utc_datetime(&instant).naive_local(),
        None => value,
    }
}

fn truncate_to_minute(value: NaiveDateTime) -> NaiveDateTime {
    value
        .with_second(0)
        .and_then(|value| value.with_nanosecond(0))
        .unwrap_or(value)
}
