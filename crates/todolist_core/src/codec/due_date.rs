//! Due-date text representation shared by both codecs.
//!
//! Rendered as `yyyyMMdd'T'HH:mm:ssZ`, e.g. `20240501T09:30:00+0200`, using
//! the offset of the configured zone at that wall-clock time.

use crate::codec::error::{EncodeError, EncodeResult};
use crate::codec::DueDateZone;
use chrono::{DateTime, Local, NaiveDateTime, Offset, TimeZone};

/// chrono pattern equivalent of `yyyyMMdd'T'HH:mm:ssZ`.
pub const DUE_DATE_FORMAT: &str = "%Y%m%dT%H:%M:%S%z";

/// Delimited-format token for "no due date".
pub const NO_DUE_DATE: &str = "0";

pub(crate) fn format_due_date(value: NaiveDateTime, zone: DueDateZone) -> EncodeResult<String> {
    let offset = match zone {
        DueDateZone::Fixed(offset) => offset,
        // Ambiguous local times (DST fall-back) take the earlier offset; times
        // inside a DST gap borrow the offset in force at that UTC instant.
        DueDateZone::Local => Local
            .offset_from_local_datetime(&value)
            .earliest()
            .unwrap_or_else(|| Local.offset_from_utc_datetime(&value))
            .fix(),
    };
    let rendered = offset
        .from_local_datetime(&value)
        .single()
        .ok_or(EncodeError::UnrepresentableDueDate(value))?;
    Ok(rendered.format(DUE_DATE_FORMAT).to_string())
}

pub(crate) fn parse_due_date(text: &str, zone: DueDateZone) -> Result<NaiveDateTime, String> {
    let parsed = DateTime::parse_from_str(text, DUE_DATE_FORMAT)
        .map_err(|err| format!("invalid due date `{text}`: {err}"))?;
    Ok(match zone {
        DueDateZone::Fixed(offset) => parsed.with_timezone(&offset).naive_local(),
        DueDateZone::Local => parsed.with_timezone(&Local).naive_local(),
    })
}
