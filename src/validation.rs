//! Validation and sanitization of submitted book instance forms
//!
//! Every rule is evaluated independently and all messages are collected.
//! Sanitization happens whether or not validation passes, so a rejected form
//! can be shown again with the cleaned values.

use chrono::{NaiveDate, Weekday};
use once_cell::sync::Lazy;
use regex::Regex;
use uuid::Uuid;
use validator::Validate;

use crate::models::{
    BookInstanceDraft, BookInstanceFields, BookInstanceForm, BookInstanceStatus, FieldError,
};

pub const MSG_BOOK_REQUIRED: &str = "book name must be specified";
pub const MSG_IMPRINT_REQUIRED: &str = "publisher must be specified";
pub const MSG_INVALID_DATE: &str = "invalid date";
pub const MSG_INVALID_STATUS: &str = "invalid status";

/// Field order used when reporting errors
const FIELDS: [&str; 4] = ["book", "imprint", "status", "due_back"];

/// ISO-8601 dates: calendar (`2024-05-17`, `20240517`, `2024-05`, `2024`),
/// ordinal (`2024-138`) and week (`2024-W20-5`), each optionally followed by a time.
static ISO8601_DATE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        r"^(?:",
        r"(?P<year>\d{4})(?:-(?P<month>\d{2})(?:-(?P<day>\d{2}))?)?",
        r"|(?P<basic_year>\d{4})(?P<basic_month>\d{2})(?P<basic_day>\d{2})",
        r"|(?P<ordinal_year>\d{4})-?(?P<ordinal_day>\d{3})",
        r"|(?P<week_year>\d{4})-?W(?P<week>\d{2})(?:-?(?P<week_day>[1-7]))?",
        r")",
        r"(?:[T ]\d{2}(?::?\d{2}(?::?\d{2}(?:[.,]\d+)?)?)?(?:Z|[+-]\d{2}(?::?\d{2})?)?)?$",
    ))
    .expect("ISO-8601 pattern compiles")
});

const WEEKDAYS: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

/// Outcome of running a submitted form through the pipeline
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Checked {
    Valid(BookInstanceFields),
    Invalid {
        draft: BookInstanceDraft,
        errors: Vec<FieldError>,
    },
}

/// HTML-escape a string the way form sanitizers usually do.
pub fn escape(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '/' => out.push_str("&#x2F;"),
            '\\' => out.push_str("&#x5C;"),
            '`' => out.push_str("&#96;"),
            c => out.push(c),
        }
    }
    out
}

fn trim_escape(input: &str) -> String {
    escape(input.trim())
}

/// Parse an ISO-8601 date or date-time into its calendar date.
///
/// Reduced precision resolves to the first day of the period. Returns `None`
/// for anything that is not a real calendar date, e.g. `2023-02-30`.
pub fn parse_iso8601_date(input: &str) -> Option<NaiveDate> {
    let caps = ISO8601_DATE.captures(input)?;
    let num = |name: &str| caps.name(name).and_then(|m| m.as_str().parse::<u32>().ok());

    if let Some(year) = num("year") {
        return NaiveDate::from_ymd_opt(year as i32, num("month").unwrap_or(1), num("day").unwrap_or(1));
    }
    if let Some(year) = num("basic_year") {
        return NaiveDate::from_ymd_opt(year as i32, num("basic_month")?, num("basic_day")?);
    }
    if let Some(year) = num("ordinal_year") {
        return NaiveDate::from_yo_opt(year as i32, num("ordinal_day")?);
    }
    let year = num("week_year")?;
    let weekday = *WEEKDAYS.get(num("week_day").unwrap_or(1) as usize - 1)?;
    NaiveDate::from_isoywd_opt(year as i32, num("week")?, weekday)
}

/// Sanitize a submitted form. `id` is attached when the form targets an existing record.
pub fn sanitize(form: &BookInstanceForm, id: Option<Uuid>) -> BookInstanceDraft {
    BookInstanceDraft {
        id,
        book: trim_escape(&form.book),
        imprint: trim_escape(&form.imprint),
        status: trim_escape(&form.status),
        due_back: form.due_back.as_deref().and_then(parse_iso8601_date),
    }
}

/// Run validation and sanitization over a submitted form.
pub fn check_book_instance(form: &BookInstanceForm, id: Option<Uuid>) -> Checked {
    let draft = sanitize(form, id);
    let mut errors = Vec::new();

    if let Err(derived) = draft.validate() {
        let field_errors = derived.field_errors();
        for field in FIELDS {
            if let Some(error) = field_errors.get(field).and_then(|errs| errs.first()) {
                let msg = error
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| error.code.to_string());
                errors.push(FieldError::new(field, msg));
            }
        }
    }

    let status = if draft.status.is_empty() {
        Some(BookInstanceStatus::default())
    } else {
        let parsed = draft.status.parse::<BookInstanceStatus>().ok();
        if parsed.is_none() {
            errors.push(FieldError::new("status", MSG_INVALID_STATUS));
        }
        parsed
    };

    // Empty means "not lent"; anything else has to be a date.
    if let Some(raw) = form.due_back.as_deref().filter(|raw| !raw.is_empty()) {
        if parse_iso8601_date(raw).is_none() {
            errors.push(FieldError::new("due_back", MSG_INVALID_DATE));
        }
    }

    errors.sort_by_key(|e| FIELDS.iter().position(|f| *f == e.field));

    match status {
        Some(status) if errors.is_empty() => Checked::Valid(BookInstanceFields {
            book_id: draft.book,
            imprint: draft.imprint,
            status,
            due_back: draft.due_back,
        }),
        _ => Checked::Invalid { draft, errors },
    }
}
