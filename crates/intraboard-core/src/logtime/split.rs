//! Splitting sessions on midnight boundaries (UTC)

use crate::models::Session;
use chrono::{DateTime, Duration, NaiveDate, Utc};

/// Part of a session confined to one calendar day
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DaySpan {
    pub date: NaiveDate,
    pub duration: Duration,
}

impl DaySpan {
    pub fn new(date: NaiveDate, duration: Duration) -> Self {
        Self { date, duration }
    }
}

/// Split `session` into one span per calendar day it touches
///
/// Open sessions end at `now`. A session that does not end after it begins
/// yields nothing. Spans are in chronological order and sum exactly to the
/// session's duration; days strictly between begin and end count 24h each.
pub fn split(session: &Session, now: DateTime<Utc>) -> Vec<DaySpan> {
    let end = session.end_or(now);
    let mut cursor = session.begin;
    let mut spans = Vec::new();

    if end <= cursor {
        return spans;
    }

    while cursor.date_naive() < end.date_naive() {
        let Some(midnight) = cursor.date_naive().succ_opt().and_then(start_of_day) else {
            break;
        };
        spans.push(DaySpan::new(cursor.date_naive(), midnight - cursor));
        cursor = midnight;
    }

    // Sessions ending exactly at midnight leave no trailing span
    if end > cursor {
        spans.push(DaySpan::new(cursor.date_naive(), end - cursor));
    }

    spans
}

fn start_of_day(date: NaiveDate) -> Option<DateTime<Utc>> {
    date.and_hms_opt(0, 0, 0).map(|midnight| midnight.and_utc())
}
