//! Logtime: turning location records into per-day and per-week durations
//!
//! Records are validated into [`Session`]s (malformed ones are dropped and
//! reported, never fatal), split on midnight and folded into a [`DayLog`].

use chrono::{DateTime, Utc};

use crate::error::MalformedSession;
use crate::models::{LocationRecord, Session};

pub mod day_log;
pub mod split;


pub use day_log::{aggregate, DayLog, WeekTotal};
pub use split::{split, DaySpan};

/// Records rejected while building sessions
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DropReport {
    pub accepted: usize,
    pub dropped: Vec<MalformedSession>,
}

impl DropReport {
    pub fn dropped_count(&self) -> usize {
        self.dropped.len()
    }

    pub fn has_drops(&self) -> bool {
        !self.dropped.is_empty()
    }

    pub fn merge(&mut self, other: DropReport) {
        self.accepted += other.accepted;
        self.dropped.extend(other.dropped);
    }
}

/// Validate raw records, keeping their order
///
/// Records that failed to decode, and open sessions whose begin lies after
/// `now`, are dropped as well.
pub fn collect_sessions(records: &[LocationRecord], now: DateTime<Utc>) -> (Vec<Session>, DropReport) {
    let mut sessions = Vec::with_capacity(records.len());
    let mut report = DropReport::default();

    for record in records {
        let checked = Session::try_from(record).and_then(|session| match session.end {
            None if session.begin >= now => Err(MalformedSession::EndNotAfterBegin {
                id: record.id(),
                begin: session.begin,
                end: now,
            }),
            _ => Ok(session),
        });

        match checked {
            Ok(session) => {
                report.accepted += 1;
                sessions.push(session);
            }
            Err(reason) => {
                tracing::warn!("Dropping location: {}", reason);
                report.dropped.push(reason);
            }
        }
    }

    (sessions, report)
}

/// Validate, split and aggregate location records in one pass
pub fn day_log_from_locations(records: &[LocationRecord], now: DateTime<Utc>) -> (DayLog, DropReport) {
    let (sessions, report) = collect_sessions(records, now);
    let log = aggregate(&sessions, now);

    tracing::debug!(
        days = log.len(),
        accepted = report.accepted,
        dropped = report.dropped_count(),
        "Aggregated logtime"
    );

    (log, report)
}
