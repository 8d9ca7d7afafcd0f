//! Per-day logtime accumulation and week totals

use super::split::{split, DaySpan};
use crate::error::EmptyLog;
use crate::models::Session;
use chrono::{DateTime, Datelike, Days, Duration, NaiveDate, Utc};
use std::collections::BTreeMap;

/// Cumulative logtime per calendar day (UTC)
///
/// Also remembers the date of the first span recorded. Locations are fetched
/// most recent first, so that anchor is the day of the latest session and
/// [`DayLog::week_total`] sums the week it belongs to.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DayLog {
    days: BTreeMap<NaiveDate, Duration>,
    anchor: Option<NaiveDate>,
}

/// Logtime summed from the Monday of the anchor's ISO week onwards
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeekTotal {
    pub week_start: NaiveDate,
    pub total: Duration,
}

impl DayLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a span, summing with any existing entry for the same date
    pub fn record(&mut self, span: DaySpan) {
        self.anchor.get_or_insert(span.date);
        let entry = self.days.entry(span.date).or_insert_with(Duration::zero);
        *entry += span.duration;
    }

    pub fn get(&self, date: NaiveDate) -> Option<Duration> {
        self.days.get(&date).copied()
    }

    /// Entries in chronological order
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = (NaiveDate, Duration)> + '_ {
        self.days.iter().map(|(date, duration)| (*date, *duration))
    }

    pub fn len(&self) -> usize {
        self.days.len()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    /// Date of the first span recorded
    pub fn anchor(&self) -> Option<NaiveDate> {
        self.anchor
    }

    /// Sum over every day
    pub fn total(&self) -> Duration {
        self.days.values().fold(Duration::zero(), |acc, d| acc + *d)
    }

    /// Week total anchored on the first recorded date
    ///
    /// An empty log is an explicit [`EmptyLog`], never a zero duration.
    pub fn week_total(&self) -> Result<WeekTotal, EmptyLog> {
        self.anchor
            .map(|anchor| self.week_total_from(anchor))
            .ok_or(EmptyLog)
    }

    /// Sum of every entry on or after the Monday of `anchor`'s ISO week
    pub fn week_total_from(&self, anchor: NaiveDate) -> WeekTotal {
        let week_start = monday_of(anchor);
        let total = self
            .days
            .range(week_start..)
            .fold(Duration::zero(), |acc, (_, d)| acc + *d);

        WeekTotal { week_start, total }
    }
}

impl Extend<DaySpan> for DayLog {
    fn extend<I: IntoIterator<Item = DaySpan>>(&mut self, spans: I) {
        for span in spans {
            self.record(span);
        }
    }
}

/// Fold every session into a [`DayLog`]
///
/// Sessions that do not end after they begin contribute nothing.
pub fn aggregate<'a, I>(sessions: I, now: DateTime<Utc>) -> DayLog
where
    I: IntoIterator<Item = &'a Session>,
{
    let mut log = DayLog::new();
    for session in sessions {
        log.extend(split(session, now));
    }
    log
}

fn monday_of(date: NaiveDate) -> NaiveDate {
    let offset = u64::from(date.weekday().num_days_from_monday());
    date.checked_sub_days(Days::new(offset)).unwrap_or(date)
}
