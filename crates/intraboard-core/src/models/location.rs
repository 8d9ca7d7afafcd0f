//! Location (on-campus session) records
//!
//! The API shape is kept loose in [`RawLocation`]; [`Session`] is the
//! validated form consumed by the logtime splitter.

use crate::error::MalformedSession;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Entry of `/v2/users/{login}/locations`, as sent by the server
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawLocation {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub begin_at: Option<String>,
    /// `null` while the user is still logged in
    #[serde(default)]
    pub end_at: Option<String>,
    #[serde(default)]
    pub host: Option<String>,
}

/// One element of a locations page
///
/// Elements are decoded one by one, so a single element with the wrong shape
/// (a number where a timestamp string belongs, a non-object entry) ends up as
/// [`LocationRecord::Invalid`] instead of failing the whole page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocationRecord {
    Parsed(RawLocation),
    Invalid(MalformedSession),
}

impl LocationRecord {
    pub fn id(&self) -> Option<u64> {
        match self {
            Self::Parsed(raw) => raw.id,
            Self::Invalid(MalformedSession::InvalidRecord { id, .. }) => *id,
            Self::Invalid(_) => None,
        }
    }

    pub fn from_value(value: Value) -> Self {
        let id = value.get("id").and_then(Value::as_u64);
        match serde_json::from_value::<RawLocation>(value) {
            Ok(raw) => Self::Parsed(raw),
            Err(e) => Self::Invalid(MalformedSession::InvalidRecord {
                id,
                reason: e.to_string(),
            }),
        }
    }
}

impl<'de> Deserialize<'de> for LocationRecord {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Value::deserialize(deserializer).map(Self::from_value)
    }
}

impl From<RawLocation> for LocationRecord {
    fn from(raw: RawLocation) -> Self {
        Self::Parsed(raw)
    }
}

/// Validated on-campus session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub begin: DateTime<Utc>,
    /// `None` means still open
    pub end: Option<DateTime<Utc>>,
}

impl Session {
    pub fn new(begin: DateTime<Utc>, end: Option<DateTime<Utc>>) -> Self {
        Self { begin, end }
    }

    pub fn closed(begin: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self::new(begin, Some(end))
    }

    pub fn open(begin: DateTime<Utc>) -> Self {
        Self::new(begin, None)
    }

    pub fn is_open(&self) -> bool {
        self.end.is_none()
    }

    /// End of the session, open sessions end at `now`
    pub fn end_or(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        self.end.unwrap_or(now)
    }

    /// Length of the session, `None` when it does not end after it begins
    pub fn duration(&self, now: DateTime<Utc>) -> Option<chrono::Duration> {
        let end = self.end_or(now);
        (end > self.begin).then(|| end - self.begin)
    }
}

impl TryFrom<&RawLocation> for Session {
    type Error = MalformedSession;

    fn try_from(raw: &RawLocation) -> Result<Self, Self::Error> {
        let begin_at = raw
            .begin_at
            .as_deref()
            .ok_or(MalformedSession::MissingBegin { id: raw.id })?;
        let begin = parse_timestamp(raw.id, "begin_at", begin_at)?;

        let end = match raw.end_at.as_deref() {
            Some(value) => Some(parse_timestamp(raw.id, "end_at", value)?),
            None => None,
        };

        if let Some(end) = end {
            if end <= begin {
                return Err(MalformedSession::EndNotAfterBegin {
                    id: raw.id,
                    begin,
                    end,
                });
            }
        }

        Ok(Session { begin, end })
    }
}

impl TryFrom<&LocationRecord> for Session {
    type Error = MalformedSession;

    fn try_from(record: &LocationRecord) -> Result<Self, Self::Error> {
        match record {
            LocationRecord::Parsed(raw) => Session::try_from(raw),
            LocationRecord::Invalid(reason) => Err(reason.clone()),
        }
    }
}

fn parse_timestamp(
    id: Option<u64>,
    field: &'static str,
    value: &str,
) -> Result<DateTime<Utc>, MalformedSession> {
    DateTime::parse_from_rfc3339(value)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|_| MalformedSession::InvalidTimestamp {
            id,
            field,
            value: value.to_string(),
        })
}
