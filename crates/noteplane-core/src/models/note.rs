//! Note domain model.
//!
//! Notes are transient request/response payloads on the client: the
//! engine never stores them, it only counts them.

use std::fmt;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::models::tenant::TenantId;
use crate::models::user::UserId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NoteId(pub i64);

impl fmt::Display for NoteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A note as listed by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub id: NoteId,
    pub title: String,
    #[serde(alias = "body", default)]
    pub content: String,
    #[serde(default)]
    pub owner: Option<UserId>,
    #[serde(default)]
    pub tenant_id: Option<TenantId>,
    #[serde(
        rename = "createdAt",
        alias = "created_at",
        default,
        deserialize_with = "lenient_timestamp"
    )]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(
        rename = "updatedAt",
        alias = "updated_at",
        default,
        deserialize_with = "lenient_timestamp"
    )]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(
        rename = "createdBy",
        alias = "created_by",
        default,
        deserialize_with = "string_or_number"
    )]
    pub created_by: Option<String>,
}

impl Note {
    pub fn is_owned_by(&self, user_id: UserId) -> bool {
        self.owner == Some(user_id)
    }
}

/// Create/update request body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteDraft {
    pub title: String,
    pub content: String,
    pub tenant_id: TenantId,
    pub owner: UserId,
}

/// Minimal acknowledgement returned by create and update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteAck {
    pub id: NoteId,
}

/// Result of a delete. Deleting an id that is already gone is not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    AlreadyAbsent,
}

fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.as_deref().and_then(parse_timestamp))
}

/// Parses RFC 3339, falling back to naive `YYYY-MM-DD[ T]HH:MM:SS[.f]`
/// interpreted as UTC. Unparseable values become `None`.
pub(crate) fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| naive.and_utc())
}

fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Author {
        Name(String),
        Id(i64),
    }

    Ok(Option::<Author>::deserialize(deserializer)?.map(|author| match author {
        Author::Name(name) => name,
        Author::Id(id) => id.to_string(),
    }))
}
