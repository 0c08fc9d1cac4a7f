//! Account domain types

use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Length of every account identifier issued by the provider
pub const ACCOUNT_ID_LEN: usize = 12;

/// Twelve-digit account identifier
///
/// Kept as a string so leading zeros survive serialization.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AccountId(String);

impl AccountId {
    /// Parses an identifier, rejecting anything that is not exactly twelve ASCII digits
    pub fn parse(raw: impl Into<String>) -> Result<Self, InvalidAccountId> {
        let raw = raw.into();
        if raw.len() == ACCOUNT_ID_LEN && raw.bytes().all(|b| b.is_ascii_digit()) {
            Ok(Self(raw))
        } else {
            Err(InvalidAccountId(raw))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for AccountId {
    type Error = InvalidAccountId;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        Self::parse(raw)
    }
}

impl From<AccountId> for String {
    fn from(id: AccountId) -> Self {
        id.0
    }
}

/// Rejected account identifier
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid account id `{0}`: expected exactly 12 digits")]
pub struct InvalidAccountId(pub String);

/// A `(key, value)` metadata pair attached to an account
///
/// Compared with exact string equality; no case folding or trimming.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub key: String,
    pub value: String,
}

impl Tag {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }

    pub fn matches(&self, key: &str, value: &str) -> bool {
        self.key == key && self.value == value
    }

    /// True iff any of `tags` equals `(key, value)` exactly
    pub fn any_matches(tags: &[Tag], key: &str, value: &str) -> bool {
        tags.iter().any(|tag| tag.matches(key, value))
    }
}

/// One account discovered in the organization
///
/// Field order here is the field order of the persisted state file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// Twelve-digit identifier of the account
    pub id: AccountId,

    /// When the account became part of the organization
    #[serde(with = "joined_at_format")]
    pub joined_at: DateTime<Utc>,

    /// Provider status string (e.g. `ACTIVE`, `SUSPENDED`), kept opaque
    pub status: String,

    /// Human readable alias, empty when unset or when discovery was denied
    #[serde(default)]
    pub alias: String,

    /// Tags in provider order, duplicates included
    #[serde(default)]
    pub tags: Vec<Tag>,
}

impl Account {
    /// Creates an account in its seeded state: no alias and no tags yet
    ///
    /// The join timestamp is truncated to millisecond precision, the
    /// precision of the persisted form.
    pub fn seed(id: AccountId, joined_at: DateTime<Utc>, status: impl Into<String>) -> Self {
        Self {
            id,
            joined_at: joined_at.trunc_subsecs(3),
            status: status.into(),
            alias: String::new(),
            tags: Vec::new(),
        }
    }

    /// True iff some tag equals `(key, value)` exactly
    pub fn has_tag_key_value(&self, key: &str, value: &str) -> bool {
        Tag::any_matches(&self.tags, key, value)
    }
}

/// RFC 3339 with millisecond precision and an explicit offset
mod joined_at_format {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_rfc3339_opts(SecondsFormat::Millis, false))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|parsed| parsed.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)
    }
}
