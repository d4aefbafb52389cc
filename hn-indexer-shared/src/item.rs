//! Source API item types.
//!
//! Mirrors the Hacker News Firebase API's item JSON. The same
//! serialization is used for queue payloads, so the struct must
//! round-trip through serde without loss.

use serde::{Deserialize, Serialize};

/// The kind of content an item holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemType {
    Story,
    Comment,
    Job,
    Poll,
    PollOpt,
}

impl ItemType {
    /// The wire/tag representation of this type.
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemType::Story => "story",
            ItemType::Comment => "comment",
            ItemType::Job => "job",
            ItemType::Poll => "poll",
            ItemType::PollOpt => "pollopt",
        }
    }
}

/// A raw item as returned by the source API.
///
/// Every field except `id` is optional on the wire; accessors provide
/// the defaults the pipeline works with (`score` 0, `descendants` 0,
/// empty `kids`).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Item {
    pub id: u64,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub item_type: Option<ItemType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub by: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub descendants: Option<u64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub kids: Vec<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dead: Option<bool>,
}

impl Item {
    /// Whether the source has marked this item deleted or dead.
    ///
    /// Tombstoned items must never pass the fetcher.
    pub fn is_tombstoned(&self) -> bool {
        self.deleted.unwrap_or(false) || self.dead.unwrap_or(false)
    }

    /// The item's score, defaulting to 0 when absent.
    pub fn score(&self) -> i64 {
        self.score.unwrap_or(0)
    }

    /// The item's reply count, defaulting to 0 when absent.
    pub fn descendants(&self) -> u64 {
        self.descendants.unwrap_or(0)
    }
}
