//! Chunk document types for the index API.
//!
//! An [`IndexChunk`] is the enriched, indexable form of an item, sent
//! to the index API's `/chunk` endpoint. Field names follow that
//! API's wire contract. Optional ranking fields are omitted entirely
//! when not applicable, never sent as null.

use serde::{Deserialize, Serialize};

use crate::item::ItemType;

/// A ranking hint: a phrase for the index to weigh and a scaling factor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankingPhrase {
    pub phrase: String,
    pub boost_factor: f64,
}

/// Denormalized item fields carried alongside the indexed body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub by: Option<String>,
    /// Reply count, repaired to be at least `kids.len()`.
    pub descendants: u64,
    /// Id of the thread root for comments; -1 when unresolved.
    pub top_parent_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<u64>,
    pub id: u64,
    pub kids: Vec<u64>,
    pub score: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_title: Option<String>,
    #[serde(rename = "type")]
    pub item_type: ItemType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// The document uploaded to the index API.
///
/// `tracking_id` is the stable upsert key: re-uploading a chunk with
/// the same tracking id replaces the previous version instead of
/// creating a duplicate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexChunk {
    /// Derived indexable body; never empty.
    pub chunk_html: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    pub tracking_id: String,
    pub upsert_by_tracking_id: bool,
    /// `%Y-%m-%d %H:%M:%S` in UTC; omitted when the item has no
    /// usable timestamp.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_stamp: Option<String>,
    /// Numeric ranking signal, taken from the item's score.
    pub num_value: i64,
    pub tag_set: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub boost_phrase: Option<RankingPhrase>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance_phrase: Option<RankingPhrase>,
    pub metadata: ChunkMetadata,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_chunk() -> IndexChunk {
        IndexChunk {
            chunk_html: "A title \n\n".to_string(),
            link: None,
            tracking_id: "8863".to_string(),
            upsert_by_tracking_id: true,
            time_stamp: None,
            num_value: 111,
            tag_set: vec!["story".to_string()],
            boost_phrase: None,
            distance_phrase: None,
            metadata: ChunkMetadata {
                by: Some("pg".to_string()),
                descendants: 2,
                top_parent_id: -1,
                parent: None,
                id: 8863,
                kids: vec![],
                score: 111,
                time: None,
                title: Some("A title".to_string()),
                text: None,
                parent_title: None,
                item_type: ItemType::Story,
                url: None,
            },
        }
    }

    #[test]
    fn optional_fields_are_omitted_not_null() {
        let value = serde_json::to_value(sample_chunk()).unwrap();
        let object = value.as_object().unwrap();

        assert!(!object.contains_key("boost_phrase"));
        assert!(!object.contains_key("distance_phrase"));
        assert!(!object.contains_key("time_stamp"));
        assert!(!object.contains_key("link"));
        assert_eq!(object["upsert_by_tracking_id"], true);
    }

    #[test]
    fn metadata_serializes_wire_type_name() {
        let value = serde_json::to_value(sample_chunk()).unwrap();
        assert_eq!(value["metadata"]["type"], "story");
    }

    #[test]
    fn ranking_phrase_serializes_both_fields() {
        let mut chunk = sample_chunk();
        chunk.boost_phrase = Some(RankingPhrase {
            phrase: "A title".to_string(),
            boost_factor: 1.5,
        });

        let value = serde_json::to_value(chunk).unwrap();
        assert_eq!(value["boost_phrase"]["phrase"], "A title");
        assert_eq!(value["boost_phrase"]["boost_factor"], 1.5);
    }
}
