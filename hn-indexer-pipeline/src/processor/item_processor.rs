//! Item processor implementation.
//!
//! Turns a raw [`Item`] into an [`IndexChunk`]: structural filtering,
//! body derivation, ancestor resolution for comments, relevance
//! signals, tag derivation, and metadata packaging.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::debug;
use url::Url;

use hn_indexer_repository::SourceApi;
use hn_indexer_shared::{ChunkMetadata, IndexChunk, Item, ItemType, RankingPhrase};

/// Hard cap on the ancestor walk. Real threads are far shallower;
/// the cap guards against cyclic or pathological parent chains.
const MAX_ANCESTOR_STEPS: usize = 64;

/// Title prefixes that contribute convention tags.
const SHOW_PREFIX: &str = "Show HN:";
const ASK_PREFIX: &str = "Ask HN:";

/// Code-hosting domain that also contributes an owner-level tag.
const CODE_HOST_DOMAIN: &str = "github.com";

/// Paragraph break appended after each body segment.
const PARAGRAPH_BREAK: &str = " \n\n";

/// Configuration for the relevance signals.
#[derive(Debug, Clone)]
pub struct ProcessorConfig {
    /// Boost factor attached to story titles.
    pub story_boost_factor: f64,
    /// Distance factor attached to a comment's resolved thread title.
    pub comment_distance_factor: f64,
}

impl Default for ProcessorConfig {
    fn default() -> Self {
        Self {
            story_boost_factor: 1.5,
            comment_distance_factor: 1.3,
        }
    }
}

/// Outcome of walking a comment's parent chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AncestorResolution {
    /// The walk reached an item with no parent.
    Resolved {
        top_parent_id: u64,
        parent_title: Option<String>,
    },
    /// The step cap was exhausted before reaching a root.
    Partial,
    /// A parent fetch failed or returned null; resolution aborted.
    Failed,
}

/// Processor that transforms raw items into index chunks.
///
/// Holds its own source API handle because ancestor resolution always
/// re-fetches ancestors live; queue ordering gives no guarantee that a
/// parent was ever fetched before its children.
pub struct ItemProcessor {
    source: Arc<dyn SourceApi>,
    config: ProcessorConfig,
}

impl ItemProcessor {
    /// Create a new processor with default relevance factors.
    pub fn new(source: Arc<dyn SourceApi>) -> Self {
        Self {
            source,
            config: ProcessorConfig::default(),
        }
    }

    /// Create a new processor with custom relevance factors.
    pub fn with_config(source: Arc<dyn SourceApi>, config: ProcessorConfig) -> Self {
        Self { source, config }
    }

    /// Transform one item into a chunk.
    ///
    /// Returns `None` for items that must not be indexed: poll
    /// options, items without a type, and items with neither title
    /// nor text after cleaning.
    pub async fn process(&self, item: &Item) -> Option<IndexChunk> {
        let item_type = item.item_type?;
        if item_type == ItemType::PollOpt {
            return None;
        }

        let title = item
            .title
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string);
        let text = item
            .text
            .as_deref()
            .map(clean_text)
            .filter(|t| !t.is_empty());

        if title.is_none() && text.is_none() {
            debug!(id = item.id, "Skipping item with no title or text");
            return None;
        }

        // Body policy: title and text concatenated, each as its own
        // paragraph.
        let mut body = String::new();
        if let Some(title) = &title {
            body.push_str(title);
            body.push_str(PARAGRAPH_BREAK);
        }
        if let Some(text) = &text {
            body.push_str(text);
            body.push_str(PARAGRAPH_BREAK);
        }

        let mut top_parent_id: i64 = -1;
        let mut parent_title: Option<String> = None;
        if item_type == ItemType::Comment {
            match self.resolve_ancestor(item).await {
                AncestorResolution::Resolved {
                    top_parent_id: root_id,
                    parent_title: root_title,
                } => {
                    top_parent_id = root_id as i64;
                    parent_title = root_title;
                }
                AncestorResolution::Partial => {
                    debug!(id = item.id, "Ancestor walk hit step cap")
                }
                AncestorResolution::Failed => {
                    debug!(id = item.id, "Ancestor walk aborted")
                }
            }
        }

        let boost_phrase = if item_type == ItemType::Story {
            title.clone().map(|phrase| RankingPhrase {
                phrase,
                boost_factor: self.config.story_boost_factor,
            })
        } else {
            None
        };
        let distance_phrase = parent_title.clone().map(|phrase| RankingPhrase {
            phrase,
            boost_factor: self.config.comment_distance_factor,
        });

        let tag_set = derive_tags(item_type, item.by.as_deref(), title.as_deref(), item.url.as_deref());

        let metadata = ChunkMetadata {
            by: item.by.clone(),
            descendants: item.descendants().max(item.kids.len() as u64),
            top_parent_id,
            parent: item.parent,
            id: item.id,
            kids: item.kids.clone(),
            score: item.score(),
            time: item.time,
            title: title.clone(),
            text: text.clone(),
            parent_title,
            item_type,
            url: item.url.clone(),
        };

        Some(IndexChunk {
            chunk_html: body,
            link: item.url.clone(),
            tracking_id: item.id.to_string(),
            upsert_by_tracking_id: true,
            time_stamp: format_timestamp(item.time),
            num_value: item.score(),
            tag_set,
            boost_phrase,
            distance_phrase,
            metadata,
        })
    }

    /// Walk the parent chain up to the thread root.
    ///
    /// Iterative with a hard step cap; a failed or null parent fetch
    /// aborts the walk. An item with no parent is its own root.
    pub async fn resolve_ancestor(&self, item: &Item) -> AncestorResolution {
        let Some(mut next_id) = item.parent else {
            return AncestorResolution::Resolved {
                top_parent_id: item.id,
                parent_title: item.title.clone(),
            };
        };

        for _ in 0..MAX_ANCESTOR_STEPS {
            let parent = match self.source.item(next_id).await {
                Ok(Some(parent)) => parent,
                Ok(None) | Err(_) => return AncestorResolution::Failed,
            };

            match parent.parent {
                // An item pointing at itself would never terminate.
                Some(grandparent) if grandparent != parent.id => next_id = grandparent,
                _ => {
                    return AncestorResolution::Resolved {
                        top_parent_id: parent.id,
                        parent_title: parent.title,
                    }
                }
            }
        }

        AncestorResolution::Partial
    }
}

/// Trim and flatten raw text: surrounding whitespace removed,
/// internal newlines collapsed to spaces.
fn clean_text(raw: &str) -> String {
    raw.trim().replace('\n', " ").replace('\r', " ")
}

/// Derive the chunk's tag set: type and author, title-prefix
/// conventions, and URL host (with an extra owner tag for the known
/// code-hosting domain).
fn derive_tags(
    item_type: ItemType,
    by: Option<&str>,
    title: Option<&str>,
    url: Option<&str>,
) -> Vec<String> {
    let mut tags = vec![item_type.as_str().to_string()];

    if let Some(by) = by {
        tags.push(by.to_string());
    }

    if let Some(title) = title {
        if title.starts_with(SHOW_PREFIX) {
            tags.push("show".to_string());
        }
        if title.starts_with(ASK_PREFIX) {
            tags.push("ask".to_string());
        }
    }

    if let Some(raw_url) = url {
        if let Ok(parsed) = Url::parse(raw_url) {
            if let Some(host) = parsed.host_str() {
                if host == CODE_HOST_DOMAIN {
                    let owner = parsed
                        .path_segments()
                        .and_then(|mut segments| segments.next())
                        .filter(|segment| !segment.is_empty());
                    if let Some(owner) = owner {
                        tags.push(format!("{}/{}", host, owner));
                    }
                }
                tags.push(host.to_string());
            }
        }
    }

    tags
}

/// Format a Unix timestamp as `%Y-%m-%d %H:%M:%S` UTC.
///
/// Absent or unrepresentable timestamps yield `None`; the chunk then
/// carries no timestamp at all.
fn format_timestamp(time: Option<i64>) -> Option<String> {
    let secs = time?;
    let stamp = DateTime::<Utc>::from_timestamp(secs, 0)?;
    Some(stamp.format("%Y-%m-%d %H:%M:%S").to_string())
}
