//! Source API trait definition.
//!
//! Abstract interface over the read-only content API that the
//! pipeline mirrors. The concrete implementation talks to the Hacker
//! News Firebase API; tests substitute an in-memory source.

use async_trait::async_trait;

use crate::errors::SourceError;
use hn_indexer_shared::Item;

/// The listing endpoints the seeder enumerates on bootstrap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Listing {
    /// Recently changed items.
    Updates,
    AskStories,
    ShowStories,
    BestStories,
    TopStories,
    NewStories,
}

impl Listing {
    /// All listings, in seed order.
    pub const ALL: [Listing; 6] = [
        Listing::Updates,
        Listing::AskStories,
        Listing::ShowStories,
        Listing::BestStories,
        Listing::TopStories,
        Listing::NewStories,
    ];

    /// The endpoint path segment for this listing.
    pub fn endpoint(&self) -> &'static str {
        match self {
            Listing::Updates => "updates",
            Listing::AskStories => "askstories",
            Listing::ShowStories => "showstories",
            Listing::BestStories => "beststories",
            Listing::TopStories => "topstories",
            Listing::NewStories => "newstories",
        }
    }
}

/// Abstract interface for the source content API.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync`; the fetcher runs several
/// concurrent instances against one shared client.
#[async_trait]
pub trait SourceApi: Send + Sync {
    /// Fetch a single item by id.
    ///
    /// # Returns
    ///
    /// * `Ok(Some(item))` - The item exists
    /// * `Ok(None)` - The source returned null for this id
    /// * `Err(SourceError)` - The request or body parse failed
    async fn item(&self, id: u64) -> Result<Option<Item>, SourceError>;

    /// Fetch the current maximum item id.
    async fn max_item(&self) -> Result<u64, SourceError>;

    /// Fetch the item ids of a listing endpoint.
    async fn listing(&self, listing: Listing) -> Result<Vec<u64>, SourceError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn listing_endpoints_cover_all_variants() {
        let endpoints: Vec<&str> = Listing::ALL.iter().map(Listing::endpoint).collect();
        assert_eq!(
            endpoints,
            vec![
                "updates",
                "askstories",
                "showstories",
                "beststories",
                "topstories",
                "newstories"
            ]
        );
    }
}
