//! Places lookup
//!
//! Turns a destination and a category into exactly `top_n` [`Place`]s. Results
//! come from a [`PlaceSearch`] backend; positions the backend cannot fill are
//! padded with numbered placeholders.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, info, instrument, warn};

use crate::Result;
use crate::maps::maps_search_url;
use crate::models::{ADDRESS_NOT_AVAILABLE, Category, NO_ADDRESS, Place, Rating};

pub mod google;

pub use google::GooglePlacesClient;

/// A single raw text-search hit
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PlaceResult {
    pub name: String,
    pub formatted_address: Option<String>,
    pub rating: Option<f64>,
}

/// Free-text place search backend
#[async_trait]
pub trait PlaceSearch: Send + Sync {
    /// Run a text search and return hits in ranked order
    async fn text_search(&self, query: &str) -> Result<Vec<PlaceResult>>;
}

/// Looks up places per category and builds their map links
#[derive(Clone)]
pub struct PlaceLookup {
    search: Arc<dyn PlaceSearch>,
}

impl PlaceLookup {
    pub fn new(search: Arc<dyn PlaceSearch>) -> Self {
        Self { search }
    }

    /// Fetch exactly `top_n` places of `category` in `destination`.
    ///
    /// Search failures propagate; an empty result is not an error.
    #[instrument(skip(self))]
    pub async fn fetch(
        &self,
        destination: &str,
        category: Category,
        top_n: usize,
    ) -> Result<Vec<Place>> {
        let query = format!("{} in {}", category.search_term(), destination);
        let results = self.search.text_search(&query).await?;
        debug!("Search for '{}' returned {} results", query, results.len());

        let mut places: Vec<Place> = results
            .into_iter()
            .take(top_n)
            .map(Place::from)
            .collect();

        if places.len() < top_n {
            warn!(
                "Only {} of {} {} found in {}, padding with placeholders",
                places.len(),
                top_n,
                category,
                destination
            );
            let start = places.len() + 1;
            places.extend((start..=top_n).map(|n| placeholder(category, n, destination)));
        }

        info!("Resolved {} {} for {}", places.len(), category, destination);
        Ok(places)
    }
}

impl From<PlaceResult> for Place {
    fn from(result: PlaceResult) -> Self {
        let address = result
            .formatted_address
            .unwrap_or_else(|| NO_ADDRESS.to_string());
        let map_url = maps_search_url(&result.name, Some(&address));
        Place {
            name: result.name,
            address,
            rating: Rating::from(result.rating),
            map_url,
        }
    }
}

/// Placeholder for position `n` (1-based); its link searches by name and destination
#[must_use]
pub fn placeholder(category: Category, n: usize, destination: &str) -> Place {
    let name = format!("{} {}", category.search_term(), n);
    let map_url = maps_search_url(&name, Some(destination));
    Place {
        name,
        address: ADDRESS_NOT_AVAILABLE.to_string(),
        rating: Rating::NotAvailable,
        map_url,
    }
}
