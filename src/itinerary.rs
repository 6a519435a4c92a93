//! Itinerary composition
//!
//! Renders the trip parameters and the place-link mapping into a single
//! instruction and passes it to the language model. The response is returned
//! as-is; its structure is never checked.

use std::sync::Arc;

use tracing::{info, instrument};

use crate::llm::CompletionModel;
use crate::models::{Itinerary, PlaceLinks, TripRequest};
use crate::{Result, TripPlannerError};

/// Builds the itinerary prompt and runs it through the model
#[derive(Clone)]
pub struct ItineraryComposer {
    model: Arc<dyn CompletionModel>,
}

impl ItineraryComposer {
    pub fn new(model: Arc<dyn CompletionModel>) -> Self {
        Self { model }
    }

    /// Generate a day-by-day itinerary. Model errors are fatal.
    #[instrument(skip(self, request, place_links), fields(destination = %request.destination))]
    pub async fn compose(&self, request: &TripRequest, place_links: &PlaceLinks) -> Result<Itinerary> {
        let prompt = build_prompt(request, place_links)?;
        let text = self.model.complete(&prompt).await?;
        info!("Itinerary generated ({} chars)", text.len());
        Ok(Itinerary::new(text))
    }
}

/// Render the itinerary instruction
pub fn build_prompt(request: &TripRequest, place_links: &PlaceLinks) -> Result<String> {
    let links = serde_json::to_string(place_links)
        .map_err(|e| TripPlannerError::general(format!("Failed to encode place links: {e}")))?;

    Ok(format!(
        "Create a detailed travel itinerary for {party} people visiting {destination}
from {start} to {end} with a budget of {budget}.
Include:
- Day-wise breakdown with times
- Top attractions with short descriptions
- Suggested restaurants nearby (breakfast, lunch, dinner)
- Hotel recommendations
- For every hotel/restaurant/attraction, ADD its Google Maps link after name (use this format: [Google Maps](url)), using info from: {links}
",
        party = request.party_size,
        destination = request.destination,
        start = request.start_date,
        end = request.end_date,
        budget = request.budget,
    ))
}
