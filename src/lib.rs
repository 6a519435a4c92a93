//! `TripPlanner` - AI travel planning with place lookups and WhatsApp delivery
//!
//! This library looks up hotels, restaurants and attractions for a
//! destination, asks a language model for a day-by-day itinerary that links
//! to them, and forwards the plan over WhatsApp.

pub mod cli;
pub mod config;
pub mod error;
pub mod itinerary;
pub mod llm;
pub mod maps;
pub mod messaging;
pub mod models;
pub mod places;
pub mod planner;
pub mod web;

// Re-export core types for public API
pub use config::TripPlannerConfig;
pub use error::TripPlannerError;
pub use itinerary::ItineraryComposer;
pub use llm::{ChatCompletionsClient, CompletionModel};
pub use maps::maps_search_url;
pub use messaging::{DispatchStatus, MessageDispatcher, MessageTransport, TwilioWhatsAppClient};
pub use models::{Category, Itinerary, Place, PlaceCatalog, PlaceLinks, Rating, TripRequest};
pub use places::{GooglePlacesClient, PlaceLookup, PlaceResult, PlaceSearch};
pub use planner::{PlannerState, TripForm, TripPlan, TripPlanner};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, TripPlannerError>;
