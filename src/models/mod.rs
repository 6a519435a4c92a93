//! Data models for the trip planner
//!
//! This module contains the core domain models organized by concern:
//! - Place: Place records, categories and the per-trip catalog
//! - Trip: Trip request parameters and the generated itinerary

pub mod place;
pub mod trip;

// Re-export all public types for convenient access
pub use place::{
    ADDRESS_NOT_AVAILABLE, Category, NO_ADDRESS, Place, PlaceCatalog, PlaceLinks, Rating,
};
pub use trip::{Itinerary, TripRequest};
