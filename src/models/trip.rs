//! Trip request and itinerary models

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Trip parameters supplied by the user for one submission
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TripRequest {
    /// Free-text destination, e.g. "Pune"
    pub destination: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    /// Number of travelers, at least 1
    pub party_size: u32,
    /// Free-text budget, e.g. "50,000 INR"
    pub budget: String,
}

/// Free-text travel plan returned by the language model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Itinerary(String);

impl Itinerary {
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Itinerary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
