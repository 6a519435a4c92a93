//! Place records returned by the places lookup

use serde::{Deserialize, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;

/// Address shown when the places API omits `formatted_address`
pub const NO_ADDRESS: &str = "no address available";

/// Address of a synthesized placeholder place
pub const ADDRESS_NOT_AVAILABLE: &str = "not available";

/// The three dimensions along which place lookups are partitioned
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Hotels,
    Restaurants,
    Attractions,
}

impl Category {
    /// Lookup order used by the planner
    pub const ALL: [Category; 3] = [Category::Hotels, Category::Restaurants, Category::Attractions];

    /// Term used in the text-search query and in placeholder names
    #[must_use]
    pub fn search_term(self) -> &'static str {
        match self {
            Category::Hotels => "hotels",
            Category::Restaurants => "restaurants",
            Category::Attractions => "tourist attractions",
        }
    }

    /// Heading used in the outbound message
    #[must_use]
    pub fn title(self) -> &'static str {
        match self {
            Category::Hotels => "Hotels",
            Category::Restaurants => "Restaurants",
            Category::Attractions => "Attractions",
        }
    }

    /// Heading used on the result page
    #[must_use]
    pub fn page_heading(self) -> &'static str {
        match self {
            Category::Hotels => "🏨 Recommended Hotels",
            Category::Restaurants => "🍽️ Recommended Restaurants",
            Category::Attractions => "🌍 Must-See Attractions",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.search_term())
    }
}

/// Place rating, or `N/A` when the places API has none
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Rating {
    Score(f64),
    #[default]
    NotAvailable,
}

impl From<Option<f64>> for Rating {
    fn from(value: Option<f64>) -> Self {
        value.map_or(Rating::NotAvailable, Rating::Score)
    }
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rating::Score(score) => write!(f, "{score}"),
            Rating::NotAvailable => f.write_str("N/A"),
        }
    }
}

impl Serialize for Rating {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Rating::Score(score) => serializer.serialize_f64(*score),
            Rating::NotAvailable => serializer.serialize_str("N/A"),
        }
    }
}

/// A single hotel, restaurant or attraction
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Place {
    pub name: String,
    pub address: String,
    pub rating: Rating,
    pub map_url: String,
}

impl Place {
    /// Markdown list entry used in the outbound message
    #[must_use]
    pub fn to_markdown_item(&self) -> String {
        format!(
            "- **{}** (⭐ {}) [Google Maps]({})\n  - {}\n",
            self.name, self.rating, self.map_url, self.address
        )
    }
}

/// Category → place name → maps URL, embedded in the itinerary prompt
pub type PlaceLinks = BTreeMap<Category, BTreeMap<String, String>>;

/// Places found for one trip, per category
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PlaceCatalog {
    pub hotels: Vec<Place>,
    pub restaurants: Vec<Place>,
    pub attractions: Vec<Place>,
}

impl PlaceCatalog {
    #[must_use]
    pub fn get(&self, category: Category) -> &[Place] {
        match category {
            Category::Hotels => &self.hotels,
            Category::Restaurants => &self.restaurants,
            Category::Attractions => &self.attractions,
        }
    }

    pub fn set(&mut self, category: Category, places: Vec<Place>) {
        match category {
            Category::Hotels => self.hotels = places,
            Category::Restaurants => self.restaurants = places,
            Category::Attractions => self.attractions = places,
        }
    }

    /// Categories in lookup order with their places
    pub fn iter(&self) -> impl Iterator<Item = (Category, &[Place])> {
        Category::ALL.into_iter().map(|category| (category, self.get(category)))
    }

    /// Name → URL mapping per category. Duplicate names keep the last URL.
    #[must_use]
    pub fn links(&self) -> PlaceLinks {
        self.iter()
            .map(|(category, places)| {
                let links = places
                    .iter()
                    .map(|p| (p.name.clone(), p.map_url.clone()))
                    .collect();
                (category, links)
            })
            .collect()
    }

    /// Markdown section for one category, as sent in the outbound message
    #[must_use]
    pub fn format_section(&self, category: Category) -> String {
        let mut formatted = format!("### {}\n", category.title());
        for place in self.get(category) {
            formatted.push_str(&place.to_markdown_item());
        }
        formatted
    }
}
