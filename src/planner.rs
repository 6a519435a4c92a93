//! Trip planning pipeline
//!
//! One submission runs the three place lookups, the itinerary completion and
//! the message dispatch strictly in sequence. Submissions are serialized, and
//! the planner reports whether it is idle or generating.

use std::sync::{Arc, Mutex, PoisonError};

use chrono::{Days, Local, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use crate::config::TripPlannerConfig;
use crate::itinerary::ItineraryComposer;
use crate::llm::ChatCompletionsClient;
use crate::messaging::{DispatchStatus, MessageDispatcher, TwilioWhatsAppClient};
use crate::models::{Category, Itinerary, PlaceCatalog, TripRequest};
use crate::places::{GooglePlacesClient, PlaceLookup};
use crate::{Result, TripPlannerError};

pub const MISSING_DESTINATION: &str = "Please enter a destination.";

/// Whether a submission is in flight
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PlannerState {
    Idle,
    Generating,
}

/// Result of one successful pipeline run
#[derive(Debug, Clone, Serialize)]
pub struct TripPlan {
    pub request: TripRequest,
    pub catalog: PlaceCatalog,
    pub itinerary: Itinerary,
    pub dispatch: DispatchStatus,
}

/// Raw trip form fields as submitted by the browser
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TripForm {
    pub destination: String,
    pub start_date: String,
    pub end_date: String,
    pub party_size: String,
    pub budget: String,
}

impl TripForm {
    /// Form prefilled with the widget defaults: today, tomorrow, two travelers
    #[must_use]
    pub fn with_defaults(today: NaiveDate) -> Self {
        let tomorrow = today.checked_add_days(Days::new(1)).unwrap_or(today);
        Self {
            destination: String::new(),
            start_date: today.to_string(),
            end_date: tomorrow.to_string(),
            party_size: "2".to_string(),
            budget: String::new(),
        }
    }

    /// Parse the form. Blank dates fall back to today and tomorrow.
    pub fn into_request(self, today: NaiveDate) -> Result<TripRequest> {
        let destination = self.destination.trim().to_string();
        if destination.is_empty() {
            return Err(TripPlannerError::validation(MISSING_DESTINATION));
        }

        let start_date = parse_date(&self.start_date, "start date")?.unwrap_or(today);
        let end_date = match parse_date(&self.end_date, "end date")? {
            Some(date) => date,
            None => today.checked_add_days(Days::new(1)).unwrap_or(today),
        };

        let party_size = match self.party_size.trim() {
            "" => 2,
            raw => raw.parse::<u32>().map_err(|_| {
                TripPlannerError::validation(format!(
                    "Number of travelers must be a whole number, got '{raw}'."
                ))
            })?,
        };

        let request = TripRequest {
            destination,
            start_date,
            end_date,
            party_size,
            budget: self.budget.trim().to_string(),
        };
        validate_request(&request)?;
        Ok(request)
    }
}

impl From<&TripRequest> for TripForm {
    fn from(request: &TripRequest) -> Self {
        Self {
            destination: request.destination.clone(),
            start_date: request.start_date.to_string(),
            end_date: request.end_date.to_string(),
            party_size: request.party_size.to_string(),
            budget: request.budget.clone(),
        }
    }
}

fn parse_date(raw: &str, field: &str) -> Result<Option<NaiveDate>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map(Some)
        .map_err(|_| TripPlannerError::validation(format!("Invalid {field} '{raw}'.")))
}

/// Checks applied to every submission before any network call
pub fn validate_request(request: &TripRequest) -> Result<()> {
    if request.destination.trim().is_empty() {
        return Err(TripPlannerError::validation(MISSING_DESTINATION));
    }
    if request.party_size < 1 {
        return Err(TripPlannerError::validation(
            "Number of travelers must be at least 1.",
        ));
    }
    Ok(())
}

/// Text forwarded to the traveler: itinerary followed by the three place lists
#[must_use]
pub fn outbound_message(destination: &str, itinerary: &Itinerary, catalog: &PlaceCatalog) -> String {
    let mut message = format!("Your AI Travel Plan for {destination}:\n\n{itinerary}\n\n");
    let sections: Vec<String> = Category::ALL
        .into_iter()
        .map(|category| catalog.format_section(category))
        .collect();
    message.push_str(&sections.join("\n"));
    message
}

/// Orchestrates lookups, composition and dispatch for each submission
pub struct TripPlanner {
    places: PlaceLookup,
    composer: ItineraryComposer,
    dispatcher: MessageDispatcher,
    top_n: usize,
    state: Mutex<PlannerState>,
    turn: tokio::sync::Mutex<()>,
}

impl TripPlanner {
    pub fn new(
        places: PlaceLookup,
        composer: ItineraryComposer,
        dispatcher: MessageDispatcher,
        top_n: usize,
    ) -> Self {
        Self {
            places,
            composer,
            dispatcher,
            top_n,
            state: Mutex::new(PlannerState::Idle),
            turn: tokio::sync::Mutex::new(()),
        }
    }

    /// Build the planner with the Google Places, chat completions and Twilio clients
    pub fn from_config(config: &TripPlannerConfig) -> Result<Self> {
        let places = PlaceLookup::new(Arc::new(GooglePlacesClient::new(&config.places)?));
        let model = ChatCompletionsClient::new(&config.llm)?;
        info!("Using language model {}", model.model());
        let composer = ItineraryComposer::new(Arc::new(model));
        let dispatcher = MessageDispatcher::new(
            Arc::new(TwilioWhatsAppClient::new(&config.messaging)?),
            config.messaging.max_chunk_chars,
        );
        Ok(Self::new(places, composer, dispatcher, config.places.top_n))
    }

    #[must_use]
    pub fn state(&self) -> PlannerState {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn set_state(&self, state: PlannerState) {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner) = state;
    }

    /// Run one submission.
    ///
    /// Validation errors return before any network call and leave the planner
    /// idle. Place and model failures are fatal; dispatch failures are
    /// reported inside the returned plan.
    #[instrument(skip(self, request), fields(destination = %request.destination))]
    pub async fn submit(&self, request: TripRequest) -> Result<TripPlan> {
        validate_request(&request)?;

        let _turn = self.turn.lock().await;
        let _generating = GeneratingGuard::enter(self);
        info!("Generating travel plan");

        let result = self.generate(request).await;
        if let Err(e) = &result {
            warn!("Travel plan generation failed: {}", e);
        }
        result
    }

    async fn generate(&self, request: TripRequest) -> Result<TripPlan> {
        let mut catalog = PlaceCatalog::default();
        for category in Category::ALL {
            let places = self
                .places
                .fetch(&request.destination, category, self.top_n)
                .await?;
            catalog.set(category, places);
        }

        let itinerary = self.composer.compose(&request, &catalog.links()).await?;

        let message = outbound_message(&request.destination, &itinerary, &catalog);
        let dispatch = self.dispatcher.send(&message).await;

        Ok(TripPlan {
            request,
            catalog,
            itinerary,
            dispatch,
        })
    }
}

/// Holds the planner in `Generating` and returns it to `Idle` on drop, even
/// when the submission future is cancelled.
struct GeneratingGuard<'a> {
    planner: &'a TripPlanner,
}

impl<'a> GeneratingGuard<'a> {
    fn enter(planner: &'a TripPlanner) -> Self {
        planner.set_state(PlannerState::Generating);
        Self { planner }
    }
}

impl Drop for GeneratingGuard<'_> {
    fn drop(&mut self) {
        self.planner.set_state(PlannerState::Idle);
    }
}

/// Today's date in the server's local time zone
#[must_use]
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use crate::itinerary::testing::FakeModel;
    use crate::messaging::testing::FakeTransport;
    use crate::places::testing::FakeSearch;

    pub struct Fixture {
        pub search: Arc<FakeSearch>,
        pub model: Arc<FakeModel>,
        pub transport: Arc<FakeTransport>,
        pub planner: Arc<TripPlanner>,
    }

    pub fn fixture(search: FakeSearch, model: FakeModel, transport: FakeTransport) -> Fixture {
        let search = Arc::new(search);
        let model = Arc::new(model);
        let transport = Arc::new(transport);
        let planner = Arc::new(TripPlanner::new(
            PlaceLookup::new(search.clone()),
            ItineraryComposer::new(model.clone()),
            MessageDispatcher::new(transport.clone(), 10_000),
            5,
        ));
        Fixture {
            search,
            model,
            transport,
            planner,
        }
    }

    pub fn pune_trip() -> TripRequest {
        TripRequest {
            destination: "Pune".to_string(),
            start_date: NaiveDate::from_ymd_opt(2026, 11, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2026, 11, 3).unwrap(),
            party_size: 2,
            budget: "50,000 INR".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::{fixture, pune_trip};
    use super::*;
    use crate::itinerary::testing::FakeModel;
    use crate::messaging::testing::FakeTransport;
    use crate::places::testing::FakeSearch;
    use async_trait::async_trait;
    use tokio::sync::Notify;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[tokio::test]
    async fn test_full_pipeline() {
        let f = fixture(
            FakeSearch::with_results(7),
            FakeModel::replying("Day 1: explore"),
            FakeTransport::default(),
        );

        let plan = f.planner.submit(pune_trip()).await.unwrap();

        assert_eq!(
            f.search.queries(),
            [
                "hotels in Pune",
                "restaurants in Pune",
                "tourist attractions in Pune"
            ]
        );
        assert_eq!(plan.catalog.hotels.len(), 5);
        assert_eq!(plan.catalog.attractions.len(), 5);
        assert_eq!(plan.itinerary.as_str(), "Day 1: explore");
        assert!(f.model.prompts()[0].contains(&plan.catalog.hotels[0].map_url));
        assert_eq!(plan.dispatch, DispatchStatus::Sent { chunks: 1 });

        let sent = f.transport.attempts();
        assert!(sent[0].starts_with("Your AI Travel Plan for Pune:\n\nDay 1: explore\n\n### Hotels\n"));
        assert!(sent[0].contains("\n### Restaurants\n"));
        assert!(sent[0].contains("\n### Attractions\n"));
        assert_eq!(f.planner.state(), PlannerState::Idle);
    }

    #[tokio::test]
    async fn test_empty_destination_stays_idle_without_network() {
        let f = fixture(
            FakeSearch::default(),
            FakeModel::default(),
            FakeTransport::default(),
        );
        let request = TripRequest {
            destination: "   ".to_string(),
            ..pune_trip()
        };

        let err = f.planner.submit(request).await.unwrap_err();

        assert_eq!(err.user_message(), MISSING_DESTINATION);
        assert!(f.search.queries().is_empty());
        assert!(f.model.prompts().is_empty());
        assert!(f.transport.attempts().is_empty());
        assert_eq!(f.planner.state(), PlannerState::Idle);
    }

    #[tokio::test]
    async fn test_places_failure_aborts_pipeline() {
        let f = fixture(
            FakeSearch::failing("Places API request failed with status: 500"),
            FakeModel::default(),
            FakeTransport::default(),
        );

        let err = f.planner.submit(pune_trip()).await.unwrap_err();

        assert!(matches!(err, TripPlannerError::Api { .. }));
        assert_eq!(f.search.queries().len(), 1);
        assert!(f.model.prompts().is_empty());
        assert!(f.transport.attempts().is_empty());
        assert_eq!(f.planner.state(), PlannerState::Idle);
    }

    #[tokio::test]
    async fn test_model_failure_skips_dispatch() {
        let f = fixture(
            FakeSearch::with_results(5),
            FakeModel::failing("timed out"),
            FakeTransport::default(),
        );

        assert!(f.planner.submit(pune_trip()).await.is_err());
        assert!(f.transport.attempts().is_empty());
        assert_eq!(f.planner.state(), PlannerState::Idle);
    }

    #[tokio::test]
    async fn test_dispatch_failure_keeps_plan() {
        let f = fixture(
            FakeSearch::with_results(5),
            FakeModel::replying("Day 1"),
            FakeTransport::failing_on(&[(1, "63007 unknown channel")]),
        );

        let plan = f.planner.submit(pune_trip()).await.unwrap();

        assert_eq!(plan.itinerary.as_str(), "Day 1");
        assert_eq!(plan.dispatch.error(), Some("63007 unknown channel"));
    }

    struct GatedModel {
        release: Notify,
    }

    #[async_trait]
    impl crate::llm::CompletionModel for GatedModel {
        async fn complete(&self, _prompt: &str) -> Result<String> {
            self.release.notified().await;
            Ok("Day 1".to_string())
        }
    }

    #[tokio::test]
    async fn test_state_is_generating_while_in_flight() {
        let model = Arc::new(GatedModel {
            release: Notify::new(),
        });
        let planner = Arc::new(TripPlanner::new(
            PlaceLookup::new(Arc::new(FakeSearch::with_results(5))),
            ItineraryComposer::new(model.clone()),
            MessageDispatcher::new(Arc::new(FakeTransport::default()), 1500),
            5,
        ));

        let task = tokio::spawn({
            let planner = planner.clone();
            async move { planner.submit(pune_trip()).await }
        });

        for _ in 0..100 {
            if planner.state() == PlannerState::Generating {
                break;
            }
            tokio::task::yield_now().await;
        }
        assert_eq!(planner.state(), PlannerState::Generating);

        model.release.notify_one();
        task.await.unwrap().unwrap();
        assert_eq!(planner.state(), PlannerState::Idle);
    }

    #[tokio::test]
    async fn test_second_submission_waits_for_first() {
        let search = Arc::new(FakeSearch::with_results(5));
        let model = Arc::new(GatedModel {
            release: Notify::new(),
        });
        let planner = Arc::new(TripPlanner::new(
            PlaceLookup::new(search.clone()),
            ItineraryComposer::new(model.clone()),
            MessageDispatcher::new(Arc::new(FakeTransport::default()), 10_000),
            5,
        ));

        let submit = |planner: Arc<TripPlanner>| {
            tokio::spawn(async move { planner.submit(pune_trip()).await })
        };
        let first = submit(planner.clone());
        let second = submit(planner.clone());

        for _ in 0..100 {
            tokio::task::yield_now().await;
        }
        // only the submission holding the turn has searched
        assert_eq!(search.queries().len(), 3);
        assert_eq!(planner.state(), PlannerState::Generating);

        model.release.notify_one();
        for _ in 0..100 {
            if search.queries().len() == 6 {
                break;
            }
            tokio::task::yield_now().await;
        }
        assert_eq!(search.queries().len(), 6);

        model.release.notify_one();
        first.await.unwrap().unwrap();
        second.await.unwrap().unwrap();
        assert_eq!(search.queries().len(), 6);
        assert_eq!(planner.state(), PlannerState::Idle);
    }

    #[test]
    fn test_form_defaults() {
        let form = TripForm::with_defaults(date("2026-10-15"));
        assert_eq!(form.start_date, "2026-10-15");
        assert_eq!(form.end_date, "2026-10-16");
        assert_eq!(form.party_size, "2");
    }

    #[test]
    fn test_form_parses_into_request() {
        let form = TripForm {
            destination: "  Goa ".to_string(),
            start_date: "2026-12-20".to_string(),
            end_date: "2026-12-24".to_string(),
            party_size: "4".to_string(),
            budget: "1 lakh INR".to_string(),
        };
        let request = form.into_request(date("2026-10-15")).unwrap();
        assert_eq!(request.destination, "Goa");
        assert_eq!(request.end_date, date("2026-12-24"));
        assert_eq!(request.party_size, 4);
    }

    #[test]
    fn test_blank_form_dates_use_widget_defaults() {
        let form = TripForm {
            destination: "Goa".to_string(),
            ..TripForm::default()
        };
        let request = form.into_request(date("2026-10-15")).unwrap();
        assert_eq!(request.start_date, date("2026-10-15"));
        assert_eq!(request.end_date, date("2026-10-16"));
        assert_eq!(request.party_size, 2);
    }

    #[test]
    fn test_form_validation_messages() {
        let today = date("2026-10-15");

        let err = TripForm::default().into_request(today).unwrap_err();
        assert_eq!(err.user_message(), MISSING_DESTINATION);

        let zero = TripForm {
            destination: "Goa".to_string(),
            party_size: "0".to_string(),
            ..TripForm::default()
        };
        assert!(zero.into_request(today).unwrap_err().user_message().contains("at least 1"));

        let bad_date = TripForm {
            destination: "Goa".to_string(),
            start_date: "20/12/2026".to_string(),
            ..TripForm::default()
        };
        assert!(bad_date.into_request(today).unwrap_err().user_message().contains("start date"));
    }
}
