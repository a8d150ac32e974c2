//! Trip aggregate orchestration
//!
//! `TripService` owns the store, the weather provider and the cache, and
//! enforces the cross-entity invariants: validated date ranges, weather
//! rows that always cover the trip's current range, and reconciliation
//! that never commits a partial state.

use std::sync::Arc;
use tracing::{info, instrument};

use crate::cache::WeatherCache;
use crate::error::TripMateError;
use crate::models::{Activity, DateRange, PackingItem, Trip, TripWeather, WeatherDay};
use crate::store::TripStore;
use crate::weather::{ForecastProvider, normalize};

/// Orchestrates trip creation/update, weather refresh, and activity and
/// packing-list mutation
pub struct TripService {
    store: TripStore,
    provider: Arc<dyn ForecastProvider>,
    cache: WeatherCache,
}

impl TripService {
    /// Wire a service from its collaborators
    pub fn new(store: TripStore, provider: Arc<dyn ForecastProvider>, cache: WeatherCache) -> Self {
        Self {
            store,
            provider,
            cache,
        }
    }

    // ------------------------------------------------------------------
    // Trips
    // ------------------------------------------------------------------

    /// Create a trip for a user
    ///
    /// Weather is fetched lazily: the first `get_weather` call populates
    /// the cache, so creation never depends on the provider being up.
    #[instrument(skip(self))]
    pub async fn create_trip(
        &self,
        user_id: i64,
        location: &str,
        start_date: &str,
        end_date: &str,
    ) -> crate::Result<Trip> {
        if location.trim().is_empty() {
            return Err(TripMateError::validation("Location cannot be empty"));
        }
        let range = DateRange::parse(start_date, end_date)?;

        let trip = self.store.insert_trip(user_id, location, range).await?;
        info!("Created trip {} for user {user_id}", trip.id);
        Ok(trip)
    }

    /// Load a trip by id
    pub async fn get_trip(&self, trip_id: i64) -> crate::Result<Trip> {
        self.store.find_trip(trip_id).await
    }

    /// Load a trip and enforce that `user_id` owns it
    pub async fn get_owned_trip(&self, trip_id: i64, user_id: i64) -> crate::Result<Trip> {
        let trip = self.store.find_trip(trip_id).await?;
        if trip.user_id != user_id {
            return Err(TripMateError::unauthorized(format!(
                "Trip {trip_id} does not belong to the caller"
            )));
        }
        Ok(trip)
    }

    /// All trips for a user, ordered by start date
    pub async fn list_trips(&self, user_id: i64) -> crate::Result<Vec<Trip>> {
        self.store.list_trips(user_id).await
    }

    /// Update a trip's location/date range and reconcile its weather rows
    ///
    /// Weather for the new (location, range) is fetched first; only on
    /// success does one transaction update the trip fields and replace the
    /// weather rows. A failed fetch leaves the trip exactly as it was.
    #[instrument(skip(self))]
    pub async fn update_trip(
        &self,
        trip_id: i64,
        location: &str,
        start_date: &str,
        end_date: &str,
    ) -> crate::Result<Trip> {
        if location.trim().is_empty() {
            return Err(TripMateError::validation("Location cannot be empty"));
        }
        let range = DateRange::parse(start_date, end_date)?;

        // NotFound before any provider traffic
        self.store.find_trip(trip_id).await?;

        let weather = self.fetch_weather(location, range).await?;
        let trip = self
            .store
            .update_trip_with_weather(trip_id, location, range, &weather.days)
            .await?;

        info!(
            "Updated trip {trip_id}: {location} {} to {}, {} weather rows",
            range.start,
            range.end,
            weather.days.len()
        );
        Ok(trip)
    }

    /// Delete a trip; its weather days, activities and packing items
    /// cascade
    pub async fn delete_trip(&self, trip_id: i64) -> crate::Result<()> {
        self.store.delete_trip(trip_id).await
    }

    // ------------------------------------------------------------------
    // Weather
    // ------------------------------------------------------------------

    /// Live weather for a trip's current location and range, through the
    /// cache
    ///
    /// Read-only: stored weather rows are a denormalized copy refreshed by
    /// `update_trip`, never by this path.
    #[instrument(skip(self))]
    pub async fn get_weather(&self, trip_id: i64) -> crate::Result<Arc<TripWeather>> {
        let trip = self.store.find_trip(trip_id).await?;
        self.fetch_weather(&trip.location, trip.date_range()).await
    }

    /// Stored weather rows for a trip (the write-side copy)
    pub async fn list_weather_days(&self, trip_id: i64) -> crate::Result<Vec<WeatherDay>> {
        self.store.list_weather_days(trip_id).await
    }

    async fn fetch_weather(
        &self,
        location: &str,
        range: DateRange,
    ) -> crate::Result<Arc<TripWeather>> {
        let provider = Arc::clone(&self.provider);
        let location_owned = location.to_string();
        self.cache
            .get_or_fetch(location, range, || async move {
                let raw = provider.fetch(&location_owned, range).await?;
                Ok(normalize(raw))
            })
            .await
    }

    // ------------------------------------------------------------------
    // Activities
    // ------------------------------------------------------------------

    /// Add an activity to a trip
    ///
    /// The date is accepted as-is; it is not validated against the trip's
    /// range.
    pub async fn add_activity(
        &self,
        trip_id: i64,
        date: &str,
        description: &str,
    ) -> crate::Result<Activity> {
        if description.trim().is_empty() {
            return Err(TripMateError::validation("Description cannot be empty"));
        }
        let date = crate::models::parse_date(date)?;

        self.store.find_trip(trip_id).await?;
        self.store.insert_activity(trip_id, date, description).await
    }

    /// All activities for a trip
    pub async fn list_activities(&self, trip_id: i64) -> crate::Result<Vec<Activity>> {
        self.store.list_activities(trip_id).await
    }

    // ------------------------------------------------------------------
    // Packing list
    // ------------------------------------------------------------------

    /// Add an item to a trip's packing list
    pub async fn add_packing_item(
        &self,
        trip_id: i64,
        item_name: &str,
        category: Option<&str>,
    ) -> crate::Result<PackingItem> {
        if item_name.trim().is_empty() {
            return Err(TripMateError::validation("Item name cannot be empty"));
        }
        self.store.find_trip(trip_id).await?;
        self.store
            .insert_packing_item(trip_id, item_name, category)
            .await
    }

    /// Set a packing item's checked flag
    pub async fn set_packing_item_checked(
        &self,
        item_id: i64,
        is_checked: bool,
    ) -> crate::Result<PackingItem> {
        self.store
            .update_packing_item_checked(item_id, is_checked)
            .await
    }

    /// Delete a packing item
    pub async fn delete_packing_item(&self, item_id: i64) -> crate::Result<()> {
        self.store.delete_packing_item(item_id).await
    }

    /// All packing items for a trip
    pub async fn list_packing_items(&self, trip_id: i64) -> crate::Result<Vec<PackingItem>> {
        self.store.list_packing_items(trip_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::weather::{RawDay, RawForecast};
    use async_trait::async_trait;
    use chrono::Days;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Provider stub producing one raw day per date in the range
    struct StubProvider {
        calls: AtomicUsize,
        fail: bool,
    }

    impl StubProvider {
        fn new() -> Self {
            Self {
                calls: AtomicUsize::new(0),
                fail: false,
            }
        }

        fn failing() -> Self {
            Self {
                calls: AtomicUsize::new(0),
                fail: true,
            }
        }

        fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ForecastProvider for StubProvider {
        async fn fetch(&self, location: &str, range: DateRange) -> crate::Result<RawForecast> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(TripMateError::provider(503, "stub outage"));
            }

            let mut days = Vec::new();
            let mut date = range.start;
            while date <= range.end {
                days.push(RawDay {
                    datetime: date.to_string(),
                    tempmin: Some(9.0),
                    tempmax: Some(18.0),
                    precipprob: Some(35.0),
                    conditions: Some("Rain".to_string()),
                    description: Some("light rain expected".to_string()),
                    icon: Some("rain".to_string()),
                });
                date = date.checked_add_days(Days::new(1)).unwrap();
            }

            Ok(RawForecast {
                resolved_address: Some(location.to_string()),
                description: Some("stubbed".to_string()),
                days: Some(days),
                alerts: None,
            })
        }
    }

    async fn service_with(provider: Arc<StubProvider>) -> TripService {
        let store = TripStore::connect("sqlite::memory:").await.unwrap();
        store.init_schema().await.unwrap();
        TripService::new(store, provider, WeatherCache::new())
    }

    #[tokio::test]
    async fn test_get_weather_is_cached_between_reads() {
        let provider = Arc::new(StubProvider::new());
        let service = service_with(Arc::clone(&provider)).await;

        let trip = service
            .create_trip(1, "Paris", "2025-07-01", "2025-07-03")
            .await
            .unwrap();
        assert_eq!(provider.call_count(), 0); // lazy fetch policy

        let first = service.get_weather(trip.id).await.unwrap();
        let second = service.get_weather(trip.id).await.unwrap();

        assert_eq!(provider.call_count(), 1);
        assert_eq!(first, second);
        assert!(first.days.iter().all(|d| trip.date_range().contains(d.date)));
    }

    #[tokio::test]
    async fn test_update_trip_replaces_weather_rows() {
        let provider = Arc::new(StubProvider::new());
        let service = service_with(Arc::clone(&provider)).await;

        let trip = service
            .create_trip(1, "Paris", "2025-07-01", "2025-07-03")
            .await
            .unwrap();
        service
            .update_trip(trip.id, "Oslo", "2025-08-10", "2025-08-11")
            .await
            .unwrap();

        let days = service.list_weather_days(trip.id).await.unwrap();
        let new_range = DateRange::parse("2025-08-10", "2025-08-11").unwrap();
        assert_eq!(days.len(), 2);
        assert!(days.iter().all(|d| new_range.contains(d.date)));
    }

    #[tokio::test]
    async fn test_update_trip_provider_failure_leaves_trip_untouched() {
        let provider = Arc::new(StubProvider::failing());
        let service = service_with(Arc::clone(&provider)).await;

        let trip = service
            .create_trip(1, "Paris", "2025-07-01", "2025-07-03")
            .await
            .unwrap();

        let err = service
            .update_trip(trip.id, "Oslo", "2025-08-10", "2025-08-11")
            .await
            .unwrap_err();
        assert!(matches!(err, TripMateError::Provider { .. }));

        let unchanged = service.get_trip(trip.id).await.unwrap();
        assert_eq!(unchanged.location, "Paris");
        assert_eq!(unchanged.start_date.to_string(), "2025-07-01");
        assert!(service.list_weather_days(trip.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_missing_trip_makes_no_provider_call() {
        let provider = Arc::new(StubProvider::new());
        let service = service_with(Arc::clone(&provider)).await;

        let err = service
            .update_trip(99, "Oslo", "2025-08-10", "2025-08-11")
            .await
            .unwrap_err();
        assert!(matches!(err, TripMateError::NotFound { .. }));
        assert_eq!(provider.call_count(), 0);
    }

    #[tokio::test]
    async fn test_create_trip_rejects_inverted_dates() {
        let provider = Arc::new(StubProvider::new());
        let service = service_with(Arc::clone(&provider)).await;

        for _ in 0..2 {
            let err = service
                .create_trip(1, "Paris", "2025-07-10", "2025-07-01")
                .await
                .unwrap_err();
            assert!(matches!(err, TripMateError::Validation { .. }));
        }
        assert!(service.list_trips(1).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_ownership_check() {
        let provider = Arc::new(StubProvider::new());
        let service = service_with(provider).await;

        let trip = service
            .create_trip(1, "Paris", "2025-07-01", "2025-07-03")
            .await
            .unwrap();

        assert!(service.get_owned_trip(trip.id, 1).await.is_ok());
        let err = service.get_owned_trip(trip.id, 2).await.unwrap_err();
        assert!(matches!(err, TripMateError::Unauthorized { .. }));
    }

    #[tokio::test]
    async fn test_add_activity_accepts_out_of_range_date() {
        let provider = Arc::new(StubProvider::new());
        let service = service_with(provider).await;

        let trip = service
            .create_trip(1, "Paris", "2025-07-01", "2025-07-03")
            .await
            .unwrap();

        // Permissive by design: the date is not checked against the range
        let activity = service
            .add_activity(trip.id, "2026-01-01", "Museum day")
            .await
            .unwrap();
        assert_eq!(activity.description, "Museum day");

        let err = service.add_activity(trip.id, "2025-07-01", "  ").await.unwrap_err();
        assert!(matches!(err, TripMateError::Validation { .. }));
    }
}
