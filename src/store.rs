//! Persistence layer for trips, weather days, activities and packing items
//!
//! Raw sqlx queries against SQLite. Every operation that targets a row by
//! id maps zero affected rows to `NotFound`. Weather-day replacement is a
//! single transaction so readers never observe a mixed range.

use chrono::NaiveDate;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Pool, Sqlite, SqliteConnection};
use std::str::FromStr;
use tracing::info;

use crate::error::TripMateError;
use crate::models::{Activity, DateRange, DayForecast, PackingItem, Trip, WeatherDay};

/// Repository over a SQLite pool
#[derive(Clone)]
pub struct TripStore {
    pool: Pool<Sqlite>,
}

impl TripStore {
    /// Open a pool for `url` with foreign keys enforced and wrap it
    pub async fn connect(url: &str) -> crate::Result<Self> {
        let options = SqliteConnectOptions::from_str(url)
            .map_err(TripMateError::from)?
            .create_if_missing(true)
            .foreign_keys(true);

        // An in-memory database exists per connection; more than one
        // pooled connection would see disjoint schemas.
        let max_connections = if is_in_memory(url) { 1 } else { 5 };

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await?;

        Ok(Self { pool })
    }

    /// Wrap an existing pool (tests use in-memory pools)
    #[must_use]
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }

    /// Create the schema if it does not exist yet
    pub async fn init_schema(&self) -> crate::Result<()> {
        info!("Initializing database schema");

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS trips (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id INTEGER NOT NULL,
                location TEXT NOT NULL,
                start_date DATE NOT NULL,
                end_date DATE NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS trip_weather_days (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                trip_id INTEGER NOT NULL REFERENCES trips(id) ON DELETE CASCADE,
                date DATE NOT NULL,
                tempmin REAL NOT NULL,
                tempmax REAL NOT NULL,
                precipprob REAL NOT NULL,
                conditions TEXT NOT NULL,
                icon TEXT NOT NULL,
                description TEXT,
                UNIQUE(trip_id, date)
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS trip_activities (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                trip_id INTEGER NOT NULL REFERENCES trips(id) ON DELETE CASCADE,
                date DATE NOT NULL,
                description TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS packing_items (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                trip_id INTEGER NOT NULL REFERENCES trips(id) ON DELETE CASCADE,
                item_name TEXT NOT NULL,
                category TEXT,
                is_checked INTEGER NOT NULL DEFAULT 0
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    // ------------------------------------------------------------------
    // Trips
    // ------------------------------------------------------------------

    /// Insert a new trip and return the created row
    pub async fn insert_trip(
        &self,
        user_id: i64,
        location: &str,
        range: DateRange,
    ) -> crate::Result<Trip> {
        let trip = sqlx::query_as::<_, Trip>(
            r#"
            INSERT INTO trips (user_id, location, start_date, end_date)
            VALUES (?, ?, ?, ?)
            RETURNING id, user_id, location, start_date, end_date
            "#,
        )
        .bind(user_id)
        .bind(location)
        .bind(range.start)
        .bind(range.end)
        .fetch_one(&self.pool)
        .await?;

        Ok(trip)
    }

    /// Load a trip by id
    pub async fn find_trip(&self, trip_id: i64) -> crate::Result<Trip> {
        sqlx::query_as::<_, Trip>(
            "SELECT id, user_id, location, start_date, end_date FROM trips WHERE id = ?",
        )
        .bind(trip_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| TripMateError::not_found(format!("No trip with id: {trip_id}")))
    }

    /// All trips for a user, ordered by start date
    pub async fn list_trips(&self, user_id: i64) -> crate::Result<Vec<Trip>> {
        let trips = sqlx::query_as::<_, Trip>(
            r#"
            SELECT id, user_id, location, start_date, end_date
            FROM trips
            WHERE user_id = ?
            ORDER BY start_date
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(trips)
    }

    /// Update a trip's location and date range together with its weather
    /// rows, in one transaction
    ///
    /// Either the trip row and its weather rows all reflect the new range,
    /// or nothing changed.
    pub async fn update_trip_with_weather(
        &self,
        trip_id: i64,
        location: &str,
        range: DateRange,
        days: &[DayForecast],
    ) -> crate::Result<Trip> {
        let mut tx = self.pool.begin().await?;

        let trip = sqlx::query_as::<_, Trip>(
            r#"
            UPDATE trips
            SET location = ?, start_date = ?, end_date = ?
            WHERE id = ?
            RETURNING id, user_id, location, start_date, end_date
            "#,
        )
        .bind(location)
        .bind(range.start)
        .bind(range.end)
        .bind(trip_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| TripMateError::not_found(format!("No trip with id: {trip_id}")))?;

        replace_weather_days_in(&mut tx, trip_id, days).await?;

        tx.commit().await?;
        Ok(trip)
    }

    /// Delete a trip; weather days, activities and packing items cascade
    pub async fn delete_trip(&self, trip_id: i64) -> crate::Result<()> {
        let result = sqlx::query("DELETE FROM trips WHERE id = ?")
            .bind(trip_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(TripMateError::not_found(format!(
                "No trip with id: {trip_id}"
            )));
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Weather days
    // ------------------------------------------------------------------

    /// Replace all stored weather rows for a trip with `days`, atomically
    pub async fn replace_weather_days(
        &self,
        trip_id: i64,
        days: &[DayForecast],
    ) -> crate::Result<()> {
        let mut tx = self.pool.begin().await?;
        replace_weather_days_in(&mut tx, trip_id, days).await?;
        tx.commit().await?;
        Ok(())
    }

    /// Stored weather rows for a trip, ordered by date
    pub async fn list_weather_days(&self, trip_id: i64) -> crate::Result<Vec<WeatherDay>> {
        let days = sqlx::query_as::<_, WeatherDay>(
            r#"
            SELECT id, trip_id, date, tempmin, tempmax, precipprob, conditions, icon, description
            FROM trip_weather_days
            WHERE trip_id = ?
            ORDER BY date
            "#,
        )
        .bind(trip_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(days)
    }

    // ------------------------------------------------------------------
    // Activities
    // ------------------------------------------------------------------

    /// Insert an activity for a trip
    pub async fn insert_activity(
        &self,
        trip_id: i64,
        date: NaiveDate,
        description: &str,
    ) -> crate::Result<Activity> {
        let activity = sqlx::query_as::<_, Activity>(
            r#"
            INSERT INTO trip_activities (trip_id, date, description)
            VALUES (?, ?, ?)
            RETURNING id, trip_id, date, description
            "#,
        )
        .bind(trip_id)
        .bind(date)
        .bind(description)
        .fetch_one(&self.pool)
        .await?;

        Ok(activity)
    }

    /// All activities for a trip, ordered by date
    pub async fn list_activities(&self, trip_id: i64) -> crate::Result<Vec<Activity>> {
        let activities = sqlx::query_as::<_, Activity>(
            r#"
            SELECT id, trip_id, date, description
            FROM trip_activities
            WHERE trip_id = ?
            ORDER BY date
            "#,
        )
        .bind(trip_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(activities)
    }

    // ------------------------------------------------------------------
    // Packing items
    // ------------------------------------------------------------------

    /// Insert a packing item (unchecked by default)
    pub async fn insert_packing_item(
        &self,
        trip_id: i64,
        item_name: &str,
        category: Option<&str>,
    ) -> crate::Result<PackingItem> {
        let item = sqlx::query_as::<_, PackingItem>(
            r#"
            INSERT INTO packing_items (trip_id, item_name, category)
            VALUES (?, ?, ?)
            RETURNING id, trip_id, item_name, category, is_checked
            "#,
        )
        .bind(trip_id)
        .bind(item_name)
        .bind(category)
        .fetch_one(&self.pool)
        .await?;

        Ok(item)
    }

    /// Update a packing item's checked flag
    pub async fn update_packing_item_checked(
        &self,
        item_id: i64,
        is_checked: bool,
    ) -> crate::Result<PackingItem> {
        sqlx::query_as::<_, PackingItem>(
            r#"
            UPDATE packing_items
            SET is_checked = ?
            WHERE id = ?
            RETURNING id, trip_id, item_name, category, is_checked
            "#,
        )
        .bind(is_checked)
        .bind(item_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| TripMateError::not_found(format!("No packing item with id: {item_id}")))
    }

    /// Delete a packing item by id
    pub async fn delete_packing_item(&self, item_id: i64) -> crate::Result<()> {
        let result = sqlx::query("DELETE FROM packing_items WHERE id = ?")
            .bind(item_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(TripMateError::not_found(format!(
                "No packing item with id: {item_id}"
            )));
        }
        Ok(())
    }

    /// All packing items for a trip
    pub async fn list_packing_items(&self, trip_id: i64) -> crate::Result<Vec<PackingItem>> {
        let items = sqlx::query_as::<_, PackingItem>(
            r#"
            SELECT id, trip_id, item_name, category, is_checked
            FROM packing_items
            WHERE trip_id = ?
            ORDER BY id
            "#,
        )
        .bind(trip_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }
}

/// Whether a connection URL names an in-memory database, in either the
/// `sqlite::memory:` or the `file:…?mode=memory` form
fn is_in_memory(url: &str) -> bool {
    url.contains(":memory:") || url.contains("mode=memory")
}

/// Delete-then-insert of a trip's weather rows on one connection
///
/// Delete completes before any insert begins, so a committed snapshot
/// never mixes rows from two ranges.
async fn replace_weather_days_in(
    tx: &mut sqlx::Transaction<'_, Sqlite>,
    trip_id: i64,
    days: &[DayForecast],
) -> crate::Result<()> {
    let conn: &mut SqliteConnection = &mut *tx;

    sqlx::query("DELETE FROM trip_weather_days WHERE trip_id = ?")
        .bind(trip_id)
        .execute(&mut *conn)
        .await?;

    for day in days {
        sqlx::query(
            r#"
            INSERT INTO trip_weather_days
                (trip_id, date, tempmin, tempmax, precipprob, conditions, icon, description)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(trip_id)
        .bind(day.date)
        .bind(day.tempmin)
        .bind(day.tempmax)
        .bind(day.precipprob)
        .bind(&day.conditions)
        .bind(&day.icon)
        .bind(day.description.as_deref())
        .execute(&mut *conn)
        .await?;
    }

    Ok(())
}
