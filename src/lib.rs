//! `TripMate` - trip-planning backend
//!
//! This library provides the core functionality for trip management,
//! weather enrichment and caching, activity and packing-list tracking,
//! and packing recommendations.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod recommend;
pub mod store;
pub mod trips;
pub mod weather;
pub mod web;

// Re-export core types for public API
pub use cache::WeatherCache;
pub use config::TripMateConfig;
pub use error::TripMateError;
pub use models::{Activity, DateRange, PackingItem, Trip, TripWeather, WeatherDay};
pub use recommend::recommend_packing;
pub use store::TripStore;
pub use trips::TripService;
pub use weather::{ForecastProvider, VisualCrossingClient, normalize};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, TripMateError>;
