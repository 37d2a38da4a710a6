//! # siyam-times
//!
//! Resilient retrieval of the six daily time markers (dawn, sunrise,
//! midday, afternoon, sunset, night) from an external time-calculation
//! service.
//!
//! ## Design
//!
//! - Month, date and coordinate lookups against an Aladhan-compatible JSON API
//! - Fixed per-request timeout and a bounded retry loop with exponential
//!   backoff, expressed once in [`retry::with_retry`]
//! - Complete-or-nothing parsing: a day missing any of the six markers is
//!   unavailable, never partially filled
//! - Per-client month cache so a week of date lookups costs one request
//! - Graceful degradation: the public `fetch_*` methods return `None`
//!   instead of propagating network failures
//!
//! ## Example
//!
//! ```no_run
//! # async fn example() -> siyam_times::Result<()> {
//! use siyam_times::{Locality, TimeServiceClient, TimesConfig};
//!
//! let client = TimeServiceClient::new(TimesConfig::default())?;
//! let today = chrono::Local::now().date_naive();
//! if let Some(times) = client
//!     .fetch_date_by_locality(&Locality::new("Cairo", "Egypt"), today)
//!     .await
//! {
//!     println!("dawn {} sunset {}", times.dawn, times.sunset);
//! }
//! # Ok(())
//! # }
//! ```

pub mod cache;
pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod parse;
pub mod retry;
pub mod types;

pub use client::TimeServiceClient;
pub use config::TimesConfig;
pub use error::{Result, TimesError};
pub use retry::{with_retry, RetryPolicy, Sleeper, TokioSleeper};
pub use types::{Coordinates, DailyPrayerTimes, Locality, Marker};
