//! Resilient client for the time-calculation service.
//!
//! Every lookup runs through [`with_retry`] with the configured
//! [`RetryPolicy`](crate::RetryPolicy) and request timeout. The `fetch_*`
//! methods never fail: once retries are exhausted, or the payload is
//! incomplete, they log the cause and return `None` (the "unavailable"
//! sentinel). The `try_*` twins return the underlying [`TimesError`].

use std::sync::Arc;

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use tracing::{debug, trace, warn};

use crate::cache::{MonthCache, MonthKey};
use crate::config::TimesConfig;
use crate::error::{Result, TimesError};
use crate::http::build_client;
use crate::parse::{self, RawDay};
use crate::retry::{with_retry, Sleeper, TokioSleeper};
use crate::types::{Coordinates, DailyPrayerTimes, Locality};

/// Client for month, date and coordinate lookups.
pub struct TimeServiceClient<S: Sleeper = TokioSleeper> {
    config: TimesConfig,
    http: reqwest::Client,
    sleeper: S,
    cache: MonthCache,
}

impl TimeServiceClient {
    /// Create a client that sleeps on the tokio timer between retries.
    ///
    /// # Errors
    ///
    /// Returns [`TimesError::Config`] if the configuration is invalid or the
    /// HTTP client cannot be built.
    pub fn new(config: TimesConfig) -> Result<Self> {
        Self::with_sleeper(config, TokioSleeper)
    }
}

impl<S: Sleeper> TimeServiceClient<S> {
    /// Create a client with a custom backoff sleeper.
    ///
    /// # Errors
    ///
    /// Same as [`TimeServiceClient::new`].
    pub fn with_sleeper(config: TimesConfig, sleeper: S) -> Result<Self> {
        config.validate()?;
        let http = build_client(&config)?;
        let cache = MonthCache::new(config.cache_ttl_seconds);
        Ok(Self {
            config,
            http,
            sleeper,
            cache,
        })
    }

    /// Returns a reference to the client configuration.
    pub fn config(&self) -> &TimesConfig {
        &self.config
    }

    /// All days of a calendar month, or `None` if unavailable.
    pub async fn fetch_month_by_locality(
        &self,
        locality: &Locality,
        year: i32,
        month: u32,
    ) -> Option<Vec<DailyPrayerTimes>> {
        log_unavailable(
            self.try_fetch_month_by_locality(locality, year, month).await,
            "month",
            locality,
        )
    }

    /// One day of a locality's calendar, or `None` if unavailable.
    pub async fn fetch_date_by_locality(
        &self,
        locality: &Locality,
        date: NaiveDate,
    ) -> Option<DailyPrayerTimes> {
        log_unavailable(
            self.try_fetch_date_by_locality(locality, date).await,
            "date",
            locality,
        )
    }

    /// The day containing `instant` at the given coordinates, or `None` if
    /// unavailable. Non-finite or out-of-range coordinates return `None`
    /// without a request.
    pub async fn fetch_by_coordinate(
        &self,
        latitude: f64,
        longitude: f64,
        instant: DateTime<Utc>,
    ) -> Option<DailyPrayerTimes> {
        log_unavailable(
            self.try_fetch_by_coordinate(latitude, longitude, instant)
                .await,
            "coordinate",
            &format!("{latitude},{longitude}"),
        )
    }

    /// Fallible form of [`Self::fetch_month_by_locality`].
    ///
    /// # Errors
    ///
    /// Returns the last network error after retries, or
    /// [`TimesError::MalformedResponse`] if any day lacks a valid timing.
    pub async fn try_fetch_month_by_locality(
        &self,
        locality: &Locality,
        year: i32,
        month: u32,
    ) -> Result<Vec<DailyPrayerTimes>> {
        let days = self.raw_month(locality, year, month).await?;
        parse::month_times(&days)
    }

    /// Fallible form of [`Self::fetch_date_by_locality`].
    ///
    /// Fetches the whole month (or reuses a cached copy) and extracts the
    /// single entry for `date`.
    ///
    /// # Errors
    ///
    /// Returns the last network error after retries, or
    /// [`TimesError::MalformedResponse`] if the month does not contain
    /// exactly one complete entry for `date`.
    pub async fn try_fetch_date_by_locality(
        &self,
        locality: &Locality,
        date: NaiveDate,
    ) -> Result<DailyPrayerTimes> {
        let days = self.raw_month(locality, date.year(), date.month()).await?;
        parse::select_day(&days, date)
    }

    /// Fallible form of [`Self::fetch_by_coordinate`].
    ///
    /// # Errors
    ///
    /// Returns [`TimesError::InvalidCoordinates`] before any request when
    /// the coordinates are unusable, otherwise as for the other lookups.
    pub async fn try_fetch_by_coordinate(
        &self,
        latitude: f64,
        longitude: f64,
        instant: DateTime<Utc>,
    ) -> Result<DailyPrayerTimes> {
        let coords = Coordinates {
            latitude,
            longitude,
        };
        if !coords.is_valid() {
            return Err(TimesError::InvalidCoordinates(format!(
                "latitude={latitude}, longitude={longitude}"
            )));
        }

        let url = format!(
            "{}/v1/timings/{}",
            self.config.trimmed_base(),
            instant.timestamp()
        );
        let query = [
            ("latitude", latitude.to_string()),
            ("longitude", longitude.to_string()),
            ("method", self.config.calculation_method.to_string()),
        ];
        let url = url.as_str();
        let query = &query[..];

        with_retry(
            &self.config.retry,
            &self.sleeper,
            TimesError::is_retryable,
            move |attempt| async move {
                trace!(attempt, "requesting timings by coordinate");
                let body = self.get_body(url, query).await?;
                parse::decode_day(&body)?.to_times()
            },
        )
        .await
    }

    /// Decoded month entries, from cache when possible.
    async fn raw_month(
        &self,
        locality: &Locality,
        year: i32,
        month: u32,
    ) -> Result<Arc<Vec<RawDay>>> {
        if !(1..=12).contains(&month) {
            return Err(TimesError::Config(format!("month must be 1-12, got {month}")));
        }

        let key = MonthKey::new(locality, year, month, self.config.calculation_method);
        if let Some(hit) = self.cache.get(&key).await {
            debug!(%locality, year, month, "calendar cache hit");
            return Ok(hit);
        }

        let url = format!(
            "{}/v1/calendarByCity/{year}/{month}",
            self.config.trimmed_base()
        );
        let query = [
            ("city", locality.city.trim().to_owned()),
            ("country", locality.country.trim().to_owned()),
            ("method", self.config.calculation_method.to_string()),
        ];
        let url = url.as_str();
        let query = &query[..];

        let days = with_retry(
            &self.config.retry,
            &self.sleeper,
            TimesError::is_retryable,
            move |attempt| async move {
                trace!(attempt, "requesting calendar");
                let body = self.get_body(url, query).await?;
                parse::decode_month(&body)
            },
        )
        .await?;

        let days = Arc::new(days);
        if parse::month_times(&days).is_ok() {
            self.cache.insert(key, Arc::clone(&days)).await;
        }
        Ok(days)
    }

    /// One GET request; non-2xx statuses become [`TimesError::Http`].
    async fn get_body(&self, url: &str, query: &[(&str, String)]) -> Result<String> {
        let resp = self.http.get(url).query(query).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(TimesError::Http {
                status: status.as_u16(),
            });
        }
        Ok(resp.text().await?)
    }
}

fn log_unavailable<T>(
    result: Result<T>,
    lookup: &'static str,
    subject: &dyn std::fmt::Display,
) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(e) => {
            warn!(lookup, %subject, error = %e, "time lookup unavailable");
            None
        }
    }
}
