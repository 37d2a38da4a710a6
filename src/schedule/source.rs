//! Inputs the engine reads at cycle time: the clock and daily times.

use async_trait::async_trait;
use chrono::{DateTime, Local, NaiveDate, Utc};
use siyam_times::{DailyPrayerTimes, Locality, Sleeper, TimeServiceClient};

use crate::settings::LocationSettings;

/// Source of "now".
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Local>;
}

/// Wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Local> {
        Local::now()
    }
}

/// Where the engine gets daily times from.
///
/// Both lookups return `None` when the day is unavailable; the planner
/// decides how to degrade.
#[async_trait]
pub trait DailyTimesSource: Send + Sync {
    /// Today's times at the user's location, labelled with `date`.
    async fn today(
        &self,
        location: &LocationSettings,
        now: DateTime<Utc>,
        date: NaiveDate,
    ) -> Option<DailyPrayerTimes>;

    /// Times for a specific calendar date at a locality.
    async fn on_date(&self, locality: &Locality, date: NaiveDate) -> Option<DailyPrayerTimes>;
}

#[async_trait]
impl<S: Sleeper + 'static> DailyTimesSource for TimeServiceClient<S> {
    async fn today(
        &self,
        location: &LocationSettings,
        now: DateTime<Utc>,
        date: NaiveDate,
    ) -> Option<DailyPrayerTimes> {
        if let Some(coords) = location.coordinates
            && let Some(times) = self
                .fetch_by_coordinate(coords.latitude, coords.longitude, now)
                .await
        {
            // The service labels the day in the location's zone; the
            // planner works in the device's local calendar.
            return Some(times.with_date(date));
        }
        self.fetch_date_by_locality(&location.locality, date)
            .await
            .map(|times| times.with_date(date))
    }

    async fn on_date(&self, locality: &Locality, date: NaiveDate) -> Option<DailyPrayerTimes> {
        self.fetch_date_by_locality(locality, date).await
    }
}
