//! Core types for daily time markers and lookup keys.

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the six canonical daily time markers, in chronological order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Marker {
    /// Dawn (Fajr). Start of the fast.
    Dawn,
    /// Sunrise. Closes the dawn prayer window.
    Sunrise,
    /// Midday (Dhuhr).
    Midday,
    /// Afternoon (Asr).
    Afternoon,
    /// Sunset (Maghrib). End of the fast.
    Sunset,
    /// Night (Isha).
    Night,
}

impl Marker {
    /// All markers in chronological order.
    pub const ALL: [Marker; 6] = [
        Self::Dawn,
        Self::Sunrise,
        Self::Midday,
        Self::Afternoon,
        Self::Sunset,
        Self::Night,
    ];

    /// Key used by the calculation service in its `timings` object.
    pub fn wire_name(&self) -> &'static str {
        match self {
            Self::Dawn => "Fajr",
            Self::Sunrise => "Sunrise",
            Self::Midday => "Dhuhr",
            Self::Afternoon => "Asr",
            Self::Sunset => "Maghrib",
            Self::Night => "Isha",
        }
    }

    /// Name shown to the user in reminder copy.
    pub fn display_name(&self) -> &'static str {
        self.wire_name()
    }
}

impl fmt::Display for Marker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// The six time markers for one calendar date.
///
/// A value of this type is always complete. Parsing code builds it only
/// when all six fields are present and well formed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyPrayerTimes {
    /// Calendar date the times apply to.
    pub date: NaiveDate,
    /// Dawn (Fajr).
    pub dawn: NaiveTime,
    /// Sunrise.
    pub sunrise: NaiveTime,
    /// Midday (Dhuhr).
    pub midday: NaiveTime,
    /// Afternoon (Asr).
    pub afternoon: NaiveTime,
    /// Sunset (Maghrib).
    pub sunset: NaiveTime,
    /// Night (Isha).
    pub night: NaiveTime,
}

impl DailyPrayerTimes {
    /// Time of day for a marker.
    pub fn get(&self, marker: Marker) -> NaiveTime {
        match marker {
            Marker::Dawn => self.dawn,
            Marker::Sunrise => self.sunrise,
            Marker::Midday => self.midday,
            Marker::Afternoon => self.afternoon,
            Marker::Sunset => self.sunset,
            Marker::Night => self.night,
        }
    }

    /// `(marker, time)` pairs in chronological order.
    pub fn iter(&self) -> impl Iterator<Item = (Marker, NaiveTime)> + '_ {
        Marker::ALL.into_iter().map(move |m| (m, self.get(m)))
    }

    /// Same times moved onto another calendar date.
    pub fn with_date(&self, date: NaiveDate) -> Self {
        Self { date, ..*self }
    }
}

/// A named place the service can resolve on its own.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Locality {
    /// City name as the service expects it (e.g. `"Cairo"`).
    pub city: String,
    /// Country name or ISO code (e.g. `"Egypt"`).
    pub country: String,
}

impl Locality {
    /// Build a locality from city and country.
    pub fn new(city: impl Into<String>, country: impl Into<String>) -> Self {
        Self {
            city: city.into(),
            country: country.into(),
        }
    }
}

impl fmt::Display for Locality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {}", self.city, self.country)
    }
}

/// Geographic coordinates in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    /// Latitude, -90..=90.
    pub latitude: f64,
    /// Longitude, -180..=180.
    pub longitude: f64,
}

impl Coordinates {
    /// Whether both values are finite and inside their valid ranges.
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }
}
