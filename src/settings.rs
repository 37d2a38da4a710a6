//! User reminder settings and the settings store seam.

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use siyam_times::{Coordinates, Locality};
use tokio::sync::watch;

use crate::error::{ReminderError, Result};
use crate::schedule::category::{NotificationCategory, SoundProfile};

/// Longest planning window accepted, in days.
pub const MAX_LOOKAHEAD_DAYS: u32 = 30;

/// Most hydration reminders planned per cycle.
pub const MAX_HYDRATION_COUNT: u32 = 48;

/// Longest hydration interval accepted: one day.
pub const MAX_HYDRATION_INTERVAL_MINUTES: u32 = 24 * 60;

/// Longest meal lead time accepted, in minutes.
pub const MAX_MEAL_OFFSET_MINUTES: u32 = 180;

/// Where the user is.
///
/// `coordinates` drive today's lookup when present; the locality is always
/// used for date-specific lookups.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocationSettings {
    pub locality: Locality,
    pub coordinates: Option<Coordinates>,
}

impl Default for LocationSettings {
    fn default() -> Self {
        Self {
            locality: Locality::new("Mecca", "Saudi Arabia"),
            coordinates: None,
        }
    }
}

/// Per-category on/off switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CategoryToggles {
    pub prayer_time: bool,
    pub missed_dawn: bool,
    pub pre_dawn_meal: bool,
    pub pre_sunset_meal: bool,
    pub daily_journal: bool,
    /// Off by default; hydration reminders are opt-in.
    pub hydration: bool,
}

impl Default for CategoryToggles {
    fn default() -> Self {
        Self {
            prayer_time: true,
            missed_dawn: true,
            pre_dawn_meal: true,
            pre_sunset_meal: true,
            daily_journal: true,
            hydration: false,
        }
    }
}

impl CategoryToggles {
    pub fn enabled(&self, category: NotificationCategory) -> bool {
        match category {
            NotificationCategory::PrayerTime => self.prayer_time,
            NotificationCategory::MissedDawn => self.missed_dawn,
            NotificationCategory::PreDawnMeal => self.pre_dawn_meal,
            NotificationCategory::PreSunsetMeal => self.pre_sunset_meal,
            NotificationCategory::DailyJournal => self.daily_journal,
            NotificationCategory::Hydration => self.hydration,
        }
    }
}

/// Lead times for the two meal reminders, in minutes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MealOffsets {
    /// Minutes before dawn.
    pub pre_dawn_minutes: u32,
    /// Minutes before sunset.
    pub pre_sunset_minutes: u32,
}

impl Default for MealOffsets {
    fn default() -> Self {
        Self {
            pre_dawn_minutes: 45,
            pre_sunset_minutes: 15,
        }
    }
}

/// Hydration cadence, counted from the moment of planning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HydrationSettings {
    pub count: u32,
    pub interval_minutes: u32,
}

impl Default for HydrationSettings {
    fn default() -> Self {
        Self {
            count: 5,
            interval_minutes: 30,
        }
    }
}

/// Everything the planner reads from the user's preferences.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReminderSettings {
    pub location: LocationSettings,
    pub toggles: CategoryToggles,
    pub offsets: MealOffsets,
    pub sound_profile: SoundProfile,
    /// Local time of the daily journal prompt.
    pub journal_time: NaiveTime,
    pub hydration: HydrationSettings,
    /// Days planned per cycle, today included.
    pub lookahead_days: u32,
}

impl Default for ReminderSettings {
    fn default() -> Self {
        Self {
            location: LocationSettings::default(),
            toggles: CategoryToggles::default(),
            offsets: MealOffsets::default(),
            sound_profile: SoundProfile::default(),
            journal_time: NaiveTime::from_hms_opt(21, 0, 0).unwrap_or(NaiveTime::MIN),
            hydration: HydrationSettings::default(),
            lookahead_days: 7,
        }
    }
}

impl ReminderSettings {
    /// Validate settings values.
    ///
    /// # Errors
    ///
    /// Returns [`ReminderError::Config`] if any value is out of range.
    pub fn validate(&self) -> Result<()> {
        if self.lookahead_days == 0 || self.lookahead_days > MAX_LOOKAHEAD_DAYS {
            return Err(ReminderError::Config(format!(
                "lookahead_days must be between 1 and {MAX_LOOKAHEAD_DAYS}, got {}",
                self.lookahead_days
            )));
        }
        if self.hydration.interval_minutes == 0
            || self.hydration.interval_minutes > MAX_HYDRATION_INTERVAL_MINUTES
        {
            return Err(ReminderError::Config(format!(
                "hydration.interval_minutes must be between 1 and {MAX_HYDRATION_INTERVAL_MINUTES}, got {}",
                self.hydration.interval_minutes
            )));
        }
        if self.hydration.count > MAX_HYDRATION_COUNT {
            return Err(ReminderError::Config(format!(
                "hydration.count must be at most {MAX_HYDRATION_COUNT}, got {}",
                self.hydration.count
            )));
        }
        for (name, minutes) in [
            ("offsets.pre_dawn_minutes", self.offsets.pre_dawn_minutes),
            ("offsets.pre_sunset_minutes", self.offsets.pre_sunset_minutes),
        ] {
            if minutes > MAX_MEAL_OFFSET_MINUTES {
                return Err(ReminderError::Config(format!(
                    "{name} must be at most {MAX_MEAL_OFFSET_MINUTES}, got {minutes}"
                )));
            }
        }
        let locality = &self.location.locality;
        if locality.city.trim().is_empty() || locality.country.trim().is_empty() {
            return Err(ReminderError::Config(
                "location.locality needs both city and country".into(),
            ));
        }
        if let Some(coords) = self.location.coordinates
            && !coords.is_valid()
        {
            return Err(ReminderError::Config(format!(
                "location.coordinates out of range: {},{}",
                coords.latitude, coords.longitude
            )));
        }
        Ok(())
    }
}

/// Read-only view of the current settings.
pub trait SettingsSource: Send + Sync {
    /// Snapshot of the settings right now.
    fn current(&self) -> ReminderSettings;
}

/// Shared, observable settings cell.
///
/// Cloning yields another handle to the same value. Subscribers see every
/// update that actually changes the settings.
#[derive(Debug, Clone)]
pub struct SettingsHandle {
    tx: watch::Sender<ReminderSettings>,
}

impl Default for SettingsHandle {
    fn default() -> Self {
        Self::new(ReminderSettings::default())
    }
}

impl SettingsHandle {
    pub fn new(initial: ReminderSettings) -> Self {
        let (tx, _rx) = watch::channel(initial);
        Self { tx }
    }

    /// Replace the settings. Returns `true` if the value changed.
    pub fn replace(&self, settings: ReminderSettings) -> bool {
        self.tx.send_if_modified(|current| {
            if *current == settings {
                false
            } else {
                *current = settings;
                true
            }
        })
    }

    /// Edit the settings in place. Returns `true` if the value changed.
    pub fn update(&self, edit: impl FnOnce(&mut ReminderSettings)) -> bool {
        let mut next = self.current();
        edit(&mut next);
        self.replace(next)
    }

    /// Receiver that wakes on every change.
    pub fn subscribe(&self) -> watch::Receiver<ReminderSettings> {
        self.tx.subscribe()
    }
}

impl SettingsSource for SettingsHandle {
    fn current(&self) -> ReminderSettings {
        self.tx.borrow().clone()
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

    use super::*;

    #[test]
    fn defaults_are_valid() {
        let settings = ReminderSettings::default();
        settings.validate().unwrap();
        assert_eq!(settings.lookahead_days, 7);
        assert_eq!(settings.offsets.pre_dawn_minutes, 45);
        assert_eq!(settings.offsets.pre_sunset_minutes, 15);
        assert!(!settings.toggles.hydration);
        assert_eq!(settings.journal_time, NaiveTime::from_hms_opt(21, 0, 0).unwrap());
    }

    #[test]
    fn lookahead_bounds() {
        let mut settings = ReminderSettings {
            lookahead_days: 0,
            ..Default::default()
        };
        assert!(settings.validate().is_err());
        settings.lookahead_days = MAX_LOOKAHEAD_DAYS;
        assert!(settings.validate().is_ok());
        settings.lookahead_days = MAX_LOOKAHEAD_DAYS + 1;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn zero_hydration_interval_rejected() {
        let mut settings = ReminderSettings::default();
        settings.hydration.interval_minutes = 0;
        let err = settings.validate().unwrap_err();
        assert!(err.to_string().contains("interval_minutes"));
    }

    #[test]
    fn hydration_bounds() {
        let mut settings = ReminderSettings::default();
        settings.hydration.interval_minutes = MAX_HYDRATION_INTERVAL_MINUTES;
        settings.hydration.count = MAX_HYDRATION_COUNT;
        assert!(settings.validate().is_ok());

        settings.hydration.interval_minutes = u32::MAX;
        let err = settings.validate().unwrap_err();
        assert!(err.to_string().contains("interval_minutes"));

        settings.hydration.interval_minutes = 30;
        settings.hydration.count = 1_000_000;
        let err = settings.validate().unwrap_err();
        assert!(err.to_string().contains("hydration.count"));
    }

    #[test]
    fn meal_offset_bounds() {
        let mut settings = ReminderSettings::default();
        settings.offsets.pre_dawn_minutes = MAX_MEAL_OFFSET_MINUTES;
        settings.offsets.pre_sunset_minutes = MAX_MEAL_OFFSET_MINUTES;
        assert!(settings.validate().is_ok());

        settings.offsets.pre_dawn_minutes = MAX_MEAL_OFFSET_MINUTES + 1;
        let err = settings.validate().unwrap_err();
        assert!(err.to_string().contains("pre_dawn_minutes"));

        settings.offsets.pre_dawn_minutes = 45;
        settings.offsets.pre_sunset_minutes = u32::MAX;
        let err = settings.validate().unwrap_err();
        assert!(err.to_string().contains("pre_sunset_minutes"));
    }

    #[test]
    fn bad_coordinates_rejected() {
        let mut settings = ReminderSettings::default();
        settings.location.coordinates = Some(Coordinates {
            latitude: 120.0,
            longitude: 0.0,
        });
        assert!(settings.validate().is_err());
    }

    #[test]
    fn default_toggles_leave_only_hydration_off() {
        let toggles = CategoryToggles::default();
        for category in NotificationCategory::ALL {
            assert_eq!(
                toggles.enabled(category),
                category != NotificationCategory::Hydration,
                "{category:?}"
            );
        }
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let settings: ReminderSettings = toml::from_str(
            r#"
lookahead_days = 3

[toggles]
pre_dawn_meal = false
"#,
        )
        .unwrap();
        assert_eq!(settings.lookahead_days, 3);
        assert!(!settings.toggles.pre_dawn_meal);
        assert!(settings.toggles.prayer_time);
        assert_eq!(settings.location, LocationSettings::default());
    }

    #[tokio::test]
    async fn handle_notifies_only_on_change() {
        let handle = SettingsHandle::default();
        let mut rx = handle.subscribe();

        assert!(!handle.replace(ReminderSettings::default()));
        assert!(!rx.has_changed().unwrap());

        assert!(handle.update(|s| s.toggles.hydration = true));
        assert!(rx.has_changed().unwrap());
        rx.changed().await.unwrap();
        assert!(rx.borrow_and_update().toggles.hydration);
        assert!(handle.current().toggles.hydration);
    }
}
