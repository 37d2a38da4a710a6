//! Reminder categories, sound selection and reminder copy.

use serde::{Deserialize, Serialize};
use siyam_times::Marker;
use std::fmt;

/// The closed set of reminder kinds the planner produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationCategory {
    /// A devotional time marker has arrived.
    PrayerTime,
    /// Sunrise: the dawn prayer window has closed.
    MissedDawn,
    /// Shortly before dawn: finish the pre-dawn meal.
    PreDawnMeal,
    /// Shortly before sunset: prepare to break the fast.
    PreSunsetMeal,
    /// Recurring daily journal prompt.
    DailyJournal,
    /// Interval-based drink-water reminder.
    Hydration,
}

impl NotificationCategory {
    /// All categories.
    pub const ALL: [NotificationCategory; 6] = [
        Self::PrayerTime,
        Self::MissedDawn,
        Self::PreDawnMeal,
        Self::PreSunsetMeal,
        Self::DailyJournal,
        Self::Hydration,
    ];

    /// Stable identifier used in stored notification payloads.
    pub fn id(&self) -> &'static str {
        match self {
            Self::PrayerTime => "prayer_time",
            Self::MissedDawn => "missed_dawn",
            Self::PreDawnMeal => "pre_dawn_meal",
            Self::PreSunsetMeal => "pre_sunset_meal",
            Self::DailyJournal => "daily_journal",
            Self::Hydration => "hydration",
        }
    }
}

impl fmt::Display for NotificationCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// Host platform; decides how sounds are addressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Platform {
    /// iOS / macOS: bundled sound files, no channels.
    Apple,
    /// Android: raw resources addressed through notification channels.
    Android,
}

impl Platform {
    /// Platform of the current build target.
    pub fn current() -> Self {
        if cfg!(target_os = "android") {
            Self::Android
        } else {
            Self::Apple
        }
    }
}

/// User preference for how loud reminders are.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SoundProfile {
    /// Full call to prayer for prayer-time reminders.
    #[default]
    Adhan,
    /// Short chime for every reminder.
    Chime,
    /// No sound at all.
    Silent,
}

/// Resolved sound for one reminder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SoundSpec {
    /// Sound resource to play; `None` means silent, `"default"` the system sound.
    pub sound: Option<String>,
    /// Android notification channel. Always `None` on Apple platforms.
    pub channel_id: Option<String>,
}

/// Pick the sound for a category on a platform.
///
/// Pure function of its inputs. Missed-dawn alerts always use their own
/// soft sound so they are never mistaken for a call to prayer.
pub fn resolve_sound(
    category: NotificationCategory,
    platform: Platform,
    profile: SoundProfile,
) -> SoundSpec {
    let base = match (profile, category) {
        (SoundProfile::Silent, _) => None,
        (SoundProfile::Adhan, NotificationCategory::PrayerTime) => Some("adhan"),
        (_, NotificationCategory::MissedDawn) => Some("soft_bell"),
        (_, NotificationCategory::DailyJournal | NotificationCategory::Hydration) => {
            Some("default")
        }
        _ => Some("chime"),
    };

    match platform {
        Platform::Apple => SoundSpec {
            sound: base.map(|name| match name {
                "default" => name.to_owned(),
                _ => format!("{name}.caf"),
            }),
            channel_id: None,
        },
        Platform::Android => {
            // Android fixes the sound per channel, so each (category, sound)
            // pair needs its own channel.
            let channel = match base {
                Some(name) => format!("siyam-{}-{name}", category.id()),
                None => format!("siyam-{}-silent", category.id()),
            };
            SoundSpec {
                sound: base.map(str::to_owned),
                channel_id: Some(channel),
            }
        }
    }
}

/// Title and body for a reminder.
///
/// `marker` names the time marker for prayer-time entries; `lead_minutes`
/// is the offset for the two meal reminders.
pub fn reminder_copy(
    category: NotificationCategory,
    marker: Option<Marker>,
    lead_minutes: i64,
) -> (String, String) {
    match category {
        NotificationCategory::PrayerTime => {
            let name = marker.map_or("Prayer", |m| m.display_name());
            let body = if marker == Some(Marker::Sunset) {
                format!("It is time for {name}. You may break your fast.")
            } else {
                format!("It is time for {name}.")
            };
            (format!("{name} time"), body)
        }
        NotificationCategory::MissedDawn => (
            "Fajr window closed".to_owned(),
            "The sun has risen. If you missed Fajr, pray it as soon as you can.".to_owned(),
        ),
        NotificationCategory::PreDawnMeal => (
            "Suhoor reminder".to_owned(),
            format!("Fajr is in {lead_minutes} minutes. Finish your pre-dawn meal."),
        ),
        NotificationCategory::PreSunsetMeal => (
            "Iftar is near".to_owned(),
            format!("Maghrib is in {lead_minutes} minutes. Get ready to break your fast."),
        ),
        NotificationCategory::DailyJournal => (
            "Daily reflection".to_owned(),
            "Take a moment to record how today's fast went.".to_owned(),
        ),
        NotificationCategory::Hydration => (
            "Stay hydrated".to_owned(),
            "Have a glass of water while you can.".to_owned(),
        ),
    }
}
