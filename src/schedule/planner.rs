//! Scheduling window planner.
//!
//! Turns a run of daily time markers plus user preferences into the list of
//! reminders to commit. Pure: no I/O and no clock reads. The caller passes
//! `now` and a resolver that yields each day's times.

use chrono::{DateTime, Days, Duration, NaiveDate, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use siyam_times::{DailyPrayerTimes, Marker};
use tracing::{debug, warn};

use crate::schedule::category::{
    NotificationCategory, Platform, SoundProfile, reminder_copy, resolve_sound,
};
use crate::schedule::entry::{ScheduledEntry, Trigger};
use crate::settings::{CategoryToggles, HydrationSettings, MealOffsets, ReminderSettings};

/// The slice of settings the planner reads, plus the target platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanPrefs {
    pub toggles: CategoryToggles,
    pub offsets: MealOffsets,
    pub sound_profile: SoundProfile,
    pub platform: Platform,
    pub journal_time: NaiveTime,
    pub hydration: HydrationSettings,
}

impl PlanPrefs {
    pub fn from_settings(settings: &ReminderSettings, platform: Platform) -> Self {
        Self {
            toggles: settings.toggles,
            offsets: settings.offsets,
            sound_profile: settings.sound_profile,
            platform,
            journal_time: settings.journal_time,
            hydration: settings.hydration,
        }
    }
}

/// Which days of the window did not get their own times.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanSummary {
    /// Offsets planned with day 0's times because their own lookup failed.
    pub fallback_days: Vec<u32>,
    /// Offsets with no times at all (day 0 was unavailable too).
    pub skipped_days: Vec<u32>,
}

/// Output of [`plan_window`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Plan {
    pub entries: Vec<ScheduledEntry>,
    pub summary: PlanSummary,
}

/// Plan every reminder for the `lookahead_days` days starting at `now`.
///
/// `resolve(k)` yields the times for the day `k` days after `now`'s date,
/// or `None` when unavailable. Day 0 is resolved first and exactly once.
/// A later day without times is planned with day 0's times; if day 0 is
/// unavailable as well the day is skipped.
///
/// No emitted one-off trigger is at or before `now`. Local times that do
/// not exist in `now`'s zone are dropped.
pub fn plan_window<Tz, F>(
    now: &DateTime<Tz>,
    lookahead_days: u32,
    mut resolve: F,
    prefs: &PlanPrefs,
) -> Plan
where
    Tz: TimeZone,
    F: FnMut(u32) -> Option<DailyPrayerTimes>,
{
    let mut plan = Plan::default();
    let now_utc = now.with_timezone(&Utc);
    let today = now.date_naive();
    let tz = now.timezone();

    let day0 = if lookahead_days > 0 { resolve(0) } else { None };

    for offset in 0..lookahead_days {
        let Some(date) = today.checked_add_days(Days::new(u64::from(offset))) else {
            break;
        };

        let times = if offset == 0 {
            day0
        } else {
            match resolve(offset) {
                Some(times) => Some(times),
                None => {
                    let fallback = day0.map(|d| d.with_date(date));
                    if fallback.is_some() {
                        warn!(day_offset = offset, %date, "times unavailable, reusing today's times");
                        plan.summary.fallback_days.push(offset);
                    }
                    fallback
                }
            }
        };

        let Some(times) = times else {
            warn!(day_offset = offset, %date, "times unavailable, skipping day");
            plan.summary.skipped_days.push(offset);
            continue;
        };

        plan_day(&tz, &now_utc, date, &times, prefs, &mut plan.entries);
    }

    if prefs.toggles.daily_journal {
        plan.entries.push(entry(
            prefs,
            NotificationCategory::DailyJournal,
            None,
            Trigger::daily(prefs.journal_time),
            0,
        ));
    }

    if prefs.toggles.hydration {
        let interval = i64::from(prefs.hydration.interval_minutes);
        for i in 1..=i64::from(prefs.hydration.count) {
            let Some(at) = interval.checked_mul(i).and_then(|m| shift(now_utc, m)) else {
                warn!(reminder = i, "hydration reminder out of range, dropping the rest");
                break;
            };
            if at > now_utc {
                plan.entries.push(entry(
                    prefs,
                    NotificationCategory::Hydration,
                    None,
                    Trigger::at(at),
                    0,
                ));
            }
        }
    }

    debug!(
        entries = plan.entries.len(),
        fallback_days = plan.summary.fallback_days.len(),
        skipped_days = plan.summary.skipped_days.len(),
        "window planned"
    );
    plan
}

fn plan_day<Tz: TimeZone>(
    tz: &Tz,
    now: &DateTime<Utc>,
    date: NaiveDate,
    times: &DailyPrayerTimes,
    prefs: &PlanPrefs,
    out: &mut Vec<ScheduledEntry>,
) {
    let pre_dawn = i64::from(prefs.offsets.pre_dawn_minutes);
    let pre_sunset = i64::from(prefs.offsets.pre_sunset_minutes);

    for (marker, time) in times.iter() {
        let Some(at) = local_instant(tz, date, time) else {
            debug!(%date, %marker, "local time does not exist, dropping");
            continue;
        };

        match marker {
            Marker::Dawn if prefs.toggles.pre_dawn_meal => {
                if let Some(meal) = shift(at, -pre_dawn)
                    && meal > *now
                {
                    out.push(entry(
                        prefs,
                        NotificationCategory::PreDawnMeal,
                        None,
                        Trigger::at(meal),
                        pre_dawn,
                    ));
                }
            }
            Marker::Sunset if prefs.toggles.pre_sunset_meal => {
                if let Some(meal) = shift(at, -pre_sunset)
                    && meal > *now
                {
                    out.push(entry(
                        prefs,
                        NotificationCategory::PreSunsetMeal,
                        None,
                        Trigger::at(meal),
                        pre_sunset,
                    ));
                }
            }
            _ => {}
        }

        if at <= *now {
            continue;
        }
        let category = if marker == Marker::Sunrise {
            NotificationCategory::MissedDawn
        } else {
            NotificationCategory::PrayerTime
        };
        if prefs.toggles.enabled(category) {
            out.push(entry(prefs, category, Some(marker), Trigger::at(at), 0));
        }
    }
}

/// `at` moved by `minutes`, or `None` outside chrono's range.
fn shift(at: DateTime<Utc>, minutes: i64) -> Option<DateTime<Utc>> {
    at.checked_add_signed(Duration::try_minutes(minutes)?)
}

fn local_instant<Tz: TimeZone>(tz: &Tz, date: NaiveDate, time: NaiveTime) -> Option<DateTime<Utc>> {
    tz.from_local_datetime(&date.and_time(time))
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
}

fn entry(
    prefs: &PlanPrefs,
    category: NotificationCategory,
    marker: Option<Marker>,
    trigger: Trigger,
    lead_minutes: i64,
) -> ScheduledEntry {
    let (title, body) = reminder_copy(category, marker, lead_minutes);
    ScheduledEntry {
        category,
        marker,
        trigger,
        title,
        body,
        sound: resolve_sound(category, prefs.platform, prefs.sound_profile),
    }
}
