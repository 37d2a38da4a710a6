//! Planned reminders and their triggers.

use chrono::{DateTime, NaiveTime, Timelike, Utc};
use serde::{Deserialize, Serialize};
use siyam_times::Marker;
use std::fmt;

use crate::schedule::category::{NotificationCategory, SoundSpec};
use crate::schedule::store::{Namespace, NotificationContent, NotificationRequest};

/// When a reminder fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Trigger {
    /// Once, at an absolute instant.
    At {
        /// Instant the reminder fires.
        instant: DateTime<Utc>,
    },
    /// Every day at a local wall-clock time.
    Daily {
        /// Hour of day (0-23, local).
        hour: u32,
        /// Minute of hour (0-59).
        minute: u32,
    },
}

impl Trigger {
    /// One-off trigger at `instant`.
    pub fn at(instant: DateTime<Utc>) -> Self {
        Self::At { instant }
    }

    /// Daily trigger at the hour and minute of `time`.
    pub fn daily(time: NaiveTime) -> Self {
        Self::Daily {
            hour: time.hour(),
            minute: time.minute(),
        }
    }

    /// The absolute instant of a one-off trigger.
    pub fn instant(&self) -> Option<DateTime<Utc>> {
        match self {
            Self::At { instant } => Some(*instant),
            Self::Daily { .. } => None,
        }
    }

    /// Whether this trigger can still fire after `now`.
    ///
    /// One-off triggers must be strictly later than `now`; recurring
    /// triggers always have a next occurrence.
    pub fn is_future(&self, now: DateTime<Utc>) -> bool {
        match self {
            Self::At { instant } => *instant > now,
            Self::Daily { .. } => true,
        }
    }
}

impl fmt::Display for Trigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::At { instant } => write!(f, "at {}", instant.to_rfc3339()),
            Self::Daily { hour, minute } => write!(f, "daily at {hour:02}:{minute:02}"),
        }
    }
}

/// One reminder produced by the planner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduledEntry {
    /// Reminder kind.
    pub category: NotificationCategory,
    /// Time marker the entry derives from, if any.
    pub marker: Option<Marker>,
    /// When it fires.
    pub trigger: Trigger,
    /// Notification title.
    pub title: String,
    /// Notification body.
    pub body: String,
    /// Resolved sound.
    pub sound: SoundSpec,
}

impl ScheduledEntry {
    /// Identity used to compare store contents: category plus trigger.
    pub fn key(&self) -> (NotificationCategory, Trigger) {
        (self.category, self.trigger)
    }

    /// Store request for this entry in the reconciled namespace.
    pub fn to_request(&self) -> NotificationRequest {
        NotificationRequest {
            trigger: self.trigger,
            content: NotificationContent {
                title: self.title.clone(),
                body: self.body.clone(),
                sound: self.sound.clone(),
                namespace: Namespace::Reconciled,
                category: Some(self.category),
            },
        }
    }
}
