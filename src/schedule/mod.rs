//! Reminder planning and reconciliation.
//!
//! - [`planner`] turns daily times and preferences into [`ScheduledEntry`] values.
//! - [`engine`] clears, plans and commits them against a [`NotificationStore`].
//! - [`lifecycle`] carries the host events that trigger a cycle.

pub mod category;
pub mod engine;
pub mod entry;
pub mod lifecycle;
pub mod planner;
pub mod source;
pub mod store;

pub use category::{NotificationCategory, Platform, SoundProfile, SoundSpec};
pub use engine::{
    EngineBuilder, ReconcileOutcome, ReconcileReport, ReconciliationEngine, ReconciliationState,
};
pub use entry::{ScheduledEntry, Trigger};
pub use lifecycle::{LifecycleEvent, LifecycleEvents, LifecycleHub, Subscription};
pub use planner::{Plan, PlanPrefs, PlanSummary, plan_window};
pub use source::{Clock, DailyTimesSource, SystemClock};
pub use store::{
    InMemoryNotificationStore, Namespace, NotificationContent, NotificationHandle,
    NotificationRequest, NotificationStore, PendingNotification,
};
