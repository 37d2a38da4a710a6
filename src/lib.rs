//! Siyam: rolling reminder scheduling for a 30-day fasting period.
//!
//! Keeps a host's local notification queue populated with reminders derived
//! from the six daily devotional time markers, for a rolling window of days:
//! Settings → Engine → (time service × N days) → Planner → Engine → Store.
//!
//! # Architecture
//!
//! - **Time service**: [`siyam_times::TimeServiceClient`] fetches daily times
//!   with bounded retries and degrades to `None` instead of failing
//! - **Planner**: [`schedule::plan_window`] is a pure function from times and
//!   preferences to [`schedule::ScheduledEntry`] values
//! - **Engine**: [`schedule::ReconciliationEngine`] runs one clear, plan and
//!   commit cycle at a time and coalesces concurrent triggers
//! - **Service**: [`ReminderService`] is the surface the host calls
//!
//! # Example
//!
//! ```no_run
//! use siyam::schedule::InMemoryNotificationStore;
//! use siyam::{ReminderService, SiyamConfig};
//! use std::sync::Arc;
//!
//! # async fn demo() -> siyam::Result<()> {
//! let config = SiyamConfig::load_or_default(&SiyamConfig::default_config_path())?;
//! let _guard = siyam::logging::init(&config.logging)?;
//! let service = ReminderService::from_config(&config, Arc::new(InMemoryNotificationStore::new()))?;
//! let outcome = service.reconcile().await;
//! println!("{outcome:?}");
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod logging;
pub mod schedule;
pub mod service;
pub mod settings;
pub mod siyam_dirs;

pub use config::{LoggingConfig, SiyamConfig};
pub use error::{ReminderError, Result};
pub use schedule::{ReconcileOutcome, ReconcileReport, ReconciliationEngine};
pub use service::{AdHocReminder, ReminderService};
pub use settings::{ReminderSettings, SettingsHandle, SettingsSource};
