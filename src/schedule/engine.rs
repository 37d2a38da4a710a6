//! Reconciliation engine.
//!
//! Keeps the host's pending reminders in step with the current time and
//! settings through one clear, plan and commit cycle at a time. Triggers
//! that arrive while a cycle is running join it instead of starting another.

use chrono::{Days, Utc};
use futures_util::FutureExt;
use futures_util::future::{BoxFuture, Shared};
use std::sync::Arc;
use tokio::sync::{Mutex, broadcast, watch};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::error::{ReminderError, Result};
use crate::schedule::category::Platform;
use crate::schedule::lifecycle::{LifecycleEvent, LifecycleEvents, Subscription};
use crate::schedule::planner::{PlanPrefs, plan_window};
use crate::schedule::source::{Clock, DailyTimesSource, SystemClock};
use crate::schedule::store::{Namespace, NotificationStore};
use crate::settings::{ReminderSettings, SettingsSource};

/// Whether a cycle is in progress.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReconciliationState {
    #[default]
    Idle,
    Running,
}

/// Counts from one completed cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    /// Reconciled notifications removed before planning.
    pub cleared: usize,
    /// Entries the planner produced.
    pub planned: usize,
    /// Entries written to the store.
    pub committed: usize,
    /// Entries whose trigger passed before they could be committed.
    pub discarded: usize,
    /// Entries the store rejected.
    pub failed: usize,
    /// Day offsets planned with today's times.
    pub fallback_days: Vec<u32>,
    /// Day offsets with no times at all.
    pub skipped_days: Vec<u32>,
}

/// Result of a [`ReconciliationEngine::reconcile`] call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcileOutcome {
    Completed(ReconcileReport),
    /// Posting is not allowed; nothing was touched.
    PermissionDenied,
    /// The cycle stopped early. The engine is idle again.
    Failed(String),
}

impl ReconcileOutcome {
    pub fn report(&self) -> Option<&ReconcileReport> {
        match self {
            Self::Completed(report) => Some(report),
            _ => None,
        }
    }
}

type InFlight = Shared<BoxFuture<'static, ReconcileOutcome>>;

#[derive(Default)]
struct CycleSlot {
    state: ReconciliationState,
    in_flight: Option<InFlight>,
}

struct EngineInner {
    store: Arc<dyn NotificationStore>,
    times: Arc<dyn DailyTimesSource>,
    settings: Arc<dyn SettingsSource>,
    clock: Arc<dyn Clock>,
    platform: Platform,
    cycle: Mutex<CycleSlot>,
}

/// Builder for [`ReconciliationEngine`].
pub struct EngineBuilder {
    store: Arc<dyn NotificationStore>,
    times: Arc<dyn DailyTimesSource>,
    settings: Arc<dyn SettingsSource>,
    clock: Arc<dyn Clock>,
    platform: Platform,
}

impl EngineBuilder {
    /// Replace the wall clock.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Plan sounds for a platform other than the build target.
    pub fn with_platform(mut self, platform: Platform) -> Self {
        self.platform = platform;
        self
    }

    pub fn build(self) -> ReconciliationEngine {
        ReconciliationEngine {
            inner: Arc::new(EngineInner {
                store: self.store,
                times: self.times,
                settings: self.settings,
                clock: self.clock,
                platform: self.platform,
                cycle: Mutex::new(CycleSlot::default()),
            }),
        }
    }
}

/// Owner of the reconciliation cycle.
///
/// Cloning is cheap and every clone drives the same state. Independent
/// engines share nothing.
#[derive(Clone)]
pub struct ReconciliationEngine {
    inner: Arc<EngineInner>,
}

impl std::fmt::Debug for ReconciliationEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReconciliationEngine")
            .field("platform", &self.inner.platform)
            .finish_non_exhaustive()
    }
}

impl ReconciliationEngine {
    /// Start building an engine over a store, a times source and settings.
    pub fn builder(
        store: Arc<dyn NotificationStore>,
        times: Arc<dyn DailyTimesSource>,
        settings: Arc<dyn SettingsSource>,
    ) -> EngineBuilder {
        EngineBuilder {
            store,
            times,
            settings,
            clock: Arc::new(SystemClock),
            platform: Platform::current(),
        }
    }

    /// Current state.
    pub async fn state(&self) -> ReconciliationState {
        self.inner.cycle.lock().await.state
    }

    /// Run one cycle, or join the one already running.
    ///
    /// Returns [`ReconcileOutcome::PermissionDenied`] without touching the
    /// store or the state when posting is not allowed. The cycle itself
    /// runs on a spawned task, so it completes even if the caller stops
    /// waiting.
    pub async fn reconcile(&self) -> ReconcileOutcome {
        let in_flight = {
            let mut slot = self.inner.cycle.lock().await;
            if let Some(in_flight) = &slot.in_flight {
                debug!("reconciliation already running, joining");
                in_flight.clone()
            } else {
                if !self.inner.store.permission_granted().await {
                    info!("notification permission not granted, skipping reconciliation");
                    return ReconcileOutcome::PermissionDenied;
                }
                let in_flight = self.start_cycle();
                slot.state = ReconciliationState::Running;
                slot.in_flight = Some(in_flight.clone());
                in_flight
            }
        };
        in_flight.await
    }

    /// Trigger a cycle without waiting for it.
    pub fn request_reconcile(&self) -> JoinHandle<ReconcileOutcome> {
        let engine = self.clone();
        tokio::spawn(async move { engine.reconcile().await })
    }

    /// Reconcile whenever the app returns to the foreground.
    pub fn on_foreground(&self, events: &dyn LifecycleEvents) -> Subscription {
        let mut rx = events.subscribe();
        let engine = self.clone();
        Subscription::new(tokio::spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(LifecycleEvent::Foreground) => {
                        debug!("foreground regained");
                        engine.request_reconcile();
                    }
                    Ok(LifecycleEvent::Background) => {}
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        debug!(skipped, "lifecycle listener lagged");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        }))
    }

    /// Reconcile whenever the settings change.
    ///
    /// A change that lands after a running cycle has read its settings
    /// joins that cycle, so the store keeps the older settings until the
    /// next trigger. Call [`Self::reconcile`] again once it returns if the
    /// new settings must be applied right away.
    pub fn on_settings_change(&self, mut rx: watch::Receiver<ReminderSettings>) -> Subscription {
        let engine = self.clone();
        Subscription::new(tokio::spawn(async move {
            while rx.changed().await.is_ok() {
                debug!("reminder settings changed");
                engine.request_reconcile();
            }
        }))
    }

    /// Spawn the cycle plus a supervisor that always returns the engine
    /// to idle, then hand back the shared outcome.
    fn start_cycle(&self) -> InFlight {
        let worker = self.clone();
        let supervisor = self.clone();
        let handle = tokio::spawn(async move {
            let outcome = match tokio::spawn(async move { worker.run_cycle().await }).await {
                Ok(outcome) => outcome,
                Err(e) => {
                    error!(error = %e, "reconciliation task failed");
                    ReconcileOutcome::Failed(format!("reconciliation task failed: {e}"))
                }
            };
            supervisor.finish_cycle().await;
            outcome
        });

        async move {
            handle
                .await
                .unwrap_or_else(|e| ReconcileOutcome::Failed(format!("supervisor failed: {e}")))
        }
        .boxed()
        .shared()
    }

    async fn finish_cycle(&self) {
        let mut slot = self.inner.cycle.lock().await;
        slot.state = ReconciliationState::Idle;
        slot.in_flight = None;
    }

    async fn run_cycle(&self) -> ReconcileOutcome {
        let settings = self.inner.settings.current();
        if let Err(e) = settings.validate() {
            warn!(error = %e, "settings unusable, reconciliation aborted");
            return ReconcileOutcome::Failed(e.to_string());
        }

        let cleared = match self.clear_reconciled().await {
            Ok(cleared) => cleared,
            Err(e) => {
                error!(error = %e, "failed to clear scheduled reminders");
                return ReconcileOutcome::Failed(e.to_string());
            }
        };

        let now = self.inner.clock.now();
        let now_utc = now.with_timezone(&Utc);
        let today = now.date_naive();
        let location = &settings.location;

        let mut days = Vec::with_capacity(settings.lookahead_days as usize);
        for offset in 0..settings.lookahead_days {
            let times = match today.checked_add_days(Days::new(u64::from(offset))) {
                Some(date) if offset == 0 => self.inner.times.today(location, now_utc, date).await,
                Some(date) => self.inner.times.on_date(&location.locality, date).await,
                None => None,
            };
            days.push(times);
        }

        let prefs = PlanPrefs::from_settings(&settings, self.inner.platform);
        let plan = plan_window(
            &now,
            settings.lookahead_days,
            |offset| days.get(offset as usize).copied().flatten(),
            &prefs,
        );

        let mut report = ReconcileReport {
            cleared,
            planned: plan.entries.len(),
            fallback_days: plan.summary.fallback_days,
            skipped_days: plan.summary.skipped_days,
            ..ReconcileReport::default()
        };

        for entry in &plan.entries {
            let now = self.inner.clock.now().with_timezone(&Utc);
            if !entry.trigger.is_future(now) {
                debug!(category = %entry.category, trigger = %entry.trigger, "trigger passed before commit, discarding");
                report.discarded += 1;
                continue;
            }
            match self.inner.store.schedule(entry.to_request()).await {
                Ok(handle) => {
                    debug!(category = %entry.category, trigger = %entry.trigger, %handle, "reminder scheduled");
                    report.committed += 1;
                }
                Err(e) => {
                    warn!(category = %entry.category, trigger = %entry.trigger, error = %e, "failed to schedule reminder");
                    report.failed += 1;
                }
            }
        }

        info!(
            cleared = report.cleared,
            planned = report.planned,
            committed = report.committed,
            discarded = report.discarded,
            failed = report.failed,
            fallback_days = ?report.fallback_days,
            skipped_days = ?report.skipped_days,
            "reconciliation complete"
        );
        ReconcileOutcome::Completed(report)
    }

    /// Remove every reconciled notification, leaving ad-hoc ones alone.
    async fn clear_reconciled(&self) -> Result<usize> {
        let pending = self.inner.store.list().await?;
        let mut cleared = 0;
        for notification in pending
            .iter()
            .filter(|p| p.content.namespace == Namespace::Reconciled)
        {
            match self.inner.store.cancel_one(&notification.handle).await {
                Ok(()) => cleared += 1,
                // Already fired or removed by the host.
                Err(ReminderError::UnknownHandle(_)) => {}
                Err(e) => return Err(e),
            }
        }
        Ok(cleared)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

    use super::*;
    use crate::schedule::store::InMemoryNotificationStore;
    use crate::settings::{LocationSettings, SettingsHandle};
    use async_trait::async_trait;
    use chrono::{DateTime, Local, NaiveDate, NaiveTime, TimeZone};
    use siyam_times::{DailyPrayerTimes, Locality};

    struct FixedClock(DateTime<Local>);

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Local> {
            self.0
        }
    }

    struct StaticTimes;

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn times(date: NaiveDate) -> DailyPrayerTimes {
        DailyPrayerTimes {
            date,
            dawn: t(5, 0),
            sunrise: t(6, 20),
            midday: t(12, 30),
            afternoon: t(15, 45),
            sunset: t(18, 10),
            night: t(19, 30),
        }
    }

    #[async_trait]
    impl DailyTimesSource for StaticTimes {
        async fn today(
            &self,
            _location: &LocationSettings,
            _now: DateTime<Utc>,
            date: NaiveDate,
        ) -> Option<DailyPrayerTimes> {
            Some(times(date))
        }

        async fn on_date(&self, _locality: &Locality, date: NaiveDate) -> Option<DailyPrayerTimes> {
            Some(times(date))
        }
    }

    fn engine(store: Arc<InMemoryNotificationStore>, settings: SettingsHandle) -> ReconciliationEngine {
        let now = Local
            .from_local_datetime(
                &NaiveDate::from_ymd_opt(2025, 2, 10)
                    .unwrap()
                    .and_time(t(2, 0)),
            )
            .earliest()
            .unwrap();
        ReconciliationEngine::builder(store, Arc::new(StaticTimes), Arc::new(settings))
            .with_clock(Arc::new(FixedClock(now)))
            .with_platform(Platform::Android)
            .build()
    }

    #[tokio::test]
    async fn starts_idle_and_returns_to_idle() {
        let store = Arc::new(InMemoryNotificationStore::new());
        let engine = engine(store.clone(), SettingsHandle::default());
        assert_eq!(engine.state().await, ReconciliationState::Idle);

        let outcome = engine.reconcile().await;
        let report = outcome.report().unwrap();
        assert_eq!(report.committed, report.planned);
        assert_eq!(store.len(), report.committed);
        assert_eq!(engine.state().await, ReconciliationState::Idle);
    }

    #[tokio::test]
    async fn invalid_settings_fail_and_leave_engine_idle() {
        let store = Arc::new(InMemoryNotificationStore::new());
        let settings = SettingsHandle::new(ReminderSettings {
            lookahead_days: 0,
            ..Default::default()
        });
        let engine = engine(store.clone(), settings);

        let outcome = engine.reconcile().await;
        assert!(matches!(outcome, ReconcileOutcome::Failed(ref reason) if reason.contains("lookahead_days")));
        assert_eq!(engine.state().await, ReconciliationState::Idle);
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn request_reconcile_runs_in_background() {
        let store = Arc::new(InMemoryNotificationStore::new());
        let engine = engine(store.clone(), SettingsHandle::default());
        let outcome = engine.request_reconcile().await.unwrap();
        assert!(outcome.report().is_some());
        assert!(!store.is_empty());
    }

    #[tokio::test]
    async fn android_entries_carry_channels() {
        let store = Arc::new(InMemoryNotificationStore::new());
        let engine = engine(store.clone(), SettingsHandle::default());
        engine.reconcile().await;
        let pending = store.list().await.unwrap();
        assert!(pending.iter().all(|p| p.content.sound.channel_id.is_some()));
    }
}
