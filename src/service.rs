//! Host-facing facade over the engine, the store and the times source.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use siyam_times::{DailyPrayerTimes, Locality, TimeServiceClient};
use std::sync::Arc;
use tracing::{debug, info};

use crate::config::SiyamConfig;
use crate::error::{ReminderError, Result};
use crate::schedule::category::{Platform, SoundProfile, SoundSpec};
use crate::schedule::engine::{ReconcileOutcome, ReconciliationEngine};
use crate::schedule::entry::Trigger;
use crate::schedule::lifecycle::{LifecycleEvents, Subscription};
use crate::schedule::source::{Clock, DailyTimesSource, SystemClock};
use crate::schedule::store::{
    Namespace, NotificationContent, NotificationHandle, NotificationRequest, NotificationStore,
    PendingNotification,
};
use crate::settings::{SettingsHandle, SettingsSource};

const AD_HOC_CHANNEL: &str = "siyam-ad-hoc";

/// Content of a one-off reminder written by the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdHocReminder {
    pub title: String,
    pub body: String,
}

impl AdHocReminder {
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
        }
    }
}

/// The reminder subsystem as the host sees it.
pub struct ReminderService {
    engine: ReconciliationEngine,
    store: Arc<dyn NotificationStore>,
    times: Arc<dyn DailyTimesSource>,
    settings: SettingsHandle,
    clock: Arc<dyn Clock>,
    platform: Platform,
}

impl std::fmt::Debug for ReminderService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReminderService")
            .field("engine", &self.engine)
            .field("platform", &self.platform)
            .finish_non_exhaustive()
    }
}

impl ReminderService {
    /// Service on the wall clock and the build target's platform.
    pub fn new(
        store: Arc<dyn NotificationStore>,
        times: Arc<dyn DailyTimesSource>,
        settings: SettingsHandle,
    ) -> Self {
        Self::with_parts(store, times, settings, Arc::new(SystemClock), Platform::current())
    }

    pub fn with_parts(
        store: Arc<dyn NotificationStore>,
        times: Arc<dyn DailyTimesSource>,
        settings: SettingsHandle,
        clock: Arc<dyn Clock>,
        platform: Platform,
    ) -> Self {
        let engine = ReconciliationEngine::builder(
            Arc::clone(&store),
            Arc::clone(&times),
            Arc::new(settings.clone()),
        )
        .with_clock(Arc::clone(&clock))
        .with_platform(platform)
        .build();
        Self {
            engine,
            store,
            times,
            settings,
            clock,
            platform,
        }
    }

    /// Build the service from configuration, talking to the configured
    /// calculation service.
    ///
    /// # Errors
    ///
    /// Returns [`ReminderError::Config`] for invalid configuration, or a
    /// [`ReminderError::Times`] if the HTTP client cannot be built.
    pub fn from_config(config: &SiyamConfig, store: Arc<dyn NotificationStore>) -> Result<Self> {
        config.validate()?;
        let client = TimeServiceClient::new(config.times.clone())?;
        info!(base_url = %config.times.base_url, "reminder service configured");
        Ok(Self::new(
            store,
            Arc::new(client),
            SettingsHandle::new(config.reminders.clone()),
        ))
    }

    pub fn engine(&self) -> &ReconciliationEngine {
        &self.engine
    }

    /// Settings store; updates here trigger reconciliation once
    /// [`Self::attach`] has been called.
    pub fn settings(&self) -> &SettingsHandle {
        &self.settings
    }

    /// Run or join a reconciliation cycle.
    pub async fn reconcile(&self) -> ReconcileOutcome {
        self.engine.reconcile().await
    }

    /// Reconcile on foreground regain and on settings changes.
    ///
    /// Both listeners stop when the returned guards are dropped.
    pub fn attach(&self, events: &dyn LifecycleEvents) -> Vec<Subscription> {
        vec![
            self.engine.on_foreground(events),
            self.engine.on_settings_change(self.settings.subscribe()),
        ]
    }

    /// Times for one date, or `None` if unavailable.
    pub async fn fetch_for_date(
        &self,
        locality: &Locality,
        date: NaiveDate,
    ) -> Option<DailyPrayerTimes> {
        self.times.on_date(locality, date).await
    }

    /// Schedule a one-off reminder outside the reconciled set.
    ///
    /// Ad-hoc reminders survive reconciliation.
    ///
    /// # Errors
    ///
    /// - [`ReminderError::PermissionDenied`] if posting is not allowed.
    /// - [`ReminderError::TriggerInPast`] if `trigger_at` is not after now.
    /// - Any store error from the write.
    pub async fn schedule_ad_hoc(
        &self,
        trigger_at: DateTime<Utc>,
        reminder: AdHocReminder,
    ) -> Result<NotificationHandle> {
        if !self.store.permission_granted().await {
            return Err(ReminderError::PermissionDenied);
        }
        let trigger = Trigger::at(trigger_at);
        if !trigger.is_future(self.clock.now().with_timezone(&Utc)) {
            return Err(ReminderError::TriggerInPast(trigger_at.to_rfc3339()));
        }

        let profile = self.settings.current().sound_profile;
        let handle = self
            .store
            .schedule(NotificationRequest {
                trigger,
                content: NotificationContent {
                    title: reminder.title,
                    body: reminder.body,
                    sound: ad_hoc_sound(self.platform, profile),
                    namespace: Namespace::AdHoc,
                    category: None,
                },
            })
            .await?;
        debug!(%handle, %trigger, "ad-hoc reminder scheduled");
        Ok(handle)
    }

    /// Everything pending in the store, reconciled and ad-hoc.
    pub async fn list_scheduled(&self) -> Result<Vec<PendingNotification>> {
        self.store.list().await
    }

    /// Remove one pending reminder.
    pub async fn cancel_one(&self, handle: &NotificationHandle) -> Result<()> {
        self.store.cancel_one(handle).await
    }
}

fn ad_hoc_sound(platform: Platform, profile: SoundProfile) -> SoundSpec {
    let sound = (profile != SoundProfile::Silent).then(|| "default".to_owned());
    let channel_id = (platform == Platform::Android).then(|| AD_HOC_CHANNEL.to_owned());
    SoundSpec { sound, channel_id }
}
