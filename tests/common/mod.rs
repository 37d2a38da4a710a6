//! Shared fakes for the integration tests.

#![allow(dead_code, clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Duration, Local, NaiveDate, NaiveTime, TimeZone, Utc};
use siyam::ReminderError;
use siyam::schedule::{
    Clock, DailyTimesSource, InMemoryNotificationStore, NotificationCategory, NotificationHandle,
    NotificationRequest, NotificationStore, PendingNotification, Trigger,
};
use siyam::settings::LocationSettings;
use siyam_times::{DailyPrayerTimes, Locality};
use tokio::sync::{Notify, Semaphore};

pub fn t(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap()
}

pub fn feb(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 2, day).unwrap()
}

pub fn local(date: NaiveDate, h: u32, m: u32) -> DateTime<Local> {
    Local
        .from_local_datetime(&date.and_time(t(h, m)))
        .earliest()
        .unwrap()
}

/// The example day: dawn 05:00 through night 19:30.
pub fn sample_times(date: NaiveDate) -> DailyPrayerTimes {
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

/// Clock that reads `start` once, then `later` on every following call.
pub struct TestClock {
    start: DateTime<Local>,
    later: DateTime<Local>,
    calls: AtomicUsize,
}

impl TestClock {
    pub fn fixed(now: DateTime<Local>) -> Arc<Self> {
        Arc::new(Self {
            start: now,
            later: now,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn jumping(start: DateTime<Local>, by: Duration) -> Arc<Self> {
        Arc::new(Self {
            start,
            later: start + by,
            calls: AtomicUsize::new(0),
        })
    }
}

impl Clock for TestClock {
    fn now(&self) -> DateTime<Local> {
        if self.calls.fetch_add(1, Ordering::SeqCst) == 0 {
            self.start
        } else {
            self.later
        }
    }
}

/// Times source returning the sample day, except for scripted failures.
#[derive(Default)]
pub struct ScriptedTimes {
    failing: Mutex<HashSet<NaiveDate>>,
    today_unavailable: AtomicBool,
    panic_on_lookup: AtomicBool,
    lookups: AtomicUsize,
}

impl ScriptedTimes {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn fail_on(&self, date: NaiveDate) {
        self.failing.lock().unwrap().insert(date);
    }

    pub fn fail_today(&self) {
        self.today_unavailable.store(true, Ordering::SeqCst);
    }

    pub fn panic_on_lookup(&self) {
        self.panic_on_lookup.store(true, Ordering::SeqCst);
    }

    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }

    fn lookup(&self, date: NaiveDate) -> Option<DailyPrayerTimes> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        if self.panic_on_lookup.load(Ordering::SeqCst) {
            panic!("scripted lookup panic");
        }
        if self.failing.lock().unwrap().contains(&date) {
            None
        } else {
            Some(sample_times(date))
        }
    }
}

#[async_trait]
impl DailyTimesSource for ScriptedTimes {
    async fn today(
        &self,
        _location: &LocationSettings,
        _now: DateTime<Utc>,
        date: NaiveDate,
    ) -> Option<DailyPrayerTimes> {
        if self.today_unavailable.load(Ordering::SeqCst) {
            self.lookups.fetch_add(1, Ordering::SeqCst);
            return None;
        }
        self.lookup(date)
    }

    async fn on_date(&self, _locality: &Locality, date: NaiveDate) -> Option<DailyPrayerTimes> {
        self.lookup(date)
    }
}

/// In-memory store that can hold the first write until released, reject
/// one category, and count clears.
pub struct InstrumentedStore {
    pub inner: InMemoryNotificationStore,
    hold_first_write: AtomicBool,
    pub entered_commit: Notify,
    gate: Semaphore,
    reject: Mutex<Option<NotificationCategory>>,
    lists: AtomicUsize,
}

impl InstrumentedStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            inner: InMemoryNotificationStore::new(),
            hold_first_write: AtomicBool::new(false),
            entered_commit: Notify::new(),
            gate: Semaphore::new(0),
            reject: Mutex::new(None),
            lists: AtomicUsize::new(0),
        })
    }

    /// Block the next write until [`Self::release`] is called.
    pub fn hold_first_write(&self) {
        self.hold_first_write.store(true, Ordering::SeqCst);
    }

    pub fn release(&self) {
        self.gate.add_permits(1);
    }

    pub fn reject_category(&self, category: NotificationCategory) {
        *self.reject.lock().unwrap() = Some(category);
    }

    /// Number of `list` calls, one per clear step.
    pub fn lists(&self) -> usize {
        self.lists.load(Ordering::SeqCst)
    }

    /// (category, trigger) of every reconciled entry, sorted.
    pub fn keys(&self) -> Vec<(NotificationCategory, Trigger)> {
        let mut keys: Vec<_> = self
            .inner
            .pending_in(siyam::schedule::Namespace::Reconciled)
            .iter()
            .filter_map(PendingNotification::key)
            .collect();
        keys.sort_by_key(|(category, trigger)| (*category, trigger.to_string()));
        keys
    }
}

#[async_trait]
impl NotificationStore for InstrumentedStore {
    async fn permission_granted(&self) -> bool {
        self.inner.permission_granted().await
    }

    async fn schedule(&self, request: NotificationRequest) -> siyam::Result<NotificationHandle> {
        if self.hold_first_write.swap(false, Ordering::SeqCst) {
            self.entered_commit.notify_one();
            let permit = self.gate.acquire().await.unwrap();
            permit.forget();
        }
        let rejected = *self.reject.lock().unwrap();
        if rejected.is_some() && request.content.category == rejected {
            return Err(ReminderError::StoreWrite("rejected by host".into()));
        }
        self.inner.schedule(request).await
    }

    async fn list(&self) -> siyam::Result<Vec<PendingNotification>> {
        self.lists.fetch_add(1, Ordering::SeqCst);
        self.inner.list().await
    }

    async fn cancel_one(&self, handle: &NotificationHandle) -> siyam::Result<()> {
        self.inner.cancel_one(handle).await
    }

    async fn cancel_all(&self) -> siyam::Result<()> {
        self.inner.cancel_all().await
    }
}
