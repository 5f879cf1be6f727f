//! The polling loop.
//!
//! Each tick fetches a snapshot, compares it with the last known one and hands
//! any resulting [`Message`] to every registered notifier. A tick never fails
//! the loop: fetch and delivery errors are logged and the loop waits for the
//! next tick.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;
use statuswatch_types::Snapshot;
use tokio::sync::watch;
use tokio::time;
use tracing::{debug, error, info, warn};

use crate::detect::{detect_changes, Detection};
use crate::error::{DeliveryErrors, Error, NotifyError, Result, SourceError};
use crate::notifier::{Message, Notifier};
use crate::source::SnapshotSource;
use crate::ticker::{IntervalTicker, Ticker};

/// Default upper bound on a single fetch.
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// What a successful tick did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// First observation, adopted without notifying.
    FirstRun,
    /// The page timestamp did not move.
    Unchanged,
    /// The page moved but nothing tracked changed.
    NoChanges,
    /// A message went out to this many notifiers.
    Delivered(usize),
}

/// Polls a [`SnapshotSource`] and relays changes to notifiers.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use std::time::Duration;
/// use statuswatch::{Monitor, StatusPageClient, StatusPageSource, StdoutNotifier};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = StatusPageClient::builder().build()?;
/// let monitor = Monitor::builder(StatusPageSource::new(client)).build();
/// monitor.register_notifier(Arc::new(StdoutNotifier::new()))?;
///
/// let (_stop, shutdown) = tokio::sync::watch::channel(false);
/// monitor.run(shutdown, Duration::from_secs(60)).await;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Monitor {
    source: Arc<dyn SnapshotSource>,
    notifiers: RwLock<BTreeMap<String, Arc<dyn Notifier>>>,
    notify_on_first_run: bool,
    fetch_timeout: Duration,
}

impl Monitor {
    /// Start building a monitor around `source`.
    pub fn builder<S: SnapshotSource + 'static>(source: S) -> MonitorBuilder {
        MonitorBuilder::new(Arc::new(source))
    }

    /// Add a notifier.
    ///
    /// Fails if a notifier with the same name is already registered; the
    /// existing one stays active. Safe to call while the monitor runs: the
    /// notifier takes part from the next dispatch on.
    pub fn register_notifier(&self, notifier: Arc<dyn Notifier>) -> Result<()> {
        let mut notifiers = self.notifiers.write();
        let name = notifier.name().to_string();
        if notifiers.contains_key(&name) {
            return Err(Error::DuplicateNotifier(name));
        }
        debug!(notifier = %name, "Registered notifier");
        notifiers.insert(name, notifier);
        Ok(())
    }

    /// Names of the registered notifiers, sorted.
    pub fn notifier_names(&self) -> Vec<String> {
        self.notifiers.read().keys().cloned().collect()
    }

    /// Run until `shutdown` turns `true` or its sender is dropped, polling
    /// every `poll_interval`.
    ///
    /// # Panics
    ///
    /// Panics if `poll_interval` is zero.
    pub async fn run(&self, shutdown: watch::Receiver<bool>, poll_interval: Duration) {
        self.run_with_ticker(shutdown, IntervalTicker::new(poll_interval))
            .await
    }

    /// Run with a custom ticker. The first cycle runs immediately, then one per
    /// tick.
    ///
    /// Shutdown is only observed between cycles, so a dispatch in flight
    /// always completes.
    pub async fn run_with_ticker<T: Ticker>(&self, mut shutdown: watch::Receiver<bool>, mut ticker: T) {
        info!(
            source = self.source.description(),
            notifiers = ?self.notifier_names(),
            "Starting monitor"
        );

        let mut last = Snapshot::default();
        if !*shutdown.borrow_and_update() {
            loop {
                match self.tick(&mut last).await {
                    Ok(outcome) => debug!(?outcome, "Tick finished"),
                    Err(Error::Delivery(errors)) => {
                        error!(failed = errors.len(), error = %errors, "Error notifying");
                    }
                    Err(e) => warn!(error = %e, "Tick failed"),
                }

                if !next_tick(&mut shutdown, &mut ticker).await {
                    break;
                }
            }
        }

        info!("Monitor stopped");
    }

    /// Run one fetch, detect and dispatch cycle against `last`.
    ///
    /// `last` is left untouched on fetch failure and when the page timestamp
    /// did not move; otherwise it becomes the fetched snapshot. A delivery
    /// failure is reported after `last` has been updated.
    pub async fn tick(&self, last: &mut Snapshot) -> Result<TickOutcome> {
        let current = self.fetch().await?;

        let detection = detect_changes(last, &current, self.notify_on_first_run);
        if detection.adopts_current() {
            *last = current;
        }

        match detection {
            Detection::FirstRun => {
                debug!("First run, adopting snapshot without notifying");
                Ok(TickOutcome::FirstRun)
            }
            Detection::Unchanged => {
                debug!("Page not updated since last poll");
                Ok(TickOutcome::Unchanged)
            }
            Detection::NoChanges => {
                debug!("Page updated without tracked changes");
                Ok(TickOutcome::NoChanges)
            }
            Detection::Changed(message) => {
                info!(
                    status = message.changed_status.is_some(),
                    components = message.changed_components.len(),
                    incidents = message.changed_incidents.len(),
                    scheduled_maintenances = message.changed_scheduled_maintenances.len(),
                    "Changes detected"
                );
                let delivered = self.dispatch(message).await?;
                Ok(TickOutcome::Delivered(delivered))
            }
        }
    }

    /// Hand `message` to every registered notifier.
    ///
    /// Notifiers run concurrently on their own tasks. One failing or panicking
    /// does not keep the others from receiving the message; every failure is
    /// collected. Returns how many notifiers were invoked.
    pub async fn dispatch(&self, message: Message) -> Result<usize, DeliveryErrors> {
        let notifiers: Vec<Arc<dyn Notifier>> = self.notifiers.read().values().cloned().collect();
        if notifiers.is_empty() {
            warn!("No notifiers registered, dropping message");
            return Ok(0);
        }

        let message = Arc::new(message);
        let tasks: Vec<_> = notifiers
            .into_iter()
            .map(|notifier| {
                let name = notifier.name().to_string();
                let message = Arc::clone(&message);
                let handle = tokio::spawn(async move { notifier.notify(&message).await });
                (name, handle)
            })
            .collect();

        let count = tasks.len();
        let mut errors = DeliveryErrors::default();
        for (name, handle) in tasks {
            let result = match handle.await {
                Ok(result) => result,
                Err(e) if e.is_panic() => Err(NotifyError::Panicked(panic_message(e.into_panic()))),
                Err(e) => Err(NotifyError::Panicked(e.to_string())),
            };
            match result {
                Ok(()) => debug!(notifier = %name, "Notified"),
                Err(e) => errors.0.push((name, e)),
            }
        }

        if errors.is_empty() {
            Ok(count)
        } else {
            Err(errors)
        }
    }

    /// Call `cleanup` once on every registered notifier and return the
    /// failures.
    pub fn cleanup(&self) -> Vec<(String, NotifyError)> {
        let notifiers: Vec<Arc<dyn Notifier>> = self.notifiers.read().values().cloned().collect();
        notifiers
            .into_iter()
            .filter_map(|notifier| {
                notifier
                    .cleanup()
                    .err()
                    .map(|e| (notifier.name().to_string(), e))
            })
            .collect()
    }

    async fn fetch(&self) -> Result<Snapshot> {
        match time::timeout(self.fetch_timeout, self.source.fetch_summary()).await {
            Ok(result) => Ok(result?),
            Err(_) => Err(SourceError::Timeout(self.fetch_timeout).into()),
        }
    }
}

/// Builder for [`Monitor`].
#[derive(Debug)]
pub struct MonitorBuilder {
    source: Arc<dyn SnapshotSource>,
    notify_on_first_run: bool,
    fetch_timeout: Duration,
}

impl MonitorBuilder {
    fn new(source: Arc<dyn SnapshotSource>) -> Self {
        Self {
            source,
            notify_on_first_run: false,
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
        }
    }

    /// Report the first observation instead of silently adopting it.
    pub fn notify_on_first_run(mut self, notify: bool) -> Self {
        self.notify_on_first_run = notify;
        self
    }

    /// Bound each fetch, retries included. Defaults to 10 seconds.
    pub fn fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = timeout;
        self
    }

    pub fn build(self) -> Monitor {
        Monitor {
            source: self.source,
            notifiers: RwLock::new(BTreeMap::new()),
            notify_on_first_run: self.notify_on_first_run,
            fetch_timeout: self.fetch_timeout,
        }
    }
}

/// Wait for the next tick. Returns `false` once shutdown is requested.
async fn next_tick<T: Ticker>(shutdown: &mut watch::Receiver<bool>, ticker: &mut T) -> bool {
    loop {
        tokio::select! {
            biased;
            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow_and_update() {
                    return false;
                }
            }
            _ = ticker.tick() => return true,
        }
    }
}

fn panic_message(payload: Box<dyn std::any::Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::ChannelSource;
    use crate::ticker::ManualTicker;
    use async_trait::async_trait;
    use chrono::{Duration as ChronoDuration, TimeZone, Utc};
    use parking_lot::Mutex;
    use statuswatch_types::{Component, ComponentStatus, Indicator, Status, Timestamp};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::mpsc;

    fn t(minute: i64) -> Timestamp {
        Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap() + ChronoDuration::minutes(minute)
    }

    #[derive(Debug, Default)]
    struct Recorder {
        name: &'static str,
        messages: Mutex<Vec<Message>>,
        cleanups: AtomicUsize,
        forward: Option<mpsc::UnboundedSender<Message>>,
    }

    impl Recorder {
        fn named(name: &'static str) -> Arc<Self> {
            Arc::new(Self {
                name,
                ..Default::default()
            })
        }

        fn forwarding(name: &'static str) -> (Arc<Self>, mpsc::UnboundedReceiver<Message>) {
            let (tx, rx) = mpsc::unbounded_channel();
            let recorder = Arc::new(Self {
                name,
                forward: Some(tx),
                ..Default::default()
            });
            (recorder, rx)
        }

        fn messages(&self) -> Vec<Message> {
            self.messages.lock().clone()
        }
    }

    #[async_trait]
    impl Notifier for Recorder {
        fn name(&self) -> &str {
            self.name
        }

        async fn notify(&self, message: &Message) -> Result<(), NotifyError> {
            self.messages.lock().push(message.clone());
            if let Some(tx) = &self.forward {
                let _ = tx.send(message.clone());
            }
            Ok(())
        }

        fn cleanup(&self) -> Result<(), NotifyError> {
            self.cleanups.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    #[derive(Debug)]
    struct Failing;

    #[async_trait]
    impl Notifier for Failing {
        fn name(&self) -> &str {
            "failing"
        }

        async fn notify(&self, _message: &Message) -> Result<(), NotifyError> {
            Err(NotifyError::Api {
                service: "Test",
                reason: "rejected".to_string(),
            })
        }

        fn cleanup(&self) -> Result<(), NotifyError> {
            Err(NotifyError::Cleanup(std::io::Error::other("flush failed")))
        }
    }

    #[derive(Debug)]
    struct Panicking;

    #[async_trait]
    impl Notifier for Panicking {
        fn name(&self) -> &str {
            "panicking"
        }

        async fn notify(&self, _message: &Message) -> Result<(), NotifyError> {
            panic!("notifier exploded");
        }
    }

    #[derive(Debug)]
    struct Stalled;

    #[async_trait]
    impl SnapshotSource for Stalled {
        async fn fetch_summary(&self) -> Result<Snapshot, SourceError> {
            time::sleep(Duration::from_secs(3600)).await;
            Ok(Snapshot::default())
        }

        fn description(&self) -> &str {
            "stalled"
        }
    }

    fn outage(at: Timestamp) -> Snapshot {
        Snapshot::builder()
            .updated_at(at)
            .status(Indicator::Major, "outage")
            .build()
    }

    #[tokio::test]
    async fn test_first_run_then_unchanged_then_new_component() {
        let (tx, source) = ChannelSource::create("test");
        let monitor = Monitor::builder(source).notify_on_first_run(true).build();
        let recorder = Recorder::named("recorder");
        monitor.register_notifier(recorder.clone()).unwrap();

        let mut last = Snapshot::default();

        tx.send(outage(t(1))).unwrap();
        assert_eq!(monitor.tick(&mut last).await.unwrap(), TickOutcome::Delivered(1));
        assert_eq!(
            recorder.messages(),
            vec![Message {
                changed_status: Some(Status::new(Indicator::Major, "outage")),
                ..Default::default()
            }]
        );
        assert_eq!(last.updated_at(), Some(t(1)));

        // Same page timestamp, different content: ignored, last kept.
        let mut same_time = outage(t(1));
        same_time.status = Status::new(Indicator::None, "fine");
        tx.send(same_time).unwrap();
        assert_eq!(monitor.tick(&mut last).await.unwrap(), TickOutcome::Unchanged);
        assert_eq!(last, outage(t(1)));
        assert_eq!(recorder.messages().len(), 1);

        let a1 = Component::new("A", ComponentStatus::Operational, t(1));
        last.components.push(a1);
        let a2 = Component::new("A", ComponentStatus::MajorOutage, t(2));
        let b2 = Component::new("B", ComponentStatus::Operational, t(2));
        let mut next = outage(t(2));
        next.components = vec![a2.clone(), b2.clone()];
        tx.send(next.clone()).unwrap();

        assert_eq!(monitor.tick(&mut last).await.unwrap(), TickOutcome::Delivered(1));
        assert_eq!(recorder.messages()[1].changed_components, vec![a2, b2]);
        assert_eq!(last, next);
    }

    #[tokio::test]
    async fn test_first_run_is_adopted_silently() {
        let (tx, source) = ChannelSource::create("test");
        let monitor = Monitor::builder(source).build();
        let recorder = Recorder::named("recorder");
        monitor.register_notifier(recorder.clone()).unwrap();

        tx.send(outage(t(1))).unwrap();
        let mut last = Snapshot::default();
        assert_eq!(monitor.tick(&mut last).await.unwrap(), TickOutcome::FirstRun);
        assert_eq!(last, outage(t(1)));
        assert!(recorder.messages().is_empty());

        let mut moved = outage(t(2));
        moved.page.name = "GitHub".to_string();
        tx.send(moved.clone()).unwrap();
        assert_eq!(monitor.tick(&mut last).await.unwrap(), TickOutcome::NoChanges);
        assert_eq!(last, moved);
    }

    #[test]
    fn test_duplicate_notifier_is_rejected() {
        let (_tx, source) = ChannelSource::create("test");
        let monitor = Monitor::builder(source).build();
        let first = Recorder::named("stdout");
        monitor.register_notifier(first.clone()).unwrap();

        let err = monitor
            .register_notifier(Recorder::named("stdout"))
            .unwrap_err();
        assert!(matches!(err, Error::DuplicateNotifier(ref name) if name == "stdout"));
        assert_eq!(monitor.notifier_names(), vec!["stdout"]);

        monitor.cleanup();
        assert_eq!(first.cleanups.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_failing_notifier_does_not_block_others() {
        let (_tx, source) = ChannelSource::create("test");
        let monitor = Monitor::builder(source).build();
        let recorder = Recorder::named("recorder");
        monitor.register_notifier(Arc::new(Failing)).unwrap();
        monitor.register_notifier(Arc::new(Panicking)).unwrap();
        monitor.register_notifier(recorder.clone()).unwrap();

        let message = Message {
            changed_status: Some(Status::new(Indicator::Minor, "Degraded")),
            ..Default::default()
        };
        let errors = monitor.dispatch(message.clone()).await.unwrap_err();

        assert_eq!(errors.len(), 2);
        assert_eq!(errors.notifiers().collect::<Vec<_>>(), vec!["failing", "panicking"]);
        assert!(matches!(errors.0[1].1, NotifyError::Panicked(ref m) if m == "notifier exploded"));
        assert_eq!(recorder.messages(), vec![message]);
    }

    #[tokio::test]
    async fn test_delivery_failure_still_updates_last() {
        let (tx, source) = ChannelSource::create("test");
        let monitor = Monitor::builder(source).notify_on_first_run(true).build();
        monitor.register_notifier(Arc::new(Failing)).unwrap();

        tx.send(outage(t(1))).unwrap();
        let mut last = Snapshot::default();
        let err = monitor.tick(&mut last).await.unwrap_err();

        assert!(matches!(err, Error::Delivery(_)));
        assert_eq!(last, outage(t(1)));
    }

    #[tokio::test]
    async fn test_fetch_failure_keeps_last() {
        let (tx, source) = ChannelSource::create("test");
        let monitor = Monitor::builder(source).build();
        let mut last = outage(t(1));
        drop(tx);

        let err = monitor.tick(&mut last).await.unwrap_err();
        assert!(matches!(err, Error::Fetch(SourceError::Closed)));
        assert_eq!(last, outage(t(1)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_fetch_is_bounded_by_timeout() {
        let monitor = Monitor::builder(Stalled)
            .fetch_timeout(Duration::from_secs(2))
            .build();

        let mut last = Snapshot::default();
        let err = monitor.tick(&mut last).await.unwrap_err();
        assert!(matches!(err, Error::Fetch(SourceError::Timeout(d)) if d == Duration::from_secs(2)));
        assert!(last.is_bootstrap());
    }

    #[tokio::test]
    async fn test_run_loop_with_manual_ticker() {
        let (tx, source) = ChannelSource::create("test");
        let monitor = Arc::new(Monitor::builder(source).notify_on_first_run(true).build());
        let (recorder, mut received) = Recorder::forwarding("recorder");
        monitor.register_notifier(recorder.clone()).unwrap();
        tx.send(outage(t(1))).unwrap();

        let (ticker, handle) = ManualTicker::new();
        let (stop, shutdown) = watch::channel(false);
        let running = {
            let monitor = monitor.clone();
            tokio::spawn(async move { monitor.run_with_ticker(shutdown, ticker).await })
        };

        // Cycle 0 runs without waiting for a tick.
        let first = received.recv().await.unwrap();
        assert_eq!(first.changed_status, Some(Status::new(Indicator::Major, "outage")));

        // Registered mid-run, takes part from the next dispatch.
        let (late, mut late_received) = Recorder::forwarding("late");
        monitor.register_notifier(late).unwrap();

        let mut resolved = outage(t(2));
        resolved.status = Status::new(Indicator::None, "All Systems Operational");
        tx.send(resolved).unwrap();
        assert!(handle.tick());

        let second = received.recv().await.unwrap();
        assert_eq!(
            second.changed_status,
            Some(Status::new(Indicator::None, "All Systems Operational"))
        );
        assert_eq!(late_received.recv().await.unwrap(), second);

        stop.send(true).unwrap();
        running.await.unwrap();
        assert_eq!(recorder.messages().len(), 2);
    }

    #[tokio::test]
    async fn test_run_stops_when_shutdown_sender_dropped() {
        let (_tx, source) = ChannelSource::create("test");
        let monitor = Monitor::builder(source).build();
        let (ticker, _handle) = ManualTicker::new();
        let (stop, shutdown) = watch::channel(false);
        drop(stop);

        time::timeout(Duration::from_secs(5), monitor.run_with_ticker(shutdown, ticker))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_run_does_nothing_when_already_stopped() {
        let (tx, source) = ChannelSource::create("test");
        let monitor = Monitor::builder(source).notify_on_first_run(true).build();
        let recorder = Recorder::named("recorder");
        monitor.register_notifier(recorder.clone()).unwrap();
        tx.send(outage(t(1))).unwrap();

        let (_stop, shutdown) = watch::channel(true);
        monitor.run(shutdown, Duration::from_secs(60)).await;
        assert!(recorder.messages().is_empty());
    }

    #[tokio::test]
    async fn test_cleanup_reports_failures() {
        let (_tx, source) = ChannelSource::create("test");
        let monitor = Monitor::builder(source).build();
        let recorder = Recorder::named("recorder");
        monitor.register_notifier(recorder.clone()).unwrap();
        monitor.register_notifier(Arc::new(Failing)).unwrap();

        let failures = monitor.cleanup();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].0, "failing");
        assert_eq!(recorder.cleanups.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_dispatch_without_notifiers() {
        let (_tx, source) = ChannelSource::create("test");
        let monitor = Monitor::builder(source).build();
        assert_eq!(monitor.dispatch(Message::default()).await.unwrap(), 0);
    }
}
