//! Background re-evaluation of finished itineraries against live conditions.
//!
//! Each monitored itinerary gets one session: a spawned ticker task that runs an
//! evaluation cycle every [`MonitorConfig::interval`]. A cycle runs all detectors
//! concurrently, derives adjustment proposals, replaces the session's active
//! alerts, persists history and notifies subscribers.

mod adjustments;
mod detectors;
mod notify;
mod session;

use crate::config::MonitorConfig;
use crate::core::clock::{Clock, SystemClock};
use crate::error::{PlannerError, Result};
use crate::providers::{AlertStore, Providers};
use crate::types::{Alert, AlertBatch, EvaluationReport, Itinerary};
use detectors::Scan;
use notify::{adjustment_notification, alert_notifications, Subscribers};
use session::{CycleGuard, MonitoringSession};
use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

pub use notify::{AlertCallback, Subscription};
pub use session::SessionStatus;

struct EngineInner {
    providers: Providers,
    config: MonitorConfig,
    clock: Arc<dyn Clock>,
    sessions: Mutex<HashMap<String, MonitoringSession>>,
    subscribers: Arc<Subscribers>,
    generations: AtomicU64,
}

/// Owns every monitoring session. Cheap to clone; clones share state.
#[derive(Clone)]
pub struct MonitoringEngine {
    inner: Arc<EngineInner>,
}

impl fmt::Debug for MonitoringEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MonitoringEngine")
            .field("config", &self.inner.config)
            .field("clock", &self.inner.clock)
            .field("subscribers", &self.inner.subscribers)
            .finish()
    }
}

impl MonitoringEngine {
    pub fn new(providers: Providers, config: MonitorConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            inner: Arc::new(EngineInner {
                providers,
                config,
                clock,
                sessions: Mutex::new(HashMap::new()),
                subscribers: Arc::new(Subscribers::default()),
                generations: AtomicU64::new(0),
            }),
        }
    }

    /// Default settings and the system clock.
    pub fn with_defaults(providers: Providers) -> Self {
        Self::new(providers, MonitorConfig::default(), Arc::new(SystemClock::default()))
    }

    pub fn config(&self) -> &MonitorConfig {
        &self.inner.config
    }

    /// Starts monitoring `itinerary`, replacing any session for the same id.
    ///
    /// The first cycle runs before this returns; its report is returned unless
    /// the session was stopped or superseded meanwhile.
    pub async fn start(&self, itinerary: Itinerary, user_id: Option<&str>) -> Option<EvaluationReport> {
        let id = itinerary.id.clone();
        let generation = self.inner.generations.fetch_add(1, Ordering::SeqCst) + 1;
        let session = MonitoringSession::new(itinerary, user_id.map(str::to_string), generation);
        let cancel = session.cancel.clone();

        {
            let mut sessions = self.inner.sessions.lock().await;
            if let Some(previous) = sessions.insert(id.clone(), session) {
                previous.cancel.cancel();
                info!(
                    target: "itinerary::monitor",
                    itinerary_id = %id,
                    generation = previous.generation,
                    "superseded monitoring session"
                );
            }
        }
        info!(target: "itinerary::monitor", itinerary_id = %id, generation, "monitoring started");

        let report = run_cycle(&self.inner, &id, generation).await;

        let task = tokio::spawn(run_ticker(
            Arc::downgrade(&self.inner),
            id.clone(),
            generation,
            self.inner.config.interval,
            cancel,
        ));
        let mut sessions = self.inner.sessions.lock().await;
        if let Some(session) = sessions.get_mut(&id).filter(|s| s.generation == generation) {
            session.task = Some(task);
        }
        report
    }

    /// Cancels the recurring evaluation for `itinerary_id` and drops its state.
    /// A cycle already running is allowed to finish. No-op when nothing is monitored.
    pub async fn stop(&self, itinerary_id: &str) -> bool {
        let removed = self.inner.sessions.lock().await.remove(itinerary_id);
        match removed {
            Some(session) => {
                session.cancel.cancel();
                info!(
                    target: "itinerary::monitor",
                    itinerary_id,
                    cycles = session.cycles,
                    "monitoring stopped"
                );
                true
            }
            None => false,
        }
    }

    /// Stops every session and waits for their ticker tasks to exit.
    pub async fn shutdown(&self) {
        let sessions: Vec<MonitoringSession> = {
            let mut guard = self.inner.sessions.lock().await;
            guard.drain().map(|(_, session)| session).collect()
        };
        for session in &sessions {
            session.cancel.cancel();
        }
        for session in sessions {
            if let Some(task) = session.task {
                if let Err(err) = task.await {
                    warn!(target: "itinerary::monitor", error = %err, "monitoring task ended abnormally");
                }
            }
        }
        info!(target: "itinerary::monitor", "monitoring engine shut down");
    }

    pub async fn is_monitoring(&self, itinerary_id: &str) -> bool {
        self.inner.sessions.lock().await.contains_key(itinerary_id)
    }

    /// Ids of all monitored itineraries.
    pub async fn monitored(&self) -> Vec<String> {
        self.inner.sessions.lock().await.keys().cloned().collect()
    }

    pub async fn session_status(&self, itinerary_id: &str) -> Option<SessionStatus> {
        self.inner
            .sessions
            .lock()
            .await
            .get(itinerary_id)
            .map(MonitoringSession::status)
    }

    /// Alerts found by the latest completed cycle.
    pub async fn active_alerts(&self, itinerary_id: &str) -> Vec<Alert> {
        self.inner
            .sessions
            .lock()
            .await
            .get(itinerary_id)
            .map(|session| session.active_alerts.clone())
            .unwrap_or_default()
    }

    pub async fn clear_alerts(&self, itinerary_id: &str) {
        if let Some(session) = self.inner.sessions.lock().await.get_mut(itinerary_id) {
            session.active_alerts.clear();
        }
    }

    /// The session's itinerary, including auto-applied adjustments.
    pub async fn itinerary(&self, itinerary_id: &str) -> Option<Itinerary> {
        self.inner
            .sessions
            .lock()
            .await
            .get(itinerary_id)
            .map(|session| session.itinerary.clone())
    }

    /// Persisted alert batches, newest first.
    pub async fn alert_history(&self, itinerary_id: &str) -> Result<Vec<AlertBatch>> {
        match &self.inner.providers.alerts {
            Some(store) => store.alert_history(itinerary_id, self.inner.config.history_limit).await,
            None => Ok(Vec::new()),
        }
    }

    /// Runs a cycle for a monitored itinerary right away. `None` when the id is
    /// not monitored or another cycle for it is still running.
    pub async fn evaluate_now(&self, itinerary_id: &str) -> Option<EvaluationReport> {
        let generation = self
            .inner
            .sessions
            .lock()
            .await
            .get(itinerary_id)
            .map(|session| session.generation)?;
        run_cycle(&self.inner, itinerary_id, generation).await
    }

    /// Evaluates an itinerary without a session: nothing is persisted or broadcast.
    pub async fn evaluate_once(&self, itinerary: &Itinerary) -> EvaluationReport {
        evaluate(&self.inner, itinerary).await
    }

    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&str, &[Alert]) + Send + Sync + 'static,
    {
        let id = self.inner.subscribers.add(Arc::new(callback));
        Subscription::new(id, &self.inner.subscribers)
    }
}

async fn run_ticker(
    inner: Weak<EngineInner>,
    itinerary_id: String,
    generation: u64,
    period: Duration,
    cancel: CancellationToken,
) {
    let mut ticker = interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = ticker.tick() => {
                let Some(inner) = inner.upgrade() else {
                    break;
                };
                run_cycle(&inner, &itinerary_id, generation).await;
            }
        }
    }
    debug!(target: "itinerary::monitor", itinerary_id = %itinerary_id, generation, "ticker stopped");
}

async fn bounded<F>(detector: &'static str, limit: Duration, run: F) -> (&'static str, Result<Vec<Alert>>)
where
    F: Future<Output = Result<Vec<Alert>>>,
{
    let outcome = match tokio::time::timeout(limit, run).await {
        Ok(result) => result,
        Err(_) => Err(PlannerError::Timeout(format!(
            "{} detector exceeded {:?}",
            detector, limit
        ))),
    };
    (detector, outcome)
}

async fn evaluate(inner: &EngineInner, itinerary: &Itinerary) -> EvaluationReport {
    let scan = Scan {
        itinerary,
        now: inner.clock.local_now(),
        detected_at: inner.clock.now(),
        config: &inner.config,
    };
    let providers = &inner.providers;
    let limit = inner.config.cycle_timeout;

    let outcomes = futures::join!(
        bounded("weather", limit, detectors::weather_alerts(&scan, providers.weather.as_deref())),
        bounded("place_status", limit, detectors::place_status_alerts(&scan, providers.status.as_deref())),
        bounded("traffic", limit, detectors::traffic_alerts(&scan, providers.traffic.as_deref())),
        bounded("pricing", limit, detectors::pricing_alerts(&scan, providers.pricing.as_deref())),
        bounded("crowd", limit, detectors::crowd_alerts(&scan)),
    );

    let mut alerts = Vec::new();
    let mut failed_detectors = Vec::new();
    for (detector, outcome) in [outcomes.0, outcomes.1, outcomes.2, outcomes.3, outcomes.4] {
        match outcome {
            Ok(found) => alerts.extend(found),
            Err(err) => {
                warn!(
                    target: "itinerary::monitor",
                    itinerary_id = %itinerary.id,
                    detector,
                    error = %err,
                    "detector failed"
                );
                failed_detectors.push(detector.to_string());
            }
        }
    }
    alerts.sort_by_key(|alert| alert.severity);

    let proposals = match tokio::time::timeout(
        limit,
        adjustments::propose_adjustments(&alerts, itinerary, providers, &inner.config),
    )
    .await
    {
        Ok(proposals) => proposals,
        Err(_) => {
            warn!(target: "itinerary::monitor", itinerary_id = %itinerary.id, "adjustment search timed out");
            failed_detectors.push("adjustments".to_string());
            Vec::new()
        }
    };

    debug!(
        target: "itinerary::monitor",
        itinerary_id = %itinerary.id,
        alerts = alerts.len(),
        proposals = proposals.len(),
        "evaluation finished"
    );

    EvaluationReport {
        itinerary_id: itinerary.id.clone(),
        evaluated_at: scan.detected_at,
        alerts,
        proposals,
        failed_detectors,
    }
}

/// One cycle for the session `(itinerary_id, generation)`. Results of a session
/// stopped or superseded while the cycle ran are discarded.
async fn run_cycle(inner: &EngineInner, itinerary_id: &str, generation: u64) -> Option<EvaluationReport> {
    let (itinerary, user_id, in_flight) = {
        let sessions = inner.sessions.lock().await;
        let session = sessions.get(itinerary_id).filter(|s| s.generation == generation)?;
        (
            session.planned.clone(),
            session.user_id.clone(),
            Arc::clone(&session.in_flight),
        )
    };

    let Some(_guard) = CycleGuard::acquire(&in_flight) else {
        warn!(
            target: "itinerary::monitor",
            itinerary_id,
            "previous cycle still running, skipping"
        );
        return None;
    };

    let report = evaluate(inner, &itinerary).await;

    {
        let mut sessions = inner.sessions.lock().await;
        match sessions.get_mut(itinerary_id).filter(|s| s.generation == generation) {
            Some(session) => session.record(&report),
            None => {
                debug!(
                    target: "itinerary::monitor",
                    itinerary_id,
                    generation,
                    "session ended during cycle, discarding results"
                );
                return None;
            }
        }
    }

    dispatch(inner, user_id.as_deref(), &report).await;
    Some(report)
}

/// Persists and announces a cycle's results. Store failures are logged and
/// never stop the remaining deliveries.
async fn dispatch(inner: &EngineInner, user_id: Option<&str>, report: &EvaluationReport) {
    if report.alerts.is_empty() {
        return;
    }
    let itinerary_id = report.itinerary_id.as_str();
    let store = inner.providers.alerts.as_deref();

    info!(
        target: "itinerary::monitor",
        itinerary_id,
        alerts = report.alerts.len(),
        proposals = report.proposals.len(),
        "processing alerts"
    );

    let mut notifications = Vec::new();
    if !report.proposals.is_empty() {
        if let Some(store) = store {
            if let Err(err) = store.persist_adjustments(itinerary_id, &report.proposals).await {
                warn!(target: "itinerary::monitor", itinerary_id, error = %err, "failed to persist adjustments");
            }
        }
        notifications.push(adjustment_notification(itinerary_id, &report.proposals, report.evaluated_at));
    }
    notifications.extend(alert_notifications(itinerary_id, &report.alerts, report.evaluated_at));

    if let Some(store) = store {
        deliver(store, user_id, &notifications).await;

        let batch = AlertBatch {
            itinerary_id: itinerary_id.to_string(),
            alerts: report.alerts.clone(),
            recorded_at: report.evaluated_at,
        };
        if let Err(err) = store.persist_alert_batch(&batch).await {
            warn!(target: "itinerary::monitor", itinerary_id, error = %err, "failed to persist alert batch");
        }
    }

    let delivered = inner.subscribers.broadcast(itinerary_id, &report.alerts);
    debug!(target: "itinerary::monitor", itinerary_id, delivered, "subscribers notified");
}

async fn deliver(store: &dyn AlertStore, user_id: Option<&str>, notifications: &[crate::types::Notification]) {
    let Some(user_id) = user_id else {
        debug!(target: "itinerary::monitor", "no user to notify");
        return;
    };
    for notification in notifications {
        if let Err(err) = store.persist_notification(user_id, notification).await {
            warn!(
                target: "itinerary::monitor",
                user_id,
                title = %notification.title,
                error = %err,
                "failed to send notification"
            );
        }
    }
}
