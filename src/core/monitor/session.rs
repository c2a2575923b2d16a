use crate::core::monitor::adjustments::apply_auto_adjustments;
use crate::types::{Alert, EvaluationReport, Itinerary};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Monitoring state for one itinerary id.
#[derive(Debug)]
pub(crate) struct MonitoringSession {
    /// The itinerary as handed to `start`; detectors and proposals always read this copy
    pub planned: Itinerary,
    /// `planned` with auto adjustments applied
    pub itinerary: Itinerary,
    pub user_id: Option<String>,
    /// Distinguishes this session from earlier ones for the same id
    pub generation: u64,
    pub cancel: CancellationToken,
    pub in_flight: Arc<AtomicBool>,
    pub task: Option<JoinHandle<()>>,
    pub active_alerts: Vec<Alert>,
    pub last_evaluated_at: Option<DateTime<Utc>>,
    pub cycles: u64,
    pub adjustments_applied: usize,
}

impl MonitoringSession {
    pub fn new(itinerary: Itinerary, user_id: Option<String>, generation: u64) -> Self {
        Self {
            planned: itinerary.clone(),
            itinerary,
            user_id,
            generation,
            cancel: CancellationToken::new(),
            in_flight: Arc::new(AtomicBool::new(false)),
            task: None,
            active_alerts: Vec::new(),
            last_evaluated_at: None,
            cycles: 0,
            adjustments_applied: 0,
        }
    }

    /// Replaces the active alert set wholesale and applies auto adjustments.
    /// Proposals derive from `planned`, so a condition that persists across
    /// cycles maps to the same departure and is applied only once.
    pub fn record(&mut self, report: &EvaluationReport) {
        self.active_alerts = report.alerts.clone();
        self.last_evaluated_at = Some(report.evaluated_at);
        self.cycles += 1;
        self.adjustments_applied += apply_auto_adjustments(&mut self.itinerary, &report.proposals);
    }

    pub fn status(&self) -> SessionStatus {
        SessionStatus {
            itinerary_id: self.itinerary.id.clone(),
            generation: self.generation,
            cycles: self.cycles,
            last_evaluated_at: self.last_evaluated_at,
            active_alerts: self.active_alerts.len(),
            adjustments_applied: self.adjustments_applied,
            cycle_running: self.in_flight.load(Ordering::Acquire),
        }
    }
}

/// Point-in-time view of a monitoring session.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionStatus {
    pub itinerary_id: String,
    pub generation: u64,
    /// Completed evaluation cycles
    pub cycles: u64,
    pub last_evaluated_at: Option<DateTime<Utc>>,
    pub active_alerts: usize,
    pub adjustments_applied: usize,
    pub cycle_running: bool,
}

/// Held for the duration of one cycle; a second cycle for the same session cannot acquire it.
#[derive(Debug)]
pub(crate) struct CycleGuard(Arc<AtomicBool>);

impl CycleGuard {
    pub fn acquire(flag: &Arc<AtomicBool>) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(Arc::clone(flag)))
    }
}

impl Drop for CycleGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guard_is_exclusive_until_dropped() {
        let flag = Arc::new(AtomicBool::new(false));
        let first = CycleGuard::acquire(&flag);
        assert!(first.is_some());
        assert!(CycleGuard::acquire(&flag).is_none());
        drop(first);
        assert!(CycleGuard::acquire(&flag).is_some());
    }
}
