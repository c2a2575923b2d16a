use crate::types::{AdjustmentProposal, Alert, Notification, NotificationKind, Severity};
use chrono::{DateTime, Utc};
use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock, Weak};
use tracing::warn;

/// Receives `(itinerary_id, alerts)` after every cycle that detected something.
pub type AlertCallback = dyn Fn(&str, &[Alert]) + Send + Sync;

#[derive(Default)]
pub(crate) struct Subscribers {
    next_id: AtomicU64,
    callbacks: RwLock<Vec<(u64, Arc<AlertCallback>)>>,
}

impl fmt::Debug for Subscribers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscribers").field("count", &self.len()).finish()
    }
}

impl Subscribers {
    pub fn add(&self, callback: Arc<AlertCallback>) -> u64 {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.callbacks
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push((id, callback));
        id
    }

    pub fn remove(&self, id: u64) -> bool {
        let mut callbacks = self.callbacks.write().unwrap_or_else(|poisoned| poisoned.into_inner());
        let before = callbacks.len();
        callbacks.retain(|(known, _)| *known != id);
        callbacks.len() != before
    }

    pub fn len(&self) -> usize {
        self.callbacks
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }

    /// Calls every subscriber; a panicking one is logged and skipped.
    /// Returns how many returned normally.
    pub fn broadcast(&self, itinerary_id: &str, alerts: &[Alert]) -> usize {
        let callbacks: Vec<Arc<AlertCallback>> = self
            .callbacks
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .iter()
            .map(|(_, callback)| Arc::clone(callback))
            .collect();

        let mut delivered = 0;
        for callback in callbacks {
            match catch_unwind(AssertUnwindSafe(|| callback(itinerary_id, alerts))) {
                Ok(()) => delivered += 1,
                Err(_) => warn!(
                    target: "itinerary::monitor",
                    itinerary_id,
                    "alert subscriber panicked"
                ),
            }
        }
        delivered
    }
}

/// Handle returned by `MonitoringEngine::subscribe`.
#[derive(Debug)]
pub struct Subscription {
    id: u64,
    subscribers: Weak<Subscribers>,
}

impl Subscription {
    pub(crate) fn new(id: u64, subscribers: &Arc<Subscribers>) -> Self {
        Self {
            id,
            subscribers: Arc::downgrade(subscribers),
        }
    }

    /// Returns false if the subscription was already gone.
    pub fn unsubscribe(self) -> bool {
        self.subscribers
            .upgrade()
            .map(|subscribers| subscribers.remove(self.id))
            .unwrap_or(false)
    }
}

fn tier_text(severity: Severity, count: usize) -> (&'static str, String) {
    match severity {
        Severity::High => (
            "🚨 Cảnh báo quan trọng cho chuyến đi",
            format!("{} cảnh báo cần xử lý ngay", count),
        ),
        Severity::Medium => ("⚠️ Cập nhật cho chuyến đi", format!("{} thông báo mới", count)),
        Severity::Low => ("ℹ️ Thông tin chuyến đi", format!("{} thông tin tham khảo", count)),
    }
}

/// One notification per severity tier present, high first.
pub(crate) fn alert_notifications(itinerary_id: &str, alerts: &[Alert], at: DateTime<Utc>) -> Vec<Notification> {
    Severity::ALL
        .iter()
        .filter_map(|severity| {
            let count = alerts.iter().filter(|alert| alert.severity == *severity).count();
            if count == 0 {
                return None;
            }
            let (title, body) = tier_text(*severity, count);
            Some(Notification {
                kind: NotificationKind::Alert,
                itinerary_id: itinerary_id.to_string(),
                severity: Some(*severity),
                title: title.to_string(),
                body,
                count: count as u32,
                created_at: at,
            })
        })
        .collect()
}

pub(crate) fn adjustment_notification(
    itinerary_id: &str,
    proposals: &[AdjustmentProposal],
    at: DateTime<Utc>,
) -> Notification {
    Notification {
        kind: NotificationKind::Adjustment,
        itinerary_id: itinerary_id.to_string(),
        severity: None,
        title: "🔄 Đề xuất điều chỉnh lịch trình".to_string(),
        body: format!("{} điều chỉnh được đề xuất cho chuyến đi", proposals.len()),
        count: proposals.len() as u32,
        created_at: at,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::AlertType;
    use std::sync::atomic::AtomicUsize;

    fn alert(severity: Severity) -> Alert {
        Alert::new(AlertType::CrowdHigh, severity, "t", "m", Utc::now())
    }

    #[test]
    fn test_one_notification_per_tier() {
        let alerts = vec![alert(Severity::Low), alert(Severity::High), alert(Severity::High)];
        let notifications = alert_notifications("trip", &alerts, Utc::now());
        assert_eq!(notifications.len(), 2);
        assert_eq!(notifications[0].severity, Some(Severity::High));
        assert_eq!(notifications[0].body, "2 cảnh báo cần xử lý ngay");
        assert_eq!(notifications[1].severity, Some(Severity::Low));
    }

    #[test]
    fn test_panicking_subscriber_does_not_block_others() {
        let subscribers = Arc::new(Subscribers::default());
        let calls = Arc::new(AtomicUsize::new(0));
        subscribers.add(Arc::new(|_: &str, _: &[Alert]| panic!("boom")));
        let counter = Arc::clone(&calls);
        subscribers.add(Arc::new(move |_: &str, alerts: &[Alert]| {
            counter.fetch_add(alerts.len(), Ordering::SeqCst);
        }));

        let delivered = subscribers.broadcast("trip", &[alert(Severity::Medium)]);
        assert_eq!(delivered, 1);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_unsubscribe_removes_callback() {
        let subscribers = Arc::new(Subscribers::default());
        let id = subscribers.add(Arc::new(|_: &str, _: &[Alert]| {}));
        let subscription = Subscription::new(id, &subscribers);
        assert_eq!(subscribers.len(), 1);
        assert!(subscription.unsubscribe());
        assert_eq!(subscribers.len(), 0);
    }
}
