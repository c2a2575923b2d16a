use super::{AlertStore, ItineraryStore};
use crate::error::Result;
use crate::types::{AdjustmentProposal, AlertBatch, Itinerary, Notification};
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::debug;

/// Process-local alert history, notification outbox and itinerary store.
#[derive(Debug, Default)]
pub struct InMemoryAlertStore {
    batches: RwLock<HashMap<String, Vec<AlertBatch>>>,
    notifications: RwLock<Vec<(String, Notification)>>,
    adjustments: RwLock<HashMap<String, Vec<AdjustmentProposal>>>,
    itineraries: RwLock<HashMap<String, Itinerary>>,
}

impl InMemoryAlertStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every notification sent so far with its recipient, oldest first.
    pub async fn notifications(&self) -> Vec<(String, Notification)> {
        self.notifications.read().await.clone()
    }

    pub async fn adjustments(&self, itinerary_id: &str) -> Vec<AdjustmentProposal> {
        self.adjustments
            .read()
            .await
            .get(itinerary_id)
            .cloned()
            .unwrap_or_default()
    }

    pub async fn itinerary(&self, itinerary_id: &str) -> Option<Itinerary> {
        self.itineraries.read().await.get(itinerary_id).cloned()
    }

    pub async fn batch_count(&self, itinerary_id: &str) -> usize {
        self.batches
            .read()
            .await
            .get(itinerary_id)
            .map(Vec::len)
            .unwrap_or(0)
    }
}

#[async_trait]
impl AlertStore for InMemoryAlertStore {
    async fn persist_alert_batch(&self, batch: &AlertBatch) -> Result<()> {
        let mut batches = self.batches.write().await;
        batches
            .entry(batch.itinerary_id.clone())
            .or_default()
            .push(batch.clone());
        debug!(
            target: "itinerary::monitor",
            itinerary_id = %batch.itinerary_id,
            alerts = batch.alerts.len(),
            "alert batch stored"
        );
        Ok(())
    }

    async fn persist_notification(&self, user_id: &str, notification: &Notification) -> Result<()> {
        self.notifications
            .write()
            .await
            .push((user_id.to_string(), notification.clone()));
        Ok(())
    }

    async fn persist_adjustments(&self, itinerary_id: &str, proposals: &[AdjustmentProposal]) -> Result<()> {
        self.adjustments
            .write()
            .await
            .entry(itinerary_id.to_string())
            .or_default()
            .extend_from_slice(proposals);
        Ok(())
    }

    async fn alert_history(&self, itinerary_id: &str, limit: usize) -> Result<Vec<AlertBatch>> {
        let batches = self.batches.read().await;
        Ok(batches
            .get(itinerary_id)
            .map(|list| list.iter().rev().take(limit).cloned().collect())
            .unwrap_or_default())
    }
}

#[async_trait]
impl ItineraryStore for InMemoryAlertStore {
    async fn save_itinerary(&self, itinerary: &Itinerary) -> Result<()> {
        self.itineraries
            .write()
            .await
            .insert(itinerary.id.clone(), itinerary.clone());
        Ok(())
    }
}
