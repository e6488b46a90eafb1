use std::fmt::Debug;

use log::*;
use reseller_tools::OrderGateway;

use crate::{
    db_types::TransactionStatus,
    events::{EventProducers, StatusChangedEvent},
    topup_api::{
        checkout_objects::{FailedReconciliation, ReconcileReport, SyncOutcome},
        errors::ReconcileError,
    },
    traits::{StoreError, TransactionStore},
};

/// `ReconcileApi` pulls the provider's authoritative order status and advances the local transaction to match.
///
/// Reconciliation is idempotent and always safe to retry: a provider failure leaves the transaction untouched, and a
/// terminal transaction is never sent back to the provider.
pub struct ReconcileApi<B, G> {
    db: B,
    gateway: G,
    producers: EventProducers,
}

impl<B, G> Debug for ReconcileApi<B, G> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ReconcileApi")
    }
}

impl<B, G> ReconcileApi<B, G> {
    pub fn new(db: B, gateway: G, producers: EventProducers) -> Self {
        Self { db, gateway, producers }
    }
}

impl<B, G> ReconcileApi<B, G>
where
    B: TransactionStore,
    G: OrderGateway,
{
    pub async fn sync_status(&self, invoice: &str) -> Result<SyncOutcome, ReconcileError> {
        let invoice = invoice.trim();
        if invoice.is_empty() {
            return Err(ReconcileError::Validation("invoice is required".to_string()));
        }
        let transaction = self
            .db
            .fetch_transaction_by_invoice(invoice)
            .await?
            .ok_or_else(|| ReconcileError::TransactionNotFound(invoice.to_string()))?;
        if transaction.is_final() {
            trace!("🔄️ {invoice} is already {}. Nothing to reconcile.", transaction.status);
            return Ok(SyncOutcome::AlreadyFinal { transaction });
        }
        let Some(vip_order_id) = transaction.vip_order_id.clone() else {
            trace!("🔄️ {invoice} has no external order yet. Nothing to reconcile.");
            return Ok(SyncOutcome::AwaitingExternalOrder { transaction });
        };
        let report = self.gateway.query_status(&vip_order_id).await.map_err(|e| {
            warn!("🔄️ Could not fetch the provider status of {vip_order_id} for {invoice}: {e}");
            ReconcileError::from(e)
        })?;
        let new_status = TransactionStatus::from_provider_status(&report.status);
        if new_status == transaction.status {
            debug!("🔄️ {invoice} is still {} (provider says '{}')", transaction.status, report.status);
            return Ok(SyncOutcome::Unchanged { transaction });
        }
        let old_status = transaction.status;
        match self.db.update_status(transaction.id, new_status).await {
            Ok(updated) => {
                info!("🔄️ {invoice} moved from {old_status} to {new_status}");
                let event = StatusChangedEvent::new(updated.clone(), old_status);
                self.producers.publish_status_changed(event).await;
                Ok(SyncOutcome::Updated { transaction: updated, old_status })
            },
            // Another reconciliation finished first. Report what it stored.
            Err(StoreError::InvalidStatusTransition { .. }) => {
                let current = self
                    .db
                    .fetch_transaction(transaction.id)
                    .await?
                    .ok_or_else(|| ReconcileError::TransactionNotFound(invoice.to_string()))?;
                debug!("🔄️ {invoice} was finalised concurrently as {}", current.status);
                Ok(SyncOutcome::AlreadyFinal { transaction: current })
            },
            Err(e) => Err(e.into()),
        }
    }

    /// Runs [`Self::sync_status`] over up to `limit` pending transactions that already carry an external order id,
    /// oldest first. Individual failures are collected in the report rather than aborting the sweep.
    pub async fn reconcile_pending(&self, limit: i64) -> Result<ReconcileReport, ReconcileError> {
        if limit <= 0 {
            return Err(ReconcileError::Validation("limit must be a positive integer".to_string()));
        }
        let candidates = self.db.fetch_unreconciled(limit).await?;
        debug!("🔄️ {} pending transactions to reconcile", candidates.len());
        let mut report = ReconcileReport::default();
        for tx in candidates {
            match self.sync_status(tx.invoice.as_str()).await {
                Ok(SyncOutcome::Updated { transaction, .. }) => report.updated.push(transaction.invoice),
                Ok(outcome) => report.unchanged.push(outcome.into_transaction().invoice),
                Err(e) => report.failed.push(FailedReconciliation { invoice: tx.invoice, reason: e.to_string() }),
            }
        }
        info!(
            "🔄️ Reconciliation sweep complete. {} updated, {} unchanged, {} failed",
            report.updated.len(),
            report.unchanged.len(),
            report.failed.len()
        );
        Ok(report)
    }
}
