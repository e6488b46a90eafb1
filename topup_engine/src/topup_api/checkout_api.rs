use std::fmt::Debug;

use log::*;
use reseller_tools::{data_objects::OrderRequest, OrderGateway};

use crate::{
    db_types::{NewTransaction, Product, Transaction, TransactionStatus},
    events::{DesyncEvent, DesyncKind, EventProducers, StatusChangedEvent},
    helpers::{generate_invoice, InvoiceGenerator},
    topup_api::{
        checkout_objects::{CheckoutRequest, StockPolicy},
        errors::CheckoutError,
    },
    traits::{StoreError, TopupDatabase},
};

/// `CheckoutApi` runs the purchase saga: it records a pending transaction, places the matching order with the
/// fulfillment provider and consumes one unit of inventory, keeping the local records consistent with the provider
/// on every failure path.
///
/// Per call, at most one transaction is created, at most one external order is placed and at most one unit of
/// inventory is consumed.
pub struct CheckoutApi<B, G> {
    db: B,
    gateway: G,
    producers: EventProducers,
    policy: StockPolicy,
    invoice_generator: InvoiceGenerator,
}

impl<B, G> Debug for CheckoutApi<B, G> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "CheckoutApi ({})", self.policy)
    }
}

impl<B, G> CheckoutApi<B, G> {
    pub fn new(db: B, gateway: G, producers: EventProducers) -> Self {
        Self {
            db,
            gateway,
            producers,
            policy: StockPolicy::default(),
            invoice_generator: std::sync::Arc::new(generate_invoice),
        }
    }

    pub fn with_stock_policy(mut self, policy: StockPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Replaces the default invoice source.
    pub fn with_invoice_generator(mut self, generator: InvoiceGenerator) -> Self {
        self.invoice_generator = generator;
        self
    }

    pub fn stock_policy(&self) -> StockPolicy {
        self.policy
    }

    pub fn db(&self) -> &B {
        &self.db
    }
}

impl<B, G> CheckoutApi<B, G>
where
    B: TopupDatabase,
    G: OrderGateway,
{
    /// Process a purchase of one unit of `request.product_id`.
    ///
    /// On success the persisted transaction is returned. It is normally still `pending`: the provider's final word
    /// arrives later through [`crate::ReconcileApi::sync_status`].
    pub async fn process_checkout(&self, request: CheckoutRequest) -> Result<Transaction, CheckoutError> {
        let request = request.validate()?;
        let product = self
            .db
            .fetch_product(request.product_id)
            .await
            .map_err(|e| CheckoutError::Persistence(e.to_string()))?
            .ok_or(CheckoutError::ProductNotFound(request.product_id))?;
        if !product.is_available() {
            debug!("🛍️ Product {} ({}) is not available for checkout", product.id, product.sku);
            return Err(CheckoutError::ProductUnavailable(product.id));
        }
        match self.policy {
            StockPolicy::ReserveBeforeOrder => self.checkout_with_reservation(&product, request).await,
            StockPolicy::DecrementAfterOrder => self.checkout_then_decrement(&product, request).await,
        }
    }

    async fn checkout_with_reservation(
        &self,
        product: &Product,
        request: CheckoutRequest,
    ) -> Result<Transaction, CheckoutError> {
        match self.db.adjust_stock(product.id, -1).await {
            Ok(remaining) => trace!("🛍️ Reserved one unit of {}. {remaining} left", product.sku),
            Err(StoreError::OutOfStock(id)) => {
                debug!("🛍️ Lost the race for the last unit of {}", product.sku);
                return Err(CheckoutError::ProductUnavailable(id));
            },
            Err(StoreError::ProductNotFound(id)) => return Err(CheckoutError::ProductNotFound(id)),
            Err(e) => return Err(CheckoutError::Persistence(e.to_string())),
        }
        let transaction = match self.create_pending_transaction(product, &request).await {
            Ok(tx) => tx,
            Err(e) => {
                self.release_reservation(product).await;
                return Err(e);
            },
        };
        let placed = match self.place_order(product, &request, &transaction).await {
            Ok(order) => order,
            Err(e) => {
                self.release_reservation(product).await;
                return Err(e);
            },
        };
        match self.db.link_external_order(transaction.id, &placed).await {
            Ok(tx) => {
                info!("🛍️ Checkout {} complete. External order {placed}", tx.invoice);
                Ok(tx)
            },
            Err(e) => Err(self.desynchronized(&transaction, &placed, e.to_string()).await),
        }
    }

    async fn checkout_then_decrement(
        &self,
        product: &Product,
        request: CheckoutRequest,
    ) -> Result<Transaction, CheckoutError> {
        let transaction = self.create_pending_transaction(product, &request).await?;
        let placed = self.place_order(product, &request, &transaction).await?;
        let linked = match self.db.link_external_order(transaction.id, &placed).await {
            Ok(tx) => tx,
            Err(e) => return Err(self.desynchronized(&transaction, &placed, e.to_string()).await),
        };
        match self.db.adjust_stock(product.id, -1).await {
            Ok(remaining) => {
                info!("🛍️ Checkout {} complete. External order {placed}. {remaining} units left", linked.invoice);
                Ok(linked)
            },
            Err(StoreError::OutOfStock(_)) => {
                warn!(
                    "🛍️ Order {placed} for {} was placed, but {} is out of stock. Flagging for an operator.",
                    linked.invoice, product.sku
                );
                let note = format!("unfulfillable: external order {placed} placed after stock for {} ran out", product.sku);
                if let Err(e) = self.db.annotate(linked.id, &note).await {
                    error!("🛍️ Could not annotate {}: {e}", linked.invoice);
                }
                let event = DesyncEvent::new(DesyncKind::Unfulfillable, linked.invoice.clone(), &placed, &note);
                self.producers.publish_desync(event).await;
                Err(CheckoutError::Unfulfillable { invoice: linked.invoice, vip_order_id: placed })
            },
            Err(e) => Err(self.desynchronized(&linked, &placed, format!("inventory not consumed: {e}")).await),
        }
    }

    /// Inserts the pending transaction. An invoice collision is retried once with a fresh invoice.
    async fn create_pending_transaction(
        &self,
        product: &Product,
        request: &CheckoutRequest,
    ) -> Result<Transaction, CheckoutError> {
        let mut attempts = 0;
        loop {
            attempts += 1;
            let new_tx = NewTransaction {
                user_id: request.user_id,
                product_id: product.id,
                method: request.method,
                invoice: (self.invoice_generator)(),
                amount: product.price,
                game_id: request.game_id.clone(),
                game_server: request.game_server.clone(),
            };
            match self.db.insert_transaction(new_tx).await {
                Ok(tx) => {
                    debug!("🛍️ Pending transaction {} created for {}", tx.invoice, product.sku);
                    return Ok(tx);
                },
                Err(StoreError::InvoiceConflict(invoice)) if attempts < 2 => {
                    warn!("🛍️ Invoice {invoice} is already taken. Retrying with a fresh invoice.");
                },
                Err(StoreError::InvoiceConflict(invoice)) => {
                    error!("🛍️ Invoice {invoice} is already taken, again. Giving up.");
                    return Err(CheckoutError::InvoiceConflict(invoice));
                },
                Err(e) => return Err(CheckoutError::Persistence(e.to_string())),
            }
        }
    }

    /// Places the order with the provider and returns the provider's order id. A rejected order marks the
    /// transaction as failed before the error is returned.
    async fn place_order(
        &self,
        product: &Product,
        request: &CheckoutRequest,
        transaction: &Transaction,
    ) -> Result<String, CheckoutError> {
        let order = OrderRequest::new(request.game_id.as_str(), request.game_server.as_str(), product.sku.as_str());
        match self.gateway.place_order(&order).await {
            Ok(placed) => {
                debug!("🛍️ Provider accepted {} as order {}", transaction.invoice, placed.order_id);
                Ok(placed.order_id)
            },
            Err(e) => {
                warn!("🛍️ Provider rejected the order for {}: {e}", transaction.invoice);
                self.mark_failed(transaction).await;
                Err(CheckoutError::ExternalOrderFailed { invoice: transaction.invoice.clone(), reason: e.to_string() })
            },
        }
    }

    /// Best-effort. If the write fails, the transaction stays `pending` with no external order id, which the
    /// reconciler leaves alone; the failure is logged for an operator.
    async fn mark_failed(&self, transaction: &Transaction) {
        match self.db.update_status(transaction.id, TransactionStatus::Failed).await {
            Ok(tx) => {
                let event = StatusChangedEvent::new(tx, transaction.status);
                self.producers.publish_status_changed(event).await;
            },
            Err(e) => error!("🛍️ Could not mark {} as failed. It remains pending. {e}", transaction.invoice),
        }
    }

    async fn release_reservation(&self, product: &Product) {
        match self.db.adjust_stock(product.id, 1).await {
            Ok(stock) => debug!("🛍️ Reservation on {} released. Stock is back to {stock}", product.sku),
            Err(e) => error!("🛍️ Could not release the reservation on {}. Stock is one short. {e}", product.sku),
        }
    }

    async fn desynchronized(&self, transaction: &Transaction, vip_order_id: &str, reason: String) -> CheckoutError {
        error!(
            "🛍️ DESYNC: external order {vip_order_id} was placed for {} but local bookkeeping failed: {reason}",
            transaction.invoice
        );
        let note = format!("external order {vip_order_id} placed but not confirmed locally: {reason}");
        if let Err(e) = self.db.annotate(transaction.id, &note).await {
            error!("🛍️ Could not annotate {}: {e}", transaction.invoice);
        }
        let event = DesyncEvent::new(DesyncKind::Unconfirmed, transaction.invoice.clone(), vip_order_id, &reason);
        self.producers.publish_desync(event).await;
        CheckoutError::Desynchronized {
            invoice: transaction.invoice.clone(),
            vip_order_id: vip_order_id.to_string(),
            reason,
        }
    }
}
