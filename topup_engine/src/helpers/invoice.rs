use std::sync::Arc;

use chrono::{DateTime, Utc};
use rand::Rng;

use crate::db_types::Invoice;

/// A source of fresh invoice numbers. The checkout API takes one of these so that tests can force collisions.
pub type InvoiceGenerator = Arc<dyn Fn() -> Invoice + Send + Sync>;

/// Generates an invoice of the form `INV/<yyyymmddHHMMSS>/<6 random digits>` for the current time.
pub fn generate_invoice() -> Invoice {
    invoice_for_time(Utc::now(), rand::thread_rng().gen_range(0..1_000_000))
}

pub fn invoice_for_time(timestamp: DateTime<Utc>, suffix: u32) -> Invoice {
    Invoice::new(format!("INV/{}/{:06}", timestamp.format("%Y%m%d%H%M%S"), suffix % 1_000_000))
}
