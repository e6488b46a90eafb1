mod invoice;

pub use invoice::{generate_invoice, invoice_for_time, InvoiceGenerator};
