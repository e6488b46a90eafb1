use std::{fmt::Display, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use thiserror::Error;
pub use topup_common::Amount;

//--------------------------------------     Invoice       -----------------------------------------------------------
/// The buyer-facing reference for a transaction, e.g. `INV/20240601101500/482913`. Assigned once, never reused.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Type, Serialize, Deserialize)]
#[sqlx(transparent)]
#[serde(transparent)]
pub struct Invoice(String);

impl Invoice {
    pub fn new<S: Into<String>>(value: S) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl Display for Invoice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for Invoice {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for Invoice {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

#[derive(Debug, Clone, Error)]
#[error("Invalid conversion: {0}")]
pub struct ConversionError(String);

//--------------------------------------   TransactionStatus   -------------------------------------------------------
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Type, Serialize, Deserialize)]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    /// The transaction has been recorded and is waiting for the provider to fulfil it.
    #[default]
    Pending,
    /// The provider has delivered the top-up.
    Success,
    /// The order was rejected, either by the provider or because it could never be placed.
    Failed,
}

impl TransactionStatus {
    /// `Success` and `Failed` are terminal. Nothing moves a transaction out of them.
    pub fn is_final(&self) -> bool {
        !matches!(self, TransactionStatus::Pending)
    }

    /// Interprets a raw provider status string. Only the exact strings `success` and `failed` are terminal; anything
    /// else the provider reports (processing, waiting, unknown values) is treated as still pending.
    pub fn from_provider_status(status: &str) -> Self {
        match status {
            "success" => TransactionStatus::Success,
            "failed" => TransactionStatus::Failed,
            _ => TransactionStatus::Pending,
        }
    }
}

impl Display for TransactionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransactionStatus::Pending => write!(f, "pending"),
            TransactionStatus::Success => write!(f, "success"),
            TransactionStatus::Failed => write!(f, "failed"),
        }
    }
}

impl FromStr for TransactionStatus {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "success" => Ok(Self::Success),
            "failed" => Ok(Self::Failed),
            s => Err(ConversionError(format!("Invalid transaction status: {s}"))),
        }
    }
}

//--------------------------------------     PaymentMethod     -------------------------------------------------------
/// How the buyer intends to pay. Only recorded; no payment is processed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Type, Serialize, Deserialize)]
#[sqlx(rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    BankTransfer,
    Ewallet,
    CreditCard,
}

impl Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PaymentMethod::BankTransfer => write!(f, "bank_transfer"),
            PaymentMethod::Ewallet => write!(f, "ewallet"),
            PaymentMethod::CreditCard => write!(f, "credit_card"),
        }
    }
}

impl FromStr for PaymentMethod {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "bank_transfer" => Ok(Self::BankTransfer),
            "ewallet" => Ok(Self::Ewallet),
            "credit_card" => Ok(Self::CreditCard),
            s => Err(ConversionError(format!("Invalid payment method: {s}"))),
        }
    }
}

//--------------------------------------        Product        -------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct Product {
    pub id: i64,
    pub sku: String,
    pub name: String,
    pub category: String,
    pub description: String,
    pub price: Amount,
    pub stock: i64,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// The advisory availability check made before a checkout commits to anything.
    pub fn is_available(&self) -> bool {
        self.is_active && self.stock > 0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewProduct {
    pub sku: String,
    pub name: String,
    pub category: String,
    #[serde(default)]
    pub description: String,
    pub price: Amount,
    #[serde(default)]
    pub stock: i64,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

impl NewProduct {
    pub fn new<S: Into<String>>(sku: S, name: S, category: S, price: Amount) -> Self {
        Self {
            sku: sku.into(),
            name: name.into(),
            category: category.into(),
            description: String::default(),
            price,
            stock: 0,
            is_active: true,
        }
    }

    pub fn with_stock(mut self, stock: i64) -> Self {
        self.stock = stock;
        self
    }

    pub fn with_description<S: Into<String>>(mut self, description: S) -> Self {
        self.description = description.into();
        self
    }

    pub fn inactive(mut self) -> Self {
        self.is_active = false;
        self
    }

    /// Name and category must be non-blank, the price strictly positive and the stock non-negative.
    pub fn validate(&self) -> Result<(), String> {
        if self.sku.trim().is_empty() {
            return Err("product SKU is required".to_string());
        }
        if self.name.trim().is_empty() {
            return Err("product name is required".to_string());
        }
        if self.category.trim().is_empty() {
            return Err("product category is required".to_string());
        }
        if !self.price.is_positive() {
            return Err("product price must be greater than 0".to_string());
        }
        if self.stock < 0 {
            return Err("product stock cannot be negative".to_string());
        }
        Ok(())
    }
}

//--------------------------------------      Transaction      -------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct Transaction {
    pub id: i64,
    pub user_id: Option<i64>,
    pub product_id: i64,
    pub method: PaymentMethod,
    pub invoice: Invoice,
    pub status: TransactionStatus,
    pub amount: Amount,
    pub game_id: String,
    pub game_server: String,
    pub vip_order_id: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Transaction {
    pub fn is_final(&self) -> bool {
        self.status.is_final()
    }
}

/// A transaction that has not been persisted yet. New transactions are always `pending` and carry no external
/// order id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTransaction {
    pub user_id: Option<i64>,
    pub product_id: i64,
    pub method: PaymentMethod,
    pub invoice: Invoice,
    pub amount: Amount,
    pub game_id: String,
    pub game_server: String,
}
