use chrono::Utc;
use log::{debug, trace, warn};
use sqlx::{QueryBuilder, SqliteConnection};

use crate::{
    db_types::{NewTransaction, Transaction, TransactionStatus},
    traits::{is_unique_violation, StoreError, TransactionQueryFilter},
};

/// Inserts a new pending transaction. A clash on the invoice column is reported as [`StoreError::InvoiceConflict`].
pub async fn insert_transaction(
    transaction: NewTransaction,
    conn: &mut SqliteConnection,
) -> Result<Transaction, StoreError> {
    let now = Utc::now();
    let invoice = transaction.invoice.to_string();
    let result = sqlx::query_as(
        r#"
            INSERT INTO transactions (
                user_id,
                product_id,
                method,
                invoice,
                status,
                amount,
                game_id,
                game_server,
                created_at,
                updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $9)
            RETURNING *;
        "#,
    )
    .bind(transaction.user_id)
    .bind(transaction.product_id)
    .bind(transaction.method)
    .bind(transaction.invoice)
    .bind(TransactionStatus::Pending)
    .bind(transaction.amount)
    .bind(transaction.game_id)
    .bind(transaction.game_server)
    .bind(now)
    .fetch_one(conn)
    .await;
    match result {
        Ok(tx) => Ok(tx),
        Err(e) if is_unique_violation(&e, "invoice") => Err(StoreError::InvoiceConflict(invoice)),
        Err(e) => Err(e.into()),
    }
}

pub async fn fetch_transaction(id: i64, conn: &mut SqliteConnection) -> Result<Option<Transaction>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM transactions WHERE id = $1").bind(id).fetch_optional(conn).await
}

pub async fn fetch_transaction_by_invoice(
    invoice: &str,
    conn: &mut SqliteConnection,
) -> Result<Option<Transaction>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM transactions WHERE invoice = $1").bind(invoice).fetch_optional(conn).await
}

pub async fn fetch_transaction_by_vip_order_id(
    vip_order_id: &str,
    conn: &mut SqliteConnection,
) -> Result<Option<Transaction>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM transactions WHERE vip_order_id = $1").bind(vip_order_id).fetch_optional(conn).await
}

/// Fetches transactions according to the criteria in the `TransactionQueryFilter`.
///
/// Results are ordered by `created_at` in descending order, with the id as a tie-breaker.
pub async fn search_transactions(
    filter: TransactionQueryFilter,
    conn: &mut SqliteConnection,
) -> Result<Vec<Transaction>, sqlx::Error> {
    let mut builder = QueryBuilder::new("SELECT * FROM transactions ");
    if !filter.is_empty() {
        builder.push("WHERE ");
    }
    let mut where_clause = builder.separated(" AND ");
    if let Some(status) = filter.status {
        where_clause.push("status = ");
        where_clause.push_bind_unseparated(status);
    }
    if let Some(method) = filter.method {
        where_clause.push("method = ");
        where_clause.push_bind_unseparated(method);
    }
    if let Some(user_id) = filter.user_id {
        where_clause.push("user_id = ");
        where_clause.push_bind_unseparated(user_id);
    }
    if let Some(search) = filter.search {
        let pattern = format!("%{search}%");
        where_clause.push("(invoice LIKE ");
        where_clause.push_bind_unseparated(pattern.clone());
        where_clause.push_unseparated(" OR game_id LIKE ");
        where_clause.push_bind_unseparated(pattern);
        where_clause.push_unseparated(")");
    }
    if let Some(since) = filter.since {
        where_clause.push("created_at >= ");
        where_clause.push_bind_unseparated(since);
    }
    if let Some(until) = filter.until {
        where_clause.push("created_at <= ");
        where_clause.push_bind_unseparated(until);
    }
    builder.push(" ORDER BY created_at DESC, id DESC");
    // SQLite only accepts OFFSET after a LIMIT. -1 is "no limit".
    if filter.limit.is_some() || filter.offset.is_some() {
        builder.push(" LIMIT ");
        builder.push_bind(filter.limit.unwrap_or(-1));
        builder.push(" OFFSET ");
        builder.push_bind(filter.offset.unwrap_or(0));
    }
    trace!("🧾️ Executing query: {}", builder.sql());
    let transactions = builder.build_query_as::<Transaction>().fetch_all(conn).await?;
    trace!("🧾️ Result of search_transactions: {}", transactions.len());
    Ok(transactions)
}

pub async fn link_external_order(
    id: i64,
    vip_order_id: &str,
    conn: &mut SqliteConnection,
) -> Result<Transaction, StoreError> {
    let result = sqlx::query_as(
        r#"
            UPDATE transactions SET vip_order_id = $1, updated_at = $2
            WHERE id = $3 AND vip_order_id IS NULL
            RETURNING *;
        "#,
    )
    .bind(vip_order_id)
    .bind(Utc::now())
    .bind(id)
    .fetch_optional(&mut *conn)
    .await;
    let updated: Option<Transaction> = match result {
        Ok(tx) => tx,
        Err(e) if is_unique_violation(&e, "vip_order_id") => {
            warn!("🧾️ External order {vip_order_id} is already linked to a different transaction");
            return Err(StoreError::ExternalOrderAlreadyLinked(id));
        },
        Err(e) => return Err(e.into()),
    };
    match updated {
        Some(tx) => {
            debug!("🧾️ Transaction {} linked to external order {vip_order_id}", tx.invoice);
            Ok(tx)
        },
        None => match fetch_transaction(id, conn).await? {
            Some(_) => Err(StoreError::ExternalOrderAlreadyLinked(id)),
            None => Err(StoreError::TransactionNotFound(id.to_string())),
        },
    }
}

/// Moves a pending transaction into a terminal state. Rows that are no longer `pending` are never touched.
pub async fn update_status(
    id: i64,
    status: TransactionStatus,
    conn: &mut SqliteConnection,
) -> Result<Transaction, StoreError> {
    if !status.is_final() {
        return Err(StoreError::InvalidStatusTransition {
            id,
            from: TransactionStatus::Pending.to_string(),
            to: status.to_string(),
        });
    }
    let updated: Option<Transaction> = sqlx::query_as(
        r#"
            UPDATE transactions SET status = $1, updated_at = $2
            WHERE id = $3 AND status = $4
            RETURNING *;
        "#,
    )
    .bind(status)
    .bind(Utc::now())
    .bind(id)
    .bind(TransactionStatus::Pending)
    .fetch_optional(&mut *conn)
    .await?;
    match updated {
        Some(tx) => {
            debug!("🧾️ Transaction {} is now {status}", tx.invoice);
            Ok(tx)
        },
        None => match fetch_transaction(id, conn).await? {
            Some(existing) => Err(StoreError::InvalidStatusTransition {
                id,
                from: existing.status.to_string(),
                to: status.to_string(),
            }),
            None => Err(StoreError::TransactionNotFound(id.to_string())),
        },
    }
}

pub async fn annotate(id: i64, note: &str, conn: &mut SqliteConnection) -> Result<Transaction, StoreError> {
    let updated: Option<Transaction> = sqlx::query_as(
        r#"
            UPDATE transactions
            SET notes = CASE WHEN notes IS NULL OR notes = '' THEN $1 ELSE notes || char(10) || $1 END,
                updated_at = $2
            WHERE id = $3
            RETURNING *;
        "#,
    )
    .bind(note)
    .bind(Utc::now())
    .bind(id)
    .fetch_optional(conn)
    .await?;
    updated.ok_or_else(|| StoreError::TransactionNotFound(id.to_string()))
}

pub async fn fetch_unreconciled(limit: i64, conn: &mut SqliteConnection) -> Result<Vec<Transaction>, sqlx::Error> {
    sqlx::query_as(
        r#"
            SELECT * FROM transactions
            WHERE status = $1 AND vip_order_id IS NOT NULL
            ORDER BY created_at ASC, id ASC
            LIMIT $2;
        "#,
    )
    .bind(TransactionStatus::Pending)
    .bind(limit)
    .fetch_all(conn)
    .await
}
