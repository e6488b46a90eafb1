use chrono::Utc;
use log::{debug, trace};
use sqlx::{QueryBuilder, SqliteConnection};

use crate::{
    db_types::{NewProduct, Product},
    traits::{is_unique_violation, ProductQueryFilter, StoreError, UpsertResult},
};

pub async fn fetch_product(id: i64, conn: &mut SqliteConnection) -> Result<Option<Product>, sqlx::Error> {
    let product = sqlx::query_as("SELECT * FROM products WHERE id = $1").bind(id).fetch_optional(conn).await?;
    Ok(product)
}

pub async fn fetch_product_by_sku(sku: &str, conn: &mut SqliteConnection) -> Result<Option<Product>, sqlx::Error> {
    let product = sqlx::query_as("SELECT * FROM products WHERE sku = $1").bind(sku).fetch_optional(conn).await?;
    Ok(product)
}

/// Fetches products according to the criteria in the `ProductQueryFilter`, ordered by category and then name.
pub async fn search_products(
    filter: ProductQueryFilter,
    conn: &mut SqliteConnection,
) -> Result<Vec<Product>, sqlx::Error> {
    let mut builder = QueryBuilder::new("SELECT * FROM products ");
    if !filter.is_empty() {
        builder.push("WHERE ");
    }
    let mut where_clause = builder.separated(" AND ");
    if let Some(category) = filter.category {
        where_clause.push("category = ");
        where_clause.push_bind_unseparated(category);
    }
    if let Some(search) = filter.search {
        let pattern = format!("%{search}%");
        where_clause.push("(name LIKE ");
        where_clause.push_bind_unseparated(pattern.clone());
        where_clause.push_unseparated(" OR description LIKE ");
        where_clause.push_bind_unseparated(pattern);
        where_clause.push_unseparated(")");
    }
    if let Some(active) = filter.is_active {
        where_clause.push("is_active = ");
        where_clause.push_bind_unseparated(active);
    }
    builder.push(" ORDER BY category ASC, name ASC");
    // SQLite only accepts OFFSET after a LIMIT. -1 is "no limit".
    if filter.limit.is_some() || filter.offset.is_some() {
        builder.push(" LIMIT ");
        builder.push_bind(filter.limit.unwrap_or(-1));
        builder.push(" OFFSET ");
        builder.push_bind(filter.offset.unwrap_or(0));
    }
    trace!("🛒️ Executing query: {}", builder.sql());
    let products = builder.build_query_as::<Product>().fetch_all(conn).await?;
    trace!("🛒️ Result of search_products: {}", products.len());
    Ok(products)
}

pub async fn insert_product(product: NewProduct, conn: &mut SqliteConnection) -> Result<Product, StoreError> {
    let now = Utc::now();
    let sku = product.sku.clone();
    let result = sqlx::query_as(
        r#"
            INSERT INTO products (sku, name, category, description, price, stock, is_active, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $8)
            RETURNING *;
        "#,
    )
    .bind(product.sku)
    .bind(product.name)
    .bind(product.category)
    .bind(product.description)
    .bind(product.price)
    .bind(product.stock)
    .bind(product.is_active)
    .bind(now)
    .fetch_one(conn)
    .await;
    match result {
        Ok(product) => Ok(product),
        Err(e) if is_unique_violation(&e, "sku") => Err(StoreError::SkuConflict(sku)),
        Err(e) => Err(e.into()),
    }
}

/// Refreshes the provider-owned fields of the product with the same SKU, or inserts it.
pub async fn upsert_product(product: NewProduct, conn: &mut SqliteConnection) -> Result<UpsertResult, StoreError> {
    let now = Utc::now();
    let updated: Option<(i64,)> = sqlx::query_as(
        r#"
            UPDATE products
            SET name = $1, category = $2, description = $3, price = $4, stock = $5, updated_at = $6
            WHERE sku = $7
            RETURNING id;
        "#,
    )
    .bind(&product.name)
    .bind(&product.category)
    .bind(&product.description)
    .bind(product.price)
    .bind(product.stock)
    .bind(now)
    .bind(&product.sku)
    .fetch_optional(&mut *conn)
    .await?;
    if let Some((id,)) = updated {
        debug!("🛒️ Product {} (id {id}) refreshed from catalog", product.sku);
        return Ok(UpsertResult::Updated(id));
    }
    let product = insert_product(product, conn).await?;
    debug!("🛒️ Product {} created with id {}", product.sku, product.id);
    Ok(UpsertResult::Created(product.id))
}

/// Applies `delta` to the stock of product `id` as a single conditional update.
pub async fn adjust_stock(id: i64, delta: i64, conn: &mut SqliteConnection) -> Result<i64, StoreError> {
    let stock: Option<(i64,)> = sqlx::query_as(
        r#"
            UPDATE products
            SET stock = stock + $1, updated_at = $2
            WHERE id = $3 AND stock + $1 >= 0
            RETURNING stock;
        "#,
    )
    .bind(delta)
    .bind(Utc::now())
    .bind(id)
    .fetch_optional(&mut *conn)
    .await?;
    match stock {
        Some((stock,)) => {
            trace!("🛒️ Stock for product {id} adjusted by {delta}. New level: {stock}");
            Ok(stock)
        },
        None => match fetch_product(id, conn).await? {
            Some(_) => Err(StoreError::OutOfStock(id)),
            None => Err(StoreError::ProductNotFound(id)),
        },
    }
}
