//! Request handler definitions
//!
//! Define each route and its handler here. Handlers should stay thin: parse the request, call one engine API and shape
//! the response. Anything longer belongs in the engine.
//!
//! Every handler is async. Database and provider calls are futures, so a slow provider never blocks a worker thread.
use actix_web::{get, web, HttpResponse, Responder};
use log::*;
use reseller_tools::OrderGateway;
use topup_engine::{
    checkout_objects::CheckoutRequest,
    db_types::NewProduct,
    CatalogApi,
    CheckoutApi,
    ProductCatalog,
    ReconcileApi,
    ReconcileError,
    TopupDatabase,
    TransactionQueryFilter,
    TransactionStore,
    TransactionsApi,
};

use crate::{
    config::ServerOptions,
    data_objects::{
        CheckoutResponse,
        ProductList,
        ProductQueryParams,
        ReconcileParams,
        TransactionList,
        TransactionStatusResponse,
    },
    errors::ServerError,
};

// Web-actix cannot handle generics in handlers, so it's implemented manually using the `route!` macro
#[macro_export]
macro_rules! route {
    ($name:ident => $method:ident $path:literal impl $($bounds:ty),+) => {
        paste::paste! { pub struct [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ >( $( core::marker::PhantomData<fn() -> [< T $bounds:camel> ] >,)+ );}
        paste::paste! { impl< $( [< T $bounds:camel> ],)+ > [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ > {
            #[allow(clippy::new_without_default)]
            pub fn new() -> Self {
                Self($( core::marker::PhantomData::<fn() -> [< T $bounds:camel> ] >,)+)
            }
        }}
        paste::paste! { impl<$( [< T $bounds:camel >] , )+> actix_web::dev::HttpServiceFactory for [<$name:camel Route>]<$([<T $bounds:camel>],)+>
        where
            $([<T $bounds:camel>]: $bounds + 'static,)+
        {
            fn register(self, config: &mut actix_web::dev::AppService) {
                let res = actix_web::Resource::new($path)
                    .name(stringify!($name))
                    .guard(actix_web::guard::$method())
                    .to($name::< $( [< T $bounds:camel >], )+>);
                actix_web::dev::HttpServiceFactory::register(res, config);
            }
        }}
    };
}

// ----------------------------------------------   Health  ----------------------------------------------------
#[get("/health")]
pub async fn health() -> impl Responder {
    trace!("💻️ Received health check request");
    HttpResponse::Ok().body("👍️\n")
}

//----------------------------------------------   Products  ----------------------------------------------------
route!(products => Get "/products" impl ProductCatalog, OrderGateway);
/// Lists the catalog. Supports the `category`, `search` and `active` filters, and `limit`/`offset` pagination.
pub async fn products<B: ProductCatalog, G: OrderGateway>(
    query: web::Query<ProductQueryParams>,
    api: web::Data<CatalogApi<B, G>>,
) -> Result<HttpResponse, ServerError> {
    let params = query.into_inner();
    trace!("💻️ Received product list request. {params:?}");
    let products = api.products(params.into()).await?;
    Ok(HttpResponse::Ok().json(ProductList { count: products.len(), products }))
}

route!(product_by_id => Get "/products/{id}" impl ProductCatalog, OrderGateway);
pub async fn product_by_id<B: ProductCatalog, G: OrderGateway>(
    path: web::Path<i64>,
    api: web::Data<CatalogApi<B, G>>,
) -> Result<HttpResponse, ServerError> {
    let id = path.into_inner();
    trace!("💻️ Received request for product {id}");
    let product = api.product(id).await?;
    Ok(HttpResponse::Ok().json(product))
}

//----------------------------------------------   Checkout  ----------------------------------------------------
route!(checkout => Post "/checkout" impl TopupDatabase, OrderGateway);
/// Runs a checkout for one unit of the requested product.
///
/// A successful checkout answers `201 Created` with the pending transaction. The final outcome of the purchase is
/// learned later through `/transaction/{invoice}`.
pub async fn checkout<B: TopupDatabase, G: OrderGateway>(
    body: web::Json<CheckoutRequest>,
    api: web::Data<CheckoutApi<B, G>>,
) -> Result<HttpResponse, ServerError> {
    let request = body.into_inner();
    debug!("💻️ Checkout request for product {} (game {} / {})", request.product_id, request.game_id, request.game_server);
    let transaction = api.process_checkout(request).await.map_err(|e| {
        info!("💻️ Checkout was rejected. {e}");
        ServerError::from(e)
    })?;
    Ok(HttpResponse::Created().json(CheckoutResponse::new(transaction)))
}

//----------------------------------------------   Transactions  ----------------------------------------------------
route!(transaction_status => Get "/transaction/{invoice:.*}" impl TransactionStore, OrderGateway);
/// Reconciles the transaction with the provider, then returns it.
///
/// If the provider cannot be reached, the last stored state is returned along with the sync error, flagged as
/// retryable.
pub async fn transaction_status<B: TransactionStore, G: OrderGateway>(
    path: web::Path<String>,
    reconcile_api: web::Data<ReconcileApi<B, G>>,
    transactions_api: web::Data<TransactionsApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let invoice = path.into_inner();
    trace!("💻️ Received status request for {invoice}");
    let response = match reconcile_api.sync_status(&invoice).await {
        Ok(outcome) => TransactionStatusResponse::synced(outcome),
        Err(ReconcileError::Gateway(e)) => {
            let transaction = transactions_api.transaction_by_invoice(invoice.trim()).await?;
            debug!("💻️ Returning the last known state of {invoice}. Sync failed: {e}");
            TransactionStatusResponse::stale(transaction, e)
        },
        Err(e) => return Err(e.into()),
    };
    Ok(HttpResponse::Ok().json(response))
}

//----------------------------------------------   Admin  ----------------------------------------------------
route!(user_transactions => Get "/user/{user_id}/transactions" impl TransactionStore);
/// A buyer's transactions, newest first. Admin only, since it exposes invoices and external order ids.
pub async fn user_transactions<B: TransactionStore>(
    path: web::Path<i64>,
    api: web::Data<TransactionsApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let user_id = path.into_inner();
    trace!("💻️ Received transaction history request for user {user_id}");
    let transactions = api.transactions_for_user(user_id).await?;
    Ok(HttpResponse::Ok().json(TransactionList { count: transactions.len(), transactions }))
}

route!(admin_transactions => Get "/transactions" impl TransactionStore);
/// Filtered transaction listing: `status`, `method`, `user_id`, `search`, `since`, `until`, `limit` and `offset`.
pub async fn admin_transactions<B: TransactionStore>(
    query: web::Query<TransactionQueryFilter>,
    api: web::Data<TransactionsApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let filter = query.into_inner();
    debug!("💻️ Admin transaction search. {filter:?}");
    let transactions = api.search(filter).await?;
    Ok(HttpResponse::Ok().json(TransactionList { count: transactions.len(), transactions }))
}

route!(admin_transaction_by_id => Get "/transactions/{id}" impl TransactionStore);
pub async fn admin_transaction_by_id<B: TransactionStore>(
    path: web::Path<i64>,
    api: web::Data<TransactionsApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let transaction = api.transaction(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(transaction))
}

route!(add_product => Post "/products" impl ProductCatalog, OrderGateway);
/// Adds a product by hand. Answers `201 Created` with the stored product, or `409` if the SKU is taken.
pub async fn add_product<B: ProductCatalog, G: OrderGateway>(
    body: web::Json<NewProduct>,
    api: web::Data<CatalogApi<B, G>>,
) -> Result<HttpResponse, ServerError> {
    let product = body.into_inner();
    debug!("💻️ Admin request to add product {}", product.sku);
    let product = api.add_product(product).await?;
    Ok(HttpResponse::Created().json(product))
}

route!(sync_catalog => Post "/products/sync" impl ProductCatalog, OrderGateway);
pub async fn sync_catalog<B: ProductCatalog, G: OrderGateway>(
    api: web::Data<CatalogApi<B, G>>,
) -> Result<HttpResponse, ServerError> {
    info!("💻️ Catalog sync requested");
    let report = api.sync_catalog().await?;
    Ok(HttpResponse::Ok().json(report))
}

route!(reconcile_transactions => Post "/transactions/reconcile" impl TransactionStore, OrderGateway);
/// Runs the stale-transaction sweep. `limit` defaults to the configured batch size.
pub async fn reconcile_transactions<B: TransactionStore, G: OrderGateway>(
    query: web::Query<ReconcileParams>,
    options: web::Data<ServerOptions>,
    api: web::Data<ReconcileApi<B, G>>,
) -> Result<HttpResponse, ServerError> {
    let limit = query.limit.unwrap_or(options.reconcile_batch_size);
    info!("💻️ Reconciliation sweep requested for up to {limit} transactions");
    let report = api.reconcile_pending(limit).await?;
    Ok(HttpResponse::Ok().json(report))
}
