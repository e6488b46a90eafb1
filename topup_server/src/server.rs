use std::time::Duration;

use actix_web::{
    dev::Server,
    http::KeepAlive,
    middleware::Logger,
    web,
    web::ServiceConfig,
    App,
    HttpServer,
};
use log::*;
use reseller_tools::{OrderGateway, VipResellerApi};
use topup_common::Secret;
use topup_engine::{
    checkout_objects::StockPolicy,
    events::{DesyncEvent, EventHandlers, EventHooks, EventProducers, StatusChangedEvent},
    CatalogApi,
    CheckoutApi,
    ReconcileApi,
    SqliteDatabase,
    TopupDatabase,
    TransactionsApi,
};

use crate::{
    config::{ServerConfig, ServerOptions},
    errors::ServerError,
    middleware::AdminKeyMiddlewareFactory,
    reconcile_worker::start_reconcile_worker,
    routes::{
        health,
        AddProductRoute,
        AdminTransactionByIdRoute,
        AdminTransactionsRoute,
        CheckoutRoute,
        ProductByIdRoute,
        ProductsRoute,
        ReconcileTransactionsRoute,
        SyncCatalogRoute,
        TransactionStatusRoute,
        UserTransactionsRoute,
    },
};

const EVENT_BUFFER_SIZE: usize = 128;

pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    let mut db = SqliteDatabase::new_with_url(&config.database_url, 25)
        .await
        .map_err(|e| ServerError::InitializeError(e.to_string()))?;
    db.migrate().await.map_err(|e| ServerError::InitializeError(e.to_string()))?;
    info!("💻️ Using database {}", db.url());
    let gateway = VipResellerApi::new(config.reseller.clone())
        .map_err(|e| ServerError::InitializeError(format!("Could not create the reseller client. {e}")))?;
    let handlers = EventHandlers::new(EVENT_BUFFER_SIZE, logging_hooks());
    let producers = handlers.producers();
    handlers.start_handlers().await;
    let _worker = start_reconcile_worker(db.clone(), gateway.clone(), producers.clone(), config.reconcile);
    let srv = create_server_instance(config, db.clone(), gateway, producers)?;
    let result = srv.await.map_err(|e| ServerError::Unspecified(e.to_string()));
    info!("💻️ Server stopped. Closing the database.");
    if let Err(e) = db.close().await {
        warn!("💻️ Could not close the database cleanly. {e}");
    }
    result
}

pub fn create_server_instance(
    config: ServerConfig,
    db: SqliteDatabase,
    gateway: VipResellerApi,
    producers: EventProducers,
) -> Result<Server, ServerError> {
    let options = ServerOptions::from_config(&config);
    let stock_policy = config.stock_policy;
    let admin_key = config.admin_api_key.clone();
    info!("💻️ Checkouts will use the '{stock_policy}' stock policy");
    let srv = HttpServer::new(move || {
        App::new()
            .wrap(Logger::new("%t (%D ms) %s %a %{Host}i %U").log_target("topup::access_log"))
            .service(health)
            .configure(|cfg| {
                configure_api(
                    cfg,
                    db.clone(),
                    gateway.clone(),
                    producers.clone(),
                    stock_policy,
                    options,
                    admin_key.clone(),
                )
            })
    })
    .keep_alive(KeepAlive::Timeout(Duration::from_secs(600)))
    .bind((config.host.as_str(), config.port))?
    .run();
    Ok(srv)
}

/// Registers the engine APIs and every `/api` route on `cfg`.
///
/// Each API holds its own clone of the database handle and the gateway.
pub fn configure_api<B, G>(
    cfg: &mut ServiceConfig,
    db: B,
    gateway: G,
    producers: EventProducers,
    stock_policy: StockPolicy,
    options: ServerOptions,
    admin_key: Option<Secret<String>>,
) where
    B: TopupDatabase + 'static,
    G: OrderGateway + Clone + 'static,
{
    let checkout_api = CheckoutApi::new(db.clone(), gateway.clone(), producers.clone()).with_stock_policy(stock_policy);
    let reconcile_api = ReconcileApi::new(db.clone(), gateway.clone(), producers);
    let catalog_api = CatalogApi::new(db.clone(), gateway);
    let transactions_api = TransactionsApi::new(db);
    configure_extractors(cfg);
    cfg.app_data(web::Data::new(checkout_api))
        .app_data(web::Data::new(reconcile_api))
        .app_data(web::Data::new(catalog_api))
        .app_data(web::Data::new(transactions_api))
        .app_data(web::Data::new(options));
    let admin_scope = web::scope("/admin")
        .wrap(AdminKeyMiddlewareFactory::new(admin_key))
        .service(AdminTransactionsRoute::<B>::new())
        .service(ReconcileTransactionsRoute::<B, G>::new())
        .service(AdminTransactionByIdRoute::<B>::new())
        .service(UserTransactionsRoute::<B>::new())
        .service(AddProductRoute::<B, G>::new())
        .service(SyncCatalogRoute::<B, G>::new());
    let api_scope = web::scope("/api")
        .service(ProductsRoute::<B, G>::new())
        .service(ProductByIdRoute::<B, G>::new())
        .service(CheckoutRoute::<B, G>::new())
        .service(TransactionStatusRoute::<B, G>::new())
        .service(admin_scope);
    cfg.service(api_scope);
}

/// Makes extractor failures (malformed JSON, bad path segments, bad query strings) answer with the same JSON error
/// body as every other failure.
pub fn configure_extractors(cfg: &mut ServiceConfig) {
    cfg.app_data(
        web::JsonConfig::default().error_handler(|e, _req| ServerError::InvalidRequestBody(e.to_string()).into()),
    )
    .app_data(web::PathConfig::default().error_handler(|e, _req| ServerError::InvalidRequestPath(e.to_string()).into()))
    .app_data(web::QueryConfig::default().error_handler(|e, _req| ServerError::InvalidQuery(e.to_string()).into()));
}

/// Hooks that log every status change and every desynchronised checkout.
pub fn logging_hooks() -> EventHooks {
    let mut hooks = EventHooks::default();
    hooks.on_status_changed(|ev: StatusChangedEvent| {
        Box::pin(async move {
            info!(
                "📬️ Transaction {} moved from {} to {}",
                ev.transaction.invoice, ev.old_status, ev.transaction.status
            );
        })
    });
    hooks.on_desync(|ev: DesyncEvent| {
        Box::pin(async move {
            error!(
                "📬️ OPERATOR ACTION REQUIRED. {:?} checkout {} (external order {}): {}",
                ev.kind, ev.invoice, ev.vip_order_id, ev.reason
            );
        })
    });
    hooks
}
