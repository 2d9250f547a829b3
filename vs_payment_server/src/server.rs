use std::time::Duration;

use actix_web::{dev::Server, http::KeepAlive, middleware::Logger, web, App, HttpServer};
use vs_payment_engine::{MemoryCache, ReconciliationApi, SqliteDatabase};

use crate::{
    config::ServerConfig,
    errors::ServerError,
    integrations::paypal::PayPalGateway,
    routes::{api_scope, health},
};

pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    let db = SqliteDatabase::new_with_url(&config.database_url, 25)
        .await
        .map_err(|e| ServerError::InitializeError(e.to_string()))?;
    let srv = create_server_instance(config, db)?;
    srv.await.map_err(|e| ServerError::Unspecified(e.to_string()))
}

pub fn create_server_instance(config: ServerConfig, db: SqliteDatabase) -> Result<Server, ServerError> {
    let gateway = PayPalGateway::new(config.paypal.clone())?;
    let cache = MemoryCache::new(config.cache_ttl);
    let frontend = config.frontend.clone();
    let srv = HttpServer::new(move || {
        let api = ReconciliationApi::new(db.clone(), gateway.clone(), cache.clone());
        App::new()
            .wrap(Logger::new("%t (%D ms) %s %a %{Host}i %U").log_target("vsp::access_log"))
            .app_data(web::Data::new(api))
            .app_data(web::Data::new(frontend.clone()))
            .service(health)
            .service(api_scope::<SqliteDatabase, PayPalGateway, MemoryCache>())
    })
    .keep_alive(KeepAlive::Timeout(Duration::from_secs(600)))
    .bind((config.host.as_str(), config.port))?
    .run();
    Ok(srv)
}
