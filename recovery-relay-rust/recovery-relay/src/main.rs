use actix_web::{web, App, HttpServer};
use recovery_relay::api;
use recovery_relay::app::recovery_service::RecoveryService;
use recovery_relay::infrastructure::blockchain::ethereum::EthersGatewayFactory;
use recovery_relay::infrastructure::config::{ChainRegistry, Config};
use recovery_relay::infrastructure::logger::{LogConfig, Logger};
use recovery_relay::utils::retry::RetryPolicy;
use recovery_wallet_core::ArchanovaDirectory;
use std::sync::Arc;

fn startup_error(what: &str, e: impl std::fmt::Display) -> std::io::Error {
    std::io::Error::new(std::io::ErrorKind::Other, format!("{} failed: {}", what, e))
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    let config = match Config::new() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            return Err(startup_error("Configuration initialization", e));
        }
    };

    Logger::init_with(LogConfig {
        level: config.log_level.clone(),
        enable_file: config.log_to_file,
        log_directory: config.log_directory.clone(),
        ..LogConfig::default()
    });

    tracing::info!("Starting recovery relay v{}", env!("CARGO_PKG_VERSION"));

    let directory = match ArchanovaDirectory::load(&config.archanova_mapping_path) {
        Ok(directory) => Arc::new(directory),
        Err(e) => {
            tracing::error!("Failed to load Archanova mapping: {}", e);
            return Err(startup_error("Archanova mapping load", e));
        }
    };

    let registry = ChainRegistry::new(&config);
    let gateways = Arc::new(EthersGatewayFactory::from_config(&config));
    let service = Arc::new(RecoveryService::new(
        registry,
        gateways,
        directory,
        RetryPolicy::from_config(&config.retry),
    ));

    for endpoint in service.list_chain_endpoints().await {
        tracing::info!("Chain {} ({}) -> {}", endpoint.chain, endpoint.chain_id, endpoint.rpc_url);
    }
    tracing::info!("Listening on {}:{}", config.host, config.port);

    HttpServer::new(move || {
        App::new()
            .wrap(actix_web::middleware::Logger::default())
            .app_data(web::Data::new(Arc::clone(&service)))
            .configure(api::configure)
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await
}
