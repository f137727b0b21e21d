use actix_web::{web, App, HttpServer};
use backend::config::Config;
use backend::settlement::{configure_routes, SettlementService};
use log::{error, info};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            return Err(std::io::Error::new(std::io::ErrorKind::Other, e.to_string()));
        }
    };

    // Rules are loaded once; every worker shares the same table
    let settlement = match SettlementService::from_config(&config.settlement) {
        Ok(service) => service,
        Err(e) => {
            error!("Failed to load settlement rules: {:#}", e);
            return Err(std::io::Error::new(std::io::ErrorKind::InvalidData, format!("{:#}", e)));
        }
    };
    let settlement_data = web::Data::new(settlement);
    let allowed_origins = config.server.allowed_origins.clone();

    info!("Starting server on {}:{}", config.server.host, config.server.port);

    HttpServer::new(move || {
        App::new()
            .wrap(backend::middleware::Logger)
            .wrap(backend::middleware::cors_middleware(&allowed_origins))
            .app_data(settlement_data.clone())
            .service(backend::health::health_check)
            .service(backend::health::settlement_health_check)
            .configure(|cfg| configure_routes(cfg, settlement_data.clone()))
    })
    .workers(config.server.workers)
    .bind((config.server.host.as_str(), config.server.port))?
    .run()
    .await
}
