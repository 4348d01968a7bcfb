use actix_cors::Cors;
use actix_web::{App, HttpServer, middleware, web};
use backend::config::GatewayConfig;
use backend::routes::{configure_app, configure_frontend};
use backend::{AppState, detector};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = GatewayConfig::load().map_err(|e| {
        log::error!("Failed to load configuration: {}", e);
        std::io::Error::new(std::io::ErrorKind::Other, e.to_string())
    })?;

    let detector = detector::from_config(&config.detector).map_err(|e| {
        log::error!("Failed to set up detector: {}", e);
        std::io::Error::new(std::io::ErrorKind::Other, e.to_string())
    })?;

    let state = web::Data::new(AppState::new(config.limits.clone(), detector));
    let frontend_dir = config.frontend_dir();
    let bind_address = config.bind_address();

    log::info!(
        "Upload limit {} bytes, {} concurrent detection jobs",
        config.limits.max_upload_bytes,
        config.limits.max_concurrent_jobs
    );
    log::info!("Starting server on {}", bind_address);

    HttpServer::new(move || {
        App::new()
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allowed_methods(vec!["GET", "POST", "OPTIONS"])
                    .allowed_headers(vec![
                        actix_web::http::header::ACCEPT,
                        actix_web::http::header::CONTENT_TYPE,
                    ])
                    .max_age(3600),
            )
            .wrap(middleware::Logger::default())
            .configure(|cfg| configure_app(cfg, state.clone()))
            .configure(|cfg| configure_frontend(cfg, frontend_dir.clone()))
    })
    .bind(&bind_address)?
    .run()
    .await
}
