use actix_cors::Cors;
use actix_web::{App, HttpServer, middleware::NormalizePath, web};
use tracing_actix_web::TracingLogger;

use bandsite_backend::{
    AppState, graceful_shutdown::shutdown_signal, middlewares::api_key::ApiKeyMiddleware,
    routes::configure_routes, settings::AppConfig,
};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    tracing_subscriber::fmt::init();

    let config = match AppConfig::new() {
        Ok(cfg) => {
            tracing::info!("Loaded configuration: {:?}", cfg);
            cfg
        }
        Err(e) => {
            tracing::error!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    let app_state = web::Data::new(AppState::new(&config));

    let server_addr = format!("{}:{}", config.host, config.port);

    tracing::info!(
        "🚀 Starting bandsite API v{} on {}",
        env!("CARGO_PKG_VERSION"),
        server_addr
    );

    let workers = config.worker_count;
    let server = HttpServer::new(move || {
        let policy = config.clone();
        let cors = Cors::default()
            .allowed_origin_fn(move |origin, _| {
                origin
                    .to_str()
                    .map(|o| policy.origin_allowed(o))
                    .unwrap_or(false)
            })
            .allow_any_method()
            .allow_any_header()
            .max_age(3600);

        // The API key check wraps the bare route stack; cors sits
        // outermost so preflights are answered before any other layer.
        App::new()
            .app_data(app_state.clone())
            .wrap(ApiKeyMiddleware)
            .wrap(NormalizePath::trim())
            .wrap(TracingLogger::default())
            .wrap(cors)
            .configure(configure_routes)
    })
    .workers(workers)
    .bind(server_addr)?
    .run();

    tokio::select! {
        res = server => res,
        signal = shutdown_signal() => {
            tracing::info!(%signal, "shutdown signal received, stopping server");
            Ok(())
        }
    }
}
