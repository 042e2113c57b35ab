use actix_cors::Cors;
use actix_web::{
    http::header,
    middleware::{Compress, Logger},
    web, App, HttpServer,
};
use dotenv::dotenv;
use std::io;
use std::sync::Arc;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use users_service::{
    api,
    config::{Config, StoreBackend},
    database::MongoDB,
    middleware::RequestMetrics,
    services::{MemoryUserStore, MongoUserStore, UserStore},
};

fn cors(origins: &[String]) -> Cors {
    let cors = Cors::default()
        .allowed_methods(vec!["GET", "POST", "PUT", "DELETE", "OPTIONS"])
        .allowed_headers(vec![header::CONTENT_TYPE, header::ACCEPT])
        .max_age(3600);

    if origins.is_empty() {
        return cors.allow_any_origin();
    }

    origins
        .iter()
        .fold(cors, |cors, origin| cors.allowed_origin(origin))
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    // Load environment variables
    dotenv().ok();

    // Initialize logger
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = Config::from_env().map_err(|e| {
        log::error!("❌ Invalid configuration: {}", e);
        io::Error::new(io::ErrorKind::InvalidInput, e)
    })?;

    log::info!("🚀 Starting Users Service...");
    log::info!("🗄️  Store backend: {}", config.store_backend);

    // Escolhe o backend de armazenamento
    let store: Arc<dyn UserStore> = match config.store_backend {
        StoreBackend::Mongo => {
            log::info!("📊 Database: {}", config.database_url);
            let db = MongoDB::new(&config.database_url).await.map_err(|e| {
                log::error!("❌ Failed to connect to MongoDB: {}", e);
                io::Error::new(io::ErrorKind::ConnectionRefused, e.to_string())
            })?;
            log::info!("✅ MongoDB connected successfully");
            Arc::new(MongoUserStore::new(db, &config.users_collection))
        }
        StoreBackend::Memory => {
            log::warn!("⚠️  Using in-memory store, data is lost on restart");
            Arc::new(MemoryUserStore::new())
        }
    };
    let store_data = web::Data::from(store);

    let bind_address = config.bind_address();
    log::info!("🌐 Server starting on {}", bind_address);
    log::info!("📚 Swagger UI available at: http://{}/swagger-ui/", bind_address);

    let origins = config.cors_allowed_origins.clone();
    let openapi = api::swagger::ApiDoc::openapi();

    // Start HTTP server
    HttpServer::new(move || {
        App::new()
            .app_data(store_data.clone())
            .wrap(cors(&origins))
            .wrap(RequestMetrics)
            .wrap(Compress::default())
            .wrap(Logger::default())
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}")
                    .url("/api-docs/openapi.json", openapi.clone()),
            )
            .configure(api::configure)
    })
    .bind(bind_address)?
    .run()
    .await
}
