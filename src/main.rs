use axum::{
    http::{
        header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
        HeaderValue, Method,
    },
    Server,
};

use dotenv::dotenv;
use sqlx::{migrate::MigrateDatabase, sqlite::SqlitePoolOptions, Sqlite};
use tower_http::cors::CorsLayer;
use tracing_subscriber::EnvFilter;

use std::{net::SocketAddr, sync::Arc};

use todo_api::{
    config::Config, model::init_schema, route::create_router, token::TokenService, AppState,
};

// Entry point of the application
#[tokio::main]
async fn main() {
    dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(err) => {
            tracing::error!("invalid configuration: {}", err);
            std::process::exit(1);
        }
    };

    // Check if the database exists, if not, create it
    if !Sqlite::database_exists(&config.database_url)
        .await
        .unwrap_or(false)
    {
        tracing::info!("creating database {}", config.database_url);
        if let Err(err) = Sqlite::create_database(&config.database_url).await {
            tracing::error!("failed to create database: {}", err);
            std::process::exit(1);
        }
    }

    // Connect to the database
    let pool = match SqlitePoolOptions::new()
        .max_connections(10)
        .connect(&config.database_url)
        .await
    {
        Ok(pool) => {
            tracing::info!("connected to the database");
            pool
        }
        Err(err) => {
            tracing::error!("failed to connect to the database: {:?}", err);
            std::process::exit(1);
        }
    };

    // Create the 'users' and 'todos' tables if they don't exist
    if let Err(err) = init_schema(&pool).await {
        tracing::error!("failed to initialize the database schema: {:?}", err);
        std::process::exit(1);
    }

    let tokens = TokenService::new(&config.secret_key, config.token_max_age_secs);

    // Create an Arc-wrapped instance of the application state
    let app_state = Arc::new(AppState { db: pool, tokens });

    // Configure CORS settings for the application
    let cors = CorsLayer::new()
        .allow_origin("http://localhost:3000".parse::<HeaderValue>().unwrap())
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::DELETE])
        .allow_credentials(true)
        .allow_headers([AUTHORIZATION, ACCEPT, CONTENT_TYPE]);

    // Create the Axum application with routes and middleware
    let app = create_router(app_state).layer(cors);

    // Specify the address and port to run the server on
    let addr = SocketAddr::from(([127, 0, 0, 1], config.port));
    tracing::info!("server listening on {}", addr);

    // Start the Axum server
    Server::bind(&addr)
        .serve(app.into_make_service())
        .await
        .unwrap();
}
