pub mod auth;
pub mod config;
pub mod error;
pub mod handler;
pub mod model;
pub mod ownership;
pub mod password;
pub mod route;
pub mod schema;
pub mod token;

use sqlx::{Pool, Sqlite};

use crate::token::TokenService;

// Struct representing the application state
pub struct AppState {
    pub db: Pool<Sqlite>,
    pub tokens: TokenService,
}
