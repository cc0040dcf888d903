use std::sync::Arc;

use axum::{routing::get, Router};

use crate::{handler::*, AppState};

pub fn create_router(app_state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(health_checker_handler))
        .route("/api/v1/token", get(issue_token))
        .route("/api/v1/users", get(list_users).post(create_user))
        .route("/api/v1/users/:id", get(get_user))
        .route("/api/v1/todos", get(get_todos).post(create_todo))
        .route(
            "/api/v1/todos/:id",
            get(get_todo).patch(update_todo).delete(delete_todo),
        )
        .with_state(app_state)
}
