use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde_json::json;
use sqlx::{query_as, Pool, Sqlite};

use crate::{
    auth::{BasicIdentity, BearerIdentity},
    error::ApiError,
    model::{Todo, User, UserRepresentation},
    ownership, password,
    schema::{CreateTodoSchema, CreateUserSchema, UpdateTodoSchema},
    AppState,
};

// Handler for the health checker route
pub async fn health_checker_handler() -> impl IntoResponse {
    const MESSAGE: &str = "Todo REST API with Rust, SQLX, SQLite, and Axum";

    let json_response = serde_json::json!({
        "status": "success",
        "message": MESSAGE
    });

    Json(json_response)
}

// Handler for issuing a signed token. This is the only operation that
// accepts basic credentials; everything else that mutates wants the token.
pub async fn issue_token(
    BasicIdentity(user): BasicIdentity,
    State(data): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ApiError> {
    let token = data
        .tokens
        .issue(user.id)
        .map_err(|err| ApiError::Internal(format!("token issuance failed: {}", err)))?;

    tracing::debug!(user_id = user.id, "issued api token");
    Ok((StatusCode::OK, Json(json!({ "token": token }))))
}

// Handler for getting all Todo items
pub async fn get_todos(
    State(data): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ApiError> {
    let todos = query_as::<_, Todo>("SELECT id, name, user_id FROM todos")
        .fetch_all(&data.db)
        .await?;

    if todos.is_empty() {
        return Err(ApiError::NotFound("No todos currently exist".to_string()));
    }

    let json_response = serde_json::json!({
        "status": "success",
        "results": todos.len(),
        "todos": todos
    });
    Ok((StatusCode::OK, Json(json_response)))
}

// Handler for getting a specific Todo by ID
pub async fn get_todo(
    Path(id): Path<i64>,
    State(data): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ApiError> {
    let todo = query_as::<_, Todo>("SELECT id, name, user_id FROM todos WHERE id = ?")
        .bind(id)
        .fetch_optional(&data.db)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Todo with ID: {} not found", id)))?;

    let todo_response = serde_json::json!({"status": "success","data": serde_json::json!({
        "todo": todo
    })});
    Ok((StatusCode::OK, Json(todo_response)))
}

// Handler for creating a new Todo. The bearer identity becomes the owner.
pub async fn create_todo(
    BearerIdentity(user): BearerIdentity,
    State(data): State<Arc<AppState>>,
    Json(body): Json<CreateTodoSchema>,
) -> Result<impl IntoResponse, ApiError> {
    let todo = ownership::create_todo(&data.db, &user, &body.name).await?;

    let todo_response = json!({"status": "success","data": json!({
        "todo": todo
    })});
    Ok((StatusCode::CREATED, Json(todo_response)))
}

// Handler for updating a Todo by ID; only the owner gets anything but 404.
pub async fn update_todo(
    Path(id): Path<i64>,
    BearerIdentity(user): BearerIdentity,
    State(data): State<Arc<AppState>>,
    Json(body): Json<UpdateTodoSchema>,
) -> Result<impl IntoResponse, ApiError> {
    let todo = ownership::update_todo(&data.db, &user, id, &body.name).await?;

    let todo_response = serde_json::json!({"status": "success","data": serde_json::json!({
        "todo": todo
    })});
    Ok((StatusCode::OK, Json(todo_response)))
}

// Handler for deleting a Todo by ID. Deleting a missing or foreign Todo
// still reports success: the delete is idempotent and reveals nothing.
pub async fn delete_todo(
    Path(id): Path<i64>,
    BearerIdentity(user): BearerIdentity,
    State(data): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ApiError> {
    ownership::delete_todo(&data.db, &user, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// Handler for creating a new User
pub async fn create_user(
    State(data): State<Arc<AppState>>,
    Json(body): Json<CreateUserSchema>,
) -> Result<impl IntoResponse, ApiError> {
    let username = body.username.trim();
    if username.is_empty() {
        return Err(ApiError::Validation("Username is required".to_string()));
    }
    if body.password != body.verify_password {
        return Err(ApiError::Validation(
            "Password and verification do not match".to_string(),
        ));
    }

    let password_hash = password::hash(&body.password)
        .map_err(|err| ApiError::Internal(format!("password hashing failed: {}", err)))?;

    let user = query_as::<_, User>(
        "INSERT INTO users (username, password_hash) VALUES (?, ?) RETURNING id, username, password_hash",
    )
    .bind(username)
    .bind(password_hash)
    .fetch_one(&data.db)
    .await
    .map_err(|err| {
        if let sqlx::Error::Database(ref db_err) = err {
            if db_err.is_unique_violation() {
                return ApiError::Conflict("User with that username already exists".to_string());
            }
        }
        ApiError::Database(err)
    })?;

    let user_response = json!({"status": "success","data": json!({
        "user": json!({ "id": user.id, "username": user.username })
    })});
    Ok((StatusCode::CREATED, Json(user_response)))
}

// Handler for listing all Users with references to the todos they own
pub async fn list_users(
    State(data): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ApiError> {
    let users = query_as::<_, User>("SELECT id, username, password_hash FROM users")
        .fetch_all(&data.db)
        .await?;

    if users.is_empty() {
        return Err(ApiError::NotFound("No users currently exist".to_string()));
    }

    let ownerships = query_as::<_, (i64, i64)>("SELECT id, user_id FROM todos")
        .fetch_all(&data.db)
        .await?;

    let users: Vec<UserRepresentation> = users
        .into_iter()
        .map(|user| represent_user(user, &ownerships))
        .collect();

    let json_response = serde_json::json!({
        "status": "success",
        "results": users.len(),
        "users": users
    });
    Ok((StatusCode::OK, Json(json_response)))
}

// Handler for getting a specific User by ID
pub async fn get_user(
    Path(id): Path<i64>,
    State(data): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ApiError> {
    let user = query_as::<_, User>("SELECT id, username, password_hash FROM users WHERE id = ?")
        .bind(id)
        .fetch_optional(&data.db)
        .await?
        .ok_or_else(|| ApiError::NotFound("Cannot locate User with that ID".to_string()))?;

    let todos = owned_todo_ids(&data.db, user.id).await?;
    let user = UserRepresentation {
        id: user.id,
        username: user.username,
        todos,
    };

    let user_response = serde_json::json!({"status": "success","data": serde_json::json!({
        "user": user
    })});
    Ok((StatusCode::OK, Json(user_response)))
}

fn represent_user(user: User, ownerships: &[(i64, i64)]) -> UserRepresentation {
    let todos = ownerships
        .iter()
        .filter(|(_, owner)| *owner == user.id)
        .map(|(todo_id, _)| *todo_id)
        .collect();
    UserRepresentation {
        id: user.id,
        username: user.username,
        todos,
    }
}

async fn owned_todo_ids(db: &Pool<Sqlite>, user_id: i64) -> Result<Vec<i64>, ApiError> {
    let ids = query_as::<_, (i64,)>("SELECT id FROM todos WHERE user_id = ?")
        .bind(user_id)
        .fetch_all(db)
        .await?;
    Ok(ids.into_iter().map(|(id,)| id).collect())
}
