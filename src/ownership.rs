use sqlx::{query, query_as, Pool, Sqlite};

use crate::{
    error::ApiError,
    model::{Todo, User},
};

/// Ownership-scoped Todo mutation. Every statement carries the
/// `user_id = identity` predicate, so a Todo owned by someone else is
/// indistinguishable from one that does not exist. Name uniqueness is
/// enforced by the UNIQUE column; this module only translates the
/// resulting conflicts.

fn validated_name(name: &str) -> Result<&str, ApiError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ApiError::Validation("Todo name cannot be blank".to_string()));
    }
    Ok(name)
}

fn name_conflict_or_db(err: sqlx::Error) -> ApiError {
    if let sqlx::Error::Database(ref db_err) = err {
        if db_err.is_unique_violation() {
            return ApiError::Conflict("Todo with that name already exists".to_string());
        }
    }
    ApiError::Database(err)
}

/// Creates a Todo owned by `identity`.
pub async fn create_todo(
    db: &Pool<Sqlite>,
    identity: &User,
    name: &str,
) -> Result<Todo, ApiError> {
    let name = validated_name(name)?;

    query_as::<_, Todo>(
        "INSERT INTO todos (name, user_id) VALUES (?, ?) RETURNING id, name, user_id",
    )
    .bind(name)
    .bind(identity.id)
    .fetch_one(db)
    .await
    .map_err(name_conflict_or_db)
}

/// Renames a Todo owned by `identity`. Zero rows touched means the Todo is
/// missing or belongs to someone else; both are NotFound. Renaming a Todo
/// to its own current name is allowed: the row does not collide with
/// itself under the UNIQUE constraint.
pub async fn update_todo(
    db: &Pool<Sqlite>,
    identity: &User,
    todo_id: i64,
    new_name: &str,
) -> Result<Todo, ApiError> {
    let name = validated_name(new_name)?;

    let updated = query_as::<_, Todo>(
        "UPDATE todos SET name = ? WHERE id = ? AND user_id = ? RETURNING id, name, user_id",
    )
    .bind(name)
    .bind(todo_id)
    .bind(identity.id)
    .fetch_optional(db)
    .await
    .map_err(name_conflict_or_db)?;

    updated.ok_or_else(|| ApiError::NotFound(format!("Todo with ID: {} not found", todo_id)))
}

/// Deletes a Todo owned by `identity`. Deleting a missing or foreign Todo
/// is an idempotent no-op, reported as success; the return value says
/// whether a row actually went away.
pub async fn delete_todo(
    db: &Pool<Sqlite>,
    identity: &User,
    todo_id: i64,
) -> Result<bool, ApiError> {
    let rows_affected = query("DELETE FROM todos WHERE id = ? AND user_id = ?")
        .bind(todo_id)
        .bind(identity.id)
        .execute(db)
        .await?
        .rows_affected();

    if rows_affected == 0 {
        tracing::debug!(todo_id, user_id = identity.id, "delete matched no owned todo");
    }
    Ok(rows_affected > 0)
}
