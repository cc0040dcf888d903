use sqlx::{Pool, Sqlite};

// Data model representing an API user. The password is stored only as an
// Argon2 PHC-string hash and never leaves the server.
#[derive(Debug, Clone, sqlx::FromRow, serde::Serialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
}

// Data model representing a Todo item. Ownership is permanent: `user_id`
// is set at creation and never reassigned.
#[derive(Debug, sqlx::FromRow, serde::Serialize, serde::Deserialize)]
pub struct Todo {
    pub id: i64,
    pub name: String,
    #[serde(rename = "created_by")]
    pub user_id: i64,
}

// Representation of a User for read endpoints: username plus references to
// the todos it owns. URL construction is the client's business, the API
// hands out ids.
#[derive(Debug, serde::Serialize, serde::Deserialize)]
pub struct UserRepresentation {
    pub id: i64,
    pub username: String,
    pub todos: Vec<i64>,
}

/// Creates the tables if they don't exist. The UNIQUE columns are what
/// actually enforce username/todo-name uniqueness under concurrent writers;
/// the handlers only translate the resulting conflict errors.
pub async fn init_schema(pool: &Pool<Sqlite>) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"CREATE TABLE IF NOT EXISTS users (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        username TEXT NOT NULL UNIQUE,
        password_hash TEXT NOT NULL
    );"#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"CREATE TABLE IF NOT EXISTS todos (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL UNIQUE,
        user_id INTEGER NOT NULL REFERENCES users(id)
    );"#,
    )
    .execute(pool)
    .await?;

    Ok(())
}
