// Struct representing the request body for creating a new Todo
#[derive(Debug, serde::Serialize, serde::Deserialize)]
pub struct CreateTodoSchema {
    pub name: String,
}

// Struct representing the request body for updating a Todo
#[derive(Debug, serde::Serialize, serde::Deserialize)]
pub struct UpdateTodoSchema {
    pub name: String,
}

// Struct representing the request body for creating a new User. The
// password must be supplied twice; a mismatch rejects the request before
// anything is written.
#[derive(Debug, serde::Serialize, serde::Deserialize)]
pub struct CreateUserSchema {
    pub username: String,
    pub password: String,
    pub verify_password: String,
}
