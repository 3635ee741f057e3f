use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

/// User record in the database.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: Uuid,                     // unique user ID
    pub name: String,                 // display name
    pub email: String,                // unique, stored lowercased
    pub password_hash: String,        // Argon2 hash, never rendered
    pub created_at: OffsetDateTime,   // creation timestamp
}

/// Outcome of a failed insert into `users`.
#[derive(Debug, thiserror::Error)]
pub enum CreateUserError {
    #[error("email already exists")]
    EmailTaken,
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}
