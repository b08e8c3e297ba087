//! crates/reading_list_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the application's core logic.
//! These traits form the boundary of the hexagonal architecture, allowing the core
//! to be independent of specific storage or token implementations.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{Book, Identity, NewBook, NewUser, User, UserCredentials};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external services (e.g., database, crypto).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    /// A uniqueness constraint was violated.
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("Unauthorized")]
    Unauthorized,
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_all(&self) -> PortResult<Vec<User>>;

    async fn find_by_id(&self, id: Uuid) -> PortResult<Option<User>>;

    /// Exact, case-sensitive match.
    async fn find_by_username(&self, username: &str) -> PortResult<Option<User>>;

    async fn find_by_email(&self, email: &str) -> PortResult<Option<UserCredentials>>;

    /// Fails with `PortError::Conflict` when the username or email is taken.
    async fn create(&self, new_user: NewUser) -> PortResult<User>;

    /// Adds `book_id` to the user's saved list unless already present.
    async fn add_saved_book(&self, user_id: Uuid, book_id: &str) -> PortResult<User>;

    /// Removes `book_id` from the user's saved list. Absent ids are a no-op.
    async fn remove_saved_book(&self, user_id: Uuid, book_id: &str) -> PortResult<User>;
}

#[async_trait]
pub trait BookRepository: Send + Sync {
    /// All books, most recently created first.
    async fn find_all(&self) -> PortResult<Vec<Book>>;

    /// The most recently created book carrying `book_id`.
    async fn find_by_book_id(&self, book_id: &str) -> PortResult<Option<Book>>;

    /// Resolves a list of references. The result follows the order of
    /// `book_ids`, with one record per id; ids without a book are skipped.
    async fn find_by_book_ids(&self, book_ids: &[String]) -> PortResult<Vec<Book>>;

    async fn create(&self, new_book: NewBook) -> PortResult<Book>;

    /// Deletes the most recently created book carrying `book_id` and returns it.
    async fn delete_by_book_id(&self, book_id: &str) -> PortResult<Option<Book>>;
}

/// Bearer token and password handling.
pub trait AuthService: Send + Sync {
    fn sign_token(&self, username: &str, email: &str, id: Uuid) -> PortResult<String>;

    /// Fails with `PortError::Unauthorized` for malformed, forged or expired tokens.
    fn verify_token(&self, token: &str) -> PortResult<Identity>;

    fn hash_password(&self, plaintext: &str) -> PortResult<String>;

    fn is_correct_password(&self, plaintext: &str, hashed_password: &str) -> PortResult<bool>;
}
