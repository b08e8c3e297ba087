//! crates/reading_list_core/src/domain.rs
//!
//! Defines the pure, core data structures for the application.
//! These structs are independent of any database or serialization format.

use chrono::{DateTime, Utc};
use uuid::Uuid;

// Represents a user - used throughout app. Never carries the password hash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    /// Identifiers of saved books, in the order they were first saved.
    pub saved_books: Vec<String>,
    pub created_at: DateTime<Utc>,
}

// Only used internally for login - contains sensitive data
#[derive(Debug, Clone)]
pub struct UserCredentials {
    pub user: User,
    pub hashed_password: String,
}

/// The fields needed to create a user. The password is already hashed.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub hashed_password: String,
}

/// A book record. `book_id` is supplied by the caller and is not unique;
/// `id` is assigned by the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Book {
    pub id: Uuid,
    pub book_id: String,
    pub authors: Vec<String>,
    pub description: Option<String>,
    pub title: String,
    pub image: Option<String>,
    pub link: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBook {
    pub book_id: String,
    pub authors: Vec<String>,
    pub description: Option<String>,
    pub title: String,
    pub image: Option<String>,
    pub link: Option<String>,
}

/// A user together with the book records its saved references resolve to.
///
/// References whose book has been deleted stay in `user.saved_books` but
/// have no entry in `books`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PopulatedUser {
    pub user: User,
    pub books: Vec<Book>,
}

impl PopulatedUser {
    pub fn book_count(&self) -> usize {
        self.user.saved_books.len()
    }
}

/// Input for registering a new account.
#[derive(Debug, Clone)]
pub struct Registration {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Returned by a successful registration or login. Never persisted.
#[derive(Debug, Clone)]
pub struct AuthPayload {
    pub token: String,
    pub user: PopulatedUser,
}

/// The identity encoded in a bearer token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub id: Uuid,
    pub username: String,
    pub email: String,
}

/// Per-request context threaded into every resolver.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestContext {
    pub identity: Option<Identity>,
}

impl RequestContext {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn authenticated(identity: Identity) -> Self {
        Self {
            identity: Some(identity),
        }
    }
}
