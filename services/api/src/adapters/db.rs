//! services/api/src/adapters/db.rs
//!
//! This module contains the database adapter, which is the concrete implementation
//! of the `UserRepository` and `BookRepository` ports from the `core` crate. It handles
//! all interactions with the PostgreSQL database using `sqlx`.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reading_list_core::domain::{Book, NewBook, NewUser, User, UserCredentials};
use reading_list_core::ports::{BookRepository, PortError, PortResult, UserRepository};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A database adapter that implements both repository ports.
#[derive(Clone)]
pub struct DbAdapter {
    pool: PgPool,
}

impl DbAdapter {
    /// Creates a new `DbAdapter`.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// A helper function to run database migrations at startup.
    pub async fn run_migrations(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await
    }

    async fn saved_books_for(&self, user_id: Uuid) -> PortResult<Vec<String>> {
        sqlx::query_scalar::<_, String>(
            "SELECT book_id FROM saved_books WHERE user_id = $1 ORDER BY seq ASC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)
    }

    async fn load_user(&self, user_id: Uuid) -> PortResult<Option<User>> {
        let record = sqlx::query_as::<_, UserRecord>(
            "SELECT id, username, email, hashed_password, created_at FROM users WHERE id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(unexpected)?;

        match record {
            Some(record) => {
                let saved = self.saved_books_for(record.id).await?;
                Ok(Some(record.to_domain(saved)))
            }
            None => Ok(None),
        }
    }
}

//=========================================================================================
// "Impure" Database Record Structs
//=========================================================================================

#[derive(FromRow)]
struct UserRecord {
    id: Uuid,
    username: String,
    email: String,
    hashed_password: String,
    created_at: DateTime<Utc>,
}
impl UserRecord {
    fn to_domain(self, saved_books: Vec<String>) -> User {
        User {
            id: self.id,
            username: self.username,
            email: self.email,
            saved_books,
            created_at: self.created_at,
        }
    }
}

#[derive(FromRow)]
struct SavedBookRecord {
    user_id: Uuid,
    book_id: String,
}

#[derive(FromRow)]
struct BookRecord {
    id: Uuid,
    book_id: String,
    authors: Vec<String>,
    description: Option<String>,
    title: String,
    image: Option<String>,
    link: Option<String>,
    created_at: DateTime<Utc>,
}
impl BookRecord {
    fn to_domain(self) -> Book {
        Book {
            id: self.id,
            book_id: self.book_id,
            authors: self.authors,
            description: self.description,
            title: self.title,
            image: self.image,
            link: self.link,
            created_at: self.created_at,
        }
    }
}

const BOOK_COLUMNS: &str = "id, book_id, authors, description, title, image, link, created_at";

//=========================================================================================
// Error Mapping
//=========================================================================================

fn unexpected(e: sqlx::Error) -> PortError {
    PortError::Unexpected(e.to_string())
}

fn write_error(e: sqlx::Error) -> PortError {
    match &e {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            PortError::Conflict(db.message().to_string())
        }
        sqlx::Error::Database(db) if db.is_foreign_key_violation() => {
            PortError::NotFound(db.message().to_string())
        }
        _ => PortError::Unexpected(e.to_string()),
    }
}

//=========================================================================================
// `UserRepository` Trait Implementation
//=========================================================================================

#[async_trait]
impl UserRepository for DbAdapter {
    async fn find_all(&self) -> PortResult<Vec<User>> {
        let records = sqlx::query_as::<_, UserRecord>(
            "SELECT id, username, email, hashed_password, created_at FROM users ORDER BY created_at ASC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;

        let saved = sqlx::query_as::<_, SavedBookRecord>(
            "SELECT user_id, book_id FROM saved_books ORDER BY seq ASC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;

        let mut by_user: HashMap<Uuid, Vec<String>> = HashMap::new();
        for s in saved {
            by_user.entry(s.user_id).or_default().push(s.book_id);
        }

        let users = records
            .into_iter()
            .map(|r| {
                let books = by_user.remove(&r.id).unwrap_or_default();
                r.to_domain(books)
            })
            .collect();
        Ok(users)
    }

    async fn find_by_id(&self, id: Uuid) -> PortResult<Option<User>> {
        self.load_user(id).await
    }

    async fn find_by_username(&self, username: &str) -> PortResult<Option<User>> {
        let id = sqlx::query_scalar::<_, Uuid>("SELECT id FROM users WHERE username = $1")
            .bind(username)
            .fetch_optional(&self.pool)
            .await
            .map_err(unexpected)?;

        match id {
            Some(id) => self.load_user(id).await,
            None => Ok(None),
        }
    }

    async fn find_by_email(&self, email: &str) -> PortResult<Option<UserCredentials>> {
        let record = sqlx::query_as::<_, UserRecord>(
            "SELECT id, username, email, hashed_password, created_at FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(unexpected)?;

        match record {
            Some(record) => {
                let saved = self.saved_books_for(record.id).await?;
                let hashed_password = record.hashed_password.clone();
                Ok(Some(UserCredentials {
                    user: record.to_domain(saved),
                    hashed_password,
                }))
            }
            None => Ok(None),
        }
    }

    async fn create(&self, new_user: NewUser) -> PortResult<User> {
        let record = sqlx::query_as::<_, UserRecord>(
            "INSERT INTO users (id, username, email, hashed_password) VALUES ($1, $2, $3, $4) \
             RETURNING id, username, email, hashed_password, created_at",
        )
        .bind(Uuid::new_v4())
        .bind(&new_user.username)
        .bind(&new_user.email)
        .bind(&new_user.hashed_password)
        .fetch_one(&self.pool)
        .await
        .map_err(write_error)?;

        Ok(record.to_domain(Vec::new()))
    }

    async fn add_saved_book(&self, user_id: Uuid, book_id: &str) -> PortResult<User> {
        sqlx::query(
            "INSERT INTO saved_books (user_id, book_id) VALUES ($1, $2) ON CONFLICT (user_id, book_id) DO NOTHING",
        )
        .bind(user_id)
        .bind(book_id)
        .execute(&self.pool)
        .await
        .map_err(write_error)?;

        self.load_user(user_id)
            .await?
            .ok_or_else(|| PortError::NotFound(format!("User {} not found", user_id)))
    }

    async fn remove_saved_book(&self, user_id: Uuid, book_id: &str) -> PortResult<User> {
        sqlx::query("DELETE FROM saved_books WHERE user_id = $1 AND book_id = $2")
            .bind(user_id)
            .bind(book_id)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;

        self.load_user(user_id)
            .await?
            .ok_or_else(|| PortError::NotFound(format!("User {} not found", user_id)))
    }
}

//=========================================================================================
// `BookRepository` Trait Implementation
//=========================================================================================

#[async_trait]
impl BookRepository for DbAdapter {
    async fn find_all(&self) -> PortResult<Vec<Book>> {
        let records = sqlx::query_as::<_, BookRecord>(&format!(
            "SELECT {} FROM books ORDER BY created_at DESC, seq DESC",
            BOOK_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;

        Ok(records.into_iter().map(|r| r.to_domain()).collect())
    }

    async fn find_by_book_id(&self, book_id: &str) -> PortResult<Option<Book>> {
        let record = sqlx::query_as::<_, BookRecord>(&format!(
            "SELECT {} FROM books WHERE book_id = $1 ORDER BY created_at DESC, seq DESC LIMIT 1",
            BOOK_COLUMNS
        ))
        .bind(book_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(unexpected)?;

        Ok(record.map(|r| r.to_domain()))
    }

    async fn find_by_book_ids(&self, book_ids: &[String]) -> PortResult<Vec<Book>> {
        if book_ids.is_empty() {
            return Ok(Vec::new());
        }

        let records = sqlx::query_as::<_, BookRecord>(&format!(
            "SELECT {} FROM books WHERE book_id = ANY($1) ORDER BY created_at DESC, seq DESC",
            BOOK_COLUMNS
        ))
        .bind(book_ids)
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;

        // Newest first, so the first record seen per id wins.
        let mut newest: HashMap<String, Book> = HashMap::new();
        for record in records {
            newest
                .entry(record.book_id.clone())
                .or_insert_with(|| record.to_domain());
        }

        Ok(book_ids
            .iter()
            .filter_map(|id| newest.remove(id))
            .collect())
    }

    async fn create(&self, new_book: NewBook) -> PortResult<Book> {
        let record = sqlx::query_as::<_, BookRecord>(&format!(
            "INSERT INTO books (id, book_id, authors, description, title, image, link) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING {}",
            BOOK_COLUMNS
        ))
        .bind(Uuid::new_v4())
        .bind(&new_book.book_id)
        .bind(&new_book.authors)
        .bind(&new_book.description)
        .bind(&new_book.title)
        .bind(&new_book.image)
        .bind(&new_book.link)
        .fetch_one(&self.pool)
        .await
        .map_err(write_error)?;

        Ok(record.to_domain())
    }

    async fn delete_by_book_id(&self, book_id: &str) -> PortResult<Option<Book>> {
        let record = sqlx::query_as::<_, BookRecord>(&format!(
            "DELETE FROM books WHERE id = (\
                 SELECT id FROM books WHERE book_id = $1 ORDER BY created_at DESC, seq DESC LIMIT 1\
             ) RETURNING {}",
            BOOK_COLUMNS
        ))
        .bind(book_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(unexpected)?;

        Ok(record.map(|r| r.to_domain()))
    }
}
