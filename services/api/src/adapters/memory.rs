//! services/api/src/adapters/memory.rs
//!
//! An in-process implementation of the repository ports. Used by the
//! `memory` storage backend and by the test suites.

use async_trait::async_trait;
use chrono::Utc;
use reading_list_core::domain::{Book, NewBook, NewUser, User, UserCredentials};
use reading_list_core::ports::{BookRepository, PortError, PortResult, UserRepository};
use tokio::sync::RwLock;
use uuid::Uuid;

struct StoredUser {
    user: User,
    hashed_password: String,
}

/// Users and books held behind one lock each. Every port call takes the lock
/// once, so each add-to-set or pull is atomic.
#[derive(Default)]
pub struct MemoryStore {
    users: RwLock<Vec<StoredUser>>,
    /// Insertion order; the last element is the newest book.
    books: RwLock<Vec<Book>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    async fn update_user<F>(&self, user_id: Uuid, f: F) -> PortResult<User>
    where
        F: FnOnce(&mut Vec<String>),
    {
        let mut users = self.users.write().await;
        let stored = users
            .iter_mut()
            .find(|s| s.user.id == user_id)
            .ok_or_else(|| PortError::NotFound(format!("User {} not found", user_id)))?;
        f(&mut stored.user.saved_books);
        Ok(stored.user.clone())
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn find_all(&self) -> PortResult<Vec<User>> {
        let users = self.users.read().await;
        Ok(users.iter().map(|s| s.user.clone()).collect())
    }

    async fn find_by_id(&self, id: Uuid) -> PortResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users.iter().find(|s| s.user.id == id).map(|s| s.user.clone()))
    }

    async fn find_by_username(&self, username: &str) -> PortResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users
            .iter()
            .find(|s| s.user.username == username)
            .map(|s| s.user.clone()))
    }

    async fn find_by_email(&self, email: &str) -> PortResult<Option<UserCredentials>> {
        let users = self.users.read().await;
        Ok(users
            .iter()
            .find(|s| s.user.email == email)
            .map(|s| UserCredentials {
                user: s.user.clone(),
                hashed_password: s.hashed_password.clone(),
            }))
    }

    async fn create(&self, new_user: NewUser) -> PortResult<User> {
        let mut users = self.users.write().await;
        if users.iter().any(|s| s.user.username == new_user.username) {
            return Err(PortError::Conflict(format!(
                "username '{}' is already taken",
                new_user.username
            )));
        }
        if users.iter().any(|s| s.user.email == new_user.email) {
            return Err(PortError::Conflict(format!(
                "email '{}' is already registered",
                new_user.email
            )));
        }

        let user = User {
            id: Uuid::new_v4(),
            username: new_user.username,
            email: new_user.email,
            saved_books: Vec::new(),
            created_at: Utc::now(),
        };
        users.push(StoredUser {
            user: user.clone(),
            hashed_password: new_user.hashed_password,
        });
        Ok(user)
    }

    async fn add_saved_book(&self, user_id: Uuid, book_id: &str) -> PortResult<User> {
        self.update_user(user_id, |saved| {
            if !saved.iter().any(|id| id == book_id) {
                saved.push(book_id.to_string());
            }
        })
        .await
    }

    async fn remove_saved_book(&self, user_id: Uuid, book_id: &str) -> PortResult<User> {
        self.update_user(user_id, |saved| saved.retain(|id| id != book_id)).await
    }
}

#[async_trait]
impl BookRepository for MemoryStore {
    async fn find_all(&self) -> PortResult<Vec<Book>> {
        let books = self.books.read().await;
        Ok(books.iter().rev().cloned().collect())
    }

    async fn find_by_book_id(&self, book_id: &str) -> PortResult<Option<Book>> {
        let books = self.books.read().await;
        Ok(books.iter().rev().find(|b| b.book_id == book_id).cloned())
    }

    async fn find_by_book_ids(&self, book_ids: &[String]) -> PortResult<Vec<Book>> {
        let books = self.books.read().await;
        Ok(book_ids
            .iter()
            .filter_map(|id| books.iter().rev().find(|b| &b.book_id == id).cloned())
            .collect())
    }

    async fn create(&self, new_book: NewBook) -> PortResult<Book> {
        let book = Book {
            id: Uuid::new_v4(),
            book_id: new_book.book_id,
            authors: new_book.authors,
            description: new_book.description,
            title: new_book.title,
            image: new_book.image,
            link: new_book.link,
            created_at: Utc::now(),
        };
        self.books.write().await.push(book.clone());
        Ok(book)
    }

    async fn delete_by_book_id(&self, book_id: &str) -> PortResult<Option<Book>> {
        let mut books = self.books.write().await;
        let position = books.iter().rposition(|b| b.book_id == book_id);
        Ok(position.map(|index| books.remove(index)))
    }
}
