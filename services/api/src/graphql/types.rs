//! GraphQL type definitions
//!
//! These types mirror the core domain models but are decorated with async-graphql attributes.
//! Nothing here carries a password or a password hash.

use async_graphql::{InputObject, SimpleObject, ID};
use reading_list_core::domain::{self, PopulatedUser};

/// A saved book
#[derive(Debug, Clone, SimpleObject)]
pub struct Book {
    /// Caller-supplied identifier (e.g. a Google Books volume id)
    pub book_id: Option<ID>,
    pub authors: Option<Vec<Option<String>>>,
    pub description: Option<String>,
    pub title: Option<String>,
    pub image: Option<String>,
    pub link: Option<String>,
}

impl From<domain::Book> for Book {
    fn from(book: domain::Book) -> Self {
        Self {
            book_id: Some(ID(book.book_id)),
            authors: Some(book.authors.into_iter().map(Some).collect()),
            description: book.description,
            title: Some(book.title),
            image: book.image,
            link: book.link,
        }
    }
}

/// A registered user and their reading list
#[derive(Debug, Clone, SimpleObject)]
pub struct User {
    #[graphql(name = "_id")]
    pub id: Option<ID>,
    pub username: Option<String>,
    pub email: Option<String>,
    /// Number of saved references, including ones whose book was deleted
    pub book_count: Option<i32>,
    /// Raw saved references in the order they were saved
    pub saved_book_ids: Vec<ID>,
    /// Saved references resolved to book records
    pub saved_books: Vec<Option<Book>>,
}

impl From<PopulatedUser> for User {
    fn from(populated: PopulatedUser) -> Self {
        let book_count = i32::try_from(populated.book_count()).unwrap_or(i32::MAX);
        let user = populated.user;
        Self {
            id: Some(ID(user.id.to_string())),
            username: Some(user.username),
            email: Some(user.email),
            book_count: Some(book_count),
            saved_book_ids: user.saved_books.into_iter().map(ID).collect(),
            saved_books: populated
                .books
                .into_iter()
                .map(|b| Some(Book::from(b)))
                .collect(),
        }
    }
}

/// Token plus the user it was issued for
#[derive(Debug, Clone, SimpleObject)]
#[graphql(name = "Auth")]
pub struct AuthPayload {
    pub token: Option<String>,
    pub user: Option<User>,
}

impl From<domain::AuthPayload> for AuthPayload {
    fn from(payload: domain::AuthPayload) -> Self {
        Self {
            token: Some(payload.token),
            user: Some(payload.user.into()),
        }
    }
}

/// Input for registration
#[derive(Debug, InputObject)]
pub struct AddUserInput {
    pub username: String,
    pub email: String,
    /// Plaintext; hashed before it reaches the store
    pub password: String,
}

impl From<AddUserInput> for domain::Registration {
    fn from(input: AddUserInput) -> Self {
        Self {
            username: input.username,
            email: input.email,
            password: input.password,
        }
    }
}

/// Input for saving a book to the caller's list
#[derive(Debug, InputObject)]
pub struct BookInput {
    pub authors: Vec<String>,
    pub book_id: ID,
    pub title: String,
    pub description: Option<String>,
    pub image: Option<String>,
    pub link: Option<String>,
}

impl From<BookInput> for domain::NewBook {
    fn from(input: BookInput) -> Self {
        Self {
            book_id: input.book_id.0,
            authors: input.authors,
            description: input.description,
            title: input.title,
            image: input.image,
            link: input.link,
        }
    }
}
