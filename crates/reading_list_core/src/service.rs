//! crates/reading_list_core/src/service.rs
//!
//! The resolver logic for every query and mutation. Storage and token
//! handling come in through the ports, so the same code runs against
//! Postgres in production and against in-memory fakes in tests.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::domain::{
    AuthPayload, Book, Identity, NewBook, NewUser, PopulatedUser, Registration, RequestContext,
    User,
};
use crate::error::{CoreError, CoreResult};
use crate::ports::{AuthService, BookRepository, PortError, UserRepository};

/// Checked against when the email is unknown, so a miss costs one full
/// password verification just like a wrong password does.
pub const UNKNOWN_ACCOUNT_HASH: &str =
    "$argon2id$v=19$m=19456,t=2,p=1$wWBpgwpAIL85HkrGxev4Jg$ugLnrvycYQQamPJ5P6xnO79Ii55kF6Bn5B7/QBJOwVw";

#[derive(Clone)]
pub struct ReadingListService {
    users: Arc<dyn UserRepository>,
    books: Arc<dyn BookRepository>,
    auth: Arc<dyn AuthService>,
}

impl ReadingListService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        books: Arc<dyn BookRepository>,
        auth: Arc<dyn AuthService>,
    ) -> Self {
        Self { users, books, auth }
    }

    /// Builds the request context from an optional bearer token.
    ///
    /// A missing or invalid token yields an anonymous context rather than an
    /// error; resolvers that need an identity reject the request themselves.
    pub fn authenticate(&self, token: Option<&str>) -> RequestContext {
        let Some(token) = token else {
            return RequestContext::anonymous();
        };
        match self.auth.verify_token(token) {
            Ok(identity) => RequestContext::authenticated(identity),
            Err(e) => {
                debug!("Ignoring bearer token: {}", e);
                RequestContext::anonymous()
            }
        }
    }

    //=====================================================================================
    // Queries
    //=====================================================================================

    pub async fn users(&self) -> CoreResult<Vec<PopulatedUser>> {
        let users = self.users.find_all().await?;
        let mut populated = Vec::with_capacity(users.len());
        for user in users {
            populated.push(self.populate(user).await?);
        }
        Ok(populated)
    }

    pub async fn user(&self, username: &str) -> CoreResult<Option<PopulatedUser>> {
        match self.users.find_by_username(username).await? {
            Some(user) => Ok(Some(self.populate(user).await?)),
            None => Ok(None),
        }
    }

    pub async fn books(&self) -> CoreResult<Vec<Book>> {
        Ok(self.books.find_all().await?)
    }

    pub async fn book(&self, book_id: &str) -> CoreResult<Option<Book>> {
        Ok(self.books.find_by_book_id(book_id).await?)
    }

    pub async fn me(&self, ctx: &RequestContext) -> CoreResult<PopulatedUser> {
        let identity = ctx
            .identity
            .as_ref()
            .ok_or_else(CoreError::could_not_authenticate)?;
        let user = self
            .users
            .find_by_id(identity.id)
            .await?
            .ok_or_else(CoreError::could_not_authenticate)?;
        self.populate(user).await
    }

    //=====================================================================================
    // Mutations
    //=====================================================================================

    pub async fn add_user(&self, registration: Registration) -> CoreResult<AuthPayload> {
        let hashed_password = self.auth.hash_password(&registration.password)?;
        let user = self
            .users
            .create(NewUser {
                username: registration.username,
                email: registration.email,
                hashed_password,
            })
            .await?;
        info!("Registered user {} ({})", user.username, user.id);

        let token = self.auth.sign_token(&user.username, &user.email, user.id)?;
        Ok(AuthPayload {
            token,
            user: self.populate(user).await?,
        })
    }

    pub async fn login(&self, email: &str, password: &str) -> CoreResult<AuthPayload> {
        let Some(credentials) = self.users.find_by_email(email).await? else {
            let _ = self.auth.is_correct_password(password, UNKNOWN_ACCOUNT_HASH);
            warn!("Rejected login attempt");
            return Err(CoreError::could_not_authenticate());
        };

        if !self
            .auth
            .is_correct_password(password, &credentials.hashed_password)?
        {
            warn!("Rejected login attempt");
            return Err(CoreError::could_not_authenticate());
        }

        let user = credentials.user;
        let token = self.auth.sign_token(&user.username, &user.email, user.id)?;
        info!("User {} logged in", user.id);
        Ok(AuthPayload {
            token,
            user: self.populate(user).await?,
        })
    }

    /// Creates the book, then adds its identifier to the caller's saved list.
    ///
    /// The two writes are not atomic: if the second fails the book stays in
    /// the store without any user referencing it.
    pub async fn save_book(&self, new_book: NewBook, ctx: &RequestContext) -> CoreResult<Book> {
        let identity = require_identity(ctx)?;

        let book = self.books.create(new_book).await?;
        self.users.add_saved_book(identity.id, &book.book_id).await?;
        info!("User {} saved book {}", identity.id, book.book_id);
        Ok(book)
    }

    /// Deletes the book globally and pulls it from the caller's own list.
    ///
    /// Ownership is not checked. Other users who saved the same identifier
    /// keep a reference that no longer resolves.
    pub async fn remove_book(
        &self,
        book_id: &str,
        ctx: &RequestContext,
    ) -> CoreResult<PopulatedUser> {
        let identity = require_identity(ctx)?;

        self.books
            .delete_by_book_id(book_id)
            .await?
            .ok_or_else(|| PortError::NotFound(format!("Book {} not found", book_id)))?;

        let user = self.users.remove_saved_book(identity.id, book_id).await?;
        info!("User {} removed book {}", identity.id, book_id);
        self.populate(user).await
    }

    async fn populate(&self, user: User) -> CoreResult<PopulatedUser> {
        let books = self.books.find_by_book_ids(&user.saved_books).await?;
        Ok(PopulatedUser { user, books })
    }
}

fn require_identity(ctx: &RequestContext) -> CoreResult<&Identity> {
    ctx.identity.as_ref().ok_or_else(CoreError::login_required)
}
