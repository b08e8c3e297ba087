//! GraphQL schema definition with queries and mutations
//!
//! Every resolver delegates to `ReadingListService`. The request context is
//! attached as request data by the HTTP handler; `users`, `user`, `books`
//! and `book` are public, everything else needs a verified identity.

use async_graphql::{
    extensions::Tracing, Context, EmptySubscription, ErrorExtensions, Object, Result, Schema, ID,
};
use reading_list_core::{CoreError, PortError, ReadingListService, RequestContext};

use super::types::{AddUserInput, AuthPayload, Book, BookInput, User};

/// The GraphQL schema type
pub type ReadingListSchema = Schema<QueryRoot, MutationRoot, EmptySubscription>;

/// Build the GraphQL schema with all resolvers
pub fn build_schema(service: ReadingListService) -> ReadingListSchema {
    Schema::build(QueryRoot, MutationRoot, EmptySubscription)
        .data(service)
        .extension(Tracing)
        .finish()
}

/// Converts a core error into a GraphQL error with a `code` extension.
fn gql_error(err: CoreError) -> async_graphql::Error {
    let code = match &err {
        CoreError::Authentication(_) => "UNAUTHENTICATED",
        CoreError::Port(PortError::NotFound(_)) => "NOT_FOUND",
        CoreError::Port(PortError::Conflict(_)) => "CONFLICT",
        CoreError::Port(PortError::Unauthorized) => "UNAUTHENTICATED",
        CoreError::Port(PortError::Unexpected(e)) => {
            tracing::error!(error = %e, "Store failure");
            "INTERNAL_SERVER_ERROR"
        }
    };
    async_graphql::Error::new(err.to_string()).extend_with(|_, e| e.set("code", code))
}

fn service<'a>(ctx: &Context<'a>) -> &'a ReadingListService {
    ctx.data_unchecked::<ReadingListService>()
}

/// Requests executed without going through the HTTP handler are anonymous.
fn request_context(ctx: &Context<'_>) -> RequestContext {
    ctx.data_opt::<RequestContext>().cloned().unwrap_or_default()
}

// ============================================================================
// Query Root
// ============================================================================

pub struct QueryRoot;

#[Object]
impl QueryRoot {
    /// Get the current authenticated user
    async fn me(&self, ctx: &Context<'_>) -> Result<User> {
        let user = service(ctx)
            .me(&request_context(ctx))
            .await
            .map_err(gql_error)?;
        Ok(user.into())
    }

    /// Every registered user with their saved books
    async fn users(&self, ctx: &Context<'_>) -> Result<Vec<User>> {
        let users = service(ctx).users().await.map_err(gql_error)?;
        Ok(users.into_iter().map(User::from).collect())
    }

    /// Look up a user by exact username
    async fn user(&self, ctx: &Context<'_>, username: String) -> Result<Option<User>> {
        let user = service(ctx).user(&username).await.map_err(gql_error)?;
        Ok(user.map(User::from))
    }

    /// Every book, most recently saved first
    async fn books(&self, ctx: &Context<'_>) -> Result<Vec<Book>> {
        let books = service(ctx).books().await.map_err(gql_error)?;
        Ok(books.into_iter().map(Book::from).collect())
    }

    async fn book(&self, ctx: &Context<'_>, book_id: ID) -> Result<Option<Book>> {
        let book = service(ctx).book(&book_id).await.map_err(gql_error)?;
        Ok(book.map(Book::from))
    }
}

// ============================================================================
// Mutation Root
// ============================================================================

pub struct MutationRoot;

#[Object]
impl MutationRoot {
    /// Register a new account and sign it in
    async fn add_user(&self, ctx: &Context<'_>, input: AddUserInput) -> Result<AuthPayload> {
        let payload = service(ctx)
            .add_user(input.into())
            .await
            .map_err(gql_error)?;
        Ok(payload.into())
    }

    async fn login(
        &self,
        ctx: &Context<'_>,
        email: String,
        password: String,
    ) -> Result<AuthPayload> {
        let payload = service(ctx)
            .login(&email, &password)
            .await
            .map_err(gql_error)?;
        Ok(payload.into())
    }

    /// Save a book to the caller's reading list
    async fn save_book(&self, ctx: &Context<'_>, input: BookInput) -> Result<Book> {
        let book = service(ctx)
            .save_book(input.into(), &request_context(ctx))
            .await
            .map_err(gql_error)?;
        Ok(book.into())
    }

    /// Delete a book and drop it from the caller's reading list.
    /// Returns the caller with their updated list.
    async fn remove_book(&self, ctx: &Context<'_>, book_id: ID) -> Result<User> {
        let user = service(ctx)
            .remove_book(&book_id, &request_context(ctx))
            .await
            .map_err(gql_error)?;
        Ok(user.into())
    }
}
