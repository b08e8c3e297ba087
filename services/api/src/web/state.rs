//! services/api/src/web/state.rs
//!
//! Defines the application's shared state.

use crate::config::Config;
use crate::graphql::{build_schema, ReadingListSchema};
use reading_list_core::ports::{AuthService, BookRepository, UserRepository};
use reading_list_core::ReadingListService;
use std::sync::Arc;

/// The shared application state, created once at startup and passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub service: ReadingListService,
    pub schema: ReadingListSchema,
}

impl AppState {
    /// Wires the ports into the resolver service and builds the schema around it.
    pub fn new(
        config: Arc<Config>,
        users: Arc<dyn UserRepository>,
        books: Arc<dyn BookRepository>,
        auth: Arc<dyn AuthService>,
    ) -> Self {
        let service = ReadingListService::new(users, books, auth);
        let schema = build_schema(service.clone());
        Self {
            config,
            service,
            schema,
        }
    }
}
