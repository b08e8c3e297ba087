//! GraphQL API
//!
//! This module provides the GraphQL schema (types plus query and mutation
//! roots) using async-graphql. It is the single API surface of the service.

mod schema;
pub mod types;

pub use schema::{build_schema, MutationRoot, QueryRoot, ReadingListSchema};
