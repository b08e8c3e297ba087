pub mod adapters;
pub mod config;
pub mod error;
pub mod graphql;
pub mod web;
