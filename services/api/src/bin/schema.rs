//! services/api/src/bin/schema.rs
//!
//! This binary prints the GraphQL schema in SDL form and saves it to a file
//! named `schema.graphql`.

use api_lib::graphql::{MutationRoot, QueryRoot};
use async_graphql::{EmptySubscription, Schema};

/// Writes the SDL of the schema to `path`.
fn generate_sdl(path: &str) -> Result<(), Box<dyn std::error::Error>> {
    // Resolvers are never run, so no service data is attached.
    let schema = Schema::build(QueryRoot, MutationRoot, EmptySubscription).finish();
    std::fs::write(path, schema.sdl())?;
    println!("GraphQL schema generated at {}", path);
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    generate_sdl("schema.graphql")?;
    Ok(())
}
