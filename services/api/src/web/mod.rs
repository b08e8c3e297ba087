pub mod handler;
pub mod middleware;
pub mod state;

// Re-export the router and handlers to make them easily accessible
// to the binary that builds the web server.
pub use handler::{graphql_handler, graphiql, health_handler, router};
pub use middleware::resolve_identity;
