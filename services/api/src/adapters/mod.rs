pub mod auth;
pub mod db;
pub mod memory;

pub use auth::JwtAuthAdapter;
pub use db::DbAdapter;
pub use memory::MemoryStore;
