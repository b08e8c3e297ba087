pub mod domain;
pub mod error;
pub mod ports;
pub mod service;

pub use domain::{
    AuthPayload, Book, Identity, NewBook, NewUser, PopulatedUser, Registration, RequestContext,
    User, UserCredentials,
};
pub use error::{CoreError, CoreResult};
pub use ports::{AuthService, BookRepository, PortError, PortResult, UserRepository};
pub use service::{ReadingListService, UNKNOWN_ACCOUNT_HASH};
