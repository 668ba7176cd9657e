pub mod error;
pub mod memory;
pub mod models;
pub mod postgres;
pub mod store;

pub use error::StoreError;
pub use memory::InMemoryStore;
pub use models::{Chunk, Document, Message, Role, Session, SessionMode};
pub use postgres::PgStore;
pub use store::{connect, ChatStore, StoreResult};
