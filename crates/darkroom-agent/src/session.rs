pub mod message;
pub mod store;

pub use message::{Message, MessageRole};
pub use store::{Session, SessionOwner, SessionStore};
