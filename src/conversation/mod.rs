//! Client-side conversation history: records, a reducer-style store and
//! JSON persistence. Nothing here is shared with the HTTP server.

pub mod schema;
pub mod store;

pub use schema::{ConversationRecord, FileInfo, Message, ModelType, Sender};
pub use store::{Action, ConversationStore, StoreError};
