//! SQLite persistence for accounts and chat history. Free functions over a
//! pool; handlers call them directly.

pub mod chats;
pub mod users;
