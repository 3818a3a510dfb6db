//! Model to entity mappers
//!
//! Rows whose text columns hold enum values convert with `TryFrom`, since an
//! unexpected value in the database is an error rather than a panic.

mod achievement;
mod content;
mod forum;
mod resource;
mod user;

pub use achievement::leaderboard_row;
