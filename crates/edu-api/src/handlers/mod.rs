//! Route handlers
//!
//! All HTTP request handlers organized by domain.

pub mod achievements;
pub mod admin;
pub mod auth;
pub mod bookmarks;
pub mod chat;
pub mod cms;
pub mod forum;
pub mod goals;
pub mod health;
pub mod resources;
pub mod stats;
pub mod users;
