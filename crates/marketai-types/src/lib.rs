//! Wire types shared by the MarketAI server and its clients.

pub mod api;
pub mod models;

pub use models::{Platform, SavedPost, SocialConnectionRecord};
