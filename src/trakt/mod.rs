// Trakt API module
// Wire types, the rate-limited request wrapper, and list operations

mod client;
mod lists;
pub mod models;

pub use client::TraktClient;
