//! Domains module containing business logic organized by bounded contexts.
//!
//! Each subdomain represents one area of the gateway, from the handler
//! contract at the bottom to the reload watcher at the top.

pub mod dispatch;
pub mod handlers;
pub mod registry;
pub mod schema;
pub mod watcher;
