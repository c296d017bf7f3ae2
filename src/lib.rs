//! Bookshelf application library
//!
//! Book catalogue module plus the bootstrap that wires it to storage and the
//! HTTP server.

pub mod bootstrap;
pub mod modules;
