//! Building blocks for tool servers spoken to by AI-assistant hosts over the Model Context
//! Protocol.
//!
//! A server is a [`server::ToolHandler`] (the catalogue of [`tools::Tool`]s plus a way to run
//! them) handed to [`server::Server::serve_stdio`]. Everything on the wire lives in
//! [`protocol`].

pub mod protocol;
pub mod server;
pub mod tools;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

pub use server::{Server, ToolHandler};
pub use tools::{InputSchema, Property, Tool};
