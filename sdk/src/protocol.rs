//! Wire format spoken with the host: JSON-RPC 2.0, one compact object per line.

use serde::{Deserialize, Serialize};

/// The only JSON-RPC revision we speak.
pub const JSONRPC_VERSION: &str = "2.0";

/// Protocol revision offered when the host does not ask for one.
pub const LATEST_PROTOCOL_VERSION: &str = "2024-11-05";

/// Name and version of either end of the connection.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Implementation {
    pub name: String,
    pub version: String,
}

mod incoming;
pub use incoming::*;

mod outgoing;
pub use outgoing::*;
