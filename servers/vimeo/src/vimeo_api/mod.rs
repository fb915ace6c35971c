//! Vimeo REST API client library.
//!
//! Covers the handful of endpoints the tools need: listing, searching, fetching and updating
//! videos, listing and creating folders (called "projects" by the API), moving videos into
//! folders, and reading the account's quota.
//!
//! All resource types are deliberately lenient. The API omits or nulls optional fields freely,
//! so every modelled field is optional and absence is resolved by the caller.

pub mod client;
pub mod folders;
pub mod me;
pub mod types;
pub mod videos;

pub use client::{ApiResponse, VimeoClient};
pub use folders::Folder;
pub use me::User;
pub use types::{Page, PagedStream};
pub use videos::{Video, VideoUpdate};
