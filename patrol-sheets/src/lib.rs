//! Gateway to the remote tabular store the workflow reads from and (one day)
//! writes back to.
//!
//! The store itself is an external collaborator; this crate pins down its
//! shape: worksheets addressed by name, rows as ordered strings with a
//! derived position index, and an overwrite-by-index write path. The
//! [`SheetStore`] trait is the seam; production talks to a values-style
//! REST endpoint, tests use the in-memory double.

pub mod auth;
pub mod memory;
pub mod rest;
pub mod row;
pub mod store;

pub use auth::{load_service_account_key, ServiceAccountKey};
pub use memory::MemorySheets;
pub use rest::RestSheets;
pub use row::{index_rows, SheetRow};
pub use store::{SheetError, SheetStore};
