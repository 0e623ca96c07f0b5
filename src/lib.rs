//! Connection-profile store and `ssh` command synthesis.
//!
//! Profiles of each kind live in their own [`store::Store`], backed by a
//! structured file. [`model::Profile::command`] turns a profile into the
//! argument vector for the external `ssh` client.

pub mod command;
pub mod config;
pub mod error;
pub mod model;
pub mod store;

pub use command::SshCommand;
pub use error::StoreError;
pub use model::{DirectConnection, PortForward, Profile, ProfileId, ProfileKind, ProxyJump};
pub use store::{FileBackend, Store};
