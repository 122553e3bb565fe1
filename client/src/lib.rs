//! Alcove client.
//!
//! Guild channel management for the Alcove chat platform: a cached view of
//! guilds, roles, members, and channels; permission resolution against that
//! cache; and channel mutations (edits, moves, overwrite changes) planned
//! locally and pushed through an HTTP transport.
//!
//! The crate splits along a simple line: everything pure lives in
//! `alcove-model`, everything stateful or async lives here.

pub mod cache;
pub mod channels;
pub mod config;
pub mod error;
pub mod transport;

pub use cache::{Channel, Guild, GuildDirectory, Member, Role};
pub use channels::{ChannelEdit, ChannelMutator, OverwriteEdit};
pub use config::ClientConfig;
pub use error::ClientError;
pub use transport::{ChannelData, HttpTransport, Transport, TransportError};

pub use alcove_model as model;
