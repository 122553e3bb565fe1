//! Channel editing, moving, and permission management.

pub mod edit;
pub mod mutator;

pub use edit::{ChannelEdit, OverwriteEdit};
pub use mutator::ChannelMutator;
