//! Session state and the actor handle that serializes access to it.

mod actor;
mod core;

pub use self::actor::FsHandle;
pub use self::core::Session;
