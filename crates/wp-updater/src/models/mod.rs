//! Data models shared across the updater.
//!
//! `Release` and `UpdateNotice` serialize with the field names the host's
//! update registry expects (`new_version`, `package`, `url`, ...), so a
//! notice can be handed over without another mapping step.

mod release;
mod wire;

pub use release::*;
pub use wire::*;
