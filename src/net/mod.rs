//! Networking paths: token signing, vote dispatch, health probing, and
//! first-boot provisioning.  Everything here speaks through the
//! [`TallyPort`](crate::app::ports::TallyPort) trait, never the HTTP
//! stack directly.

pub mod dispatch;
pub mod probe;
pub mod provision;
pub mod token;
