//! Internal HTTP layer for biometric match service communication.
//!
//! This module is `pub(crate)` - it contains implementation details
//! not exposed to library users.

pub(crate) mod common;
pub(crate) mod request;
pub(crate) mod response;
pub(crate) mod wire_log;
