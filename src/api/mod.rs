//! API route definitions
//!
//! Two REST generations are served side by side: the legacy resource
//! routers under /api with Basic auth, and the v2 surface under /api/v2
//! with JWT bearer auth. Health endpoints sit at the root.

pub mod health;
pub mod legacy;
pub mod v2;
