// handlers/public/mod.rs - endpoints that need no token
//
// Registration and login are the token acquisition flow; `/` and `/health`
// are liveness probes.
pub mod auth;
pub mod health;

pub use auth::{login, register};
pub use health::{health, root};
