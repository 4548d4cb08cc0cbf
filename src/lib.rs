//! Authenticated video upload gateway.
//!
//! Accepts a video from a signed-in user, forwards it to Cloudinary with a
//! quality/format transformation and records the resulting metadata in
//! PostgreSQL. The `client` module holds the upload form state machine used
//! by front ends talking to the gateway.

pub mod client;
pub mod core;
pub mod features;
pub mod modules;
pub mod shared;
