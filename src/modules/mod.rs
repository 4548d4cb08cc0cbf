//! Modules layer - Infrastructure components for external integrations
//!
//! Contains clients and adapters for external services, currently the
//! media-processing service the upload gateway forwards videos to.

pub mod media;
