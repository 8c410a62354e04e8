//! Infrastructure Layer
//!
//! Storage and content generation implementations.

pub mod gemini;
pub mod memory;
pub mod postgres;
