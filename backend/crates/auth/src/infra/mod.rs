//! Infrastructure Layer
//!
//! Storage and directory implementations.

pub mod ldap;
pub mod memory;
pub mod postgres;
