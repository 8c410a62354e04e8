//! Value Object Module

pub mod list_query;
pub mod post_text;
