//! Entity Module

pub mod account;
pub mod notification_preference;
pub mod one_time_code;
pub mod session;
