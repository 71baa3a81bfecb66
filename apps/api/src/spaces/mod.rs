//! Spaces (BaaS teams): listing, administration, dashboard counts and
//! joining by code.

pub mod directory;
pub mod handlers;
pub mod join;
pub mod join_code;
