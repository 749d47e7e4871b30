//! HTTP middleware: request ID and admin authentication.

pub mod admin;
pub mod request_id;
