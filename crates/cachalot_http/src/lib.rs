//! Low-level HTTP/1.x plumbing: request-head reading, request-line parsing
//! and raw response writing.

pub mod request;
pub mod response;
