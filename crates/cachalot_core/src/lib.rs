//! Listener/dispatcher and per-connection handling.

pub mod master;
pub mod worker;

pub use master::Master;
