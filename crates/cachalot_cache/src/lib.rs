//! Disk-backed response cache.
//!
//! One file per entry under the cache directory, named by the SHA-256 hex
//! digest of the request URL. The file's modification time is the freshness
//! clock; entries past their TTL are treated as misses and overwritten by
//! the next successful fetch. There is no locking: inserts replace the
//! entry file atomically and the last writer wins.

mod key;
mod policy;
mod store;

pub use key::CacheKey;
pub use policy::FreshnessPolicy;
pub use store::{DiskStore, Lookup};
