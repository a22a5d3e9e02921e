//! Cache module for memoizing API responses in memory
//!
//! This module provides a response cache with per-entry TTL used by the API
//! clients for slowly-changing reference data (specialties, payers,
//! departments). Expired entries are never served: they are dropped by the
//! read that finds them. Clients invalidate affected resources after every
//! successful mutation.

mod clock;
mod keys;
mod store;

pub use clock::{Clock, ManualClock, SystemClock};
pub use keys::{CacheKey, Resource, LONG_TTL, REFERENCE_TTL, SHORT_TTL};
pub use store::ResponseCache;
