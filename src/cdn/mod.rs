//! CDN cache invalidation

pub mod fastly;

pub use fastly::{DEFAULT_FASTLY_API_URL, FastlyPurger};
