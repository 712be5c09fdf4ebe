//! Types shared between the changetrail crates
//!
//! - [`RequestToken`]: identity of one logical request
//! - [`schema`]: log field keys and event names

pub mod correlation;
pub mod schema;

pub use correlation::RequestToken;
