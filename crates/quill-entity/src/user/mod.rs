//! User identity value objects.

pub mod identity;

pub use identity::Identity;
