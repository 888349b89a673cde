//! Document access control.

pub mod policy;

pub use policy::AccessPolicy;
