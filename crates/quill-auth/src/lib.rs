//! # quill-auth
//!
//! Identity resolution and document access policy for Quill.
//!
//! ## Modules
//!
//! - `jwt`: signed identity token issuance and validation
//! - `provider`: the `AuthProvider` seam the transport calls once per connection
//! - `acl`: the pure read/edit/manage policy over a document's owner and collaborators

pub mod acl;
pub mod jwt;
pub mod provider;

pub use acl::AccessPolicy;
pub use jwt::{Claims, JwtDecoder, JwtEncoder};
pub use provider::{AuthProvider, JwtAuthProvider};
