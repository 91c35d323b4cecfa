//! Domain entities: organizations and the certificates issued for them.

pub mod certificate;
pub mod organization;

pub use certificate::Certificate;
pub use organization::Organization;
