use crate::error::{CertCenterError, Result};
use crate::validation::{validate_organization_id, validate_organization_names};

/// An organization that owns a certificate chain.
///
/// `names` is never empty; its first element is the primary display name and
/// every name ends up as an `O` attribute of the certificates issued for it.
/// The id is a lower case slug, see [`validate_organization_id`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Organization {
    id: String,
    names: Vec<String>,
}

impl Organization {
    pub fn new(id: impl Into<String>, names: Vec<String>) -> Result<Self> {
        let id = id.into();
        validate_organization_id(&id)?;
        if names.is_empty() {
            return Err(CertCenterError::InvalidInput(format!(
                "organization {id} needs at least one name"
            )));
        }
        validate_organization_names(&names)?;
        Ok(Self { id, names })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// The primary display name.
    pub fn name(&self) -> &str {
        &self.names[0]
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Returns a copy of this organization under a new list of names.
    pub fn with_names(&self, names: Vec<String>) -> Result<Self> {
        Self::new(self.id.clone(), names)
    }
}
