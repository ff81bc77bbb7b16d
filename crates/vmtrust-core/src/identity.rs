//! Product and machine identifiers embedded in SUDI subjects.

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;
use uuid::Uuid;

use crate::error::{Result, TrustError};
use crate::paths::TrustPaths;

/// Stable identifier of the host, shared by every credential it issues.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(String);

impl ProductId {
    /// Wrap an identifier exactly as given.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// The identifier text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Random identifier of a single issued credential.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MachineId(Uuid);

impl MachineId {
    /// Generate a fresh version-4 identifier.
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// Underlying UUID.
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }

    /// Raw 16 bytes, big-endian.
    pub const fn as_bytes(&self) -> &[u8; 16] {
        self.0.as_bytes()
    }
}

impl From<Uuid> for MachineId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

impl fmt::Display for MachineId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

/// Read the product identifier from `<trust_dir>/manifest/uuid`.
///
/// The whole file is taken verbatim, trailing newline included.
pub fn read_product_id(paths: &TrustPaths) -> Result<ProductId> {
    let path = paths.product_uuid_file();
    debug!(path = %path.display(), "reading product identifier");
    let content = std::fs::read(&path).map_err(|e| TrustError::io(&path, e))?;
    let value = String::from_utf8(content).map_err(|e| {
        TrustError::io(
            &path,
            std::io::Error::new(std::io::ErrorKind::InvalidData, e),
        )
    })?;
    Ok(ProductId(value))
}
