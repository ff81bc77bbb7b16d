//! Filesystem layout for trust material and issued credentials.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// File name of an issued private key.
pub const PRIVKEY_FILE: &str = "privkey.pem";

/// File name of an issued certificate.
pub const CERT_FILE: &str = "cert.pem";

/// Logical name of the CA that signs SUDI credentials.
pub const SUDI_CA_NAME: &str = "sudi-ca";

/// Keyset used when the caller does not pick one.
pub const DEFAULT_KEYSET: &str = "default";

/// Root directories the issuance workflow reads from and writes to.
///
/// ```text
/// <trust_dir>/manifest/uuid                  product identifier
/// <trust_dir>/keys/<keyset>/<ca>/cert.pem    CA material
/// <sudi_dir>/<vm>/{privkey,cert}.pem         issued credentials
/// <machines_dir>/<vm>/<vm>.yaml              VM configuration
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrustPaths {
    /// Trust material root.
    pub trust_dir: PathBuf,
    /// Credential storage root.
    pub sudi_dir: PathBuf,
    /// VM configuration root.
    pub machines_dir: PathBuf,
}

impl TrustPaths {
    /// Build a layout from explicit roots.
    pub fn new(
        trust_dir: impl Into<PathBuf>,
        sudi_dir: impl Into<PathBuf>,
        machines_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            trust_dir: trust_dir.into(),
            sudi_dir: sudi_dir.into(),
            machines_dir: machines_dir.into(),
        }
    }

    /// Build the conventional layout under a single base directory.
    pub fn under(base: &Path) -> Self {
        let trust_dir = base.join("trust");
        Self {
            sudi_dir: trust_dir.join("sudi"),
            trust_dir,
            machines_dir: base.join("machines"),
        }
    }

    /// Plain-text file holding this host's product identifier.
    pub fn product_uuid_file(&self) -> PathBuf {
        self.trust_dir.join("manifest").join("uuid")
    }

    /// Directory holding one subdirectory per keyset.
    pub fn keys_dir(&self) -> PathBuf {
        self.trust_dir.join("keys")
    }

    /// Credential storage directory for a VM.
    pub fn sudi_path(&self, vm: &str) -> PathBuf {
        self.sudi_dir.join(vm)
    }

    /// Configuration file whose presence marks a VM as initialized.
    pub fn vm_config_path(&self, vm: &str) -> PathBuf {
        self.machines_dir.join(vm).join(format!("{vm}.yaml"))
    }
}

/// Returns true if `name` can be used as a single directory name.
pub fn is_single_component(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains(['/', '\\', '\0'])
}
