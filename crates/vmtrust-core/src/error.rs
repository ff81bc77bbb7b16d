use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for credential issuance operations
pub type Result<T> = std::result::Result<T, TrustError>;

/// Errors that can occur while issuing a VM credential
#[derive(Error, Debug)]
pub enum TrustError {
    /// Caller supplied an unusable argument (empty VM name, bad keyset)
    #[error("{0}")]
    Validation(String),

    /// The VM has no configuration yet
    #[error("{vm} has not been initialized")]
    NotInitialized {
        /// Name of the VM that was looked up
        vm: String,
    },

    /// A private key or certificate is already present for the VM
    #[error("a {file} already exists for {vm} in {}", .dir.display())]
    CredentialExists {
        /// Name of the VM
        vm: String,
        /// File name that was found (`privkey.pem` or `cert.pem`)
        file: String,
        /// Credential storage directory
        dir: PathBuf,
    },

    /// Filesystem access failed
    #[error("i/o error on {}: {source}", .path.display())]
    Io {
        /// Path being read, created or written
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// The signing CA could not be resolved for the keyset
    #[error("cannot resolve CA {ca} for keyset {keyset}: {reason}")]
    CaResolution {
        /// Logical CA name
        ca: String,
        /// Keyset selector
        keyset: String,
        /// What went wrong
        reason: String,
    },

    /// Key generation or certificate encoding failed
    #[error("signing failed: {0}")]
    Signing(String),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),
}

impl TrustError {
    /// Wrap an I/O error together with the path it concerns.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Returns true if a credential was already issued for the VM
    #[must_use]
    pub const fn is_credential_exists(&self) -> bool {
        matches!(self, Self::CredentialExists { .. })
    }

    /// Returns true if the VM has not been initialized
    #[must_use]
    pub const fn is_not_initialized(&self) -> bool {
        matches!(self, Self::NotInitialized { .. })
    }

    /// Returns true if the CA could not be resolved
    #[must_use]
    pub const fn is_ca_resolution(&self) -> bool {
        matches!(self, Self::CaResolution { .. })
    }

    /// Returns true for filesystem failures
    #[must_use]
    pub const fn is_io(&self) -> bool {
        matches!(self, Self::Io { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_initialized_names_vm() {
        let err = TrustError::NotInitialized { vm: "vm1".into() };
        assert_eq!(err.to_string(), "vm1 has not been initialized");
        assert!(err.is_not_initialized());
        assert!(!err.is_credential_exists());
    }

    #[test]
    fn test_credential_exists_message() {
        let err = TrustError::CredentialExists {
            vm: "vm1".into(),
            file: "privkey.pem".into(),
            dir: PathBuf::from("/sudi/vm1"),
        };
        assert_eq!(
            err.to_string(),
            "a privkey.pem already exists for vm1 in /sudi/vm1"
        );
        assert!(err.is_credential_exists());
    }

    #[test]
    fn test_io_keeps_source() {
        let err = TrustError::io(
            "/trust/manifest/uuid",
            std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        );
        assert!(err.is_io());
        assert!(std::error::Error::source(&err).is_some());
        assert!(err.to_string().contains("/trust/manifest/uuid"));
    }
}
