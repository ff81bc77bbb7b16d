//! SUDI issuance workflow.
//!
//! Validation runs before anything touches the filesystem, so a rejected
//! request leaves no trace. Only a signer failure can leave an empty
//! credential directory behind.

use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use vmtrust_ca::{CaError, CaProvider, CredentialSigner, KeysetCaProvider, RcgenSigner};
use vmtrust_core::paths::is_single_component;
use vmtrust_core::{
    read_product_id, CertificateTemplate, ConfigDirRegistry, MachineId, ProductId, Result,
    TrustError, TrustPaths, VmRegistry, CERT_FILE, PRIVKEY_FILE, SUDI_CA_NAME,
};

/// A credential that was just written.
#[derive(Debug, Clone)]
pub struct IssuedCredential {
    /// VM the credential belongs to
    pub vm: String,
    /// Directory holding `privkey.pem` and `cert.pem`
    pub dir: PathBuf,
    /// Machine identifier embedded in the subject
    pub machine_id: MachineId,
    /// Product identifier embedded in the subject
    pub product_id: ProductId,
}

/// Issues SUDI credentials against pluggable collaborators.
pub struct SudiIssuer<'a> {
    paths: &'a TrustPaths,
    registry: &'a dyn VmRegistry,
    ca: &'a dyn CaProvider,
    signer: &'a dyn CredentialSigner,
}

impl<'a> SudiIssuer<'a> {
    pub fn new(
        paths: &'a TrustPaths,
        registry: &'a dyn VmRegistry,
        ca: &'a dyn CaProvider,
        signer: &'a dyn CredentialSigner,
    ) -> Self {
        Self {
            paths,
            registry,
            ca,
            signer,
        }
    }

    /// Generate a SUDI key and certificate for `vm`, signed by the
    /// `sudi-ca` of `keyset`.
    ///
    /// Fails without writing anything if the VM is unknown or already has a
    /// key or certificate.
    pub fn issue(&self, vm: &str, keyset: &str) -> Result<IssuedCredential> {
        if vm.is_empty() {
            return Err(TrustError::Validation("VM name must be provided".into()));
        }
        if !is_single_component(vm) {
            return Err(TrustError::Validation(format!("invalid VM name {vm:?}")));
        }

        if !self.registry.is_initialized(vm) {
            return Err(TrustError::NotInitialized { vm: vm.to_string() });
        }
        debug!(vm, "VM is initialized");

        let dir = self.paths.sudi_path(vm);
        for file in [PRIVKEY_FILE, CERT_FILE] {
            if dir.join(file).exists() {
                warn!(vm, file, dir = %dir.display(), "credential already exists");
                return Err(TrustError::CredentialExists {
                    vm: vm.to_string(),
                    file: file.to_string(),
                    dir,
                });
            }
        }

        let product_id = read_product_id(self.paths)?;
        let machine_id = MachineId::generate();
        let template = CertificateTemplate::new(&product_id, machine_id);
        debug!(vm, machine = %machine_id, "built certificate template");

        let ca = self
            .ca
            .resolve(SUDI_CA_NAME, keyset)
            .map_err(|e| TrustError::CaResolution {
                ca: SUDI_CA_NAME.to_string(),
                keyset: keyset.to_string(),
                reason: e.to_string(),
            })?;

        create_credential_dir(&dir)?;
        self.signer
            .sign(&template, &ca, &dir)
            .map_err(|e| signing_error(vm, &dir, e))?;

        info!(vm, dir = %dir.display(), "Generated sudi key and cert");
        Ok(IssuedCredential {
            vm: vm.to_string(),
            dir,
            machine_id,
            product_id,
        })
    }
}

/// Issue a SUDI credential using the filesystem-backed collaborators.
pub fn issue_sudi(paths: &TrustPaths, vm: &str, keyset: &str) -> Result<IssuedCredential> {
    let registry = ConfigDirRegistry::new(paths);
    let ca = KeysetCaProvider::from_paths(paths);
    let signer = RcgenSigner::new();
    SudiIssuer::new(paths, &registry, &ca, &signer).issue(vm, keyset)
}

fn create_credential_dir(dir: &Path) -> Result<()> {
    let mut builder = std::fs::DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(0o755);
    }
    builder.create(dir).map_err(|e| TrustError::io(dir, e))
}

fn signing_error(vm: &str, dir: &Path, err: CaError) -> TrustError {
    match err {
        CaError::AlreadyExists { path } => TrustError::CredentialExists {
            vm: vm.to_string(),
            file: path
                .file_name()
                .map_or_else(String::new, |f| f.to_string_lossy().into_owned()),
            dir: dir.to_path_buf(),
        },
        CaError::Io { path, source } | CaError::Unreadable { path, source } => {
            TrustError::Io { path, source }
        }
        other => TrustError::Signing(other.to_string()),
    }
}
