//! VM configuration lookup.

use std::path::PathBuf;

use crate::paths::TrustPaths;

/// Tells whether a VM has been initialized.
pub trait VmRegistry {
    /// Returns true if configuration exists for `vm`.
    fn is_initialized(&self, vm: &str) -> bool;
}

/// Registry backed by the `<machines_dir>/<vm>/<vm>.yaml` convention.
#[derive(Debug, Clone)]
pub struct ConfigDirRegistry {
    paths: TrustPaths,
}

impl ConfigDirRegistry {
    pub fn new(paths: &TrustPaths) -> Self {
        Self {
            paths: paths.clone(),
        }
    }

    /// Configuration path probed for `vm`.
    pub fn conf_path(&self, vm: &str) -> PathBuf {
        self.paths.vm_config_path(vm)
    }
}

impl VmRegistry for ConfigDirRegistry {
    fn is_initialized(&self, vm: &str) -> bool {
        self.conf_path(vm).exists()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_initialized_when_config_present() {
        let dir = tempdir().unwrap();
        let paths = TrustPaths::under(dir.path());
        let registry = ConfigDirRegistry::new(&paths);

        assert!(!registry.is_initialized("vm1"));

        let conf = registry.conf_path("vm1");
        std::fs::create_dir_all(conf.parent().unwrap()).unwrap();
        std::fs::write(&conf, "name: vm1\n").unwrap();

        assert!(registry.is_initialized("vm1"));
        assert!(!registry.is_initialized("vm2"));
    }
}
