use std::path::{Path, PathBuf};

use kube::config::{KubeConfigOptions, Kubeconfig};

use crate::error::{ScanError, ScanResult};

/// Where the cluster access configuration comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KubeconfigSource {
    /// A kubeconfig file on disk.
    File(PathBuf),
    /// Let kube discover it: `KUBECONFIG`, then the in-cluster service account.
    Infer,
}

impl KubeconfigSource {
    /// Pick the configuration source.
    /// An explicit (non-empty) path always wins, even if it does not exist, so that
    /// a typo surfaces as an error instead of silently talking to another cluster.
    /// Without one we use `~/.kube/config` when it exists and fall back to inference otherwise.
    pub fn resolve(explicit: Option<&Path>, home: Option<&Path>) -> Self {
        if let Some(path) = explicit.filter(|p| !p.as_os_str().is_empty()) {
            return Self::File(path.to_path_buf());
        }

        match home.map(default_kubeconfig_path) {
            Some(path) if path.exists() => Self::File(path),
            _ => Self::Infer,
        }
    }
}

/// `<home>/.kube/config`
pub fn default_kubeconfig_path(home: &Path) -> PathBuf {
    home.join(".kube").join("config")
}

pub async fn load_config(source: &KubeconfigSource) -> ScanResult<kube::Config> {
    match source {
        KubeconfigSource::File(path) => {
            let kubeconfig_error = |source| ScanError::Kubeconfig {
                path: path.clone(),
                source,
            };
            let kubeconfig = Kubeconfig::read_from(path).map_err(kubeconfig_error)?;
            kube::Config::from_custom_kubeconfig(kubeconfig, &KubeConfigOptions::default())
                .await
                .map_err(kubeconfig_error)
        }
        KubeconfigSource::Infer => Ok(kube::Config::infer().await?),
    }
}

/// Build a client for the resolved configuration source.
pub async fn connect(source: &KubeconfigSource) -> ScanResult<kube::Client> {
    let config = load_config(source).await?;
    tracing::info!("Connecting to {}", config.cluster_url);
    kube::Client::try_from(config).map_err(ScanError::Connection)
}
