//! Errors that abort a scan. None of them are recovered from: a scan either
//! completes against a full snapshot or produces nothing.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScanError {
    /// The kubeconfig file could not be read or turned into a client config.
    #[error("Failed to load kubeconfig {path:?}: {source}")]
    Kubeconfig {
        path: PathBuf,
        #[source]
        source: kube::config::KubeconfigError,
    },

    /// No kubeconfig was given and none could be discovered.
    #[error("Failed to infer cluster configuration: {0}")]
    InferConfig(#[from] kube::config::InferConfigError),

    /// A client could not be built from an otherwise valid config.
    #[error("Failed to connect to the cluster: {0}")]
    Connection(#[source] kube::Error),

    /// A list call against the API server failed.
    #[error("Failed to list {kind}: {source}")]
    Api {
        kind: &'static str,
        #[source]
        source: kube::Error,
    },
}

pub type ScanResult<T> = std::result::Result<T, ScanError>;
