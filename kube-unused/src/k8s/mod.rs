/// This module is responsible for interfacing with Kubernetes.
pub mod client;
pub mod list;
