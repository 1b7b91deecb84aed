use std::fmt::Debug;

use k8s_openapi::api::core::v1::{ConfigMap, Pod, Secret};
use k8s_openapi::api::networking::v1::Ingress;
use kube::api::{ListParams, ObjectList};
use serde::de::DeserializeOwned;

use crate::error::{ScanError, ScanResult};

/// List every object of kind `K` across all namespaces.
pub async fn list_all<K>(
    kube_client: kube::Client,
    kind: &'static str,
) -> ScanResult<ObjectList<K>>
where
    K: kube::Resource + Clone + DeserializeOwned + Debug,
    K::DynamicType: Default,
{
    let api: kube::Api<K> = kube::Api::all(kube_client);
    let list = api
        .list(&ListParams::default())
        .await
        .map_err(|source| ScanError::Api { kind, source })?;

    tracing::info!("Listed {} {}", list.items.len(), kind);
    Ok(list)
}

pub async fn get_pods(kube_client: kube::Client) -> ScanResult<ObjectList<Pod>> {
    list_all(kube_client, "pods").await
}

pub async fn get_secrets(kube_client: kube::Client) -> ScanResult<ObjectList<Secret>> {
    list_all(kube_client, "secrets").await
}

pub async fn get_config_maps(kube_client: kube::Client) -> ScanResult<ObjectList<ConfigMap>> {
    list_all(kube_client, "configmaps").await
}

pub async fn get_ingresses(kube_client: kube::Client) -> ScanResult<ObjectList<Ingress>> {
    list_all(kube_client, "ingresses").await
}
