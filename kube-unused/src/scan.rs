//! Cross-reference the cluster snapshot and report what nothing points at.

use std::fmt;

use k8s_openapi::api::core::v1::{ConfigMap, Pod, Secret};
use k8s_openapi::api::networking::v1::Ingress;

use crate::error::ScanResult;
use crate::k8s::list::{get_config_maps, get_ingresses, get_pods, get_secrets};
use crate::refs::{
    default_extractors, extended_extractors, ingress_references, Reference, ReferenceExtractor,
    ResourceKind,
};
use crate::unused::{MatchScope, ResourceKey, UnusedSet};

/// Point-in-time listing of everything the scan looks at.
#[derive(Debug, Clone, Default)]
pub struct Inventory {
    pub pods: Vec<Pod>,
    pub secrets: Vec<Secret>,
    pub config_maps: Vec<ConfigMap>,
    pub ingresses: Vec<Ingress>,
}

impl Inventory {
    /// List the four kinds across all namespaces, one call after the other.
    /// The first failing call aborts the whole fetch.
    pub async fn fetch(kube_client: kube::Client) -> ScanResult<Self> {
        let pods = get_pods(kube_client.clone()).await?;
        let secrets = get_secrets(kube_client.clone()).await?;
        let config_maps = get_config_maps(kube_client.clone()).await?;
        let ingresses = get_ingresses(kube_client).await?;

        Ok(Self {
            pods: pods.items,
            secrets: secrets.items,
            config_maps: config_maps.items,
            ingresses: ingresses.items,
        })
    }
}

pub struct Scanner {
    scope: MatchScope,
    extractors: Vec<Box<dyn ReferenceExtractor>>,
}

impl Default for Scanner {
    fn default() -> Self {
        Self::new(MatchScope::default())
    }
}

impl Scanner {
    pub fn new(scope: MatchScope) -> Self {
        Self {
            scope,
            extractors: default_extractors(),
        }
    }

    /// Also follow projected volumes, init/ephemeral containers and `imagePullSecrets`.
    pub fn extended(scope: MatchScope) -> Self {
        Self {
            scope,
            extractors: extended_extractors(),
        }
    }

    /// A scanner with no extractors, for callers assembling their own set.
    pub fn empty(scope: MatchScope) -> Self {
        Self {
            scope,
            extractors: Vec::new(),
        }
    }

    pub fn with_extractor(mut self, extractor: impl ReferenceExtractor + 'static) -> Self {
        self.extractors.push(Box::new(extractor));
        self
    }

    /// Start from every listed Secret and ConfigMap and strike out whatever a Pod or
    /// an Ingress refers to.
    pub fn scan(&self, inventory: &Inventory) -> ScanReport {
        let mut unused = Unused {
            secrets: UnusedSet::new(self.scope, inventory.secrets.iter().cloned()),
            config_maps: UnusedSet::new(self.scope, inventory.config_maps.iter().cloned()),
        };

        let mut refs = Vec::new();
        for pod in &inventory.pods {
            let Some(spec) = &pod.spec else {
                continue;
            };
            let namespace = pod.metadata.namespace.as_deref();
            for extractor in &self.extractors {
                extractor.extract(spec, &mut refs);
                for reference in refs.drain(..) {
                    unused.mark_used(extractor.name(), namespace, &reference);
                }
            }
        }

        for ingress in &inventory.ingresses {
            let namespace = ingress.metadata.namespace.as_deref();
            for reference in ingress_references(ingress) {
                unused.mark_used("ingress-tls", namespace, &reference);
            }
        }

        ScanReport {
            pod_count: inventory.pods.len(),
            unused_secrets: unused.secrets.into_keys(),
            unused_config_maps: unused.config_maps.into_keys(),
        }
    }
}

struct Unused {
    secrets: UnusedSet<Secret>,
    config_maps: UnusedSet<ConfigMap>,
}

impl Unused {
    fn mark_used(&mut self, source: &str, namespace: Option<&str>, reference: &Reference) {
        let removed = match reference.kind {
            ResourceKind::Secret => self.secrets.remove(namespace, &reference.name).is_some(),
            ResourceKind::ConfigMap => {
                self.config_maps.remove(namespace, &reference.name).is_some()
            }
        };
        if removed {
            tracing::debug!(
                "{:?} {:?} is used ({} in namespace {:?})",
                reference.kind,
                reference.name,
                source,
                namespace
            );
        } else {
            tracing::trace!(
                "{:?} {:?} referenced by {} was not listed or already seen",
                reference.kind,
                reference.name,
                source
            );
        }
    }
}

/// The outcome of a scan: names that had no reference at snapshot time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanReport {
    pub pod_count: usize,
    pub unused_secrets: Vec<ResourceKey>,
    pub unused_config_maps: Vec<ResourceKey>,
}

impl fmt::Display for ScanReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "There are {} pods in the cluster", self.pod_count)?;

        writeln!(f, "Secrets not used:")?;
        writeln!(f, "{}", self.unused_secrets.len())?;
        for key in &self.unused_secrets {
            writeln!(f, "{}", key)?;
        }

        writeln!(f)?;
        writeln!(f, "Configmaps not used:")?;
        writeln!(f, "{}", self.unused_config_maps.len())?;
        for key in &self.unused_config_maps {
            writeln!(f, "{}", key)?;
        }
        Ok(())
    }
}
