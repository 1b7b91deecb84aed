//! References from workloads to Secrets and ConfigMaps.
//!
//! Every place a Pod spec can name a Secret or ConfigMap is covered by a
//! [`ReferenceExtractor`]. Extractors work on a [`PodSpec`] rather than a Pod so the
//! same set applies to anything carrying a pod template.

use k8s_openapi::api::core::v1::{EnvFromSource, EnvVar, PodSpec};
use k8s_openapi::api::networking::v1::Ingress;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Secret,
    ConfigMap,
}

/// A single occurrence of a Secret or ConfigMap name inside a workload.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Reference {
    pub kind: ResourceKind,
    pub name: String,
}

impl Reference {
    pub fn secret(name: &impl RefName) -> Option<Self> {
        Self::new(ResourceKind::Secret, name)
    }

    pub fn config_map(name: &impl RefName) -> Option<Self> {
        Self::new(ResourceKind::ConfigMap, name)
    }

    /// Returns None when there is no usable name to reference.
    fn new(kind: ResourceKind, name: &impl RefName) -> Option<Self> {
        name.ref_name().map(|name| Self {
            kind,
            name: name.to_string(),
        })
    }
}

/// Name fields in the core API are either required or optional depending on the
/// object. Both shapes resolve to a non-empty name or nothing.
pub trait RefName {
    fn ref_name(&self) -> Option<&str>;
}

impl RefName for String {
    fn ref_name(&self) -> Option<&str> {
        Some(self.as_str()).filter(|name| !name.is_empty())
    }
}

impl RefName for Option<String> {
    fn ref_name(&self) -> Option<&str> {
        self.as_ref().and_then(RefName::ref_name)
    }
}

/// A source of references within a pod spec.
pub trait ReferenceExtractor {
    /// Short identifier used in logs.
    fn name(&self) -> &'static str;

    fn extract(&self, spec: &PodSpec, refs: &mut Vec<Reference>);
}

/// `secret` and `configMap` volumes.
#[derive(Debug, Default)]
pub struct VolumeExtractor;

impl ReferenceExtractor for VolumeExtractor {
    fn name(&self) -> &'static str {
        "volumes"
    }

    fn extract(&self, spec: &PodSpec, refs: &mut Vec<Reference>) {
        for volume in spec.volumes.iter().flatten() {
            if let Some(secret) = &volume.secret {
                refs.extend(Reference::secret(&secret.secret_name));
            }
            if let Some(config_map) = &volume.config_map {
                refs.extend(Reference::config_map(&config_map.name));
            }
        }
    }
}

/// `envFrom` entries of the pod's containers.
#[derive(Debug, Default)]
pub struct EnvFromExtractor;

impl ReferenceExtractor for EnvFromExtractor {
    fn name(&self) -> &'static str {
        "env-from"
    }

    fn extract(&self, spec: &PodSpec, refs: &mut Vec<Reference>) {
        let sources = spec
            .containers
            .iter()
            .flat_map(|container| container.env_from.iter().flatten());
        env_from_references(sources, refs);
    }
}

/// `env[].valueFrom.secretKeyRef` and `env[].valueFrom.configMapKeyRef` of the
/// pod's containers.
#[derive(Debug, Default)]
pub struct EnvValueFromExtractor;

impl ReferenceExtractor for EnvValueFromExtractor {
    fn name(&self) -> &'static str {
        "env-value-from"
    }

    fn extract(&self, spec: &PodSpec, refs: &mut Vec<Reference>) {
        let vars = spec
            .containers
            .iter()
            .flat_map(|container| container.env.iter().flatten());
        env_value_from_references(vars, refs);
    }
}

/// Secrets and ConfigMaps projected into a `projected` volume.
#[derive(Debug, Default)]
pub struct ProjectedVolumeExtractor;

impl ReferenceExtractor for ProjectedVolumeExtractor {
    fn name(&self) -> &'static str {
        "projected-volumes"
    }

    fn extract(&self, spec: &PodSpec, refs: &mut Vec<Reference>) {
        let sources = spec
            .volumes
            .iter()
            .flatten()
            .filter_map(|volume| volume.projected.as_ref())
            .flat_map(|projected| projected.sources.iter().flatten());

        for source in sources {
            if let Some(secret) = &source.secret {
                refs.extend(Reference::secret(&secret.name));
            }
            if let Some(config_map) = &source.config_map {
                refs.extend(Reference::config_map(&config_map.name));
            }
        }
    }
}

/// `envFrom` and `env[].valueFrom` of init and ephemeral containers.
#[derive(Debug, Default)]
pub struct SideContainerEnvExtractor;

impl ReferenceExtractor for SideContainerEnvExtractor {
    fn name(&self) -> &'static str {
        "side-container-env"
    }

    fn extract(&self, spec: &PodSpec, refs: &mut Vec<Reference>) {
        for container in spec.init_containers.iter().flatten() {
            env_from_references(container.env_from.iter().flatten(), refs);
            env_value_from_references(container.env.iter().flatten(), refs);
        }
        for container in spec.ephemeral_containers.iter().flatten() {
            env_from_references(container.env_from.iter().flatten(), refs);
            env_value_from_references(container.env.iter().flatten(), refs);
        }
    }
}

/// `imagePullSecrets` of the pod.
#[derive(Debug, Default)]
pub struct ImagePullSecretsExtractor;

impl ReferenceExtractor for ImagePullSecretsExtractor {
    fn name(&self) -> &'static str {
        "image-pull-secrets"
    }

    fn extract(&self, spec: &PodSpec, refs: &mut Vec<Reference>) {
        for pull_secret in spec.image_pull_secrets.iter().flatten() {
            refs.extend(Reference::secret(&pull_secret.name));
        }
    }
}

/// Volumes, `envFrom` and `valueFrom` of regular containers.
pub fn default_extractors() -> Vec<Box<dyn ReferenceExtractor>> {
    vec![
        Box::new(VolumeExtractor),
        Box::new(EnvFromExtractor),
        Box::new(EnvValueFromExtractor),
    ]
}

/// The default set plus projected volumes, init/ephemeral containers and
/// `imagePullSecrets`.
pub fn extended_extractors() -> Vec<Box<dyn ReferenceExtractor>> {
    let mut extractors = default_extractors();
    extractors.push(Box::new(ProjectedVolumeExtractor));
    extractors.push(Box::new(SideContainerEnvExtractor));
    extractors.push(Box::new(ImagePullSecretsExtractor));
    extractors
}

fn env_from_references<'a>(
    sources: impl Iterator<Item = &'a EnvFromSource>,
    refs: &mut Vec<Reference>,
) {
    for env_from in sources {
        if let Some(config_map_ref) = &env_from.config_map_ref {
            refs.extend(Reference::config_map(&config_map_ref.name));
        }
        if let Some(secret_ref) = &env_from.secret_ref {
            refs.extend(Reference::secret(&secret_ref.name));
        }
    }
}

fn env_value_from_references<'a>(
    vars: impl Iterator<Item = &'a EnvVar>,
    refs: &mut Vec<Reference>,
) {
    for source in vars.filter_map(|var| var.value_from.as_ref()) {
        if let Some(config_map_key_ref) = &source.config_map_key_ref {
            refs.extend(Reference::config_map(&config_map_key_ref.name));
        }
        if let Some(secret_key_ref) = &source.secret_key_ref {
            refs.extend(Reference::secret(&secret_key_ref.name));
        }
    }
}

/// Secrets named by the TLS section of an Ingress.
pub fn ingress_references(ingress: &Ingress) -> Vec<Reference> {
    ingress
        .spec
        .iter()
        .flat_map(|spec| spec.tls.iter().flatten())
        .filter_map(|tls| Reference::secret(&tls.secret_name))
        .collect()
}
