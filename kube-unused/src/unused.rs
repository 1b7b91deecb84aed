use std::collections::BTreeMap;
use std::fmt;

use kube::Resource;

/// How a reference is matched against a listed resource.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MatchScope {
    /// Match on the bare name. A reference from any namespace clears every
    /// resource with that name, and resources sharing a name across namespaces
    /// collapse into one entry (the last one listed).
    #[default]
    ClusterWide,
    /// Match on `(namespace, name)`; a reference only clears the resource in the
    /// referencing object's namespace.
    Namespaced,
}

impl MatchScope {
    pub fn key(&self, namespace: Option<&str>, name: &str) -> ResourceKey {
        let namespace = match self {
            MatchScope::ClusterWide => None,
            MatchScope::Namespaced => namespace.map(str::to_string),
        };
        ResourceKey {
            namespace,
            name: name.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourceKey {
    pub namespace: Option<String>,
    pub name: String,
}

impl fmt::Display for ResourceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.namespace {
            Some(namespace) => write!(f, "{}/{}", namespace, self.name),
            None => write!(f, "{}", self.name),
        }
    }
}

/// All resources of one kind that have not been referenced (yet).
/// Starts out holding everything that was listed and only ever shrinks.
#[derive(Debug, Clone)]
pub struct UnusedSet<K> {
    scope: MatchScope,
    entries: BTreeMap<ResourceKey, K>,
}

impl<K: Resource> UnusedSet<K> {
    pub fn new(scope: MatchScope, items: impl IntoIterator<Item = K>) -> Self {
        let mut entries = BTreeMap::new();
        for item in items {
            let Some(name) = item.meta().name.clone() else {
                continue;
            };
            let key = scope.key(item.meta().namespace.as_deref(), &name);
            if let Some(previous) = entries.insert(key, item) {
                tracing::debug!(
                    "{:?} in namespace {:?} shadowed by a later resource of the same name",
                    name,
                    previous.meta().namespace
                );
            }
        }
        Self { scope, entries }
    }

    /// Mark `name`, as referenced from `namespace`, as used.
    /// Names that were never listed are ignored.
    pub fn remove(&mut self, namespace: Option<&str>, name: &str) -> Option<K> {
        self.entries.remove(&self.scope.key(namespace, name))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn into_keys(self) -> Vec<ResourceKey> {
        self.entries.into_keys().collect()
    }
}
