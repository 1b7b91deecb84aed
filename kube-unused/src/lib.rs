//! Find Secrets and ConfigMaps that no Pod or Ingress in the cluster refers to.

pub mod error;
pub mod k8s;
pub mod refs;
pub mod scan;
pub mod unused;

pub use error::{ScanError, ScanResult};
pub use scan::{Inventory, ScanReport, Scanner};
pub use unused::{MatchScope, ResourceKey, UnusedSet};
