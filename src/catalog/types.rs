use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

fn default_tag() -> String {
    "latest".to_string()
}

fn default_icon() -> String {
    "Box".to_string()
}

/// Catalog entry describing how to run one tool as a container.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceDefinition {
    /// Stable slug, unique across the catalog
    pub id: String,

    /// Display name
    pub name: String,

    /// Category tag (database, storage, tool, ...)
    pub category: String,

    /// Image name without tag
    pub image: String,

    /// Image tag
    #[serde(default = "default_tag")]
    pub tag: String,

    #[serde(default)]
    pub description: Option<String>,

    /// Port specs in `host:container` form, in declaration order
    #[serde(default)]
    pub ports: Vec<String>,

    /// Environment passed to the container
    #[serde(default, rename = "env_vars", alias = "env")]
    pub env: BTreeMap<String, String>,

    /// Volume specs in `source:target` form, in declaration order
    #[serde(default)]
    pub volumes: Vec<String>,

    /// HTTP path probed by the health check, if the tool exposes one
    #[serde(default)]
    pub health_check: Option<String>,

    #[serde(default)]
    pub enabled: bool,

    #[serde(default = "default_icon")]
    pub icon: String,
}

impl ServiceDefinition {
    /// Full image reference (`name:tag`).
    pub fn image_ref(&self) -> String {
        format!("{}:{}", self.image, self.tag)
    }

    /// Parsed port mappings; malformed specs are skipped.
    pub fn port_mappings(&self) -> Vec<PortMapping> {
        parse_port_mappings(&self.ports)
    }

    /// Parsed volume mappings; malformed specs are skipped.
    pub fn volume_mappings(&self) -> Vec<VolumeMapping> {
        parse_volume_mappings(&self.volumes)
    }
}

/// Request body for creating a catalog entry. The identifier is derived from `name`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewService {
    pub name: String,
    pub category: String,
    pub image: String,
    #[serde(default = "default_tag")]
    pub tag: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub ports: Vec<String>,
    #[serde(default, rename = "env_vars", alias = "env")]
    pub env: BTreeMap<String, String>,
    #[serde(default)]
    pub volumes: Vec<String>,
    #[serde(default)]
    pub health_check: Option<String>,
    #[serde(default = "default_icon")]
    pub icon: String,
}

impl NewService {
    /// Build the definition that will be stored. New entries start disabled.
    pub fn into_definition(self) -> crate::error::Result<ServiceDefinition> {
        let id = derive_service_id(&self.name);
        if id.is_empty() {
            return Err(crate::error::Error::Validation(
                "service name must not be empty".to_string(),
            ));
        }
        if self.image.trim().is_empty() {
            return Err(crate::error::Error::Validation(format!(
                "service '{}' has no image",
                self.name
            )));
        }

        Ok(ServiceDefinition {
            id,
            name: self.name,
            category: self.category,
            image: self.image,
            tag: self.tag,
            description: self.description,
            ports: self.ports,
            env: self.env,
            volumes: self.volumes,
            health_check: self.health_check,
            enabled: false,
            icon: self.icon,
        })
    }
}

/// Derive a catalog identifier from a display name: lowercased, spaces become hyphens.
///
/// No collision handling; two names that map to the same slug collide on insert.
pub fn derive_service_id(name: &str) -> String {
    name.trim().to_lowercase().replace(' ', "-")
}

/// One `host:container` port publication.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortMapping {
    pub host_port: String,
    pub container_port: String,
}

impl PortMapping {
    /// Parse a `host:container` spec, splitting on the first colon.
    pub fn parse(spec: &str) -> Option<Self> {
        let (host, container) = spec.split_once(':')?;
        Some(Self {
            host_port: host.to_string(),
            container_port: container.to_string(),
        })
    }
}

/// One `source:target` mount. Always mounted read-write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VolumeMapping {
    pub source: String,
    pub target: String,
}

impl VolumeMapping {
    /// Parse a `source:target` spec, splitting on the first colon.
    pub fn parse(spec: &str) -> Option<Self> {
        let (source, target) = spec.split_once(':')?;
        Some(Self {
            source: source.to_string(),
            target: target.to_string(),
        })
    }

    /// Bind spec as passed to the runtime (`source:target:rw`).
    pub fn bind_spec(&self) -> String {
        format!("{}:{}:rw", self.source, self.target)
    }
}

pub fn parse_port_mappings(specs: &[String]) -> Vec<PortMapping> {
    specs
        .iter()
        .filter_map(|spec| {
            let mapping = PortMapping::parse(spec);
            if mapping.is_none() {
                tracing::debug!("Skipping malformed port spec '{}'", spec);
            }
            mapping
        })
        .collect()
}

pub fn parse_volume_mappings(specs: &[String]) -> Vec<VolumeMapping> {
    specs
        .iter()
        .filter_map(|spec| {
            let mapping = VolumeMapping::parse(spec);
            if mapping.is_none() {
                tracing::debug!("Skipping malformed volume spec '{}'", spec);
            }
            mapping
        })
        .collect()
}
