//! Service catalog: definitions of the tools that can be run as containers.

mod seed;
mod types;

pub use seed::{default_catalog, load_catalog_file, parse_catalog};
pub use types::{
    derive_service_id, parse_port_mappings, parse_volume_mappings, NewService, PortMapping,
    ServiceDefinition, VolumeMapping,
};
