//! Built-in tool catalog and YAML catalog loading.

use super::ServiceDefinition;
use crate::error::{Error, Result};
use serde::Deserialize;
use std::collections::{BTreeMap, HashSet};
use std::path::Path;

struct SeedEntry {
    id: &'static str,
    name: &'static str,
    category: &'static str,
    image: &'static str,
    tag: &'static str,
    description: &'static str,
    ports: &'static [&'static str],
    env: &'static [(&'static str, &'static str)],
    volumes: &'static [&'static str],
    health_check: &'static str,
    enabled: bool,
    icon: &'static str,
}

const CORE_TOOLS: &[SeedEntry] = &[
    SeedEntry {
        id: "duckdb",
        name: "DuckDB",
        category: "database",
        image: "datacatering/duckdb",
        tag: "latest",
        description: "In-process analytical database",
        ports: &["8080:8080"],
        env: &[],
        volumes: &["duckdb-data:/data"],
        health_check: "/health",
        enabled: true,
        icon: "Database",
    },
    SeedEntry {
        id: "minio",
        name: "MinIO",
        category: "storage",
        image: "minio/minio",
        tag: "latest",
        description: "S3-compatible object storage",
        ports: &["9000:9000", "9001:9001"],
        env: &[("MINIO_ROOT_USER", "admin"), ("MINIO_ROOT_PASSWORD", "adminpass123")],
        volumes: &["minio-data:/data"],
        health_check: "/minio/health/live",
        enabled: true,
        icon: "HardDrive",
    },
    SeedEntry {
        id: "n8n",
        name: "n8n",
        category: "automation",
        image: "n8nio/n8n",
        tag: "latest",
        description: "Workflow automation tool",
        ports: &["5678:5678"],
        env: &[("N8N_BASIC_AUTH_ACTIVE", "false")],
        volumes: &["n8n-data:/home/node/.n8n"],
        health_check: "/healthz",
        enabled: true,
        icon: "Workflow",
    },
    SeedEntry {
        id: "temporal",
        name: "Temporal",
        category: "orchestration",
        image: "temporalio/auto-setup",
        tag: "latest",
        description: "Workflow orchestration engine",
        ports: &["7233:7233", "8088:8088"],
        env: &[],
        volumes: &["temporal-data:/etc/temporal"],
        health_check: "/",
        enabled: true,
        icon: "GitBranch",
    },
    SeedEntry {
        id: "dbeaver",
        name: "DBeaver CE",
        category: "tool",
        image: "dbeaver/cloudbeaver",
        tag: "latest",
        description: "Web-based database management",
        ports: &["8978:8978"],
        env: &[],
        volumes: &["dbeaver-data:/opt/cloudbeaver/workspace"],
        health_check: "/",
        enabled: true,
        icon: "Database",
    },
    SeedEntry {
        id: "code-server",
        name: "VS Code Server",
        category: "tool",
        image: "codercom/code-server",
        tag: "latest",
        description: "VS Code in the browser",
        ports: &["8443:8080"],
        env: &[("PASSWORD", "admin123")],
        volumes: &["code-server-data:/home/coder"],
        health_check: "/healthz",
        enabled: true,
        icon: "Code",
    },
    SeedEntry {
        id: "electerm",
        name: "Electerm",
        category: "tool",
        image: "electerm/electerm-web",
        tag: "latest",
        description: "Terminal/SSH client",
        ports: &["3456:3000"],
        env: &[],
        volumes: &["electerm-data:/root/.electerm"],
        health_check: "/",
        enabled: true,
        icon: "Terminal",
    },
    SeedEntry {
        id: "rclone",
        name: "Rclone",
        category: "storage",
        image: "rclone/rclone",
        tag: "latest",
        description: "Cloud storage sync",
        ports: &["5572:5572"],
        env: &[],
        volumes: &["rclone-config:/config/rclone", "rclone-data:/data"],
        health_check: "/",
        enabled: true,
        icon: "Cloud",
    },
    SeedEntry {
        id: "grist",
        name: "Grist",
        category: "data",
        image: "gristlabs/grist",
        tag: "latest",
        description: "Collaborative spreadsheet/database",
        ports: &["8484:8484"],
        env: &[],
        volumes: &["grist-data:/persist"],
        health_check: "/status",
        enabled: true,
        icon: "Table",
    },
    SeedEntry {
        id: "amphi",
        name: "Amphi",
        category: "etl",
        image: "amphi/amphi-etl",
        tag: "latest",
        description: "Visual ETL builder",
        ports: &["3001:3000"],
        env: &[],
        volumes: &["amphi-data:/app/data"],
        health_check: "/health",
        enabled: true,
        icon: "BarChart3",
    },
];

const OPTIONAL_TOOLS: &[SeedEntry] = &[
    SeedEntry {
        id: "grafana",
        name: "Grafana",
        category: "monitoring",
        image: "grafana/grafana",
        tag: "latest",
        description: "Monitoring dashboards",
        ports: &["3030:3000"],
        env: &[("GF_SECURITY_ADMIN_PASSWORD", "admin")],
        volumes: &["grafana-data:/var/lib/grafana"],
        health_check: "/api/health",
        enabled: false,
        icon: "LineChart",
    },
    SeedEntry {
        id: "prometheus",
        name: "Prometheus",
        category: "monitoring",
        image: "prom/prometheus",
        tag: "latest",
        description: "Metrics collection",
        ports: &["9090:9090"],
        env: &[],
        volumes: &["prometheus-data:/prometheus"],
        health_check: "/-/healthy",
        enabled: false,
        icon: "Activity",
    },
    SeedEntry {
        id: "traefik",
        name: "Traefik",
        category: "routing",
        image: "traefik",
        tag: "latest",
        description: "Reverse proxy",
        ports: &["8081:8080", "8082:80"],
        env: &[],
        volumes: &["/var/run/docker.sock:/var/run/docker.sock"],
        health_check: "/ping",
        enabled: false,
        icon: "Network",
    },
    SeedEntry {
        id: "portainer",
        name: "Portainer",
        category: "management",
        image: "portainer/portainer-ce",
        tag: "latest",
        description: "Container management UI",
        ports: &["9443:9443", "8000:8000"],
        env: &[],
        volumes: &["portainer-data:/data", "/var/run/docker.sock:/var/run/docker.sock"],
        health_check: "/api/status",
        enabled: false,
        icon: "Container",
    },
    SeedEntry {
        id: "postgresql",
        name: "PostgreSQL",
        category: "database",
        image: "postgres",
        tag: "15",
        description: "Relational database",
        ports: &["5432:5432"],
        env: &[("POSTGRES_PASSWORD", "postgres"), ("POSTGRES_USER", "postgres")],
        volumes: &["postgres-data:/var/lib/postgresql/data"],
        health_check: "/",
        enabled: false,
        icon: "Database",
    },
    SeedEntry {
        id: "redis",
        name: "Redis",
        category: "cache",
        image: "redis",
        tag: "7",
        description: "In-memory data store",
        ports: &["6379:6379"],
        env: &[],
        volumes: &["redis-data:/data"],
        health_check: "/",
        enabled: false,
        icon: "Zap",
    },
    SeedEntry {
        id: "rabbitmq",
        name: "RabbitMQ",
        category: "messaging",
        image: "rabbitmq",
        tag: "3-management",
        description: "Message broker",
        ports: &["5672:5672", "15672:15672"],
        env: &[("RABBITMQ_DEFAULT_USER", "admin"), ("RABBITMQ_DEFAULT_PASS", "admin")],
        volumes: &["rabbitmq-data:/var/lib/rabbitmq"],
        health_check: "/api/health/checks/alarms",
        enabled: false,
        icon: "MessageSquare",
    },
    SeedEntry {
        id: "keycloak",
        name: "Keycloak",
        category: "auth",
        image: "quay.io/keycloak/keycloak",
        tag: "latest",
        description: "Identity and access management",
        ports: &["8180:8080"],
        env: &[("KEYCLOAK_ADMIN", "admin"), ("KEYCLOAK_ADMIN_PASSWORD", "admin")],
        volumes: &["keycloak-data:/opt/keycloak/data"],
        health_check: "/health",
        enabled: false,
        icon: "Lock",
    },
    SeedEntry {
        id: "nextcloud",
        name: "Nextcloud",
        category: "storage",
        image: "nextcloud",
        tag: "latest",
        description: "File sharing platform",
        ports: &["8081:80"],
        env: &[],
        volumes: &["nextcloud-data:/var/www/html"],
        health_check: "/status.php",
        enabled: false,
        icon: "FolderOpen",
    },
    SeedEntry {
        id: "vault",
        name: "Vault",
        category: "security",
        image: "vault",
        tag: "latest",
        description: "Secrets management",
        ports: &["8200:8200"],
        env: &[("VAULT_DEV_ROOT_TOKEN_ID", "root")],
        volumes: &["vault-data:/vault/file"],
        health_check: "/v1/sys/health",
        enabled: false,
        icon: "Shield",
    },
];

impl SeedEntry {
    fn to_definition(&self) -> ServiceDefinition {
        ServiceDefinition {
            id: self.id.to_string(),
            name: self.name.to_string(),
            category: self.category.to_string(),
            image: self.image.to_string(),
            tag: self.tag.to_string(),
            description: Some(self.description.to_string()),
            ports: self.ports.iter().map(|p| p.to_string()).collect(),
            env: self
                .env
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect::<BTreeMap<_, _>>(),
            volumes: self.volumes.iter().map(|v| v.to_string()).collect(),
            health_check: Some(self.health_check.to_string()),
            enabled: self.enabled,
            icon: self.icon.to_string(),
        }
    }
}

/// The built-in catalog: core tools (enabled) followed by optional tools (disabled).
pub fn default_catalog() -> Vec<ServiceDefinition> {
    CORE_TOOLS
        .iter()
        .chain(OPTIONAL_TOOLS.iter())
        .map(SeedEntry::to_definition)
        .collect()
}

#[derive(Debug, Deserialize)]
struct CatalogFile {
    #[serde(default)]
    services: Vec<ServiceDefinition>,
}

/// Parse a YAML catalog document (`services:` list of definitions).
pub fn parse_catalog(yaml: &str) -> Result<Vec<ServiceDefinition>> {
    let file: CatalogFile = serde_yaml::from_str(yaml)?;

    let mut seen = HashSet::new();
    for service in &file.services {
        if service.id.trim().is_empty() {
            return Err(Error::Validation(format!(
                "catalog entry '{}' has an empty id",
                service.name
            )));
        }
        if !seen.insert(service.id.as_str()) {
            return Err(Error::Validation(format!(
                "catalog declares '{}' more than once",
                service.id
            )));
        }
    }

    Ok(file.services)
}

/// Load a YAML catalog from disk.
pub fn load_catalog_file<P: AsRef<Path>>(path: P) -> Result<Vec<ServiceDefinition>> {
    let path = path.as_ref();
    let contents = std::fs::read_to_string(path).map_err(|e| {
        Error::Config(format!("Failed to read catalog file {}: {}", path.display(), e))
    })?;
    parse_catalog(&contents)
}
