use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Coarse container status as recorded and reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CoarseStatus {
    Running,
    Stopped,
    /// The runtime could not be asked
    Unknown,
}

impl CoarseStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CoarseStatus::Running => "running",
            CoarseStatus::Stopped => "stopped",
            CoarseStatus::Unknown => "unknown",
        }
    }
}

impl fmt::Display for CoarseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CoarseStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "running" => Ok(CoarseStatus::Running),
            "stopped" => Ok(CoarseStatus::Stopped),
            "unknown" => Ok(CoarseStatus::Unknown),
            other => Err(format!("unknown status '{}'", other)),
        }
    }
}

/// Durable cache of the last container operation for one service.
///
/// The runtime is the source of truth for whether a container is running;
/// this record only says what was last done and when.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LifecycleRecord {
    pub service_id: String,
    pub container_id: Option<String>,
    pub status: CoarseStatus,
    pub started_at: Option<DateTime<Utc>>,
    pub stopped_at: Option<DateTime<Utc>>,
}

/// A saved dashboard arrangement. The layout payload is opaque.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Layout {
    pub id: String,
    pub name: String,
    pub layout_data: serde_json::Value,
    pub is_default: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewLayout {
    pub name: String,
    #[serde(default = "empty_layout")]
    pub layout_data: serde_json::Value,
    #[serde(default)]
    pub is_default: bool,
}

fn empty_layout() -> serde_json::Value {
    serde_json::Value::Array(Vec::new())
}
