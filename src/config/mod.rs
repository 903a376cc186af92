//! Runtime configuration.
//!
//! - `settings` - `Settings` read from `ORCH_*` variables and `.env`
//! - `duration` - timeout strings such as `"5s"` or `"500ms"`

mod duration;
mod settings;

pub use duration::{parse_duration_setting, parse_duration_string};
pub use settings::{
    parse_bind, Settings, Timeouts, DEFAULT_BIND, DEFAULT_DATABASE, DEFAULT_DOCKER_SOCKET,
    DEFAULT_PROBE_HOST,
};
