//! Docker access: the `docker` CLI for lifecycle calls, the Engine API
//! socket for raw stats.

pub mod client;
pub mod engine;
pub mod error;

pub use client::{ContainerState, DockerClient, RunOptions};
pub use engine::{EngineClient, RawStats};
pub use error::DockerError;
