//! Distributed Conway's Game of Life on a periodic process mesh.
//!
//! The N x N torus is split into equal blocks, one per rank of an SPMD
//! process group. Each generation every rank refreshes the one-cell ghost
//! ring around its block from its four mesh neighbors, applies the life rule
//! to its interior, and commits the result. A run over any valid mesh
//! produces the same grid as a run on a single rank.
//!
//! ```text
//! SimConfig ─► PartitionSpec + ProcessTopology (once per rank)
//!                    │
//!   ┌────────────────▼────────────────┐
//!   │ HaloExchanger ─► update ─► swap │  x G generations
//!   └────────────────┬────────────────┘
//!                    ▼
//!        gather ─► GenerationObserver (optional, coordinator only)
//! ```

pub mod comm;
pub mod config;
pub mod error;
pub mod grid;
pub mod halo;
pub mod partition;
pub mod patterns;
pub mod report;
pub mod seed;
pub mod simulation;
pub mod topology;
pub mod update;

pub use comm::{Communicator, GroupOutcome, ProcessGroup, Rank, Tag, TrafficStats};
pub use config::SimConfig;
pub use error::{CommError, ConfigError, SimError, SimResult};
pub use grid::Grid;
pub use halo::HaloExchanger;
pub use partition::{LocalPartition, PartitionSpec};
pub use report::{FrameRecorder, GenerationObserver, NoReport, ReportSchedule, TextReport};
pub use seed::Seed;
pub use simulation::{RankSummary, Simulation, SimulationReport};
pub use topology::{Coords, Direction, MeshShape, ProcessTopology};
