//! Startup parameters for a simulation run.

use crate::error::ConfigError;
use crate::partition::PartitionSpec;
use crate::report::ReportSchedule;
use crate::topology::MeshShape;

/// Configuration shared by every rank.
///
/// All fields are common knowledge, so validation yields the same verdict
/// on every rank.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimConfig {
    /// Global grid extent N (the grid is N x N).
    pub grid_size: usize,
    /// Number of generations G to run.
    pub generations: usize,
    /// Number of ranks in the process group.
    pub processes: usize,
    /// Explicit mesh; derived from `processes` when unset.
    pub mesh: Option<MeshShape>,
    /// Which generations are gathered for the observer.
    pub report: ReportSchedule,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            grid_size: 5,
            generations: 3,
            processes: 1,
            mesh: None,
            report: ReportSchedule::every(1),
        }
    }
}

impl SimConfig {
    pub fn new(grid_size: usize, generations: usize) -> Self {
        Self {
            grid_size,
            generations,
            ..Default::default()
        }
    }

    pub fn with_processes(mut self, processes: usize) -> Self {
        self.processes = processes;
        self
    }

    /// Fix the mesh shape; the process count follows it.
    pub fn with_mesh(mut self, mesh: MeshShape) -> Self {
        self.processes = mesh.size();
        self.mesh = Some(mesh);
        self
    }

    pub fn with_report(mut self, report: ReportSchedule) -> Self {
        self.report = report;
        self
    }

    pub fn mesh_shape(&self) -> Result<MeshShape, ConfigError> {
        if self.processes == 0 {
            return Err(ConfigError::ZeroProcesses);
        }
        match self.mesh {
            Some(mesh) if mesh.size() != self.processes => Err(ConfigError::MeshMismatch {
                rows: mesh.rows,
                cols: mesh.cols,
                processes: self.processes,
            }),
            Some(mesh) => Ok(mesh),
            None => MeshShape::balanced(self.processes),
        }
    }

    /// Derive the mesh and decomposition, or the configuration failure.
    pub fn validate(&self) -> Result<PartitionSpec, ConfigError> {
        PartitionSpec::validate_and_partition(self.grid_size, self.mesh_shape()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_classic_run() {
        let config = SimConfig::default();
        assert_eq!((config.grid_size, config.generations, config.processes), (5, 3, 1));
        assert_eq!(config.validate().unwrap().local_rows, 5);
    }

    #[test]
    fn mesh_derived_from_process_count() {
        let config = SimConfig::new(12, 1).with_processes(6);
        assert_eq!(config.mesh_shape().unwrap(), MeshShape::new(3, 2));
        let spec = config.validate().unwrap();
        assert_eq!((spec.local_rows, spec.local_cols), (4, 6));
    }

    #[test]
    fn explicit_mesh_must_match_processes() {
        let mut config = SimConfig::new(4, 1).with_mesh(MeshShape::new(1, 4));
        assert_eq!(config.processes, 4);
        assert!(config.validate().is_ok());

        config.processes = 3;
        assert_eq!(
            config.mesh_shape(),
            Err(ConfigError::MeshMismatch {
                rows: 1,
                cols: 4,
                processes: 3
            })
        );
    }

    #[test]
    fn indivisible_grid_fails_validation() {
        let config = SimConfig::new(5, 1).with_mesh(MeshShape::new(2, 3));
        assert!(matches!(config.validate(), Err(ConfigError::NotDivisible { size: 5, .. })));
        assert_eq!(
            SimConfig::new(4, 1).with_processes(0).validate(),
            Err(ConfigError::ZeroProcesses)
        );
    }
}
