//! Generation loop driven on every rank of the group.
//!
//! Per generation each rank refreshes its ghost ring, computes the next
//! interior into its second buffer, optionally takes part in a report, and
//! swaps the buffers. A report for generation `t` shows the grid that
//! generation started from, so `t = 1` shows the seed. Topology and decomposition are derived once before
//! the first generation; nothing is allocated when they are invalid.

use crate::comm::{Communicator, GroupOutcome, ProcessGroup, Rank, TrafficStats};
use crate::config::SimConfig;
use crate::error::{ConfigError, SimResult};
use crate::grid::Grid;
use crate::halo::HaloExchanger;
use crate::partition::{LocalPartition, PartitionSpec};
use crate::report::{GenerationObserver, NoReport};
use crate::seed::Seed;
use crate::topology::{Coords, MeshShape, ProcessTopology};
use crate::update::update;
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::{debug, error, info};

/// Rank that assembles reports and speaks for the group.
pub const COORDINATOR: Rank = 0;

type ObserverSlot = Arc<Mutex<Option<Box<dyn GenerationObserver>>>>;

/// What one rank hands back after its last generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankSummary {
    pub rank: Rank,
    pub coords: Coords,
    pub generations: usize,
    /// Final interior, row-major.
    pub interior: Vec<bool>,
}

/// Result of a completed run.
#[derive(Debug, Clone)]
pub struct SimulationReport {
    pub mesh: MeshShape,
    pub generations: usize,
    pub final_grid: Grid,
    pub traffic: TrafficStats,
}

impl SimulationReport {
    pub fn live_cells(&self) -> usize {
        self.final_grid.live_cells()
    }
}

pub struct Simulation {
    config: SimConfig,
}

impl Simulation {
    pub fn new(config: SimConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    /// Run every rank to completion and return each rank's own result.
    pub async fn launch<O>(&self, seed: Seed, observer: O) -> SimResult<GroupOutcome<RankSummary>>
    where
        O: GenerationObserver + 'static,
    {
        // Without at least one rank there is no group to report through.
        if self.config.processes == 0 {
            return Err(ConfigError::ZeroProcesses.into());
        }

        info!(
            grid_size = self.config.grid_size,
            generations = self.config.generations,
            processes = self.config.processes,
            "Starting simulation"
        );

        let config = Arc::new(self.config.clone());
        let seed = Arc::new(seed);
        let observer: Box<dyn GenerationObserver> = Box::new(observer);
        let slot: ObserverSlot = Arc::new(Mutex::new(Some(observer)));

        let outcome = ProcessGroup::launch(self.config.processes, |comm| {
            run_rank(comm, Arc::clone(&config), Arc::clone(&seed), Arc::clone(&slot))
        })
        .await;

        info!(
            messages = outcome.traffic.messages_sent,
            cells = outcome.traffic.cells_sent,
            failed = outcome.results.iter().filter(|r| r.is_err()).count(),
            "Simulation finished"
        );
        Ok(outcome)
    }

    /// Run and assemble the final global grid. On failure the most
    /// informative rank error is returned: the original cause in rank order,
    /// or an abort echo if that is all there is.
    pub async fn run<O>(&self, seed: Seed, observer: O) -> SimResult<SimulationReport>
    where
        O: GenerationObserver + 'static,
    {
        let outcome = self.launch(seed, observer).await?;
        let mut summaries = Vec::with_capacity(outcome.results.len());
        let mut echo = None;
        for result in outcome.results {
            match result {
                Ok(summary) => summaries.push(summary),
                Err(err) if err.is_abort_echo() => {
                    echo.get_or_insert(err);
                }
                Err(err) => return Err(err),
            }
        }
        if let Some(err) = echo {
            return Err(err);
        }

        let spec = self.config.validate()?;
        let blocks: Vec<_> = summaries.into_iter().map(|s| s.interior).collect();
        Ok(SimulationReport {
            mesh: spec.mesh,
            generations: self.config.generations,
            final_grid: Grid::assemble(&spec, &blocks)?,
            traffic: outcome.traffic,
        })
    }

    /// Run without any per-generation reporting.
    pub async fn run_quiet(&self, seed: Seed) -> SimResult<SimulationReport> {
        self.run(seed, NoReport).await
    }
}

/// Body of one rank.
async fn run_rank(
    comm: Communicator,
    config: Arc<SimConfig>,
    seed: Arc<Seed>,
    slot: ObserverSlot,
) -> SimResult<RankSummary> {
    let rank = comm.rank();

    let spec = match config.validate() {
        Ok(spec) => spec,
        Err(err) => {
            if rank == COORDINATOR {
                error!(%err, "Configuration rejected");
            } else {
                debug!(rank, %err, "Configuration rejected");
            }
            return Err(err.into());
        }
    };
    let topology = ProcessTopology::new(spec.mesh, rank);
    debug!(
        rank,
        row = topology.coords.row,
        col = topology.coords.col,
        local_rows = spec.local_rows,
        local_cols = spec.local_cols,
        "Rank placed on mesh"
    );

    let (mut current, mut next) = match allocate_buffers(&spec) {
        Ok(buffers) => buffers,
        Err(err) => {
            error!(rank, %err, "Buffer allocation failed");
            comm.abort(format!("rank {rank}: {err}"));
            return Err(err);
        }
    };
    current.load_interior(&seed.interior(&spec, &topology)?);

    let mut observer = if rank == COORDINATOR {
        slot.lock().take()
    } else {
        None
    };
    let exchanger = HaloExchanger::new(&topology, comm.clone());

    for generation in 1..=config.generations {
        comm.check_abort()?;
        exchanger.exchange(&mut current).await?;
        update(&current, &mut next);
        if config.report.is_due(generation) {
            collect(&comm, &spec, generation, &current, observer.as_mut()).await?;
        }
        std::mem::swap(&mut current, &mut next);
        debug!(rank, generation, "Generation committed");
    }

    Ok(RankSummary {
        rank,
        coords: topology.coords,
        generations: config.generations,
        interior: current.interior(),
    })
}

fn allocate_buffers(spec: &PartitionSpec) -> SimResult<(LocalPartition, LocalPartition)> {
    Ok((LocalPartition::for_spec(spec)?, LocalPartition::for_spec(spec)?))
}

/// Gather the interiors generation `generation` started from at the
/// coordinator, hold the group at a barrier, and hand the assembled grid to
/// the observer.
async fn collect(
    comm: &Communicator,
    spec: &PartitionSpec,
    generation: usize,
    current: &LocalPartition,
    observer: Option<&mut Box<dyn GenerationObserver>>,
) -> SimResult<()> {
    let blocks = comm.gather(COORDINATOR, current.interior()).await?;
    comm.barrier().await?;
    if let (Some(blocks), Some(observer)) = (blocks, observer) {
        let grid = Grid::assemble(spec, &blocks)?;
        observer.observe(generation, &grid)?;
    }
    Ok(())
}
