// main.rs - Mesh viewer: runs a distributed simulation and plays it back
// Every generation is gathered from the ranks and rendered with the
// partition boundaries of the process mesh drawn on top.

use conway_mesh::report::Frame;
use conway_mesh::{patterns, FrameRecorder, Grid, MeshShape, ReportSchedule, Seed, SimConfig, Simulation};
use eframe::egui;
use egui::Color32;
use std::time::{Duration, Instant};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod ui;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("warn,grid_display=info,conway_mesh=info")),
        )
        .init();

    let runtime = tokio::runtime::Runtime::new()?;

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([820.0, 1000.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Conway Mesh Viewer",
        options,
        Box::new(move |_cc| Box::new(MeshViewer::new(runtime))),
    )?;
    Ok(())
}

/// Starting grid chosen in the viewer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedChoice {
    Pattern(usize),
    Random,
    Edited,
}

pub struct MeshViewer {
    runtime: tokio::runtime::Runtime,

    pub grid_size: usize,
    pub processes: usize,
    pub generations: usize,
    pub seed_choice: SeedChoice,
    pub random_seed: u64,
    edited: Option<Grid>,

    frames: Vec<Frame>,
    pub mesh: Option<MeshShape>,
    pub cursor: usize,
    pub status: String,

    pub is_running: bool,
    pub last_update: Instant,
    pub update_interval: Duration,
    pub live_color: Color32,
    pub dead_color: Color32,
    pub boundary_color: Color32,
    pub show_partitions: bool,
}

impl MeshViewer {
    pub fn new(runtime: tokio::runtime::Runtime) -> Self {
        let mut viewer = Self {
            runtime,
            grid_size: 48,
            processes: 4,
            generations: 200,
            seed_choice: SeedChoice::Pattern(0),
            random_seed: 42,
            edited: None,
            frames: Vec::new(),
            mesh: None,
            cursor: 0,
            status: String::new(),
            is_running: false,
            last_update: Instant::now(),
            update_interval: Duration::from_millis(200),
            live_color: Color32::from_rgb(0, 200, 0),
            dead_color: Color32::from_rgb(40, 40, 40),
            boundary_color: Color32::from_rgb(220, 120, 0),
            show_partitions: true,
        };
        viewer.recompute();
        viewer
    }

    fn seed(&self) -> Seed {
        match self.seed_choice {
            SeedChoice::Pattern(index) => Seed::pattern(patterns::PATTERNS[index].name),
            SeedChoice::Random => Seed::Random(self.random_seed),
            SeedChoice::Edited => match &self.edited {
                Some(grid) => Seed::Grid(grid.clone()),
                None => Seed::Grid(Grid::new(self.grid_size)),
            },
        }
    }

    /// Run the whole simulation and keep every generation for playback.
    pub fn recompute(&mut self) {
        self.is_running = false;
        self.cursor = 0;
        self.frames.clear();
        self.mesh = None;

        let seed = self.seed();
        let config = SimConfig::new(self.grid_size, self.generations)
            .with_processes(self.processes)
            .with_report(ReportSchedule::every(1));
        let recorder = FrameRecorder::new();
        let started = Instant::now();
        let result = self
            .runtime
            .block_on(Simulation::new(config).run(seed, recorder.clone()));

        match result {
            Ok(report) => {
                info!(
                    mesh = %report.mesh,
                    generations = report.generations,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "Simulation recorded"
                );
                self.status = format!(
                    "mesh {} | {} messages | {} cells exchanged",
                    report.mesh, report.traffic.messages_sent, report.traffic.cells_sent
                );
                self.mesh = Some(report.mesh);
                // Report t holds the state generation t started from.
                self.frames = recorder
                    .frames()
                    .into_iter()
                    .map(|frame| Frame {
                        generation: frame.generation - 1,
                        grid: frame.grid,
                    })
                    .collect();
                self.frames.push(Frame {
                    generation: report.generations,
                    grid: report.final_grid,
                });
            }
            Err(err) => {
                warn!(%err, "Simulation failed");
                self.status = err.to_string();
            }
        }
    }

    pub fn current(&self) -> Option<&Frame> {
        self.frames.get(self.cursor)
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    pub fn step_forward(&mut self) {
        if self.cursor + 1 < self.frames.len() {
            self.cursor += 1;
        } else {
            self.is_running = false;
        }
    }

    pub fn step_back(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    /// Toggle a cell of the starting grid and re-run from the edited grid.
    /// Ignored while the shown run is stale against the grid size setting.
    pub fn toggle_start_cell(&mut self, row: usize, col: usize) {
        let Some(first) = self.frames.first() else {
            return;
        };
        if first.grid.size() != self.grid_size {
            self.status = format!(
                "grid size changed to {}; press Run before editing",
                self.grid_size
            );
            return;
        }
        let mut grid = first.grid.clone();
        grid.set(row, col, !grid.get(row, col));
        self.edited = Some(grid);
        self.seed_choice = SeedChoice::Edited;
        self.recompute();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn viewer() -> MeshViewer {
        let mut viewer = MeshViewer::new(tokio::runtime::Runtime::new().unwrap());
        viewer.grid_size = 8;
        viewer.generations = 4;
        viewer.seed_choice = SeedChoice::Pattern(1);
        viewer.recompute();
        viewer
    }

    #[test]
    fn playback_starts_at_seed_and_ends_at_final_generation() {
        let viewer = viewer();
        let generations: Vec<_> = viewer.frames.iter().map(|f| f.generation).collect();
        assert_eq!(generations, vec![0, 1, 2, 3, 4]);
        assert_eq!(viewer.frames[1].grid, viewer.frames[0].grid.step());
        assert_eq!(viewer.frames[4].grid, viewer.frames[0].grid);
    }

    #[test]
    fn edits_on_a_stale_grid_are_ignored() {
        let mut viewer = viewer();
        viewer.grid_size = 10;
        viewer.toggle_start_cell(0, 0);
        assert_eq!(viewer.frames[0].grid.size(), 8);
        assert_eq!(viewer.seed_choice, SeedChoice::Pattern(1));
        assert!(viewer.status.contains("press Run"));

        viewer.grid_size = 8;
        viewer.toggle_start_cell(0, 0);
        assert_eq!(viewer.seed_choice, SeedChoice::Edited);
        assert!(viewer.frames[0].grid.get(0, 0));
    }
}
