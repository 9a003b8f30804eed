//! Optional per-generation diagnostic hook.
//!
//! Collection is the expensive part of a run: every rank ships its interior
//! to the coordinator and the whole group meets at a barrier. A
//! [`ReportSchedule`] decides which generations pay that cost; every rank
//! evaluates it the same way so the collectives always line up.

use crate::grid::Grid;
use parking_lot::Mutex;
use std::io::{self, Write};
use std::num::NonZeroUsize;
use std::sync::Arc;

/// Which generations are gathered and handed to the observer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReportSchedule {
    #[default]
    Never,
    Every(NonZeroUsize),
}

impl ReportSchedule {
    /// Every `k` generations; `0` disables reporting.
    pub fn every(k: usize) -> Self {
        NonZeroUsize::new(k).map_or(ReportSchedule::Never, ReportSchedule::Every)
    }

    pub fn is_due(&self, generation: usize) -> bool {
        match self {
            ReportSchedule::Never => false,
            ReportSchedule::Every(k) => generation % k.get() == 0,
        }
    }
}

/// Receives the assembled global grid on the coordinating rank.
///
/// `grid` is the state generation `generation` started from: the seed for
/// generation 1. The state after the last generation is never reported.
pub trait GenerationObserver: Send {
    fn observe(&mut self, generation: usize, grid: &Grid) -> io::Result<()>;
}

/// Discards every report.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoReport;

impl GenerationObserver for NoReport {
    fn observe(&mut self, _generation: usize, _grid: &Grid) -> io::Result<()> {
        Ok(())
    }
}

/// Writes each report as a header line, the 0/1 matrix, and a blank line.
pub struct TextReport<W> {
    out: W,
}

impl<W: Write> TextReport<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl TextReport<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write + Send> GenerationObserver for TextReport<W> {
    fn observe(&mut self, generation: usize, grid: &Grid) -> io::Result<()> {
        writeln!(self.out, "Iteration: {generation}")?;
        write!(self.out, "{grid}")?;
        writeln!(self.out)?;
        self.out.flush()
    }
}

/// One reported generation and the grid it started from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub generation: usize,
    pub grid: Grid,
}

/// Keeps every reported grid in memory. Clones share the same frames, so
/// a caller can hand one clone to the simulation and read from another.
#[derive(Debug, Default, Clone)]
pub struct FrameRecorder {
    frames: Arc<Mutex<Vec<Frame>>>,
}

impl FrameRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn frames(&self) -> Vec<Frame> {
        self.frames.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.frames.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.lock().is_empty()
    }
}

impl GenerationObserver for FrameRecorder {
    fn observe(&mut self, generation: usize, grid: &Grid) -> io::Result<()> {
        self.frames.lock().push(Frame {
            generation,
            grid: grid.clone(),
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schedule_due_generations() {
        let every_two = ReportSchedule::every(2);
        let due: Vec<_> = (1..=6).filter(|&t| every_two.is_due(t)).collect();
        assert_eq!(due, vec![2, 4, 6]);

        assert_eq!(ReportSchedule::every(0), ReportSchedule::Never);
        assert!(!ReportSchedule::Never.is_due(1));
        assert!((1..=3).all(|t| ReportSchedule::every(1).is_due(t)));
    }

    #[test]
    fn text_report_layout() {
        let mut report = TextReport::new(Vec::new());
        report.observe(1, &Grid::from_rows(&["01", "10"])).unwrap();
        report.observe(2, &Grid::from_rows(&["00", "11"])).unwrap();
        let text = String::from_utf8(report.into_inner()).unwrap();
        assert_eq!(text, "Iteration: 1\n0 1\n1 0\n\nIteration: 2\n0 0\n1 1\n\n");
    }

    #[test]
    fn recorder_clones_share_frames() {
        let recorder = FrameRecorder::new();
        let mut handle = recorder.clone();
        handle.observe(3, &Grid::new(2)).unwrap();
        assert_eq!(recorder.len(), 1);
        assert_eq!(recorder.frames()[0].generation, 3);
    }
}
