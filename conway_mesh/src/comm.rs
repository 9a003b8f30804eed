//! In-memory process group with tagged point-to-point messaging.
//!
//! Every rank runs as its own tokio task and owns its data outright; the
//! only thing ranks share is the message fabric. Messages travel on lanes
//! keyed by `(source, destination, tag)`, each lane FIFO. Sends are
//! buffered and complete as soon as the payload is queued, receives
//! complete when a matching message arrives.
//!
//! A group abort cancels every pending and future receive or barrier on
//! every rank, so one failing rank can never leave its peers blocked.

use crate::error::{CommError, SimError, SimResult};
use dashmap::DashMap;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};
use tokio::sync::{mpsc, Barrier, Mutex};
use tokio_util::sync::CancellationToken;
use tracing::{info_span, trace, warn, Instrument};

pub type Rank = usize;

/// Cells carried by one message.
pub type Payload = Vec<bool>;

/// Message identity. Distinct tags never match each other, which keeps the
/// two transfers along an axis apart when both neighbors are the same rank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tag {
    /// Boundary column travelling toward the left neighbor.
    ToLeft,
    /// Boundary column travelling toward the right neighbor.
    ToRight,
    /// Boundary row travelling toward the upper neighbor.
    ToUp,
    /// Boundary row travelling toward the lower neighbor.
    ToDown,
    /// Interior block travelling to the coordinator.
    Gather,
}

type LaneKey = (Rank, Rank, Tag);

#[derive(Clone)]
struct Lane {
    tx: mpsc::UnboundedSender<Payload>,
    rx: Arc<Mutex<mpsc::UnboundedReceiver<Payload>>>,
}

impl Lane {
    fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            tx,
            rx: Arc::new(Mutex::new(rx)),
        }
    }
}

struct Fabric {
    size: usize,
    lanes: DashMap<LaneKey, Lane>,
    barrier: Barrier,
    abort: CancellationToken,
    abort_reason: OnceLock<String>,
    messages_sent: AtomicU64,
    cells_sent: AtomicU64,
}

impl Fabric {
    fn new(size: usize) -> Self {
        Self {
            size,
            lanes: DashMap::new(),
            barrier: Barrier::new(size),
            abort: CancellationToken::new(),
            abort_reason: OnceLock::new(),
            messages_sent: AtomicU64::new(0),
            cells_sent: AtomicU64::new(0),
        }
    }

    fn lane(&self, key: LaneKey) -> Lane {
        self.lanes.entry(key).or_insert_with(Lane::new).value().clone()
    }

    fn abort(&self, reason: String) {
        if self.abort_reason.set(reason).is_ok() {
            self.abort.cancel();
        }
    }

    fn aborted(&self) -> CommError {
        CommError::Aborted {
            reason: self
                .abort_reason
                .get()
                .cloned()
                .unwrap_or_else(|| "unknown".to_string()),
        }
    }
}

/// Traffic counters for a finished group.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct TrafficStats {
    pub messages_sent: u64,
    pub cells_sent: u64,
}

/// One rank's handle on the group.
#[derive(Clone)]
pub struct Communicator {
    rank: Rank,
    fabric: Arc<Fabric>,
}

impl std::fmt::Debug for Communicator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Communicator")
            .field("rank", &self.rank)
            .field("size", &self.fabric.size)
            .finish()
    }
}

impl Communicator {
    pub fn rank(&self) -> Rank {
        self.rank
    }

    pub fn size(&self) -> usize {
        self.fabric.size
    }

    pub fn is_aborted(&self) -> bool {
        self.fabric.abort.is_cancelled()
    }

    /// Fail fast if the group has been torn down.
    pub fn check_abort(&self) -> Result<(), CommError> {
        if self.is_aborted() {
            Err(self.fabric.aborted())
        } else {
            Ok(())
        }
    }

    /// Signal whole-group teardown. The first reason wins.
    pub fn abort(&self, reason: impl Into<String>) {
        let reason = reason.into();
        warn!(rank = self.rank, %reason, "Aborting process group");
        self.fabric.abort(reason);
    }

    /// Queue `payload` for `dst`. Never waits for the receiver.
    pub async fn send(&self, dst: Rank, tag: Tag, payload: Payload) -> Result<(), CommError> {
        self.check_abort()?;
        let cells = payload.len() as u64;
        trace!(from = self.rank, to = dst, ?tag, cells, "send");
        self.fabric
            .lane((self.rank, dst, tag))
            .tx
            .send(payload)
            .map_err(|_| CommError::Disconnected {
                source_rank: self.rank,
            })?;
        self.fabric.messages_sent.fetch_add(1, Ordering::Relaxed);
        self.fabric.cells_sent.fetch_add(cells, Ordering::Relaxed);
        Ok(())
    }

    /// Wait for the next message from `src` carrying `tag`.
    pub async fn recv(&self, src: Rank, tag: Tag) -> Result<Payload, CommError> {
        let lane = self.fabric.lane((src, self.rank, tag));
        let mut rx = lane.rx.lock().await;
        tokio::select! {
            biased;
            _ = self.fabric.abort.cancelled() => Err(self.fabric.aborted()),
            msg = rx.recv() => msg.ok_or(CommError::Disconnected { source_rank: src }),
        }
    }

    /// [`recv`](Self::recv) that also checks the payload length.
    pub async fn recv_exact(&self, src: Rank, tag: Tag, len: usize) -> Result<Payload, CommError> {
        let payload = self.recv(src, tag).await?;
        if payload.len() != len {
            return Err(CommError::LengthMismatch {
                source_rank: src,
                expected: len,
                actual: payload.len(),
            });
        }
        Ok(payload)
    }

    /// Group-wide barrier.
    pub async fn barrier(&self) -> Result<(), CommError> {
        tokio::select! {
            biased;
            _ = self.fabric.abort.cancelled() => Err(self.fabric.aborted()),
            _ = self.fabric.barrier.wait() => Ok(()),
        }
    }

    /// Collect every rank's payload at `root`, in rank order. Non-root ranks
    /// get `None` back once their payload is queued.
    pub async fn gather(&self, root: Rank, payload: Payload) -> Result<Option<Vec<Payload>>, CommError> {
        if self.rank != root {
            self.send(root, Tag::Gather, payload).await?;
            return Ok(None);
        }
        let len = payload.len();
        let mut own = Some(payload);
        let mut blocks = Vec::with_capacity(self.size());
        for src in 0..self.size() {
            if src == root {
                blocks.extend(own.take());
            } else {
                blocks.push(self.recv_exact(src, Tag::Gather, len).await?);
            }
        }
        Ok(Some(blocks))
    }

    pub fn traffic(&self) -> TrafficStats {
        TrafficStats {
            messages_sent: self.fabric.messages_sent.load(Ordering::Relaxed),
            cells_sent: self.fabric.cells_sent.load(Ordering::Relaxed),
        }
    }
}

/// Results of a finished group, in rank order.
#[derive(Debug)]
pub struct GroupOutcome<T> {
    pub results: Vec<SimResult<T>>,
    pub traffic: TrafficStats,
}

/// SPMD launcher: runs `body` once per rank.
pub struct ProcessGroup;

impl ProcessGroup {
    /// Spawn `size` ranks and wait for all of them. A rank that fails or
    /// panics aborts the group so its peers unwind instead of blocking.
    pub async fn launch<F, Fut, T>(size: usize, body: F) -> GroupOutcome<T>
    where
        F: Fn(Communicator) -> Fut,
        Fut: Future<Output = SimResult<T>> + Send + 'static,
        T: Send + 'static,
    {
        let fabric = Arc::new(Fabric::new(size));
        let handles: Vec<_> = (0..size)
            .map(|rank| {
                let comm = Communicator {
                    rank,
                    fabric: Arc::clone(&fabric),
                };
                let task = tokio::spawn(body(comm).instrument(info_span!("rank", rank)));
                let fabric = Arc::clone(&fabric);
                tokio::spawn(async move {
                    let result = match task.await {
                        Ok(result) => result,
                        Err(_) => Err(SimError::RankPanicked { rank }),
                    };
                    if let Err(err) = &result {
                        if !err.is_abort_echo() {
                            fabric.abort(format!("rank {rank}: {err}"));
                        }
                    }
                    result
                })
            })
            .collect();

        let mut results = Vec::with_capacity(size);
        for (rank, handle) in handles.into_iter().enumerate() {
            results.push(match handle.await {
                Ok(result) => result,
                Err(_) => Err(SimError::RankPanicked { rank }),
            });
        }
        let traffic = TrafficStats {
            messages_sent: fabric.messages_sent.load(Ordering::Relaxed),
            cells_sent: fabric.cells_sent.load(Ordering::Relaxed),
        };
        GroupOutcome { results, traffic }
    }
}
