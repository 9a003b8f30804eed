//! Ghost-ring synchronization with the four mesh neighbors.
//!
//! One call refreshes the whole ghost ring in two phases. Columns go first:
//! each rank sends its leftmost interior column left and its rightmost
//! interior column right, and waits for both matching columns to arrive.
//! Rows go second and span the full padded width, so the ghost columns
//! filled in the first phase carry the diagonal neighbors' corner cells
//! along with them. Each phase issues its four transfers together and then
//! blocks until all four complete.

use crate::comm::{Communicator, Rank, Tag};
use crate::error::CommError;
use crate::partition::{LocalPartition, GHOST};
use crate::topology::{Direction, ProcessTopology};
use tracing::trace;

/// Exchanges boundary cells of one rank's partition with its neighbors.
#[derive(Debug, Clone)]
pub struct HaloExchanger {
    comm: Communicator,
    up: Rank,
    down: Rank,
    left: Rank,
    right: Rank,
}

impl HaloExchanger {
    pub fn new(topology: &ProcessTopology, comm: Communicator) -> Self {
        Self {
            comm,
            up: topology.neighbor(Direction::Up),
            down: topology.neighbor(Direction::Down),
            left: topology.neighbor(Direction::Left),
            right: topology.neighbor(Direction::Right),
        }
    }

    /// Refresh every ghost cell of `part` from the neighbors' interiors as
    /// they stand before this generation's update.
    pub async fn exchange(&self, part: &mut LocalPartition) -> Result<(), CommError> {
        let rows = part.local_rows();
        let cols = part.local_cols();
        let comm = &self.comm;

        let (_, from_right, _, from_left) = tokio::try_join!(
            comm.send(self.left, Tag::ToLeft, part.interior_col(GHOST)),
            comm.recv_exact(self.right, Tag::ToLeft, rows),
            comm.send(self.right, Tag::ToRight, part.interior_col(cols)),
            comm.recv_exact(self.left, Tag::ToRight, rows),
        )?;
        part.write_col(cols + GHOST, &from_right);
        part.write_col(0, &from_left);

        let width = cols + 2 * GHOST;
        let (_, from_below, _, from_above) = tokio::try_join!(
            comm.send(self.up, Tag::ToUp, part.row(GHOST).to_vec()),
            comm.recv_exact(self.down, Tag::ToUp, width),
            comm.send(self.down, Tag::ToDown, part.row(rows).to_vec()),
            comm.recv_exact(self.up, Tag::ToDown, width),
        )?;
        part.write_row(rows + GHOST, &from_below);
        part.write_row(0, &from_above);

        trace!(rank = comm.rank(), rows, cols, "ghost ring refreshed");
        Ok(())
    }
}
