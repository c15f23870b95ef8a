//! Thin façade over the collective reductions a partitioned run needs.
//!
//! A total-rate well spans partitions; each process only sees its own share
//! of the productivity sum. The allocator asks a [`Communicator`] to combine
//! those shares before normalizing. Three backends are provided:
//!
//! * [`NoComm`]: a single process, the local value is the global one.
//! * [`RayonComm`]: several "ranks" inside one process (threads) that trade
//!   values through a global mailbox. Used by tests and threaded drivers.
//! * `MpiComm` (feature `mpi-support`): a real MPI communicator.

use bytes::{Buf, BufMut, Bytes, BytesMut};
use dashmap::DashMap;
use once_cell::sync::Lazy;
use std::sync::atomic::{AtomicU64, Ordering};

/// Collective operations over all partitions of a run.
pub trait Communicator {
    fn rank(&self) -> usize;
    fn size(&self) -> usize;

    /// Sum `local` over all ranks. Every rank must call this the same
    /// number of times and in the same order.
    fn all_reduce_sum(&self, local: f64) -> f64;
}

/// Compile-time no-op comm for serial runs.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoComm;

impl Communicator for NoComm {
    fn rank(&self) -> usize {
        0
    }

    fn size(&self) -> usize {
        1
    }

    fn all_reduce_sum(&self, local: f64) -> f64 {
        local
    }
}

// --- RayonComm: intra-process / multi-thread ---
type Key = (usize, usize, u64); // (src, dst, tag)

static MAILBOX: Lazy<DashMap<Key, Bytes>> = Lazy::new(DashMap::new);

/// In-process communicator: rank `r` of `size` threads.
///
/// Each rank must run on its own OS thread; a reduction blocks until every
/// peer has posted its value.
#[derive(Debug)]
pub struct RayonComm {
    rank: usize,
    size: usize,
    seq: AtomicU64,
}

impl RayonComm {
    pub fn new(rank: usize, size: usize) -> Self {
        debug_assert!(rank < size, "rank {rank} out of range for size {size}");
        Self {
            rank,
            size,
            seq: AtomicU64::new(0),
        }
    }

    fn post(&self, peer: usize, tag: u64, value: f64) {
        let mut buf = BytesMut::with_capacity(8);
        buf.put_f64_le(value);
        MAILBOX.insert((self.rank, peer, tag), buf.freeze());
    }

    fn take(&self, peer: usize, tag: u64) -> f64 {
        let key = (peer, self.rank, tag);
        loop {
            if let Some((_, mut bytes)) = MAILBOX.remove(&key) {
                return bytes.get_f64_le();
            }
            std::thread::yield_now();
        }
    }
}

impl Communicator for RayonComm {
    fn rank(&self) -> usize {
        self.rank
    }

    fn size(&self) -> usize {
        self.size
    }

    fn all_reduce_sum(&self, local: f64) -> f64 {
        let tag = self.seq.fetch_add(1, Ordering::Relaxed);
        for peer in (0..self.size).filter(|&p| p != self.rank) {
            self.post(peer, tag, local);
        }
        // sum in rank order so every rank gets bit-identical totals
        (0..self.size)
            .map(|peer| {
                if peer == self.rank {
                    local
                } else {
                    self.take(peer, tag)
                }
            })
            .sum()
    }
}

// --- MPI backend (feature = "mpi-support") ---
#[cfg(feature = "mpi-support")]
mod mpi_backend {
    use super::Communicator;
    use mpi::collective::{CommunicatorCollectives, SystemOperation};
    use mpi::topology::Communicator as MpiCommunicator;
    use mpi::topology::SimpleCommunicator;

    /// Wraps an MPI communicator. The caller keeps the `Universe` alive.
    pub struct MpiComm {
        world: SimpleCommunicator,
        rank: usize,
        size: usize,
    }

    impl MpiComm {
        pub fn new(world: SimpleCommunicator) -> Self {
            let rank = world.rank() as usize;
            let size = world.size() as usize;
            Self { world, rank, size }
        }
    }

    impl Communicator for MpiComm {
        fn rank(&self) -> usize {
            self.rank
        }

        fn size(&self) -> usize {
            self.size
        }

        fn all_reduce_sum(&self, local: f64) -> f64 {
            let mut total = 0.0f64;
            self.world
                .all_reduce_into(&local, &mut total, SystemOperation::sum());
            total
        }
    }
}

#[cfg(feature = "mpi-support")]
pub use mpi_backend::MpiComm;
