//! Transfer chunk boundaries
//!
//! Files are transferred and MAC'd in chunks whose size grows by a fixed step
//! up to a cap, then stays there:
//!
//!   128 KiB, 256 KiB, 384 KiB, ... 1 MiB, 1 MiB, ..., remainder
//!
//! The service computes its per-chunk MACs on exactly these boundaries, so the
//! default schedule must not change.

use mega_core::config::TransferConfig;
use mega_core::{MegaError, MegaResult};
use serde::{Deserialize, Serialize};
use std::iter::FusedIterator;

/// One transfer chunk: `length` bytes starting at `offset`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    pub offset: u64,
    pub length: u64,
}

impl Chunk {
    pub fn end(&self) -> u64 {
        self.offset.saturating_add(self.length)
    }

    /// The chunk's bytes within a buffer holding the whole file, or `None` if
    /// `data` ends before the chunk does.
    pub fn slice<'a>(&self, data: &'a [u8]) -> Option<&'a [u8]> {
        let start = usize::try_from(self.offset).ok()?;
        let len = usize::try_from(self.length).ok()?;
        data.get(start..start.checked_add(len)?)
    }
}

/// Chunk growth parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkSchedule {
    pub initial: u64,
    pub step: u64,
    pub cap: u64,
}

impl ChunkSchedule {
    /// The service's schedule: 128 KiB steps up to 1 MiB.
    pub const MEGA: ChunkSchedule = ChunkSchedule {
        initial: 0x20000,
        step: 0x20000,
        cap: 0x100000,
    };

    pub fn from_config(config: &TransferConfig) -> MegaResult<Self> {
        let schedule = ChunkSchedule {
            initial: config.chunk_initial,
            step: config.chunk_step,
            cap: config.chunk_cap,
        };
        if schedule.initial == 0 || schedule.step == 0 {
            return Err(MegaError::Config(
                "chunk_initial and chunk_step must be non-zero".into(),
            ));
        }
        if schedule.cap < schedule.initial {
            return Err(MegaError::Config(format!(
                "chunk_cap ({}) is smaller than chunk_initial ({})",
                schedule.cap, schedule.initial
            )));
        }
        if schedule != Self::MEGA {
            tracing::warn!(?schedule, "non-default chunk schedule; MACs will not match the service");
        }
        Ok(schedule)
    }

    /// Chunks covering `[0, total)`.
    pub fn plan(&self, total: u64) -> ChunkPlan {
        ChunkPlan {
            schedule: *self,
            total,
            offset: 0,
            size: self.initial,
            done: false,
        }
    }

    /// The chunks' bytes of an in-memory file, in file order.
    pub fn split<'a>(&self, data: &'a [u8]) -> impl Iterator<Item = &'a [u8]> + 'a {
        let mut rest = data;
        self.plan(data.len() as u64).map(move |chunk| {
            let len = usize::try_from(chunk.length).map_or(rest.len(), |l| l.min(rest.len()));
            let (head, tail) = rest.split_at(len);
            rest = tail;
            head
        })
    }
}

impl Default for ChunkSchedule {
    fn default() -> Self {
        Self::MEGA
    }
}

/// Chunks of a `total`-byte file under the service's schedule.
///
/// Every plan ends with exactly one remainder chunk, so an empty file yields
/// the single chunk `(0, 0)`.
pub fn plan_chunks(total: u64) -> ChunkPlan {
    ChunkSchedule::MEGA.plan(total)
}

/// Lazy iterator over chunk boundaries. Clone it to restart from the same
/// position.
#[derive(Debug, Clone)]
pub struct ChunkPlan {
    schedule: ChunkSchedule,
    total: u64,
    offset: u64,
    size: u64,
    done: bool,
}

impl Iterator for ChunkPlan {
    type Item = Chunk;

    fn next(&mut self) -> Option<Chunk> {
        if self.done {
            return None;
        }

        // offset <= total holds throughout
        if self.size < self.total - self.offset {
            let chunk = Chunk {
                offset: self.offset,
                length: self.size,
            };
            self.offset += self.size;
            if self.size < self.schedule.cap {
                self.size = self
                    .size
                    .saturating_add(self.schedule.step)
                    .min(self.schedule.cap);
            }
            return Some(chunk);
        }

        self.done = true;
        Some(Chunk {
            offset: self.offset,
            length: self.total - self.offset,
        })
    }
}

impl FusedIterator for ChunkPlan {}
