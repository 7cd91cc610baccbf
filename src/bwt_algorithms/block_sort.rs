//! Entry point of the sorting subsystem.
//!
//! `RotationSorter` owns every array the sort needs, so one sorter is allocated per stream and reused
//! for every block. It sorts all rotations of the block, reports where the unrotated block landed
//! (the origin pointer), and produces the last column of the sorted rotation matrix.
//!
//! The first attempt at each large block runs against a work budget. If the budget runs out the block
//! is randomised and sorted again without a budget.
use log::{debug, trace, warn};

use super::randomise::randomise;
use super::OVERSHOOT;

/// Result of sorting one block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortedBlock {
    /// Row of the sorted matrix holding the unrotated block.
    pub orig_ptr: u32,
    /// True if the block was randomised before the final sort.
    pub randomised: bool,
    /// Last column of the sorted rotation matrix.
    pub bwt: Vec<u8>,
}

/// One pending quicksort range on the explicit sort stack.
#[derive(Debug, Clone, Copy)]
pub(super) struct SortRange {
    pub lo: isize,
    pub hi: isize,
    pub d: isize,
}

#[derive(Debug)]
pub struct RotationSorter {
    /// Block data followed by OVERSHOOT wrapped bytes so comparisons can run past the end.
    pub(super) block: Vec<u8>,
    /// Cached partial sort order per position, with the same overshoot.
    pub(super) quadrant: Vec<u16>,
    /// Rotation start positions, sorted in place.
    pub(super) zptr: Vec<u32>,
    /// Two byte bucket boundaries.
    pub(super) ftab: Vec<u32>,
    pub(super) stack: Vec<SortRange>,
    /// Length of the current block.
    pub(super) end: usize,
    pub(super) work_done: u64,
    pub(super) work_limit: u64,
    pub(super) first_attempt: bool,
    work_factor: u32,
}

impl RotationSorter {
    /// `capacity` is the largest block this sorter will see. `work_factor` scales the comparison
    /// budget of the first attempt (comparisons allowed per block byte).
    pub fn new(capacity: usize, work_factor: u32) -> Self {
        Self {
            block: Vec::with_capacity(capacity + OVERSHOOT),
            quadrant: Vec::with_capacity(capacity + OVERSHOOT),
            zptr: Vec::with_capacity(capacity),
            ftab: vec![0; 65537],
            stack: Vec::with_capacity(super::main_q_sort3::QSORT_STACK_SIZE),
            end: 0,
            work_done: 0,
            work_limit: 0,
            first_attempt: true,
            work_factor,
        }
    }

    /// Sort the block. `in_use` must be the presence set of `data`; it is rebuilt if the block
    /// is randomised. Panics on an empty block.
    pub fn sort(&mut self, data: &[u8], in_use: &mut [bool; 256]) -> SortedBlock {
        assert!(!data.is_empty(), "cannot sort an empty block");
        self.load(data);

        self.work_limit = self.work_factor as u64 * self.end as u64;
        self.work_done = 0;
        self.first_attempt = true;
        self.main_sort();

        let mut randomised = false;
        if self.budget_exceeded() {
            warn!(
                "Sort budget of {} exhausted after {} units, randomising block of {} bytes",
                self.work_limit, self.work_done, self.end
            );
            randomise(&mut self.block[..self.end], in_use);
            self.wrap_overshoot();
            self.work_limit = 0;
            self.work_done = 0;
            self.first_attempt = false;
            randomised = true;
            self.main_sort();
        }
        debug!("Sorted {} rotations, {} work units", self.end, self.work_done);

        let (orig_ptr, bwt) = self.last_column();
        SortedBlock {
            orig_ptr,
            randomised,
            bwt,
        }
    }

    /// True once the first attempt has spent more than its budget.
    #[inline(always)]
    pub(super) fn budget_exceeded(&self) -> bool {
        self.first_attempt && self.work_done > self.work_limit
    }

    /// Copy the block in and prepare the overshoot areas.
    fn load(&mut self, data: &[u8]) {
        self.end = data.len();
        self.block.clear();
        self.block.extend_from_slice(data);
        self.block.resize(self.end + OVERSHOOT, 0);
        self.wrap_overshoot();
        self.quadrant.clear();
        self.quadrant.resize(self.end + OVERSHOOT, 0);
        self.zptr.clear();
        self.zptr.resize(self.end, 0);
    }

    /// Repeat the start of the block after its end. Short blocks repeat more than once.
    fn wrap_overshoot(&mut self) {
        for i in 0..OVERSHOOT {
            self.block[self.end + i] = self.block[i % self.end];
        }
    }

    /// Find the origin pointer and read off the byte preceding each sorted rotation.
    fn last_column(&self) -> (u32, Vec<u8>) {
        let end = self.end;
        let mut orig_ptr = None;
        let bwt = self
            .zptr
            .iter()
            .enumerate()
            .map(|(row, &start)| {
                if start == 0 {
                    orig_ptr = Some(row as u32);
                }
                self.block[(start as usize + end - 1) % end]
            })
            .collect();
        let orig_ptr = orig_ptr.unwrap_or_else(|| panic!("origin rotation missing from sorted block"));
        trace!("origin pointer {}", orig_ptr);
        (orig_ptr, bwt)
    }
}

/// Convenience wrapper for a single block.
#[cfg(test)]
pub fn block_sort(data: &[u8], work_factor: u32) -> SortedBlock {
    let mut in_use = [false; 256];
    data.iter().for_each(|&b| in_use[b as usize] = true);
    RotationSorter::new(data.len(), work_factor).sort(data, &mut in_use)
}
