//! The bwt_algorithms module forms the critical sorting subsystem of the compressor.
//!
//! BZIP2 uses the Burrows-Wheeler Transform (BWT) to prepare data for compression. This transform alters the data in such
//! a way that runs of similar bytes are more likely to occur. This allows for more effective compression.
//!
//! The transform requires sorting every rotation of the block. Small blocks are shell sorted directly. Larger blocks are
//! bucket sorted on two bytes, then each bucket is finished with a three way radix quicksort that drops to the shell sort
//! for small or deep ranges. A work budget guards the first attempt; blocks that exceed it are randomised and sorted again.
//!
pub mod block_sort;
mod main_gtu;
mod main_q_sort3;
mod main_simple_sort;
mod main_sort;
pub mod randomise;

/// Bytes of the block repeated past its end so comparisons never need a bounds wrap mid-group.
pub const OVERSHOOT: usize = 34;
