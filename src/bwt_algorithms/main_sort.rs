use log::{debug, trace};

use super::block_sort::RotationSorter;
use super::OVERSHOOT;

/// Blocks up to this length skip the bucket machinery and go straight to the shell sort.
const SMALL_BLOCK: usize = 4000;
/// Depth already resolved by the two byte bucket sort.
const BUCKET_DEPTH: isize = 2;
const SETMASK: u32 = 1 << 21;
const CLEARMASK: u32 = !SETMASK;

impl RotationSorter {
    /// Sort all rotations of the loaded block into `zptr`.
    ///
    /// Large blocks are radix sorted on their first two bytes, then processed one big bucket (first
    /// byte) at a time, smallest first. Each finished big bucket fixes the order of every small bucket
    /// [t, ss] by a single scan, and records its ranks in `quadrant` so later comparisons finish early.
    /// Returns early if the first attempt runs out of budget.
    pub(super) fn main_sort(&mut self) {
        let end = self.end;
        self.quadrant.iter_mut().for_each(|q| *q = 0);

        if end <= SMALL_BLOCK {
            trace!("Small block of {} bytes, shell sort only", end);
            self.zptr
                .iter_mut()
                .enumerate()
                .for_each(|(i, z)| *z = i as u32);
            self.first_attempt = false;
            self.work_done = 0;
            self.work_limit = 0;
            self.simple_sort(0, end as isize - 1, 0);
            return;
        }

        self.bucket_sort();
        let running_order = self.running_order();

        let mut big_done = [false; 256];
        let mut copy = [0_u32; 256];
        let mut num_q_sorted = 0;

        for (i, &ss) in running_order.iter().enumerate() {
            let ss = ss as usize;

            // Step 1: quicksort the small buckets [ss, j] not already finished by an earlier scan.
            for j in 0..256 {
                let sb = (ss << 8) + j;
                if self.ftab[sb] & SETMASK == 0 {
                    let lo = (self.ftab[sb] & CLEARMASK) as isize;
                    let hi = (self.ftab[sb + 1] & CLEARMASK) as isize - 1;
                    if hi > lo {
                        trace!(
                            "   qsort [0x{:02x}, 0x{:02x}]   done {}   this {}",
                            ss,
                            j,
                            num_q_sorted,
                            hi - lo + 1
                        );
                        self.q_sort3(lo, hi, BUCKET_DEPTH);
                        num_q_sorted += hi - lo + 1;
                        if self.budget_exceeded() {
                            return;
                        }
                    }
                    self.ftab[sb] |= SETMASK;
                }
            }

            // Step 2: the big bucket [ss] is sorted. Record the ranks of its members.
            big_done[ss] = true;
            if i < 255 {
                self.update_quadrants(ss);
            }

            // Step 3: a scan of [ss] yields the sorted order of every [t, ss] whose big bucket t
            // is not yet done.
            for (c, slot) in copy.iter_mut().enumerate() {
                *slot = self.ftab[(c << 8) + ss] & CLEARMASK;
            }
            let bb_start = (self.ftab[ss << 8] & CLEARMASK) as usize;
            let bb_end = (self.ftab[(ss + 1) << 8] & CLEARMASK) as usize;
            for j in bb_start..bb_end {
                let pos = self.zptr[j] as usize;
                let prev = if pos == 0 { end - 1 } else { pos - 1 };
                let c1 = self.block[prev] as usize;
                if !big_done[c1] {
                    self.zptr[copy[c1] as usize] = prev as u32;
                    copy[c1] += 1;
                }
            }
            for c in 0..256 {
                self.ftab[(c << 8) + ss] |= SETMASK;
            }
        }
        debug!(
            "{} pointers, {} sorted, {} scanned",
            end,
            num_q_sorted,
            end as isize - num_q_sorted
        );
    }

    /// Radix sort every rotation on its first two bytes. Leaves the start of bucket k in ftab[k].
    fn bucket_sort(&mut self) {
        let end = self.end;
        self.ftab.iter_mut().for_each(|f| *f = 0);
        // block[end] wraps to block[0], so every key is a plain pair read.
        for i in 0..end {
            let key = self.key(i);
            self.ftab[key] += 1;
        }
        self.ftab.iter_mut().fold(0, |acc, x| {
            *x += acc;
            *x
        });
        for i in 0..end {
            let key = self.key(i);
            self.ftab[key] -= 1;
            self.zptr[self.ftab[key] as usize] = i as u32;
        }
    }

    #[inline(always)]
    fn key(&self, i: usize) -> usize {
        ((self.block[i] as usize) << 8) | self.block[i + 1] as usize
    }

    /// Order the 256 big buckets from smallest to largest.
    fn running_order(&self) -> [u8; 256] {
        let mut running_order = [0_u8; 256];
        running_order
            .iter_mut()
            .enumerate()
            .for_each(|(i, r)| *r = i as u8);

        let mut h = 364;
        while h != 1 {
            h /= 3;
            for i in h..256 {
                let vv = running_order[i];
                let mut j = i;
                while self.big_freq(running_order[j - h]) > self.big_freq(vv) {
                    running_order[j] = running_order[j - h];
                    j -= h;
                    if j < h {
                        break;
                    }
                }
                running_order[j] = vv;
            }
        }
        running_order
    }

    /// Number of rotations in big bucket `ss`.
    #[inline(always)]
    fn big_freq(&self, ss: u8) -> u32 {
        let ss = ss as usize;
        self.ftab[(ss + 1) << 8] - self.ftab[ss << 8]
    }

    /// Store each member's rank within big bucket `ss`, scaled to fit a u16.
    fn update_quadrants(&mut self, ss: usize) {
        let end = self.end;
        let bb_start = (self.ftab[ss << 8] & CLEARMASK) as usize;
        let bb_size = (self.ftab[(ss + 1) << 8] & CLEARMASK) as usize - bb_start;
        let mut shifts = 0;
        while (bb_size >> shifts) > 65534 {
            shifts += 1;
        }
        for j in 0..bb_size {
            let a2update = self.zptr[bb_start + j] as usize;
            let q_val = (j >> shifts) as u16;
            self.quadrant[a2update] = q_val;
            if a2update < OVERSHOOT {
                self.quadrant[a2update + end] = q_val;
            }
        }
        assert!(
            bb_size == 0 || ((bb_size - 1) >> shifts) <= 65535,
            "quadrant rank overflow"
        );
    }
}
