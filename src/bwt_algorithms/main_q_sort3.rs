use super::block_sort::{RotationSorter, SortRange};

pub(super) const QSORT_STACK_SIZE: usize = 1000;
const SMALL_THRESH: isize = 20;
const DEPTH_THRESH: isize = 10;

impl RotationSorter {
    /// Three way radix quicksort of zptr[lo..=hi], comparing one byte at depth `d` per pass.
    /// Small or deep ranges are handed to the shell sort. Work is kept on an explicit stack.
    pub(super) fn q_sort3(&mut self, lo: isize, hi: isize, d: isize) {
        self.stack.clear();
        self.stack.push(SortRange { lo, hi, d });

        while let Some(SortRange { lo, hi, d }) = self.stack.pop() {
            if hi - lo < SMALL_THRESH || d > DEPTH_THRESH {
                self.simple_sort(lo, hi, d);
                if self.budget_exceeded() {
                    return;
                }
                continue;
            }

            let med = med3(
                self.byte_at(lo, d),
                self.byte_at(hi, d),
                self.byte_at((lo + hi) >> 1, d),
            ) as i32;

            let mut un_lo = lo;
            let mut lt_lo = lo;
            let mut un_hi = hi;
            let mut gt_hi = hi;

            loop {
                while un_lo <= un_hi {
                    let n = self.byte_at(un_lo, d) as i32 - med;
                    if n == 0 {
                        self.zptr.swap(un_lo as usize, lt_lo as usize);
                        lt_lo += 1;
                        un_lo += 1;
                        continue;
                    }
                    if n > 0 {
                        break;
                    }
                    un_lo += 1;
                }
                while un_lo <= un_hi {
                    let n = self.byte_at(un_hi, d) as i32 - med;
                    if n == 0 {
                        self.zptr.swap(un_hi as usize, gt_hi as usize);
                        gt_hi -= 1;
                        un_hi -= 1;
                        continue;
                    }
                    if n < 0 {
                        break;
                    }
                    un_hi -= 1;
                }
                if un_lo > un_hi {
                    break;
                }
                self.zptr.swap(un_lo as usize, un_hi as usize);
                un_lo += 1;
                un_hi -= 1;
            }

            // Every entry matched the median: the whole range moves one byte deeper.
            if gt_hi < lt_lo {
                self.push(lo, hi, d + 1);
                continue;
            }

            // Move the equal runs from both ends into the middle.
            let n = (lt_lo - lo).min(un_lo - lt_lo);
            self.vswap(lo, un_lo - n, n);
            let m = (hi - gt_hi).min(gt_hi - un_hi);
            self.vswap(un_lo, hi - m + 1, m);

            let n = lo + un_lo - lt_lo - 1;
            let m = hi - (gt_hi - un_hi) + 1;

            self.push(lo, n, d);
            self.push(n + 1, m - 1, d + 1);
            self.push(m, hi, d);
        }
    }

    #[inline(always)]
    fn byte_at(&self, idx: isize, d: isize) -> u8 {
        self.block[self.zptr[idx as usize] as usize + d as usize]
    }

    #[inline]
    fn push(&mut self, lo: isize, hi: isize, d: isize) {
        assert!(
            self.stack.len() < QSORT_STACK_SIZE,
            "quicksort stack overflow"
        );
        self.stack.push(SortRange { lo, hi, d });
    }

    /// Swap the n entries starting at p1 with the n entries starting at p2.
    #[inline]
    fn vswap(&mut self, p1: isize, p2: isize, n: isize) {
        for i in 0..n {
            self.zptr.swap((p1 + i) as usize, (p2 + i) as usize);
        }
    }
}

/// Median of three.
#[inline(always)]
fn med3(a: u8, b: u8, c: u8) -> u8 {
    let (a, b) = if a > b { (b, a) } else { (a, b) };
    let b = if b > c { c } else { b };
    a.max(b)
}
