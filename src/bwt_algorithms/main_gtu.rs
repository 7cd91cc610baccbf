use super::block_sort::RotationSorter;

impl RotationSorter {
    /// True if the rotation starting at i1 sorts after the rotation starting at i2.
    ///
    /// The first six bytes are compared directly. After that bytes and quadrant ranks are compared
    /// in groups of four, wrapping around the block, until a full block length has been covered.
    /// Each group costs one unit of work. Equal rotations return false.
    #[inline]
    pub(super) fn full_gtu(&mut self, mut i1: usize, mut i2: usize) -> bool {
        let end = self.end;
        let block = &self.block;
        let quadrant = &self.quadrant;

        for _ in 0..6 {
            if block[i1] != block[i2] {
                return block[i1] > block[i2];
            }
            i1 += 1;
            i2 += 1;
        }

        let mut k = end as isize;
        let mut work = 0;
        let result = loop {
            let mut decided = None;
            for _ in 0..4 {
                if block[i1] != block[i2] {
                    decided = Some(block[i1] > block[i2]);
                    break;
                }
                if quadrant[i1] != quadrant[i2] {
                    decided = Some(quadrant[i1] > quadrant[i2]);
                    break;
                }
                i1 += 1;
                i2 += 1;
            }
            if decided.is_some() {
                break decided;
            }
            if i1 >= end {
                i1 -= end;
            }
            if i2 >= end {
                i2 -= end;
            }
            k -= 4;
            work += 1;
            if k < 0 {
                break None;
            }
        };
        self.work_done += work;
        result.unwrap_or(false)
    }
}
