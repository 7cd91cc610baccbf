use super::block_sort::RotationSorter;

const INCS: [isize; 14] = [
    1, 4, 13, 40, 121, 364, 1093, 3280, 9841, 29524, 88573, 265720, 797161, 2391484,
];

impl RotationSorter {
    /// Shell sort of zptr[lo..=hi], comparing rotations from depth `d` onward.
    /// The budget is checked after every third insertion.
    pub(super) fn simple_sort(&mut self, lo: isize, hi: isize, d: isize) {
        let big_n = hi - lo + 1;
        if big_n < 2 {
            return;
        }

        let mut hp = INCS.iter().position(|&h| h >= big_n).unwrap_or(INCS.len());
        while hp > 0 {
            hp -= 1;
            let h = INCS[hp];
            let mut i = lo + h;
            'incr: loop {
                for _ in 0..3 {
                    if i > hi {
                        break 'incr;
                    }
                    self.insert(i, h, lo, d);
                    i += 1;
                }
                if self.budget_exceeded() {
                    return;
                }
            }
        }
    }

    /// Insert zptr[i] into the h-sorted chain that ends at i.
    #[inline(always)]
    fn insert(&mut self, i: isize, h: isize, lo: isize, d: isize) {
        let v = self.zptr[i as usize];
        let mut j = i;
        while self.full_gtu(
            self.zptr[(j - h) as usize] as usize + d as usize,
            v as usize + d as usize,
        ) {
            self.zptr[j as usize] = self.zptr[(j - h) as usize];
            j -= h;
            if j < lo + h {
                break;
            }
        }
        self.zptr[j as usize] = v;
    }
}
