use log::{debug, trace};

use crate::bitstream::bitwriter::BitWriter;
use crate::tools::rle2_mtf::{SymbolStream, MAX_ALPHA_SIZE};

use super::huffman_code_from_weights::{codes_from_lengths, improve_code_len_from_weights};
use std::io::Write;

/// Symbols coded by one selector.
pub const GROUP_SIZE: usize = 50;
/// Longest code the format allows.
pub const MAX_CODE_LEN: u8 = 20;
const MAX_TABLES: usize = 6;
const MAX_SELECTORS: usize = 32767;
/// Cost of a symbol inside / outside a table's initial frequency band.
const LESSER_ICOST: u8 = 0;
const GREATER_ICOST: u8 = 15;

/// Code lengths for every table plus the table chosen for each group of 50 symbols.
#[derive(Debug, Clone)]
pub struct CodingTables {
    pub lens: Vec<Vec<u8>>,
    pub selectors: Vec<u8>,
}

/// Multi-table huffman coder. Up to six tables are refined over several passes; each group of 50 symbols
/// is coded with whichever table is cheapest for it.
#[derive(Debug, Clone)]
pub struct MultiTableHuffmanEncoder {
    iterations: usize,
}

impl MultiTableHuffmanEncoder {
    /// `iterations` is the number of refinement passes (4 is standard, at least 1 is used).
    pub fn new(iterations: usize) -> Self {
        Self {
            iterations: iterations.max(1),
        }
    }

    /// Build the tables and write them, the selectors and the coded symbols.
    pub fn encode<W: Write>(&self, bw: &mut BitWriter<W>, stream: &SymbolStream) {
        let tables = self.build_tables(stream);
        write_tables(bw, &tables, stream);
    }

    /// Choose table lengths and selectors for the symbol stream.
    pub fn build_tables(&self, stream: &SymbolStream) -> CodingTables {
        let alpha_size = stream.alpha_size();
        let n_mtf = stream.symbols.len();
        let table_count = table_count(n_mtf);

        let mut lens = initial_tables(&stream.freqs, table_count, alpha_size, n_mtf);
        let group_count = (n_mtf + GROUP_SIZE - 1) / GROUP_SIZE;
        let mut selectors = vec![0_u8; group_count];

        for iter in 0..self.iterations {
            let mut favorites = [0; MAX_TABLES];
            let mut total_cost = 0;
            let mut rfreq = vec![[0_u32; MAX_ALPHA_SIZE]; table_count];

            for (i, chunk) in stream.symbols.chunks(GROUP_SIZE).enumerate() {
                let mut cost = [0_u32; MAX_TABLES];
                for &symbol in chunk {
                    for (t, table) in lens.iter().enumerate() {
                        cost[t] += table[symbol as usize] as u32;
                    }
                }

                // The first table with the lowest cost wins ties.
                let mut bt = 0;
                for t in 1..table_count {
                    if cost[t] < cost[bt] {
                        bt = t;
                    }
                }
                total_cost += cost[bt];
                favorites[bt] += 1;
                selectors[i] = bt as u8;
                chunk
                    .iter()
                    .for_each(|&symbol| rfreq[bt][symbol as usize] += 1);
            }

            debug!(
                " pass {}: size is {}, grp uses are {:?}",
                iter + 1,
                total_cost / 8,
                &favorites[..table_count]
            );

            for (t, table) in lens.iter_mut().enumerate() {
                *table = improve_code_len_from_weights(&rfreq[t], alpha_size, MAX_CODE_LEN);
            }
        }

        assert!(selectors.len() <= MAX_SELECTORS, "too many selectors");
        CodingTables { lens, selectors }
    }
}

/// The number of tables depends on how many symbols the block has.
pub fn table_count(n_mtf: usize) -> usize {
    match n_mtf {
        0..=199 => 2,
        200..=599 => 3,
        600..=1199 => 4,
        1200..=2399 => 5,
        _ => 6,
    }
}

/// Split the alphabet into contiguous bands of roughly equal total frequency, one per table. Each table
/// starts out cheap inside its band and expensive outside it.
fn initial_tables(
    freqs: &[u32; MAX_ALPHA_SIZE],
    table_count: usize,
    alpha_size: usize,
    n_mtf: usize,
) -> Vec<Vec<u8>> {
    let mut lens = vec![vec![GREATER_ICOST; alpha_size]; table_count];
    let mut rem_f = n_mtf as u32;
    let mut gs: isize = 0;
    let mut n_part = table_count;

    while n_part > 0 {
        let t_freq = rem_f / n_part as u32;
        let mut ge = gs - 1;
        let mut a_freq = 0;
        while a_freq < t_freq && ge < alpha_size as isize - 1 {
            ge += 1;
            a_freq += freqs[ge as usize];
        }
        // Alternate bands give back their last symbol so the bands do not all lean the same way.
        if ge > gs && n_part != table_count && n_part != 1 && (table_count - n_part) % 2 == 1 {
            a_freq -= freqs[ge as usize];
            ge -= 1;
        }
        trace!(
            "      initial group {}, [{} .. {}], has {} syms ({:4.1}%)",
            n_part,
            gs,
            ge,
            a_freq,
            100.0 * a_freq as f32 / n_mtf as f32
        );
        for (v, len) in lens[n_part - 1].iter_mut().enumerate() {
            let v = v as isize;
            if v >= gs && v <= ge {
                *len = LESSER_ICOST;
            }
        }
        n_part -= 1;
        gs = ge + 1;
        rem_f -= a_freq;
    }
    lens
}

/// Move-to-front the selectors so the common case (same table again) costs one bit.
pub fn mtf_selectors(selectors: &[u8], table_count: usize) -> Vec<u8> {
    let mut pos: Vec<u8> = (0..table_count as u8).collect();
    selectors
        .iter()
        .map(|&sel| {
            let idx = pos.iter().position(|&p| p == sel).unwrap_or(0);
            pos[..=idx].rotate_right(1);
            idx as u8
        })
        .collect()
}

/// Write the table count, selectors, code length tables and the coded symbols.
pub fn write_tables<W: Write>(bw: &mut BitWriter<W>, tables: &CodingTables, stream: &SymbolStream) {
    let table_count = tables.lens.len();

    trace!("Table count written at {}.", bw.loc());
    bw.out24((3 << 24) | table_count as u32);
    bw.out24((15 << 24) | tables.selectors.len() as u32);

    // Unary: idx ones then a zero.
    trace!("{} selectors written at {}.", tables.selectors.len(), bw.loc());
    for idx in mtf_selectors(&tables.selectors, table_count) {
        let idx = idx as u32;
        bw.out24(((idx + 1) << 24) | (((1 << idx) - 1) << 1));
    }

    // Each length is written as a delta walk from the previous one: 10 is +1, 11 is -1, 0 ends.
    for (t, lens) in tables.lens.iter().enumerate() {
        let mut curr = lens[0];
        trace!("Writing origin {} for huffman map {} at {}.", curr, t, bw.loc());
        bw.out24((5 << 24) | curr as u32);
        for &len in lens {
            while curr < len {
                bw.out24(0x02_000002);
                curr += 1;
            }
            while curr > len {
                bw.out24(0x02_000003);
                curr -= 1;
            }
            bw.out24(0x01_000000);
        }
    }

    let codes: Vec<Vec<u32>> = tables
        .lens
        .iter()
        .map(|lens| codes_from_lengths(lens))
        .collect();

    trace!("Huffman data written at {}.", bw.loc());
    for (chunk, &sel) in stream.symbols.chunks(GROUP_SIZE).zip(&tables.selectors) {
        let lens = &tables.lens[sel as usize];
        let codes = &codes[sel as usize];
        for &symbol in chunk {
            let s = symbol as usize;
            bw.out24(((lens[s] as u32) << 24) | codes[s]);
        }
    }
}
