//! This helper is part of the huffman encoding system.
//!
//! The main huffman encoder gathers symbol frequencies for each coding table. This helper turns those frequencies into
//! code lengths (depths in the huffman tree). The format limits code lengths to 20 bits. If the frequencies supplied
//! create longer codes, the weights are flattened and another attempt is made.
//!
//! The tree is built with an array backed binary min-heap. Node weights carry the frequency in the upper 24 bits and the
//! subtree depth in the low 8 bits, so among equal frequencies the shallower subtree is merged first.

use log::trace;

/// Flattening rounds allowed before giving up on a length limit.
const MAX_REBALANCE: usize = 32;

/// Compute code lengths for the first `alpha_size` symbols of `freqs`, none longer than `max_len`.
/// Symbols with a zero frequency are treated as occurring once so every symbol gets a code.
pub fn improve_code_len_from_weights(freqs: &[u32], alpha_size: usize, max_len: u8) -> Vec<u8> {
    // Slot 0 is the heap sentinel. Leaves are 1..=alpha_size, internal nodes follow.
    let mut weight = vec![0_u32; alpha_size * 2];
    for (w, &f) in weight[1..].iter_mut().zip(freqs.iter().take(alpha_size)) {
        *w = f.max(1) << 8;
    }

    for attempt in 0..MAX_REBALANCE {
        let lens = build_lengths(&mut weight, alpha_size);
        match lens.iter().max() {
            Some(&longest) if longest > max_len => {
                trace!(
                    "Attempt {}: code length {} exceeds {}, flattening weights",
                    attempt,
                    longest,
                    max_len
                );
                for w in weight[1..=alpha_size].iter_mut() {
                    let j = 1 + ((*w >> 8) / 2);
                    *w = j << 8;
                }
            }
            _ => return lens,
        }
    }
    panic!(
        "huffman code lengths did not fit in {} bits after {} attempts",
        max_len, MAX_REBALANCE
    );
}

/// Build one tree from the leaf weights and return each leaf's depth.
fn build_lengths(weight: &mut [u32], alpha_size: usize) -> Vec<u8> {
    let mut heap = vec![0_usize; alpha_size + 2];
    let mut parent = vec![-1_isize; alpha_size * 2];
    let mut n_heap = 0;
    let mut n_nodes = alpha_size;

    weight[0] = 0;
    parent[0] = -2;
    for i in 1..=alpha_size {
        n_heap += 1;
        heap[n_heap] = i;
        up_heap(&mut heap, weight, n_heap);
    }

    while n_heap > 1 {
        let n1 = pop(&mut heap, weight, &mut n_heap);
        let n2 = pop(&mut heap, weight, &mut n_heap);
        n_nodes += 1;
        parent[n1] = n_nodes as isize;
        parent[n2] = n_nodes as isize;
        weight[n_nodes] = add_weights(weight[n1], weight[n2]);
        parent[n_nodes] = -1;
        n_heap += 1;
        heap[n_heap] = n_nodes;
        up_heap(&mut heap, weight, n_heap);
    }

    (1..=alpha_size)
        .map(|leaf| {
            let mut depth = 0_u8;
            let mut k = leaf;
            while parent[k] >= 0 {
                k = parent[k] as usize;
                depth += 1;
            }
            depth
        })
        .collect()
}

#[inline]
fn pop(heap: &mut [usize], weight: &[u32], n_heap: &mut usize) -> usize {
    let top = heap[1];
    heap[1] = heap[*n_heap];
    *n_heap -= 1;
    down_heap(heap, weight, *n_heap, 1);
    top
}

#[inline]
fn up_heap(heap: &mut [usize], weight: &[u32], mut z: usize) {
    let tmp = heap[z];
    while weight[tmp] < weight[heap[z >> 1]] {
        heap[z] = heap[z >> 1];
        z >>= 1;
    }
    heap[z] = tmp;
}

#[inline]
fn down_heap(heap: &mut [usize], weight: &[u32], n_heap: usize, mut z: usize) {
    let tmp = heap[z];
    loop {
        let mut yy = z << 1;
        if yy > n_heap {
            break;
        }
        if yy < n_heap && weight[heap[yy + 1]] < weight[heap[yy]] {
            yy += 1;
        }
        if weight[tmp] < weight[heap[yy]] {
            break;
        }
        heap[z] = heap[yy];
        z = yy;
    }
    heap[z] = tmp;
}

/// Julian's weight adding for parent nodes: sum the frequencies, keep one more than the deeper depth.
#[inline(always)]
fn add_weights(a: u32, b: u32) -> u32 {
    let weight_mask: u32 = 0xffffff00;
    let depth_mask: u32 = 0x000000ff;
    ((a & weight_mask) + (b & weight_mask)) | (1 + (a & depth_mask).max(b & depth_mask))
}

/// Assign canonical codes: shorter codes first, ties broken by symbol order.
pub fn codes_from_lengths(lens: &[u8]) -> Vec<u32> {
    let mut codes = vec![0_u32; lens.len()];
    let min_len = lens.iter().copied().min().unwrap_or(0);
    let max_len = lens.iter().copied().max().unwrap_or(0);
    let mut next = 0_u32;
    for len in min_len..=max_len {
        for (code, _) in codes.iter_mut().zip(lens).filter(|(_, &l)| l == len) {
            *code = next;
            next += 1;
        }
        next <<= 1;
    }
    codes
}
