//! Reference decoder used by the tests to check what the encoder writes.
//!
//! It follows the format exactly and panics on anything malformed, reporting what it found and where.
//! Along with the data it returns what it saw in each block header (flags, alphabet, tables) so the tests
//! can check properties of the stream and not only the round trip.

use std::collections::HashMap;

use crate::bitstream::bitreader::BitReader;
use crate::bwt_algorithms::randomise::RandomiseCursor;
use crate::huffman_coding::huffman_code_from_weights::codes_from_lengths;
use crate::tools::crc::{combine_stream_crc, do_crc};
use crate::tools::symbol_map::decode_sym_map;

const EOF_MESSAGE: &str = "Unexpected End Of File";
const CHUNK_SIZE: usize = 50;
const BLOCK_MAGIC: u64 = 0x3141_5926_5359;
const TRAILER_MAGIC: u64 = 0x1772_4538_5090;

/// Everything the decoder learned about one block.
#[derive(Debug, Clone)]
pub struct DecodedBlock {
    pub block_crc: u32,
    pub randomised: bool,
    pub orig_ptr: u32,
    /// Byte values present in the (possibly randomised) RLE1 block.
    pub in_use: Vec<u8>,
    pub table_lens: Vec<Vec<u8>>,
    pub selectors: Vec<u8>,
    /// The block as it was before the BWT, randomisation undone.
    pub rle1: Vec<u8>,
}

#[derive(Debug, Clone)]
pub struct DecodedStream {
    pub level: u8,
    pub blocks: Vec<DecodedBlock>,
    pub stream_crc: u32,
    pub data: Vec<u8>,
}

/// Decode a stream that starts with "BZh" (or just "h" when `with_magic` is false).
pub fn decompress(input: &[u8], with_magic: bool) -> DecodedStream {
    let mut br = BitReader::new(input);
    if with_magic {
        assert_eq!(br.bytes(2).expect(EOF_MESSAGE), b"BZ", "missing BZ magic");
    }
    assert_eq!(br.byte().expect(EOF_MESSAGE), b'h', "missing stream header");
    let level = br.byte().expect(EOF_MESSAGE).wrapping_sub(b'0');
    assert!((1..=9).contains(&level), "invalid block size level {}", level);

    let mut blocks = Vec::new();
    let mut data = Vec::new();
    let mut stream_crc = 0;

    loop {
        let magic = (br.bint(24).expect(EOF_MESSAGE) as u64) << 24 | br.bint(24).expect(EOF_MESSAGE) as u64;
        if magic == TRAILER_MAGIC {
            let stored = br.bint(32).expect(EOF_MESSAGE);
            assert_eq!(stored, stream_crc, "stream crc mismatch");
            assert!(br.remaining() < 8, "data after the stream trailer at {}", br.loc());
            break;
        }
        assert_eq!(magic, BLOCK_MAGIC, "bad block magic at {}", br.loc());

        let block = decode_block(&mut br, level);
        let bytes = rle1_decode(&block.rle1);
        assert_eq!(do_crc(&bytes), block.block_crc, "block {} crc mismatch", blocks.len() + 1);
        stream_crc = combine_stream_crc(stream_crc, block.block_crc);
        data.extend_from_slice(&bytes);
        blocks.push(block);
    }

    DecodedStream {
        level,
        blocks,
        stream_crc,
        data,
    }
}

fn decode_block(br: &mut BitReader<'_>, level: u8) -> DecodedBlock {
    let block_crc = br.bint(32).expect(EOF_MESSAGE);
    let randomised = br.bit().expect(EOF_MESSAGE);
    let orig_ptr = br.bint(24).expect(EOF_MESSAGE);
    assert!(
        (orig_ptr as usize) < level as usize * 100_000,
        "invalid key pointer {}",
        orig_ptr
    );

    let mut sym_map = vec![br.bint(16).expect(EOF_MESSAGE) as u16];
    for _ in 0..sym_map[0].count_ones() {
        sym_map.push(br.bint(16).expect(EOF_MESSAGE) as u16);
    }
    let in_use = decode_sym_map(&sym_map);
    assert!(!in_use.is_empty(), "empty symbol map");
    let alpha_size = in_use.len() + 2;

    let table_count = br.bint(3).expect(EOF_MESSAGE) as usize;
    assert!((2..=6).contains(&table_count), "invalid table count {}", table_count);
    let selector_count = br.bint(15).expect(EOF_MESSAGE) as usize;
    assert!(selector_count > 0, "no selectors");

    let mut pos: Vec<u8> = (0..table_count as u8).collect();
    let selectors: Vec<u8> = (0..selector_count)
        .map(|_| {
            let mut idx = 0;
            while br.bit().expect(EOF_MESSAGE) {
                idx += 1;
                assert!(idx < table_count, "selector out of range");
            }
            let sel = pos[idx];
            pos[..=idx].rotate_right(1);
            sel
        })
        .collect();

    let table_lens: Vec<Vec<u8>> = (0..table_count)
        .map(|_| {
            let mut curr = br.bint(5).expect(EOF_MESSAGE) as i32;
            (0..alpha_size)
                .map(|_| {
                    loop {
                        assert!((1..=20).contains(&curr), "code length {} out of range", curr);
                        if !br.bit().expect(EOF_MESSAGE) {
                            break;
                        }
                        if br.bit().expect(EOF_MESSAGE) {
                            curr -= 1;
                        } else {
                            curr += 1;
                        }
                    }
                    curr as u8
                })
                .collect()
        })
        .collect();

    // (length, code) -> symbol for each table
    let lookups: Vec<HashMap<(u8, u32), u16>> = table_lens
        .iter()
        .map(|lens| {
            codes_from_lengths(lens)
                .into_iter()
                .zip(lens)
                .enumerate()
                .map(|(sym, (code, &len))| ((len, code), sym as u16))
                .collect()
        })
        .collect();

    let eob = (alpha_size - 1) as u16;
    let mut mtf: Vec<u8> = in_use.clone();
    let mut bwt: Vec<u8> = Vec::new();
    let mut run = 0_usize;
    let mut run_weight = 1_usize;
    let mut decoded = 0_usize;

    loop {
        let group = decoded / CHUNK_SIZE;
        assert!(group < selector_count, "ran out of selectors");
        let table = &lookups[selectors[group] as usize];
        let mut code = 0_u32;
        let mut len = 0_u8;
        let sym = loop {
            code = code << 1 | br.bit().expect(EOF_MESSAGE) as u32;
            len += 1;
            assert!(len <= 20, "invalid huffman code at {}", br.loc());
            if let Some(&sym) = table.get(&(len, code)) {
                break sym;
            }
        };
        decoded += 1;

        if sym <= 1 {
            run += (sym as usize + 1) * run_weight;
            run_weight <<= 1;
            continue;
        }
        if run > 0 {
            bwt.extend(std::iter::repeat(mtf[0]).take(run));
            run = 0;
            run_weight = 1;
        }
        if sym == eob {
            break;
        }
        let idx = sym as usize - 1;
        let byte = mtf.remove(idx);
        mtf.insert(0, byte);
        bwt.push(byte);
    }
    assert_eq!(
        (decoded + CHUNK_SIZE - 1) / CHUNK_SIZE,
        selector_count,
        "selector count does not match the symbol count"
    );
    assert!((orig_ptr as usize) < bwt.len(), "key pointer past the block end");

    let mut rle1 = inverse_bwt(&bwt, orig_ptr as usize);
    if randomised {
        let mut cursor = RandomiseCursor::new();
        rle1.iter_mut().for_each(|b| {
            if cursor.step() {
                *b ^= 1;
            }
        });
    }

    DecodedBlock {
        block_crc,
        randomised,
        orig_ptr,
        in_use,
        table_lens,
        selectors,
        rle1,
    }
}

/// Undo the Burrows-Wheeler transform.
pub fn inverse_bwt(bwt: &[u8], orig_ptr: usize) -> Vec<u8> {
    let mut cftab = [0_usize; 257];
    bwt.iter().for_each(|&b| cftab[b as usize + 1] += 1);
    for i in 1..257 {
        cftab[i] += cftab[i - 1];
    }
    let mut tt = vec![0_usize; bwt.len()];
    for (i, &b) in bwt.iter().enumerate() {
        tt[cftab[b as usize]] = i;
        cftab[b as usize] += 1;
    }
    let mut pos = tt[orig_ptr];
    (0..bwt.len())
        .map(|_| {
            let byte = bwt[pos];
            pos = tt[pos];
            byte
        })
        .collect()
}

/// Expand RLE1: four equal bytes are always followed by a count of extra copies.
pub fn rle1_decode(data: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(data.len() * 2);
    let mut iter = data.iter();
    let mut last = None;
    let mut run = 0;
    while let Some(&byte) = iter.next() {
        out.push(byte);
        if last == Some(byte) {
            run += 1;
        } else {
            last = Some(byte);
            run = 1;
        }
        if run == 4 {
            let count = *iter.next().expect("missing run length byte");
            out.extend(std::iter::repeat(byte).take(count as usize));
            last = None;
            run = 0;
        }
    }
    out
}

#[cfg(test)]
mod test {
    use std::collections::BTreeSet;
    use std::io::Write;

    use rand::{rngs::StdRng, Rng, SeedableRng};

    use super::*;
    use crate::compression::compress::{compress, BzEncoder};
    use crate::tools::cli::BzOpts;
    use crate::tools::crc::BlockChecksum;
    use crate::tools::rle1::rle1_encode;

    fn opts(level: u8) -> BzOpts {
        BzOpts {
            block_size: level,
            ..BzOpts::default()
        }
    }

    fn round_trip(data: &[u8], opts: &BzOpts) -> DecodedStream {
        let packed = compress(data, opts).unwrap();
        let decoded = decompress(&packed, true);
        assert_eq!(decoded.data.len(), data.len());
        assert!(decoded.data == data, "round trip changed the data");
        decoded
    }

    fn text_like(len: usize, seed: u64) -> Vec<u8> {
        let words: [&[u8]; 8] = [b"the ", b"block ", b"sorting ", b"of ", b"bytes ", b"and ", b"runs ", b"\n"];
        let mut rng = StdRng::seed_from_u64(seed);
        let mut out = Vec::with_capacity(len);
        while out.len() < len {
            out.extend_from_slice(words[rng.gen_range(0..words.len())]);
        }
        out.truncate(len);
        out
    }

    #[test]
    fn inverse_bwt_test() {
        assert_eq!(inverse_bwt(b"nnbaaa", 3), b"banana".to_vec());
    }

    #[test]
    fn rle1_decode_test() {
        assert_eq!(rle1_decode(&[b'a', b'a', b'a', b'a', 0, b'b']), b"aaaab".to_vec());
        let data = vec![b'z'; 259];
        assert_eq!(rle1_decode(&rle1_encode(&data)), data);
    }

    #[test]
    fn empty_stream_test() {
        let packed = compress(b"", &BzOpts::default()).unwrap();
        assert_eq!(
            packed,
            vec![b'B', b'Z', b'h', b'9', 0x17, 0x72, 0x45, 0x38, 0x50, 0x90, 0, 0, 0, 0]
        );
        let decoded = decompress(&packed, true);
        assert!(decoded.blocks.is_empty());
        assert!(decoded.data.is_empty());
    }

    #[test]
    fn header_test() {
        let mut encoder = BzEncoder::new(Vec::new(), &opts(3)).unwrap();
        encoder.write_all(b"hello").unwrap();
        let packed = encoder.finish().unwrap();
        assert_eq!(&packed[..2], b"h3");
        let decoded = decompress(&packed, false);
        assert_eq!(decoded.level, 3);
        assert_eq!(decoded.data, b"hello".to_vec());
    }

    #[test]
    fn short_run_round_trip_test() {
        let decoded = round_trip(b"aaaaaaaaaaaa", &BzOpts::default());
        assert_eq!(decoded.blocks.len(), 1);
        let block = &decoded.blocks[0];
        assert_eq!(block.block_crc, do_crc(b"aaaaaaaaaaaa"));
        assert_eq!(block.rle1, vec![b'a', b'a', b'a', b'a', 8]);
        assert_eq!(block.in_use, vec![8, b'a']);
        assert!(!block.randomised);
    }

    #[test]
    fn single_byte_round_trip_test() {
        let decoded = round_trip(b"x", &BzOpts::default());
        assert_eq!(decoded.blocks[0].orig_ptr, 0);
    }

    #[test]
    fn uniform_megabyte_round_trip_test() {
        let data = vec![0x41_u8; 1_000_000];
        let decoded = round_trip(&data, &BzOpts::default());
        assert_eq!(decoded.blocks.len(), 1);
        // 3921 full runs of 255 plus a run of 145, five bytes each.
        assert_eq!(decoded.blocks[0].rle1.len(), 3922 * 5);
    }

    #[test]
    fn random_data_round_trip_test() {
        let mut rng = StdRng::seed_from_u64(0x5eed);
        let data: Vec<u8> = (0..50_000).map(|_| rng.gen()).collect();
        let mut encoder = BzEncoder::new(Vec::new(), &opts(9)).unwrap();
        encoder.write_all(&data).unwrap();
        assert_eq!(encoder.stats().blocks_randomised, 0);
        let packed = encoder.finish().unwrap();
        let decoded = decompress(&packed, false);
        assert!(decoded.data == data);
        assert!(!decoded.blocks[0].randomised);
        assert_eq!(decoded.blocks[0].table_lens.len(), 6);
    }

    #[test]
    fn repetitive_round_trip_with_fallback_test() {
        let data: Vec<u8> = b"xy".iter().cycle().take(100_000).copied().collect();
        let decoded = round_trip(&data, &BzOpts::default());
        assert_eq!(decoded.blocks.len(), 1);
        assert!(decoded.blocks[0].randomised);
    }

    #[test]
    fn repetitive_round_trip_without_fallback_test() {
        // Small blocks are sorted without a budget, so they are never randomised.
        let data: Vec<u8> = b"xy".iter().cycle().take(3_000).copied().collect();
        let decoded = round_trip(&data, &BzOpts::default());
        assert!(!decoded.blocks[0].randomised);
    }

    #[test]
    fn multi_block_round_trip_test() {
        let mut rng = StdRng::seed_from_u64(99);
        let data: Vec<u8> = (0..200_000).map(|_| rng.gen()).collect();
        let packed = compress(&data, &opts(1)).unwrap();
        let decoded = decompress(&packed, true);
        assert!(decoded.data == data);
        assert_eq!(decoded.blocks.len(), 3);
        for block in &decoded.blocks {
            assert!(block.rle1.len() <= 100_000 - 15);
        }
        let expect = decoded
            .blocks
            .iter()
            .fold(0, |acc, b| combine_stream_crc(acc, b.block_crc));
        assert_eq!(decoded.stream_crc, expect);
    }

    #[test]
    fn text_round_trip_test() {
        let data = text_like(300_000, 3);
        let decoded = round_trip(&data, &opts(2));
        assert_eq!(decoded.blocks.len(), 2);
    }

    #[test]
    fn code_lengths_and_alphabet_test() {
        let data = text_like(40_000, 11);
        let decoded = round_trip(&data, &BzOpts::default());
        for block in &decoded.blocks {
            for lens in &block.table_lens {
                assert_eq!(lens.len(), block.in_use.len() + 2);
                assert!(lens.iter().all(|&l| (1..=20).contains(&l)));
            }
            if !block.randomised {
                let present: BTreeSet<u8> = block.rle1.iter().copied().collect();
                assert_eq!(block.in_use, present.into_iter().collect::<Vec<u8>>());
            }
        }
    }

    #[test]
    fn streaming_matches_one_shot_test() {
        let data = text_like(20_000, 5);
        let mut encoder = BzEncoder::new(Vec::new(), &BzOpts::default()).unwrap();
        for &b in &data {
            encoder.write_byte(b).unwrap();
        }
        let streamed = encoder.finish().unwrap();
        let mut encoder = BzEncoder::new(Vec::new(), &BzOpts::default()).unwrap();
        for chunk in data.chunks(777) {
            encoder.write_all(chunk).unwrap();
            encoder.flush().unwrap();
        }
        assert_eq!(streamed, encoder.finish().unwrap());
    }

    #[test]
    fn drop_finishes_stream_test() {
        let mut sink = Vec::new();
        {
            let mut encoder = BzEncoder::new(&mut sink, &BzOpts::default()).unwrap();
            encoder.write_all(b"closed by drop").unwrap();
        }
        assert_eq!(decompress(&sink, false).data, b"closed by drop".to_vec());
    }

    #[test]
    fn stats_test() {
        let data = text_like(10_000, 8);
        let mut encoder = BzEncoder::new(Vec::new(), &BzOpts::default()).unwrap();
        encoder.write_all(&data).unwrap();
        assert_eq!(encoder.stats().bytes_in, 10_000);
        assert_eq!(encoder.stats().blocks, 0);
        let packed = encoder.finish().unwrap();
        assert!(packed.len() < data.len());
    }

    /// A checksum that ignores its input.
    struct FixedChecksum;

    impl BlockChecksum for FixedChecksum {
        fn reset(&mut self) {}
        fn update(&mut self, _byte: u8) {}
        fn finalize(&self) -> u32 {
            0x1234_5678
        }
    }

    #[test]
    fn custom_checksum_test() {
        let mut encoder = BzEncoder::with_checksum(Vec::new(), &BzOpts::default(), FixedChecksum).unwrap();
        encoder.write_all(b"abc").unwrap();
        let packed = encoder.finish().unwrap();
        // Skip "h9" and the block magic, then read the stored crc.
        assert_eq!(&packed[8..12], &[0x12, 0x34, 0x56, 0x78]);
    }
}
