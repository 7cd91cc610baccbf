//! The huffman module generates the entropy coded part of each block.
//!
//! Huffman coding is used in lieu of arithmetic coding because of an historical problem with licensing restrictions.
//! The BZIP2 format was fixed around huffman coding and remains so.
//!
//! The coding is both block and group oriented. Within each block, groups of 50 symbols are coded separately using one
//! of two to six huffman tables. The tables are refined over several passes, and each group records (as a selector)
//! which table codes it. This gives a higher compression ratio than one table per block.
//!
//! The process of encoding each block is inherently sequential.

pub mod huffman;
pub mod huffman_code_from_weights;
