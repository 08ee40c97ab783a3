//! Building blocks of the static Huffman codec.

pub mod frequency;
pub mod static_huff;
pub mod bit_packer;
