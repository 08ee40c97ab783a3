//! # Static Huffman Coding
//!
//! Builds a prefix-free code from the byte frequencies of a fixed input,
//! packs the coded bits into bytes, and decodes them back using the same tree.
//!
//! * `huff` is the codec proper, it works on buffers and keeps the tree in memory
//! * `shf` wraps the codec in a container that carries the frequency table,
//!   so that a compressed file can be expanded on its own

mod tools;
pub mod huff;
pub mod shf;

pub use tools::frequency::FrequencyTable;
pub use tools::static_huff::{HuffTree,Node,CodeTable};
pub use tools::bit_packer;

type DYNERR = Box<dyn std::error::Error>;
type STDRESULT = Result<(),Box<dyn std::error::Error>>;

/// Codec Errors
#[derive(thiserror::Error,Debug,Clone,PartialEq)]
pub enum Error {
    #[error("input is empty")]
    EmptyInput,
    #[error("malformed bitstream")]
    MalformedBitstream,
    #[error("invalid bit `{0}` in message")]
    InvalidBit(char),
    #[error("no code for symbol {0}")]
    UnknownSymbol(u8),
    #[error("file format mismatch")]
    FileFormatMismatch,
    #[error("file too large")]
    FileTooLarge
}

/// Options controlling compression
#[derive(Clone)]
pub struct Options {
    /// whether to include the 4 byte signature
    pub header: bool,
    /// starting position in the input file
    pub in_offset: u64,
    /// starting position in the output file
    pub out_offset: u64,
    /// return error if file is larger
    pub max_file_size: u64
}

pub const STD_OPTIONS: Options = Options {
    header: true,
    in_offset: 0,
    out_offset: 0,
    max_file_size: u32::MAX as u64/4
};

/// Size reduction in percent, `100 * (in_bits - out_bits) / in_bits`.
/// Negative when the output grew, zero for an empty input.
pub fn reduction_percent(in_size: u64,out_size: u64) -> i64 {
    if in_size == 0 {
        return 0;
    }
    let in_bits = in_size as i128 * 8;
    let out_bits = out_size as i128 * 8;
    (100 * (in_bits - out_bits) / in_bits) as i64
}

#[test]
fn reduction() {
    assert_eq!(reduction_percent(100,25),75);
    assert_eq!(reduction_percent(3,2),33);
    assert_eq!(reduction_percent(10,15),-50);
    assert_eq!(reduction_percent(0,12),0);
}
