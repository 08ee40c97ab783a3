//! Static Huffman Codec
//!
//! Count the byte frequencies, build the tree, assign codes, and pack the coded bits.
//! The result keeps the tree, which is needed again to decompress.
//!
//! * This transforms buffers, not files, see `shf` for the file format
//! * Decompression needs the exact unpacked bit length to strip the padding

use bit_vec::BitVec;
use crate::tools::frequency::FrequencyTable;
use crate::tools::static_huff::{HuffTree,CodeTable};
use crate::tools::bit_packer;
use crate::Error;

/// Output of `compress`, everything needed to reverse it.
#[derive(Clone,Debug)]
pub struct Encoded {
    tree: HuffTree,
    table: CodeTable,
    bits: BitVec,
    packed: Vec<u8>
}

impl Encoded {
    pub fn tree(&self) -> &HuffTree {
        &self.tree
    }
    pub fn table(&self) -> &CodeTable {
        &self.table
    }
    /// the unpacked bit sequence
    pub fn bits(&self) -> &BitVec {
        &self.bits
    }
    /// length of the unpacked bit sequence, not counting padding
    pub fn bit_len(&self) -> usize {
        self.bits.len()
    }
    pub fn packed(&self) -> &[u8] {
        &self.packed
    }
    /// unpacked bits as `0` and `1` characters
    pub fn bit_string(&self) -> String {
        bit_packer::to_bit_str(&self.bits)
    }
    /// give up the tree, bit length, and packed bytes, e.g. for `decompress`
    pub fn into_parts(self) -> (HuffTree,usize,Vec<u8>) {
        let bit_len = self.bits.len();
        (self.tree,bit_len,self.packed)
    }
}

/// Main compression function
pub fn compress(dat: &[u8]) -> Result<Encoded,Error> {
    if dat.is_empty() {
        log::error!("nothing to compress");
        return Err(Error::EmptyInput);
    }
    let freq = FrequencyTable::count(dat);
    let tree = HuffTree::build(&freq)?;
    let table = CodeTable::create(&tree);
    let mut bits = BitVec::new();
    table.encode(dat,&mut bits)?;
    let packed = bit_packer::pack(&bits);
    log::debug!("coded {} bytes into {} bits, {} packed bytes",dat.len(),bits.len(),packed.len());
    Ok(Encoded {
        tree,
        table,
        bits,
        packed
    })
}

/// Main decompression function
pub fn decompress(tree: &HuffTree,bit_len: usize,packed: &[u8]) -> Result<Vec<u8>,Error> {
    let bits = bit_packer::unpack(packed,bit_len)?;
    tree.decode(bits.iter())
}

/// Decompress from the textual form of the unpacked bits, see `Encoded::bit_string`
pub fn decompress_bit_str(tree: &HuffTree,bit_str: &str) -> Result<Vec<u8>,Error> {
    let bits = bit_packer::parse_bit_str(bit_str)?;
    tree.decode(bits.iter())
}

// *************** TESTS *****************

#[cfg(test)]
use rand::{Rng,SeedableRng,rngs::SmallRng};

#[test]
fn compression_works() {
    let encoded = compress("aaabbc".as_bytes()).expect("compression failed");
    assert_eq!(encoded.bit_string(),"111010100");
    assert_eq!(encoded.bit_len(),9);
    assert_eq!(encoded.packed(),hex::decode("01D4").unwrap());
    let a = encoded.table().get(b'a').expect("no code").len();
    let b = encoded.table().get(b'b').expect("no code").len();
    let c = encoded.table().get(b'c').expect("no code").len();
    assert!(a < b && a < c);
}

#[test]
fn single_byte() {
    let encoded = compress("x".as_bytes()).expect("compression failed");
    assert_eq!(encoded.table().len(),2);
    assert!(encoded.table().iter().all(|(_,code)| code.len()==1));
    assert_eq!(encoded.packed(),vec![1u8]);
    let (tree,bit_len,packed) = encoded.into_parts();
    assert_eq!(decompress(&tree,bit_len,&packed),Ok("x".as_bytes().to_vec()));
}

#[test]
fn repeated_byte() {
    let test_data = "aaaaaaaaaa".as_bytes();
    let encoded = compress(test_data).expect("compression failed");
    assert_eq!(encoded.bit_len(),10);
    let (tree,bit_len,packed) = encoded.into_parts();
    assert_eq!(decompress(&tree,bit_len,&packed),Ok(test_data.to_vec()));
    let test_data = [0u8;20];
    let (tree,bit_len,packed) = compress(&test_data).expect("compression failed").into_parts();
    assert_eq!(decompress(&tree,bit_len,&packed),Ok(test_data.to_vec()));
}

#[test]
fn empty_input() {
    assert_eq!(compress(&[]).err(),Some(Error::EmptyInput));
}

#[test]
fn invertibility() {
    let test_data = "I am Sam. Sam I am. I do not like this Sam I am.\n".as_bytes();
    let (tree,bit_len,packed) = compress(test_data).expect("compression failed").into_parts();
    assert_eq!(decompress(&tree,bit_len,&packed),Ok(test_data.to_vec()));

    let test_data: Vec<u8> = (0..=255).collect();
    let (tree,bit_len,packed) = compress(&test_data).expect("compression failed").into_parts();
    assert_eq!(bit_len,256*8);
    assert_eq!(decompress(&tree,bit_len,&packed),Ok(test_data));
}

#[test]
fn invertibility_random() {
    let mut rng = SmallRng::seed_from_u64(0x5eed);
    for _trial in 0..50 {
        let len = rng.gen_range(1..2000);
        let alphabet = rng.gen_range(1..=256) as u32;
        let test_data: Vec<u8> = (0..len).map(|_| (rng.gen::<u32>() % alphabet) as u8).collect();
        let (tree,bit_len,packed) = compress(&test_data).expect("compression failed").into_parts();
        assert_eq!(decompress(&tree,bit_len,&packed),Ok(test_data));
    }
}

#[test]
fn determinism() {
    let test_data = "she sells sea shells by the sea shore".as_bytes();
    let first = compress(test_data).expect("compression failed");
    let second = compress(test_data).expect("compression failed");
    assert_eq!(first.tree(),second.tree());
    assert_eq!(first.table(),second.table());
    assert_eq!(first.packed(),second.packed());
}

#[test]
fn rarer_symbols_get_longer_codes() {
    let mut rng = SmallRng::seed_from_u64(1234);
    for _trial in 0..100 {
        let mut freq = FrequencyTable::new();
        for _i in 0..rng.gen_range(2..64) {
            freq.set(rng.gen(),rng.gen_range(1..1000));
        }
        let table = CodeTable::create(&HuffTree::build(&freq).expect("build failed"));
        for (s1,c1) in table.iter() {
            for (s2,c2) in table.iter() {
                if freq.get(s1) > 0 && freq.get(s1) < freq.get(s2) {
                    assert!(c1.len() >= c2.len());
                }
            }
        }
    }
}

#[test]
fn bit_string_path() {
    let encoded = compress("aaabbc".as_bytes()).expect("compression failed");
    assert_eq!(decompress_bit_str(encoded.tree(),&encoded.bit_string()),Ok("aaabbc".as_bytes().to_vec()));
    assert_eq!(decompress_bit_str(encoded.tree(),"11x"),Err(Error::InvalidBit('x')));
    assert_eq!(decompress_bit_str(encoded.tree(),"1110"),Err(Error::MalformedBitstream));
}

#[test]
fn malformed_packing() {
    let (tree,bit_len,packed) = compress("aaabbc".as_bytes()).expect("compression failed").into_parts();
    // bit length has to agree with the byte count
    assert_eq!(decompress(&tree,bit_len-1,&packed),Err(Error::MalformedBitstream));
    assert_eq!(decompress(&tree,bit_len,&packed[1..]),Err(Error::MalformedBitstream));
    // 1110 stops halfway down to `b` or `c`
    assert_eq!(decompress(&tree,4,&[0x0E]),Err(Error::MalformedBitstream));
    assert_eq!(decompress(&tree,5,&[0x1D]),Ok("aaab".as_bytes().to_vec()));
    // a set padding bit means the bytes were corrupted
    assert_eq!(decompress(&tree,bit_len,&[0x81,0xD4]),Err(Error::MalformedBitstream));
}
