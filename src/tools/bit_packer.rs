//! Packing of the coded bit sequence into bytes.
//!
//! The `bit_vec` crate packs MSB first and pads on the right.  We want the padding
//! on the left, so that the last packed bit is the last coded bit, hence the
//! zero bits are inserted ahead of the sequence before converting.
//! The unpadded length has to travel with the bytes, padding zeros cannot
//! be told apart from coded zeros.

use bit_vec::BitVec;
use crate::Error;

/// number of padding bits needed to bring `bit_len` to a byte boundary
pub fn padding(bit_len: usize) -> usize {
    (8 - bit_len % 8) % 8
}

/// number of bytes needed to hold `bit_len` bits
pub fn packed_len(bit_len: usize) -> usize {
    bit_len / 8 + usize::from(bit_len % 8 != 0)
}

/// Pad on the left with zeros and convert each 8 bits to a byte, MSB first.
pub fn pack(bits: &BitVec) -> Vec<u8> {
    let mut padded = BitVec::from_elem(padding(bits.len()),false);
    padded.extend(bits.iter());
    log::debug!("packing {} bits with {} padding bits",bits.len(),padded.len()-bits.len());
    padded.to_bytes()
}

/// Unpack each byte MSB first and drop the leading padding, leaving `bit_len` bits.
/// The byte count must be exactly what `pack` would have produced, and the padding must be zero.
pub fn unpack(packed: &[u8],bit_len: usize) -> Result<BitVec,Error> {
    if packed.len() != packed_len(bit_len) {
        log::error!("{} bits cannot be held by {} bytes",bit_len,packed.len());
        return Err(Error::MalformedBitstream);
    }
    let all = BitVec::from_bytes(packed);
    let pad = padding(bit_len);
    if all.iter().take(pad).any(|b| b) {
        log::error!("padding bits are not zero");
        return Err(Error::MalformedBitstream);
    }
    Ok(all.iter().skip(pad).collect())
}

/// Parse a textual bit-string such as `"0110"`.
pub fn parse_bit_str(s: &str) -> Result<BitVec,Error> {
    let mut ans = BitVec::new();
    for c in s.chars() {
        match c {
            '0' => ans.push(false),
            '1' => ans.push(true),
            _ => {
                log::error!("invalid bit in message: {}",c);
                return Err(Error::InvalidBit(c));
            }
        }
    }
    Ok(ans)
}

/// Render bits as text, one `0` or `1` per bit.
pub fn to_bit_str(bits: &BitVec) -> String {
    bits.iter().map(|b| match b {
        true => '1',
        false => '0'
    }).collect()
}

#[test]
fn left_padding() {
    let bits = parse_bit_str("111010100").expect("bad bits");
    assert_eq!(pack(&bits),hex::decode("01D4").unwrap());
    let bits = parse_bit_str("1").expect("bad bits");
    assert_eq!(pack(&bits),vec![1u8]);
}

#[test]
fn byte_boundary() {
    let bits = parse_bit_str("1011001100001111").expect("bad bits");
    assert_eq!(padding(bits.len()),0);
    let packed = pack(&bits);
    assert_eq!(packed,hex::decode("B30F").unwrap());
    assert_eq!(unpack(&packed,16),Ok(bits));
}

#[test]
fn unpacking() {
    let bits = parse_bit_str("0000111010100").expect("bad bits");
    let packed = pack(&bits);
    assert_eq!(packed.len(),2);
    let unpacked = unpack(&packed,13).expect("unpack failed");
    // leading coded zeros survive, only the padding is dropped
    assert_eq!(to_bit_str(&unpacked),"0000111010100");
    assert_eq!(unpack(&[],0),Ok(BitVec::new()));
}

#[test]
fn length_mismatch() {
    assert_eq!(unpack(&[0x01,0xD4],17),Err(Error::MalformedBitstream));
    assert_eq!(unpack(&[0x01,0xD4],8),Err(Error::MalformedBitstream));
    assert_eq!(unpack(&[0x01],0),Err(Error::MalformedBitstream));
}

#[test]
fn invalid_bits() {
    assert_eq!(parse_bit_str("0120"),Err(Error::InvalidBit('2')));
    assert_eq!(parse_bit_str("01 0"),Err(Error::InvalidBit(' ')));
    assert_eq!(parse_bit_str(""),Ok(BitVec::new()));
}

#[test]
fn nonzero_padding() {
    assert_eq!(unpack(&[0x81,0xD4],9),Err(Error::MalformedBitstream));
    assert_eq!(unpack(&[0x02],1),Err(Error::MalformedBitstream));
    assert_eq!(unpack(&[0x01],1),Ok(parse_bit_str("1").expect("bad bits")));
}

#[test]
fn huge_length() {
    assert_eq!(packed_len(usize::MAX),usize::MAX/8 + 1);
    assert_eq!(packed_len(16),2);
    assert_eq!(packed_len(17),3);
    assert_eq!(unpack(&[],usize::MAX),Err(Error::MalformedBitstream));
}
