//! SHF Container
//!
//! Stores the output of the `huff` codec together with what is needed to reverse it.
//! The tree itself is not stored, only the frequency table, since the tree
//! builder is deterministic the expander arrives at the identical tree.
//!
//! Layout, integers are little endian:
//! * signature `SHF1`, only if `Options::header` is set
//! * 16 bit count of distinct symbols, 1 to 256
//! * for each symbol in ascending order, the symbol byte and its 32 bit frequency
//! * 64 bit length of the unpacked bit sequence
//! * the packed bytes

use std::io::{Cursor,Read,Write,Seek,SeekFrom,BufReader,BufWriter};
use crate::tools::frequency::FrequencyTable;
use crate::tools::static_huff::HuffTree;
use crate::tools::bit_packer;
use crate::huff;
use crate::{DYNERR,Error,Options};

pub const SIGNATURE: [u8;4] = *b"SHF1";

/// Serialize everything that precedes the packed bytes.
fn header_bytes(freq: &FrequencyTable,bit_len: usize,opt: &Options) -> Result<Vec<u8>,Error> {
    let mut ans = Vec::new();
    if opt.header {
        ans.extend_from_slice(&SIGNATURE);
    }
    ans.extend_from_slice(&u16::to_le_bytes(freq.distinct() as u16));
    for (symbol,count) in freq.nonzero() {
        let count = match u32::try_from(count) {
            Ok(c) => c,
            Err(_) => return Err(Error::FileTooLarge)
        };
        ans.push(symbol);
        ans.extend_from_slice(&u32::to_le_bytes(count));
    }
    ans.extend_from_slice(&u64::to_le_bytes(bit_len as u64));
    Ok(ans)
}

/// Read `N` header bytes, running out means this is not our format.
fn take<const N: usize>(curs: &mut Cursor<&[u8]>) -> Result<[u8;N],Error> {
    let mut ans = [0;N];
    match curs.read_exact(&mut ans) {
        Ok(()) => Ok(ans),
        Err(_) => {
            log::error!("header ends after {} bytes",curs.position());
            Err(Error::FileFormatMismatch)
        }
    }
}

/// Parse the header at the start of `buf`.
/// Returns the frequency table, the unpacked bit length, and the header length.
fn parse_header(buf: &[u8],opt: &Options) -> Result<(FrequencyTable,usize,usize),Error> {
    let mut curs = Cursor::new(buf);
    if opt.header && take::<4>(&mut curs)? != SIGNATURE {
        log::error!("signature not found");
        return Err(Error::FileFormatMismatch);
    }
    let n = u16::from_le_bytes(take::<2>(&mut curs)?) as usize;
    if n < 1 || n > 256 {
        log::error!("bad symbol count {}",n);
        return Err(Error::FileFormatMismatch);
    }
    let mut freq = FrequencyTable::new();
    let mut prev: Option<u8> = None;
    for _i in 0..n {
        let [symbol] = take::<1>(&mut curs)?;
        let count = u32::from_le_bytes(take::<4>(&mut curs)?);
        if count == 0 || prev.is_some_and(|p| p >= symbol) {
            log::error!("bad table entry for symbol {}",symbol);
            return Err(Error::FileFormatMismatch);
        }
        freq.set(symbol,count as u64);
        prev = Some(symbol);
    }
    let bit_len = match usize::try_from(u64::from_le_bytes(take::<8>(&mut curs)?)) {
        Ok(l) => l,
        Err(_) => return Err(Error::FileFormatMismatch)
    };
    let header_len = curs.position() as usize;
    if bit_packer::packed_len(bit_len) > buf.len() - header_len {
        log::error!("{} bits cannot follow in {} bytes",bit_len,buf.len() - header_len);
        return Err(Error::FileFormatMismatch);
    }
    log::debug!("header has {} symbols, {} bits",n,bit_len);
    Ok((freq,bit_len,header_len))
}

/// Main compression function.
/// `expanded_in` is an object with `Read` and `Seek` traits, usually `std::fs::File`, or `std::io::Cursor<&[u8]>`.
/// `compressed_out` is an object with `Write` and `Seek` traits, usually `std::fs::File`, or `std::io::Cursor<Vec<u8>>`.
/// Returns (in_size,out_size) or error.
pub fn compress<R,W>(expanded_in: &mut R, compressed_out: &mut W, opt: &Options) -> Result<(u64,u64),DYNERR>
where R: Read + Seek, W: Write + Seek {
    let mut reader = BufReader::new(expanded_in);
    let mut writer = BufWriter::new(compressed_out);
    let mut expanded_length = reader.seek(SeekFrom::End(0))?;
    if opt.in_offset > expanded_length {
        return Err(Box::new(Error::FileFormatMismatch));
    }
    expanded_length -= opt.in_offset;
    if expanded_length > opt.max_file_size {
        return Err(Box::new(Error::FileTooLarge));
    }
    reader.seek(SeekFrom::Start(opt.in_offset))?;
    writer.seek(SeekFrom::Start(opt.out_offset))?;
    let mut dat = Vec::new();
    reader.read_to_end(&mut dat)?;
    let encoded = huff::compress(&dat)?;
    log::debug!("write header");
    writer.write_all(&header_bytes(&encoded.tree().frequencies(),encoded.bit_len(),opt)?)?;
    writer.write_all(encoded.packed())?;
    writer.flush()?;
    Ok((expanded_length,writer.stream_position()? - opt.out_offset))
}

/// Main decompression function.
/// `compressed_in` is an object with `Read` and `Seek` traits, usually `std::fs::File`, or `std::io::Cursor<&[u8]>`.
/// `expanded_out` is an object with `Write` and `Seek` traits, usually `std::fs::File`, or `std::io::Cursor<Vec<u8>>`.
/// Returns (in_size,out_size) or error.
pub fn expand<R,W>(compressed_in: &mut R, expanded_out: &mut W, opt: &Options) -> Result<(u64,u64),DYNERR>
where R: Read + Seek, W: Write + Seek {
    let mut reader = BufReader::new(compressed_in);
    let mut writer = BufWriter::new(expanded_out);
    let mut compressed_size = reader.seek(SeekFrom::End(0))?;
    if opt.in_offset > compressed_size {
        return Err(Box::new(Error::FileFormatMismatch));
    }
    compressed_size -= opt.in_offset;
    if compressed_size > opt.max_file_size {
        return Err(Box::new(Error::FileTooLarge));
    }
    reader.seek(SeekFrom::Start(opt.in_offset))?;
    writer.seek(SeekFrom::Start(opt.out_offset))?;
    let mut buf = Vec::new();
    reader.read_to_end(&mut buf)?;
    let (freq,bit_len,header_len) = parse_header(&buf,opt)?;
    let packed = &buf[header_len..];
    if packed.len() != bit_packer::packed_len(bit_len) {
        log::error!("expected {} packed bytes, found {}",bit_packer::packed_len(bit_len),packed.len());
        return Err(Box::new(Error::MalformedBitstream));
    }
    let tree = HuffTree::build(&freq)?;
    let dat = huff::decompress(&tree,bit_len,packed)?;
    if dat.len() as u64 != freq.total() {
        log::error!("decoded {} symbols, table calls for {}",dat.len(),freq.total());
        return Err(Box::new(Error::MalformedBitstream));
    }
    writer.write_all(&dat)?;
    writer.flush()?;
    Ok((compressed_size,writer.stream_position()? - opt.out_offset))
}

/// Convenience function, calls `compress` with a slice returning a Vec
pub fn compress_slice(slice: &[u8],opt: &Options) -> Result<Vec<u8>,DYNERR> {
    let mut src = Cursor::new(slice);
    let mut ans: Cursor<Vec<u8>> = Cursor::new(Vec::new());
    compress(&mut src,&mut ans,opt)?;
    Ok(ans.into_inner())
}

/// Convenience function, calls `expand` with a slice returning a Vec
pub fn expand_slice(slice: &[u8],opt: &Options) -> Result<Vec<u8>,DYNERR> {
    let mut src = Cursor::new(slice);
    let mut ans: Cursor<Vec<u8>> = Cursor::new(Vec::new());
    expand(&mut src,&mut ans,opt)?;
    Ok(ans.into_inner())
}

// *************** TESTS *****************

#[cfg(test)]
use crate::{STD_OPTIONS,STDRESULT};

#[cfg(test)]
fn codec_error(result: Result<Vec<u8>,DYNERR>) -> Option<Error> {
    match result {
        Ok(_) => None,
        Err(e) => e.downcast_ref::<Error>().cloned()
    }
}

#[test]
fn compression_works() -> STDRESULT {
    let test_data = "aaabbc".as_bytes();
    let shf_str = "53484631 0300 6103000000 6202000000 6301000000 0900000000000000 01D4";
    let compressed = compress_slice(test_data,&STD_OPTIONS)?;
    assert_eq!(compressed,hex::decode(shf_str.replace(" ",""))?);

    let mut opt = STD_OPTIONS;
    opt.header = false;
    let shf_str = "0100 7801000000 0100000000000000 01";
    let compressed = compress_slice("x".as_bytes(),&opt)?;
    assert_eq!(compressed,hex::decode(shf_str.replace(" ",""))?);
    Ok(())
}

#[test]
fn invertibility() -> STDRESULT {
    let test_data = "I am Sam. Sam I am. I do not like this Sam I am.\n".as_bytes();
    let compressed = compress_slice(test_data,&STD_OPTIONS)?;
    let expanded = expand_slice(&compressed,&STD_OPTIONS)?;
    assert_eq!(test_data.to_vec(),expanded);

    let test_data = "zzzzzzzzzzzzzzzz".as_bytes();
    let compressed = compress_slice(test_data,&STD_OPTIONS)?;
    let expanded = expand_slice(&compressed,&STD_OPTIONS)?;
    assert_eq!(test_data.to_vec(),expanded);
    Ok(())
}

#[test]
fn invertibility_with_offsets() -> STDRESULT {
    let mut copt = STD_OPTIONS;
    copt.in_offset = 3;
    copt.out_offset = 5;
    let test_data = "HDRthe rain in spain stays mainly in the plain".as_bytes();
    let compressed = compress_slice(test_data,&copt)?;
    assert_eq!(compressed[0..5].to_vec(),vec![0u8;5]);
    assert_eq!(compressed[5..9].to_vec(),SIGNATURE.to_vec());
    let mut xopt = STD_OPTIONS;
    xopt.in_offset = 5;
    let expanded = expand_slice(&compressed,&xopt)?;
    assert_eq!(test_data[3..].to_vec(),expanded);
    Ok(())
}

#[test]
fn empty_input() {
    assert_eq!(codec_error(compress_slice(&[],&STD_OPTIONS)),Some(Error::EmptyInput));
    assert_eq!(codec_error(expand_slice(&[],&STD_OPTIONS)),Some(Error::FileFormatMismatch));
}

#[test]
fn bad_container() -> STDRESULT {
    let compressed = compress_slice("aaabbc".as_bytes(),&STD_OPTIONS)?;
    let mut bad_sig = compressed.clone();
    bad_sig[0] = b'X';
    assert_eq!(codec_error(expand_slice(&bad_sig,&STD_OPTIONS)),Some(Error::FileFormatMismatch));
    // symbols out of order
    let mut bad_table = compressed.clone();
    bad_table.swap(6,11);
    assert_eq!(codec_error(expand_slice(&bad_table,&STD_OPTIONS)),Some(Error::FileFormatMismatch));
    let truncated = compressed[0..compressed.len()-1].to_vec();
    assert_eq!(codec_error(expand_slice(&truncated,&STD_OPTIONS)),Some(Error::FileFormatMismatch));
    let mut padded = compressed.clone();
    padded.push(0);
    assert_eq!(codec_error(expand_slice(&padded,&STD_OPTIONS)),Some(Error::MalformedBitstream));
    Ok(())
}

#[test]
fn count_mismatch() -> STDRESULT {
    // claim 4 a's instead of 3, the bits decode to only 6 symbols
    let mut compressed = compress_slice("aaabbc".as_bytes(),&STD_OPTIONS)?;
    compressed[7] = 4;
    assert_eq!(codec_error(expand_slice(&compressed,&STD_OPTIONS)),Some(Error::MalformedBitstream));
    Ok(())
}

#[test]
fn too_large() {
    let mut opt = STD_OPTIONS;
    opt.max_file_size = 4;
    assert_eq!(codec_error(compress_slice("abcde".as_bytes(),&opt)),Some(Error::FileTooLarge));
}

#[test]
fn bit_length_beyond_data() -> STDRESULT {
    let shf_str = "53484631 0100 6101000000 FFFFFFFFFFFFFFFF";
    let compressed = hex::decode(shf_str.replace(" ",""))?;
    assert_eq!(codec_error(expand_slice(&compressed,&STD_OPTIONS)),Some(Error::FileFormatMismatch));
    let shf_str = "53484631 0100 6101000000 1100000000000000 FFFF";
    let compressed = hex::decode(shf_str.replace(" ",""))?;
    assert_eq!(codec_error(expand_slice(&compressed,&STD_OPTIONS)),Some(Error::FileFormatMismatch));
    Ok(())
}
