//! Symbol frequency counting.
//! The alphabet is the 256 byte values, every byte of the input is one symbol.

pub const ALPHABET_SIZE: usize = 256;

/// Count of each byte value observed in the input, most entries are typically zero.
#[derive(Clone,Debug,PartialEq)]
pub struct FrequencyTable {
    counts: [u64;ALPHABET_SIZE]
}

impl FrequencyTable {
    /// all-zero table
    pub fn new() -> Self {
        Self {
            counts: [0;ALPHABET_SIZE]
        }
    }
    /// scan `dat` and count every byte
    pub fn count(dat: &[u8]) -> Self {
        let mut ans = Self::new();
        for b in dat {
            ans.counts[*b as usize] += 1;
        }
        log::debug!("counted {} bytes, {} distinct",dat.len(),ans.distinct());
        ans
    }
    pub fn get(&self,symbol: u8) -> u64 {
        self.counts[symbol as usize]
    }
    pub fn set(&mut self,symbol: u8,count: u64) {
        self.counts[symbol as usize] = count;
    }
    /// number of symbols with non-zero count
    pub fn distinct(&self) -> usize {
        self.counts.iter().filter(|c| **c > 0).count()
    }
    /// sum of all counts, i.e., length of the input that produced the table
    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }
    pub fn is_empty(&self) -> bool {
        self.distinct() == 0
    }
    /// iterate over `(symbol,count)` for non-zero counts in ascending symbol order
    pub fn nonzero(&self) -> impl Iterator<Item = (u8,u64)> + '_ {
        self.counts.iter().enumerate()
            .filter(|(_,c)| **c > 0)
            .map(|(s,c)| (s as u8,*c))
    }
}

impl Default for FrequencyTable {
    fn default() -> Self {
        Self::new()
    }
}

#[test]
fn counting() {
    let freq = FrequencyTable::count("aaabbc".as_bytes());
    assert_eq!(freq.get(b'a'),3);
    assert_eq!(freq.get(b'b'),2);
    assert_eq!(freq.get(b'c'),1);
    assert_eq!(freq.get(b'd'),0);
    assert_eq!(freq.distinct(),3);
    assert_eq!(freq.total(),6);
    assert_eq!(freq.nonzero().collect::<Vec<(u8,u64)>>(),vec![(b'a',3),(b'b',2),(b'c',1)]);
}

#[test]
fn empty_input() {
    let freq = FrequencyTable::count(&[]);
    assert!(freq.is_empty());
    assert_eq!(freq.total(),0);
    assert_eq!(freq,FrequencyTable::default());
}

#[test]
fn full_alphabet() {
    let dat: Vec<u8> = (0..=255).chain(0..=255).collect();
    let freq = FrequencyTable::count(&dat);
    assert_eq!(freq.distinct(),256);
    assert_eq!(freq.get(0),2);
    assert_eq!(freq.get(255),2);
}
