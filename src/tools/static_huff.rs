//! Module to build the static Huffman tree and its code table.
//! This is used by the `huff` module.
//!
//! The tree is built once from a complete frequency table and never updated.
//! Construction is deterministic, the same table always produces the same tree,
//! which is what allows the container to carry only the frequencies.

use bit_vec::BitVec;
use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::cmp::Reverse;
use super::frequency::{FrequencyTable,ALPHABET_SIZE};
use crate::Error;

/// Node of the Huffman tree, internal nodes own their two children.
#[derive(Clone,Debug,PartialEq)]
pub enum Node {
    Leaf {
        symbol: u8,
        freq: u64
    },
    Internal {
        freq: u64,
        left: Box<Node>,
        right: Box<Node>
    }
}

impl Node {
    pub fn freq(&self) -> u64 {
        match self {
            Node::Leaf { freq, .. } => *freq,
            Node::Internal { freq, .. } => *freq
        }
    }
    pub fn is_leaf(&self) -> bool {
        matches!(self,Node::Leaf { .. })
    }
    /// symbol used for ordering, internal nodes use the sentinel 0
    fn sort_symbol(&self) -> u8 {
        match self {
            Node::Leaf { symbol, .. } => *symbol,
            Node::Internal { .. } => 0
        }
    }
}

/// Entry in the build queue, ordered by (frequency, symbol, creation order).
/// Creation order resolves ties between an internal node and a leaf with symbol 0,
/// or between two internal nodes, leaves are always created first.
struct Pending {
    key: (u64,u8,usize),
    node: Node
}

impl Pending {
    fn new(node: Node,seq: usize) -> Self {
        Self {
            key: (node.freq(),node.sort_symbol(),seq),
            node
        }
    }
}

impl PartialEq for Pending {
    fn eq(&self,other: &Self) -> bool {
        self.key == other.key
    }
}

impl Eq for Pending {}

impl PartialOrd for Pending {
    fn partial_cmp(&self,other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Pending {
    fn cmp(&self,other: &Self) -> Ordering {
        self.key.cmp(&other.key)
    }
}

/// Static Huffman tree.
#[derive(Clone,Debug,PartialEq)]
pub struct HuffTree {
    root: Node,
    /// symbol of the leaf injected when the input has only one distinct symbol
    placeholder: Option<u8>
}

impl HuffTree {
    /// Build the tree from a frequency table.
    /// Fails with `EmptyInput` if no symbol has a non-zero count,
    /// or `FileTooLarge` if the combined weight overflows.
    pub fn build(freq: &FrequencyTable) -> Result<Self,Error> {
        let mut queue: BinaryHeap<Reverse<Pending>> = BinaryHeap::new();
        let mut seq: usize = 0;
        for (symbol,count) in freq.nonzero() {
            queue.push(Reverse(Pending::new(Node::Leaf { symbol, freq: count },seq)));
            seq += 1;
        }
        let mut placeholder = None;
        match queue.len() {
            0 => {
                log::error!("cannot build a tree without symbols");
                return Err(Error::EmptyInput);
            },
            1 => {
                // A lone leaf would be coded with zero bits, so give it a sibling.
                // The sibling takes symbol 0, or 1 if the lone symbol is 0.
                let symbol = match freq.get(0) > 0 {
                    true => 1,
                    false => 0
                };
                log::debug!("single symbol, inject placeholder {}",symbol);
                queue.push(Reverse(Pending::new(Node::Leaf { symbol, freq: 1 },seq)));
                seq += 1;
                placeholder = Some(symbol);
            },
            _ => {}
        }
        // pop two, first popped goes left, push the parent, until one node is left
        while let Some(Reverse(left)) = queue.pop() {
            let right = match queue.pop() {
                Some(Reverse(right)) => right,
                None => {
                    log::debug!("built tree with {} nodes, root weight {}",seq,left.node.freq());
                    return Ok(Self { root: left.node, placeholder });
                }
            };
            let weight = match left.node.freq().checked_add(right.node.freq()) {
                Some(f) => f,
                None => {
                    log::error!("combined weight overflows");
                    return Err(Error::FileTooLarge);
                }
            };
            let parent = Node::Internal {
                freq: weight,
                left: Box::new(left.node),
                right: Box::new(right.node)
            };
            queue.push(Reverse(Pending::new(parent,seq)));
            seq += 1;
        }
        Err(Error::EmptyInput)
    }
    pub fn root(&self) -> &Node {
        &self.root
    }
    pub fn placeholder(&self) -> Option<u8> {
        self.placeholder
    }
    /// Recover the frequency table that built this tree, the placeholder leaf is left out.
    pub fn frequencies(&self) -> FrequencyTable {
        fn collect(node: &Node,placeholder: Option<u8>,ans: &mut FrequencyTable) {
            match node {
                Node::Leaf { symbol, freq } => {
                    if Some(*symbol) != placeholder {
                        ans.set(*symbol,*freq);
                    }
                },
                Node::Internal { left, right, .. } => {
                    collect(left,placeholder,ans);
                    collect(right,placeholder,ans);
                }
            }
        }
        let mut ans = FrequencyTable::new();
        collect(&self.root,self.placeholder,&mut ans);
        ans
    }
    /// depth of the leaf holding `symbol`, which is also its code length
    pub fn depth_of(&self,symbol: u8) -> Option<usize> {
        fn search(node: &Node,target: u8,depth: usize) -> Option<usize> {
            match node {
                Node::Leaf { symbol, .. } if *symbol == target => Some(depth),
                Node::Leaf { .. } => None,
                Node::Internal { left, right, .. } => {
                    search(left,target,depth+1).or_else(|| search(right,target,depth+1))
                }
            }
        }
        search(&self.root,symbol,0)
    }
    /// Walk the tree once per output symbol, 0 goes left and 1 goes right.
    /// Running out of bits before reaching a leaf is an error.
    pub fn decode<I>(&self,bits: I) -> Result<Vec<u8>,Error>
    where I: IntoIterator<Item = bool> {
        let mut ans = Vec::new();
        let mut bits = bits.into_iter().peekable();
        while bits.peek().is_some() {
            let mut curs = &self.root;
            loop {
                match curs {
                    Node::Leaf { symbol, .. } => {
                        ans.push(*symbol);
                        break;
                    },
                    Node::Internal { left, right, .. } => {
                        curs = match bits.next() {
                            Some(false) => &**left,
                            Some(true) => &**right,
                            None => {
                                log::error!("bits ran out after {} symbols",ans.len());
                                return Err(Error::MalformedBitstream);
                            }
                        };
                    }
                }
            }
        }
        Ok(ans)
    }
}

/// Map from symbol to its bit-string, path labels from the root.
#[derive(Clone,Debug,PartialEq)]
pub struct CodeTable {
    codes: Vec<Option<BitVec>>
}

impl CodeTable {
    /// Depth first walk, append 0 going left and 1 going right.
    pub fn create(tree: &HuffTree) -> Self {
        fn walk(node: &Node,path: &mut BitVec,codes: &mut Vec<Option<BitVec>>) {
            match node {
                Node::Leaf { symbol, .. } => {
                    log::trace!("code for {}: {:?}",symbol,path);
                    codes[*symbol as usize] = Some(path.clone());
                },
                Node::Internal { left, right, .. } => {
                    path.push(false);
                    walk(left,path,codes);
                    path.pop();
                    path.push(true);
                    walk(right,path,codes);
                    path.pop();
                }
            }
        }
        let mut codes = vec![None;ALPHABET_SIZE];
        walk(tree.root(),&mut BitVec::new(),&mut codes);
        Self { codes }
    }
    pub fn get(&self,symbol: u8) -> Option<&BitVec> {
        self.codes[symbol as usize].as_ref()
    }
    /// number of symbols with a code, includes a placeholder
    pub fn len(&self) -> usize {
        self.codes.iter().filter(|c| c.is_some()).count()
    }
    /// iterate over `(symbol,code)` in ascending symbol order
    pub fn iter(&self) -> impl Iterator<Item = (u8,&BitVec)> + '_ {
        self.codes.iter().enumerate()
            .filter_map(|(s,c)| c.as_ref().map(|code| (s as u8,code)))
    }
    /// Append the code of every byte in `dat` to `obuf`.
    /// Fails if a byte has no code in this table.
    pub fn encode(&self,dat: &[u8],obuf: &mut BitVec) -> Result<(),Error> {
        for b in dat {
            match self.get(*b) {
                Some(code) => obuf.extend(code.iter()),
                None => {
                    log::error!("no code for symbol {}",b);
                    return Err(Error::UnknownSymbol(*b));
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
fn bits(s: &str) -> BitVec {
    s.chars().map(|c| c=='1').collect()
}

#[test]
fn tie_break_shape() {
    // c+b combine first, the result ties with `a` at weight 3 and wins on the sentinel symbol
    let tree = HuffTree::build(&FrequencyTable::count("aaabbc".as_bytes())).expect("build failed");
    let table = CodeTable::create(&tree);
    assert_eq!(table.get(b'c'),Some(&bits("00")));
    assert_eq!(table.get(b'b'),Some(&bits("01")));
    assert_eq!(table.get(b'a'),Some(&bits("1")));
    assert_eq!(table.len(),3);
    assert_eq!(tree.root().freq(),6);
    assert_eq!(tree.placeholder(),None);
}

#[test]
fn single_symbol() {
    let tree = HuffTree::build(&FrequencyTable::count("x".as_bytes())).expect("build failed");
    let table = CodeTable::create(&tree);
    assert_eq!(tree.placeholder(),Some(0));
    assert_eq!(table.get(0),Some(&bits("0")));
    assert_eq!(table.get(b'x'),Some(&bits("1")));
    assert_eq!(table.len(),2);
}

#[test]
fn single_zero_symbol() {
    let tree = HuffTree::build(&FrequencyTable::count(&[0,0,0])).expect("build failed");
    let table = CodeTable::create(&tree);
    assert_eq!(tree.placeholder(),Some(1));
    assert_eq!(table.get(1),Some(&bits("0")));
    assert_eq!(table.get(0),Some(&bits("1")));
}

#[test]
fn empty_table() {
    assert_eq!(HuffTree::build(&FrequencyTable::new()),Err(Error::EmptyInput));
}

#[test]
fn strict_binary() {
    fn check(node: &Node) -> usize {
        match node {
            Node::Leaf { .. } => 1,
            Node::Internal { freq, left, right } => {
                assert_eq!(*freq,left.freq() + right.freq());
                check(left) + check(right)
            }
        }
    }
    let freq = FrequencyTable::count("I am Sam. Sam I am. I do not like this Sam I am.\n".as_bytes());
    let tree = HuffTree::build(&freq).expect("build failed");
    assert!(!tree.root().is_leaf());
    assert_eq!(check(tree.root()),freq.distinct());
}

#[test]
fn frequencies_recovered() {
    let freq = FrequencyTable::count("abracadabra".as_bytes());
    let tree = HuffTree::build(&freq).expect("build failed");
    assert_eq!(tree.frequencies(),freq);
    let freq = FrequencyTable::count("zzzz".as_bytes());
    let tree = HuffTree::build(&freq).expect("build failed");
    assert_eq!(tree.frequencies(),freq);
}

#[test]
fn prefix_free() {
    let freq = FrequencyTable::count("the quick brown fox jumps over the lazy dog".as_bytes());
    let table = CodeTable::create(&HuffTree::build(&freq).expect("build failed"));
    let codes: Vec<&BitVec> = table.iter().map(|(_,c)| c).collect();
    for (i,a) in codes.iter().enumerate() {
        assert!(a.len() > 0);
        for (j,b) in codes.iter().enumerate() {
            if i != j && a.len() <= b.len() {
                assert!((0..a.len()).any(|k| a.get(k) != b.get(k)),"{:?} is a prefix of {:?}",a,b);
            }
        }
    }
}

#[test]
fn depth_matches_code() {
    let freq = FrequencyTable::count("mississippi".as_bytes());
    let tree = HuffTree::build(&freq).expect("build failed");
    let table = CodeTable::create(&tree);
    for (symbol,code) in table.iter() {
        assert_eq!(tree.depth_of(symbol),Some(code.len()));
    }
    assert_eq!(tree.depth_of(b'q'),None);
}

#[test]
fn truncated_walk() {
    let tree = HuffTree::build(&FrequencyTable::count("aaabbc".as_bytes())).expect("build failed");
    assert_eq!(tree.decode(bits("1110101")),Err(Error::MalformedBitstream));
    assert_eq!(tree.decode(bits("11101010")),Err(Error::MalformedBitstream));
    assert_eq!(tree.decode(bits("111010100")),Ok("aaabbc".as_bytes().to_vec()));
    assert_eq!(tree.decode(BitVec::new()),Ok(Vec::new()));
}

#[test]
fn leaf_zero_before_internal() {
    // 1 and 2 combine to weight 2, which ties with the leaf for symbol 0
    let tree = HuffTree::build(&FrequencyTable::count(&[0,0,1,2])).expect("build failed");
    let table = CodeTable::create(&tree);
    assert_eq!(table.get(0),Some(&bits("0")));
    assert_eq!(table.get(1),Some(&bits("10")));
    assert_eq!(table.get(2),Some(&bits("11")));
}

#[test]
fn internal_nodes_in_creation_order() {
    // a+b is created before c+d, both weigh 2 and both beat `e`
    let tree = HuffTree::build(&FrequencyTable::count("abcdee".as_bytes())).expect("build failed");
    let table = CodeTable::create(&tree);
    assert_eq!(table.get(b'e'),Some(&bits("0")));
    assert_eq!(table.get(b'a'),Some(&bits("100")));
    assert_eq!(table.get(b'b'),Some(&bits("101")));
    assert_eq!(table.get(b'c'),Some(&bits("110")));
    assert_eq!(table.get(b'd'),Some(&bits("111")));
}

#[test]
fn uncoded_symbol() {
    let table = CodeTable::create(&HuffTree::build(&FrequencyTable::count("ab".as_bytes())).expect("build failed"));
    let mut obuf = BitVec::new();
    assert_eq!(table.encode("abc".as_bytes(),&mut obuf),Err(Error::UnknownSymbol(b'c')));
}

#[test]
fn weight_overflow() {
    let mut freq = FrequencyTable::new();
    freq.set(1,u64::MAX);
    freq.set(2,1);
    assert_eq!(HuffTree::build(&freq),Err(Error::FileTooLarge));
}
