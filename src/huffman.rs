//! Huffman coding of byte streams.
//!
//! The coded stream is self describing:
//!
//! ```text
//! u32  original size (little-endian)
//! u8   leaf count - 1
//! [u32 frequency, u8 symbol] * leaf count, by descending frequency
//! ...  code bits, LSB-first
//! ```
//!
//! The tree is never transmitted. The decoder rebuilds it from the leaf
//! table with the same greedy merge, so the merge order and its tie-break
//! must stay identical on both sides.

use crate::bit_io::{BitReader, BitWriter};
use crate::constants::{
    BYTE_SYMBOL_COUNT, HUFFMAN_HEADER_PREFIX_SIZE_IN_BYTES, HUFFMAN_LEAF_ENTRY_SIZE_IN_BYTES,
    HUFFMAN_MAX_NODE_COUNT,
};
use crate::error::BildError;

/// Represents a Huffman code with its bit value and length.
///
/// The least significant bit is the branch taken at the root.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HuffmanCode {
    pub value: u64,
    pub length: u32,
}

/// A node of the arena backed tree. Leaves carry a symbol, internal nodes
/// only a summed frequency.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HuffmanNode {
    pub symbol: u8,
    pub frequency: u64,
    /// 0 if the node was popped as the left child of its parent, 1 if right.
    pub branch: u8,
    pub parent: Option<usize>,
    pub left: Option<usize>,
    pub right: Option<usize>,
}

impl HuffmanNode {
    pub fn is_leaf(&self) -> bool {
        self.left.is_none()
    }
}

pub struct HuffmanTree {
    nodes: Vec<HuffmanNode>,
    leaf_count: usize,
    root: usize,
}

impl HuffmanTree {
    /// Builds the tree from `(symbol, frequency)` leaves sorted by descending
    /// frequency.
    ///
    /// The two nodes at the tail of the list are merged, the tail becoming
    /// the left child. The merged node is inserted right after the last node
    /// whose frequency is not lower than its own.
    pub fn build(leaves: &[(u8, u32)]) -> Result<Self, BildError> {
        if leaves.is_empty() || leaves.len() > BYTE_SYMBOL_COUNT {
            return Err(BildError::InvalidData);
        }

        let mut nodes: Vec<HuffmanNode> = Vec::with_capacity(HUFFMAN_MAX_NODE_COUNT);
        nodes.extend(leaves.iter().map(|&(symbol, frequency)| HuffmanNode {
            symbol,
            frequency: frequency as u64,
            ..HuffmanNode::default()
        }));

        let mut list: Vec<usize> = (0..leaves.len()).collect();
        while list.len() > 1 {
            let tail = list.len() - 1;
            let (left, right) = (list[tail], list[tail - 1]);
            list.truncate(tail - 1);

            let parent = nodes.len();
            let frequency = nodes[left].frequency + nodes[right].frequency;
            nodes[left].branch = 0;
            nodes[left].parent = Some(parent);
            nodes[right].branch = 1;
            nodes[right].parent = Some(parent);
            nodes.push(HuffmanNode {
                frequency,
                left: Some(left),
                right: Some(right),
                ..HuffmanNode::default()
            });

            let position = list
                .iter()
                .rposition(|&i| nodes[i].frequency >= frequency)
                .map_or(0, |i| i + 1);
            list.insert(position, parent);
        }

        Ok(Self {
            nodes,
            leaf_count: leaves.len(),
            root: list[0],
        })
    }

    pub fn root(&self) -> &HuffmanNode {
        &self.nodes[self.root]
    }

    pub fn leaf_count(&self) -> usize {
        self.leaf_count
    }

    /// Leaves in the order they were given to [`build`](Self::build).
    pub fn leaves(&self) -> &[HuffmanNode] {
        &self.nodes[..self.leaf_count]
    }

    /// Code of the leaf at `index`, accumulated from the leaf up to the root.
    pub fn code(&self, index: usize) -> Result<HuffmanCode, BildError> {
        let mut code = HuffmanCode::default();
        let mut node = index;
        while let Some(parent) = self.nodes[node].parent {
            if code.length == u64::BITS {
                return Err(BildError::InvalidData);
            }
            code.value = (code.value << 1) | self.nodes[node].branch as u64;
            code.length += 1;
            node = parent;
        }
        Ok(code)
    }

    /// Codes indexed by symbol; absent symbols have length 0.
    pub fn code_table(&self) -> Result<[HuffmanCode; BYTE_SYMBOL_COUNT], BildError> {
        let mut table = [HuffmanCode::default(); BYTE_SYMBOL_COUNT];
        for (index, leaf) in self.leaves().iter().enumerate() {
            table[leaf.symbol as usize] = self.code(index)?;
        }
        Ok(table)
    }

    /// Walks from the root to a leaf, one bit per branch, and returns its
    /// symbol. A single leaf tree consumes no bits.
    pub fn decode_symbol(&self, reader: &mut BitReader) -> Result<u8, BildError> {
        let mut node = &self.nodes[self.root];
        while let (Some(left), Some(right)) = (node.left, node.right) {
            node = if reader.read_bit()? == 1 {
                &self.nodes[right]
            } else {
                &self.nodes[left]
            };
        }
        Ok(node.symbol)
    }
}

/// Byte histogram as `(symbol, frequency)` pairs of the present symbols,
/// most frequent first, ties by ascending symbol.
pub fn frequency_table(data: &[u8]) -> Vec<(u8, u32)> {
    let mut frequencies = [0u32; BYTE_SYMBOL_COUNT];
    for &byte in data {
        frequencies[byte as usize] += 1;
    }

    let mut leaves: Vec<(u8, u32)> = (0..=u8::MAX)
        .zip(frequencies)
        .filter(|&(_, frequency)| frequency > 0)
        .collect();
    leaves.sort_by(|a, b| b.1.cmp(&a.1));
    leaves
}

pub fn encode(data: &[u8]) -> Result<Vec<u8>, BildError> {
    let size = u32::try_from(data.len()).map_err(|_| BildError::InvalidData)?;
    let leaves = frequency_table(data);

    let mut coded = Vec::with_capacity(
        HUFFMAN_HEADER_PREFIX_SIZE_IN_BYTES
            + leaves.len() * HUFFMAN_LEAF_ENTRY_SIZE_IN_BYTES
            + data.len(),
    );
    coded.extend_from_slice(&size.to_le_bytes());
    if leaves.is_empty() {
        coded.push(0);
        return Ok(coded);
    }

    coded.push((leaves.len() - 1) as u8);
    for &(symbol, frequency) in &leaves {
        coded.extend_from_slice(&frequency.to_le_bytes());
        coded.push(symbol);
    }

    let tree = HuffmanTree::build(&leaves)?;
    let table = tree.code_table()?;

    let total_bits: u64 = leaves
        .iter()
        .map(|&(symbol, frequency)| frequency as u64 * table[symbol as usize].length as u64)
        .sum();
    let mut writer = BitWriter::with_capacity(total_bits.div_ceil(8) as usize);
    for &byte in data {
        let code = table[byte as usize];
        writer.write_bits(code.value, code.length);
    }
    coded.extend(writer.finish());
    Ok(coded)
}

pub fn decode(coded: &[u8]) -> Result<Vec<u8>, BildError> {
    decode_with_limit(coded, usize::MAX)
}

/// Decodes `coded`, refusing streams that declare more than `max_size`
/// output bytes.
pub fn decode_with_limit(coded: &[u8], max_size: usize) -> Result<Vec<u8>, BildError> {
    let prefix = coded
        .get(..HUFFMAN_HEADER_PREFIX_SIZE_IN_BYTES)
        .ok_or(BildError::TruncatedData)?;
    let size = u32::from_le_bytes([prefix[0], prefix[1], prefix[2], prefix[3]]) as usize;
    if size == 0 {
        return Ok(Vec::new());
    }
    if size > max_size {
        return Err(BildError::InvalidData);
    }

    let leaf_count = prefix[4] as usize + 1;
    let table_end = HUFFMAN_HEADER_PREFIX_SIZE_IN_BYTES + leaf_count * HUFFMAN_LEAF_ENTRY_SIZE_IN_BYTES;
    let table = coded
        .get(HUFFMAN_HEADER_PREFIX_SIZE_IN_BYTES..table_end)
        .ok_or(BildError::TruncatedData)?;

    let mut seen = [false; BYTE_SYMBOL_COUNT];
    let mut total = 0u64;
    let mut leaves = Vec::with_capacity(leaf_count);
    for entry in table.chunks_exact(HUFFMAN_LEAF_ENTRY_SIZE_IN_BYTES) {
        let frequency = u32::from_le_bytes([entry[0], entry[1], entry[2], entry[3]]);
        let symbol = entry[4];
        if frequency == 0 || seen[symbol as usize] {
            return Err(BildError::InvalidData);
        }
        seen[symbol as usize] = true;
        total += frequency as u64;
        leaves.push((symbol, frequency));
    }
    if total != size as u64 {
        return Err(BildError::InvalidData);
    }

    let tree = HuffmanTree::build(&leaves)?;
    let mut reader = BitReader::new(&coded[table_end..]);
    let mut data = Vec::with_capacity(size);
    for _ in 0..size {
        data.push(tree.decode_symbol(&mut reader)?);
    }
    Ok(data)
}
