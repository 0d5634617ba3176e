//! Prefix tree for greedy longest-match lookup of dictionary entries.

use crate::datafile::DictEntry;
use crate::error::{Error, Result};

/// Code emitted for a literal background pixel.
pub(crate) const CODE_ZERO: u8 = 0;
/// Code emitted for a literal foreground pixel.
pub(crate) const CODE_ONE: u8 = 1;
/// Code that pads the rest of a glyph with background pixels.
pub(crate) const CODE_FILL: u8 = 2;
/// First code assigned to dictionary entries; 3 is reserved.
pub(crate) const CODE_DICT_START: u8 = 4;

#[derive(Clone, Copy)]
struct Terminal {
    code: u8,
    ref_encode: bool,
}

/// One trie node. Children are arena indices; the root is node 0 and can
/// never be a child, so plain `Option<u32>` works.
#[derive(Default)]
struct Node {
    zero: Option<u32>,
    one: Option<u32>,
    terminal: Option<Terminal>,
}

/// A binary trie over the replacements of a sorted dictionary.
///
/// The tree is rebuilt for every encode pass and discarded with it. Nodes
/// live in a flat arena rather than in owning boxes, which keeps building
/// and dropping cheap even for long replacements.
///
/// Entry at sorted position `i` gets code `i + 4`; a duplicate replacement
/// keeps the code of its first occurrence. Two synthetic terminals for the
/// literal pixel codes 0 and 1 sit at depth one, so every walk can always
/// fall back on a single-bit match.
pub(crate) struct DictTree {
    nodes: Vec<Node>,
}

impl DictTree {
    pub fn build(sorted_dictionary: &[DictEntry]) -> DictTree {
        let mut tree = DictTree {
            nodes: vec![Node::default()],
        };

        let zero = tree.child_or_insert(0, false);
        tree.nodes[zero as usize].terminal = Some(Terminal {
            code: CODE_ZERO,
            ref_encode: false,
        });
        let one = tree.child_or_insert(0, true);
        tree.nodes[one as usize].terminal = Some(Terminal {
            code: CODE_ONE,
            ref_encode: false,
        });

        for (position, entry) in sorted_dictionary.iter().enumerate() {
            if entry.replacement.is_empty() {
                continue;
            }
            let mut node = 0;
            for &bit in entry.replacement.iter() {
                node = tree.child_or_insert(node, bit);
            }
            let terminal = &mut tree.nodes[node as usize].terminal;
            if terminal.is_none() {
                *terminal = Some(Terminal {
                    code: CODE_DICT_START + position as u8,
                    ref_encode: entry.ref_encode,
                });
            }
        }

        tree
    }

    fn child(&self, node: u32, bit: bool) -> Option<u32> {
        let node = &self.nodes[node as usize];
        if bit {
            node.one
        } else {
            node.zero
        }
    }

    fn child_or_insert(&mut self, node: u32, bit: bool) -> u32 {
        if let Some(child) = self.child(node, bit) {
            return child;
        }
        let child = self.nodes.len() as u32;
        self.nodes.push(Node::default());
        let node = &mut self.nodes[node as usize];
        if bit {
            node.one = Some(child);
        } else {
            node.zero = Some(child);
        }
        child
    }

    /// Finds the longest prefix of `bits` that carries an eligible code.
    ///
    /// When `is_glyph` is false the caller is encoding a dictionary entry,
    /// and ref-encoded terminals are skipped so that a ref entry can never
    /// reference another ref entry. Returns the matched bit count and code.
    pub fn longest_match(&self, bits: &[bool], is_glyph: bool) -> Result<(usize, u8)> {
        let mut best: Option<(usize, u8)> = None;
        let mut node = 0;

        for (length, &bit) in bits.iter().enumerate() {
            match self.child(node, bit) {
                Some(child) => node = child,
                None => break,
            }
            if let Some(terminal) = self.nodes[node as usize].terminal {
                if is_glyph || !terminal.ref_encode {
                    best = Some((length + 1, terminal.code));
                }
            }
        }

        best.ok_or(Error::Unencodable)
    }
}
