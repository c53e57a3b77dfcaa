// Copyright (C) 2025, Ava Labs, Inc. All rights reserved.
// See the file LICENSE.md for licensing terms.

use std::fmt::{self, Debug, Display, Formatter};

use crate::bits::{KEY_BITS, to_binary};
use crate::node::{Node, Slot};
use crate::{CritBit64, Snapshot};

/// Renders one node per line as `n: <first undecided bit>/<crit bit>` followed
/// by the binary prefix, and one leaf per line as its binary key and value.
/// Nesting is shown by a leading `-` per level.
impl<V: Debug> Display for Snapshot<V> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match &self.root {
            None => f.write_str("- -"),
            Some(Slot::Leaf { key, value }) => {
                writeln!(f, "-{} v={value:?}", to_binary(*key, KEY_BITS))
            }
            Some(Slot::Branch { prefix, node }) => write_node(f, node, "", 0, *prefix),
        }
    }
}

impl<V: Debug> Display for CritBit64<V> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Display::fmt(&self.current, f)
    }
}

fn write_node<V: Debug>(
    f: &mut Formatter<'_>,
    node: &Node<V>,
    level: &str,
    depth: u8,
    prefix: u64,
) -> fmt::Result {
    if depth == node.crit_bit {
        writeln!(f, "{level}n: {depth}/{} i=0", node.crit_bit)?;
    } else {
        writeln!(
            f,
            "{level}n: {depth}/{} {}",
            node.crit_bit,
            to_binary(prefix, KEY_BITS)
        )?;
    }

    let nested = format!("{level}-");
    for slot in [&node.lo, &node.hi] {
        match slot {
            Slot::Leaf { key, value } => {
                writeln!(f, "{level} {} v={value:?}", to_binary(*key, KEY_BITS))?;
            }
            Slot::Branch { prefix, node: child } => {
                write_node(f, child, &nested, node.crit_bit + 1, *prefix)?;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    #![expect(clippy::indexing_slicing)]

    use super::*;

    #[test]
    fn empty_and_single() {
        let mut trie = CritBit64::new();
        assert_eq!(trie.to_string(), "- -");
        trie.put(1, 'a');
        assert_eq!(
            trie.to_string(),
            format!("-{} v='a'\n", to_binary(1, KEY_BITS))
        );
    }

    #[test]
    fn nested_dump() {
        let trie: CritBit64<u8> = [(1, 1), (2, 2), (3, 3)].into_iter().collect();
        let dump = trie.snapshot().to_string();
        let lines: Vec<&str> = dump.lines().collect();
        assert_eq!(lines.len(), 5);
        assert!(lines[0].starts_with("n: 0/62 "));
        assert!(lines[1].starts_with(' ') && lines[1].ends_with(" v=1"));
        assert_eq!(lines[2], "-n: 63/63 i=0");
        assert!(lines[3].starts_with("- ") && lines[3].ends_with(" v=2"));
        assert!(lines[4].starts_with("- ") && lines[4].ends_with(" v=3"));
        assert_eq!(dump, trie.to_string());
    }
}
