//! Structured B-tree dumps.
//!
//! [`BTree::dump`](super::BTree::dump) returns a [`TreeDump`]: a pre-order
//! list of [`DumpEntry`] records. Rendering and logging are left to the
//! caller; the `Display` impl gives the classic indented text form.

use std::fmt;

/// Kind of a dumped node.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Leaf = 1,
    Internal = 2,
}

/// One node in a pre-order dump.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DumpEntry {
    /// Distance from the root (root = 0).
    pub depth: usize,
    pub kind: NodeKind,
    pub keys: Vec<u64>,
}

/// Pre-order dump of a whole tree.
///
/// An empty dump means the tree was destroyed; a fresh tree dumps as a
/// single leaf with no keys.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TreeDump {
    entries: Vec<DumpEntry>,
}

impl TreeDump {
    pub(crate) fn new(entries: Vec<DumpEntry>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[DumpEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, DumpEntry> {
        self.entries.iter()
    }

    /// CRC32 over the dump's records.
    ///
    /// Two trees with the same shape and the same keys in the same nodes
    /// produce the same checksum; arena slot numbers do not participate.
    pub fn checksum(&self) -> u32 {
        let mut hasher = crc32fast::Hasher::new();

        for entry in &self.entries {
            hasher.update(&(entry.depth as u32).to_le_bytes());
            hasher.update(&[entry.kind as u8]);
            hasher.update(&(entry.keys.len() as u32).to_le_bytes());
            for key in &entry.keys {
                hasher.update(&key.to_le_bytes());
            }
        }

        hasher.finalize()
    }
}

impl<'a> IntoIterator for &'a TreeDump {
    type Item = &'a DumpEntry;
    type IntoIter = std::slice::Iter<'a, DumpEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl fmt::Display for DumpEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:indent$}", "", indent = self.depth * 4)?;
        match self.kind {
            NodeKind::Leaf => {
                write!(f, "Leaf Node:")?;
                for key in &self.keys {
                    write!(f, " {}", key)?;
                }
            }
            NodeKind::Internal => {
                write!(f, "Internal Node:")?;
                for key in &self.keys {
                    write!(f, " [{}]", key)?;
                }
            }
        }
        Ok(())
    }
}

impl fmt::Display for TreeDump {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.entries.is_empty() {
            return writeln!(f, "B-tree is empty.");
        }

        writeln!(f, "---- B-tree (pre-order) ----")?;
        for entry in &self.entries {
            writeln!(f, "{}", entry)?;
        }
        writeln!(f, "----------------------------")
    }
}
