//! Lock-protected handle for sharing a B-tree across threads.

use std::sync::Arc;

use parking_lot::Mutex;

use super::dump::TreeDump;
use super::tree::BTree;
use crate::common::Result;

/// A [`BTree`] behind a single mutex.
///
/// The tree itself does no locking; every call here takes the lock for the
/// whole operation, so operations on one tree are fully serialized.
/// Cloning the handle shares the same tree.
///
/// # Example
/// ```
/// use basefs::{BTree, SharedBTree};
///
/// let shared = SharedBTree::new(BTree::new().unwrap());
/// let other = shared.clone();
/// other.insert(42).unwrap();
/// assert!(shared.search(42));
/// ```
#[derive(Debug, Clone)]
pub struct SharedBTree {
    inner: Arc<Mutex<BTree>>,
}

impl SharedBTree {
    pub fn new(tree: BTree) -> Self {
        Self {
            inner: Arc::new(Mutex::new(tree)),
        }
    }

    pub fn insert(&self, key: u64) -> Result<()> {
        self.inner.lock().insert(key)
    }

    pub fn search(&self, key: u64) -> bool {
        self.inner.lock().search(key)
    }

    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }

    pub fn dump(&self) -> TreeDump {
        self.inner.lock().dump()
    }

    /// Run `f` with exclusive access to the tree.
    ///
    /// Use this to make several operations atomic with respect to other
    /// handles.
    pub fn with<R>(&self, f: impl FnOnce(&mut BTree) -> R) -> R {
        let mut guard = self.inner.lock();
        f(&mut guard)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_concurrent_inserts_are_serialized() {
        let shared = SharedBTree::new(BTree::new().unwrap());

        let handles: Vec<_> = (0..4u64)
            .map(|t| {
                let shared = shared.clone();
                thread::spawn(move || {
                    for i in 0..250 {
                        shared.insert(t * 1000 + i).unwrap();
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(shared.len(), 1000);
        assert!(shared.search(3249));
        assert!(!shared.search(250));
        shared.with(|tree| tree.check_invariants()).unwrap();
    }

    #[test]
    fn test_with_groups_operations() {
        let shared = SharedBTree::new(BTree::new().unwrap());

        let inserted = shared.with(|tree| {
            if !tree.search(1) {
                tree.insert(1).unwrap();
                true
            } else {
                false
            }
        });

        assert!(inserted);
        assert!(!shared.is_empty());
        assert_eq!(shared.dump().entries()[0].keys, vec![1]);
    }
}
