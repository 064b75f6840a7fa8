//! Key-ordered list with removable temporary entries
//!
//! Entries are kept sorted by an integer key, ascending, and entries that share
//! a key stay in insertion order. Nodes live in a slot map and are linked
//! through their keys, so unlinking an entry is O(1) and never disturbs the
//! handles of the others. Insertion scans from the head.

use slotmap::{SlotMap, new_key_type};
use thiserror::Error;

new_key_type! {
    /// Stable handle for any entry in an [`OrderedList`]
    pub struct EntryId;
}

/// Handle to a removable entry
///
/// Generation-tagged, so a handle whose entry was already removed is detected
/// rather than hitting whichever entry reused the slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TempHandle(EntryId);

impl TempHandle {
    pub fn id(self) -> EntryId {
        self.0
    }
}

impl From<TempHandle> for EntryId {
    fn from(handle: TempHandle) -> Self {
        handle.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OrderedListError {
    #[error("no temporary entry is registered for {0:?}")]
    UnknownHandle(TempHandle),
}

#[derive(Debug, Clone)]
struct Node<T> {
    item: T,
    key: i64,
    temporary: bool,
    prev: Option<EntryId>,
    next: Option<EntryId>,
}

#[derive(Debug, Clone)]
pub struct OrderedList<T> {
    nodes: SlotMap<EntryId, Node<T>>,
    head: Option<EntryId>,
    tail: Option<EntryId>,
    temporaries: usize,
}

impl<T> Default for OrderedList<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> OrderedList<T> {
    pub fn new() -> Self {
        Self {
            nodes: SlotMap::with_key(),
            head: None,
            tail: None,
            temporaries: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Number of entries that can still be removed
    pub fn temporary_count(&self) -> usize {
        self.temporaries
    }

    /// Insert a permanent entry after every entry with a key `<= key`
    pub fn insert(&mut self, item: T, key: i64) -> EntryId {
        self.link(item, key, false)
    }

    /// Insert an entry that can later be removed through the returned handle
    pub fn insert_temporary(&mut self, item: T, key: i64) -> TempHandle {
        self.temporaries += 1;
        TempHandle(self.link(item, key, true))
    }

    /// Unlink a temporary entry and hand back its payload
    pub fn remove(&mut self, handle: TempHandle) -> Result<T, OrderedListError> {
        match self.nodes.get(handle.0) {
            Some(node) if node.temporary => {}
            _ => return Err(OrderedListError::UnknownHandle(handle)),
        }
        let node = self
            .nodes
            .remove(handle.0)
            .ok_or(OrderedListError::UnknownHandle(handle))?;

        match node.prev {
            Some(prev) => self.nodes[prev].next = node.next,
            None => self.head = node.next,
        }
        match node.next {
            Some(next) => self.nodes[next].prev = node.prev,
            None => self.tail = node.prev,
        }
        self.temporaries -= 1;
        Ok(node.item)
    }

    /// Whether `handle` still names a live temporary entry
    pub fn contains(&self, handle: TempHandle) -> bool {
        self.nodes.get(handle.0).is_some_and(|n| n.temporary)
    }

    pub fn get(&self, id: impl Into<EntryId>) -> Option<&T> {
        self.nodes.get(id.into()).map(|n| &n.item)
    }

    /// Entries in ascending key order
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            list: self,
            cursor: self.head,
        }
    }

    /// Entry ids paired with payloads, in ascending key order
    pub fn entries(&self) -> impl Iterator<Item = (EntryId, &T)> + '_ {
        let mut cursor = self.head;
        std::iter::from_fn(move || {
            let id = cursor?;
            let node = &self.nodes[id];
            cursor = node.next;
            Some((id, &node.item))
        })
    }

    fn link(&mut self, item: T, key: i64, temporary: bool) -> EntryId {
        // First node strictly past `key`; the new node goes right before it
        let mut after = self.head;
        while let Some(id) = after {
            let node = &self.nodes[id];
            if node.key > key {
                break;
            }
            after = node.next;
        }
        let prev = match after {
            Some(id) => self.nodes[id].prev,
            None => self.tail,
        };

        let id = self.nodes.insert(Node {
            item,
            key,
            temporary,
            prev,
            next: after,
        });
        match prev {
            Some(p) => self.nodes[p].next = Some(id),
            None => self.head = Some(id),
        }
        match after {
            Some(n) => self.nodes[n].prev = Some(id),
            None => self.tail = Some(id),
        }
        id
    }
}

pub struct Iter<'a, T> {
    list: &'a OrderedList<T>,
    cursor: Option<EntryId>,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        let list = self.list;
        let node = &list.nodes[self.cursor?];
        self.cursor = node.next;
        Some(&node.item)
    }
}

impl<'a, T> IntoIterator for &'a OrderedList<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn collect<T: Clone>(list: &OrderedList<T>) -> Vec<T> {
        list.iter().cloned().collect()
    }

    #[test]
    fn test_ties_keep_insertion_order() {
        let mut list = OrderedList::new();
        list.insert("a", 1);
        list.insert("b", 2);
        list.insert("c", 2);
        assert_eq!(collect(&list), vec!["a", "b", "c"]);

        list.insert("d", 0);
        list.insert("e", 1);
        assert_eq!(collect(&list), vec!["d", "a", "e", "b", "c"]);
    }

    #[test]
    fn test_removing_temporary_leaves_other_handles_valid() {
        let mut list = OrderedList::new();
        let a = list.insert_temporary('a', 1);
        let b = list.insert_temporary('b', 2);
        let c = list.insert_temporary('c', 3);
        assert_eq!(list.temporary_count(), 3);

        assert_eq!(list.remove(b), Ok('b'));
        assert_eq!(collect(&list), vec!['a', 'c']);
        assert_eq!(list.get(a), Some(&'a'));
        assert_eq!(list.get(c), Some(&'c'));

        assert_eq!(list.remove(a), Ok('a'));
        assert_eq!(list.remove(c), Ok('c'));
        assert!(list.is_empty());
        assert_eq!(list.temporary_count(), 0);
    }

    #[test]
    fn test_removing_first_of_tied_layer_keeps_second_renderable() {
        let mut list = OrderedList::new();
        list.insert_temporary("back", 1);
        let first = list.insert_temporary("first", 2);
        let second = list.insert_temporary("second", 2);
        list.insert("front", 3);
        list.remove(first).unwrap();
        assert_eq!(list.iter().count(), 3);
        assert_eq!(collect(&list)[1], "second");
        assert_eq!(list.remove(second), Ok("second"));
    }

    #[test]
    fn test_stale_handle_is_rejected() {
        let mut list = OrderedList::new();
        let a = list.insert_temporary(1, 0);
        list.remove(a).unwrap();
        // Reuses the freed slot with a new generation
        let b = list.insert_temporary(2, 0);
        assert_eq!(list.remove(a), Err(OrderedListError::UnknownHandle(a)));
        assert_eq!(list.get(b), Some(&2));
    }

    #[test]
    fn test_permanent_entry_cannot_be_removed_as_temporary() {
        let mut list = OrderedList::new();
        let id = list.insert(7, 0);
        let forged = TempHandle(id);
        assert!(list.remove(forged).is_err());
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn test_remove_head_and_tail_relinks() {
        let mut list = OrderedList::new();
        let head = list.insert_temporary(1, 0);
        list.insert(2, 5);
        let tail = list.insert_temporary(3, 9);
        list.remove(head).unwrap();
        list.remove(tail).unwrap();
        assert_eq!(collect(&list), vec![2]);
        list.insert(4, 10);
        list.insert(0, -1);
        assert_eq!(collect(&list), vec![0, 2, 4]);
    }

    proptest! {
        #[test]
        fn prop_keys_stay_sorted_under_churn(
            ops in prop::collection::vec((0i64..8, any::<bool>()), 1..64)
        ) {
            let mut list = OrderedList::new();
            let mut handles = Vec::new();
            for (i, (key, remove)) in ops.into_iter().enumerate() {
                if remove && !handles.is_empty() {
                    let h = handles.swap_remove(i % handles.len());
                    prop_assert!(list.remove(h).is_ok());
                } else {
                    handles.push(list.insert_temporary((key, i), key));
                }
            }
            let items: Vec<(i64, usize)> = list.iter().copied().collect();
            prop_assert_eq!(items.len(), handles.len());
            for pair in items.windows(2) {
                // Ascending key, then insertion order within a key
                prop_assert!(pair[0] < pair[1]);
            }
        }
    }
}
