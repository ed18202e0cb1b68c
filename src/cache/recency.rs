//! Recency List Module
//!
//! Doubly linked list stored in a slab of nodes. Links are slab indices, so a
//! node's index is a stable handle until the node is removed, and every
//! operation the LRU cache needs is O(1).
//!
//! - Front = Most recently used
//! - Back = Least recently used

// == Node ==
#[derive(Debug)]
struct Node<T> {
    item: T,
    prev: Option<usize>,
    next: Option<usize>,
}

// == Recency List ==
/// Index-linked list ordered from most to least recently used.
#[derive(Debug)]
pub struct RecencyList<T> {
    /// Node slab; `None` marks a free slot
    nodes: Vec<Option<Node<T>>>,
    /// Free slots available for reuse
    free: Vec<usize>,
    head: Option<usize>,
    tail: Option<usize>,
    len: usize,
}

impl<T> RecencyList<T> {
    // == Constructor ==
    /// Creates an empty list.
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Creates an empty list with room for `capacity` nodes.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            nodes: Vec::with_capacity(capacity),
            free: Vec::new(),
            head: None,
            tail: None,
            len: 0,
        }
    }

    // == Push Front ==
    /// Inserts `item` as most recently used and returns its handle.
    pub fn push_front(&mut self, item: T) -> usize {
        let node = Node {
            item,
            prev: None,
            next: None,
        };
        let index = match self.free.pop() {
            Some(index) => {
                self.nodes[index] = Some(node);
                index
            }
            None => {
                self.nodes.push(Some(node));
                self.nodes.len() - 1
            }
        };
        self.link_front(index);
        self.len += 1;
        index
    }

    // == Move To Front ==
    /// Marks the node at `index` as most recently used.
    pub fn move_to_front(&mut self, index: usize) {
        if self.head == Some(index) || self.node(index).is_none() {
            return;
        }
        self.unlink(index);
        self.link_front(index);
    }

    // == Remove ==
    /// Removes the node at `index` and returns its item.
    pub fn remove(&mut self, index: usize) -> Option<T> {
        self.node(index)?;
        self.unlink(index);
        let node = self.nodes[index].take()?;
        self.free.push(index);
        self.len -= 1;
        Some(node.item)
    }

    // == Pop Back ==
    /// Removes and returns the least recently used item.
    pub fn pop_back(&mut self) -> Option<T> {
        let tail = self.tail?;
        self.remove(tail)
    }

    // == Accessors ==
    /// Returns the item at `index`.
    pub fn get(&self, index: usize) -> Option<&T> {
        self.node(index).map(|node| &node.item)
    }

    /// Returns the item at `index` mutably.
    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        self.nodes
            .get_mut(index)
            .and_then(Option::as_mut)
            .map(|node| &mut node.item)
    }

    /// Returns the least recently used item without removing it.
    pub fn back(&self) -> Option<&T> {
        self.tail.and_then(|tail| self.get(tail))
    }

    /// Returns the most recently used item.
    pub fn front(&self) -> Option<&T> {
        self.head.and_then(|head| self.get(head))
    }

    /// Returns the number of items in the list.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns true if the list is empty.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Removes every item.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.free.clear();
        self.head = None;
        self.tail = None;
        self.len = 0;
    }

    /// Iterates `(handle, item)` pairs from most to least recently used.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            list: self,
            cursor: self.head,
        }
    }

    // == Linking ==
    fn node(&self, index: usize) -> Option<&Node<T>> {
        self.nodes.get(index).and_then(Option::as_ref)
    }

    fn node_mut(&mut self, index: usize) -> Option<&mut Node<T>> {
        self.nodes.get_mut(index).and_then(Option::as_mut)
    }

    /// Detaches a node from its neighbours, leaving its slot occupied.
    fn unlink(&mut self, index: usize) {
        let Some((prev, next)) = self.node(index).map(|node| (node.prev, node.next)) else {
            return;
        };

        match prev {
            Some(prev) => {
                if let Some(node) = self.node_mut(prev) {
                    node.next = next;
                }
            }
            None => self.head = next,
        }
        match next {
            Some(next) => {
                if let Some(node) = self.node_mut(next) {
                    node.prev = prev;
                }
            }
            None => self.tail = prev,
        }

        if let Some(node) = self.node_mut(index) {
            node.prev = None;
            node.next = None;
        }
    }

    /// Attaches a detached node at the head.
    fn link_front(&mut self, index: usize) {
        let old_head = self.head;
        if let Some(node) = self.node_mut(index) {
            node.prev = None;
            node.next = old_head;
        }
        match old_head {
            Some(head) => {
                if let Some(node) = self.node_mut(head) {
                    node.prev = Some(index);
                }
            }
            None => self.tail = Some(index),
        }
        self.head = Some(index);
    }
}

impl<T> Default for RecencyList<T> {
    fn default() -> Self {
        Self::new()
    }
}

// == Iterator ==
/// Front-to-back iterator over a [`RecencyList`].
pub struct Iter<'a, T> {
    list: &'a RecencyList<T>,
    cursor: Option<usize>,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = (usize, &'a T);

    fn next(&mut self) -> Option<Self::Item> {
        let index = self.cursor?;
        let node = self.list.node(index)?;
        self.cursor = node.next;
        Some((index, &node.item))
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    fn items(list: &RecencyList<&'static str>) -> Vec<&'static str> {
        list.iter().map(|(_, item)| *item).collect()
    }

    #[test]
    fn test_list_new() {
        let list: RecencyList<i32> = RecencyList::new();
        assert!(list.is_empty());
        assert_eq!(list.len(), 0);
        assert!(list.back().is_none());
    }

    #[test]
    fn test_push_front_orders_newest_first() {
        let mut list = RecencyList::new();
        list.push_front("a");
        list.push_front("b");
        list.push_front("c");

        assert_eq!(items(&list), vec!["c", "b", "a"]);
        assert_eq!(list.front(), Some(&"c"));
        assert_eq!(list.back(), Some(&"a"));
    }

    #[test]
    fn test_move_to_front() {
        let mut list = RecencyList::new();
        let a = list.push_front("a");
        list.push_front("b");
        list.push_front("c");

        list.move_to_front(a);

        assert_eq!(items(&list), vec!["a", "c", "b"]);
        assert_eq!(list.back(), Some(&"b"));
    }

    #[test]
    fn test_move_tail_and_head() {
        let mut list = RecencyList::new();
        let a = list.push_front("a");
        let b = list.push_front("b");

        list.move_to_front(b);
        assert_eq!(items(&list), vec!["b", "a"]);

        list.move_to_front(a);
        assert_eq!(items(&list), vec!["a", "b"]);
        assert_eq!(list.back(), Some(&"b"));
    }

    #[test]
    fn test_pop_back_in_lru_order() {
        let mut list = RecencyList::new();
        let a = list.push_front("a");
        list.push_front("b");
        let c = list.push_front("c");

        // front=[c, b, a]; touch a then c -> front=[c, a, b]
        list.move_to_front(a);
        list.move_to_front(c);

        assert_eq!(list.pop_back(), Some("b"));
        assert_eq!(list.pop_back(), Some("a"));
        assert_eq!(list.pop_back(), Some("c"));
        assert_eq!(list.pop_back(), None);
        assert!(list.is_empty());
    }

    #[test]
    fn test_remove_middle() {
        let mut list = RecencyList::new();
        list.push_front("a");
        let b = list.push_front("b");
        list.push_front("c");

        assert_eq!(list.remove(b), Some("b"));
        assert_eq!(list.remove(b), None);
        assert_eq!(items(&list), vec!["c", "a"]);
        assert_eq!(list.len(), 2);
    }

    #[test]
    fn test_slots_are_reused() {
        let mut list = RecencyList::new();
        let a = list.push_front("a");
        list.remove(a);
        let b = list.push_front("b");

        assert_eq!(a, b);
        assert_eq!(list.get(b), Some(&"b"));
    }

    #[test]
    fn test_get_mut_and_clear() {
        let mut list = RecencyList::new();
        let a = list.push_front(1);
        *list.get_mut(a).unwrap() += 10;
        assert_eq!(list.get(a), Some(&11));

        list.clear();
        assert!(list.is_empty());
        assert!(list.get(a).is_none());
        assert!(list.front().is_none());
    }

    #[test]
    fn test_invalid_handles_are_ignored() {
        let mut list: RecencyList<i32> = RecencyList::new();
        list.move_to_front(7);
        assert_eq!(list.remove(7), None);
        assert!(list.get_mut(7).is_none());
    }
}
