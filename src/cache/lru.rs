//! LRU List Module
//!
//! Keyed storage that remembers recency order for LRU eviction.
//!
//! Nodes live in an arena `Vec` and are linked into a doubly-linked list;
//! a `HashMap` maps each key to its node index. Front = least recently used,
//! back = most recently used. Every operation except iteration is O(1).
//! Order comes purely from list position, never from timestamps, so entries
//! touched within the same millisecond still evict in the order they arrived.

use std::collections::HashMap;

/// Index into the node arena.
type NodeIndex = usize;

/// Sentinel value for null links.
const NULL_INDEX: NodeIndex = usize::MAX;

#[derive(Debug, Clone)]
struct Node<T> {
    key: String,
    value: T,
    /// Towards the front (older)
    prev: NodeIndex,
    /// Towards the back (newer)
    next: NodeIndex,
}

// == LRU List ==
/// Ordered map from string keys to values with O(1) recency updates.
#[derive(Debug, Clone)]
pub struct LruList<T> {
    /// Node arena; `None` slots are on the free list
    arena: Vec<Option<Node<T>>>,
    /// Recycled arena slots
    free_list: Vec<NodeIndex>,
    /// Key -> arena index
    index: HashMap<String, NodeIndex>,
    /// Least recently used
    head: NodeIndex,
    /// Most recently used
    tail: NodeIndex,
}

impl<T> Default for LruList<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> LruList<T> {
    // == Constructor ==
    /// Creates a new empty list.
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Creates an empty list with room for `capacity` keys.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            arena: Vec::with_capacity(capacity),
            free_list: Vec::new(),
            index: HashMap::with_capacity(capacity),
            head: NULL_INDEX,
            tail: NULL_INDEX,
        }
    }

    // == Lookup ==
    /// Returns the value for `key` without changing its position.
    pub fn get(&self, key: &str) -> Option<&T> {
        let idx = *self.index.get(key)?;
        self.node(idx).map(|node| &node.value)
    }

    /// Mutable access without changing position.
    pub fn get_mut(&mut self, key: &str) -> Option<&mut T> {
        let idx = *self.index.get(key)?;
        self.node_mut(idx).map(|node| &mut node.value)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    // == Insert ==
    /// Inserts or replaces the value for `key`.
    ///
    /// A new key is appended at the most-recent end. An existing key keeps its
    /// position and the previous value is returned.
    pub fn insert(&mut self, key: String, value: T) -> Option<T> {
        if let Some(&idx) = self.index.get(&key) {
            return self
                .node_mut(idx)
                .map(|node| std::mem::replace(&mut node.value, value));
        }

        let idx = self.alloc_node(Node {
            key: key.clone(),
            value,
            prev: NULL_INDEX,
            next: NULL_INDEX,
        });
        self.index.insert(key, idx);
        self.push_back(idx);
        None
    }

    // == Touch ==
    /// Moves `key` to the most-recent end. Returns false if absent.
    pub fn touch(&mut self, key: &str) -> bool {
        match self.index.get(key) {
            Some(&idx) => {
                if self.tail != idx {
                    self.detach(idx);
                    self.push_back(idx);
                }
                true
            }
            None => false,
        }
    }

    // == Remove ==
    /// Removes a key, returning its value.
    pub fn remove(&mut self, key: &str) -> Option<T> {
        let idx = self.index.remove(key)?;
        self.detach(idx);
        self.free_node(idx).map(|node| node.value)
    }

    // == Pop Oldest ==
    /// Removes and returns the least recently used entry.
    pub fn pop_oldest(&mut self) -> Option<(String, T)> {
        if self.head == NULL_INDEX {
            return None;
        }
        let idx = self.head;
        self.detach(idx);
        let node = self.free_node(idx)?;
        self.index.remove(&node.key);
        Some((node.key, node.value))
    }

    // == Length ==
    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn clear(&mut self) {
        self.arena.clear();
        self.free_list.clear();
        self.index.clear();
        self.head = NULL_INDEX;
        self.tail = NULL_INDEX;
    }

    // == Iteration ==
    /// Iterates entries from least to most recently used.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            list: self,
            cursor: self.head,
            remaining: self.len(),
        }
    }

    /// Removes every entry for which `pred` returns true, returning the removed keys.
    pub fn remove_where<F>(&mut self, mut pred: F) -> Vec<String>
    where
        F: FnMut(&str, &T) -> bool,
    {
        let doomed: Vec<String> = self
            .iter()
            .filter(|&(key, value)| pred(key, value))
            .map(|(key, _)| key.to_string())
            .collect();

        for key in &doomed {
            self.remove(key);
        }
        doomed
    }

    // == Internal: Node Management ==

    fn node(&self, idx: NodeIndex) -> Option<&Node<T>> {
        self.arena.get(idx).and_then(Option::as_ref)
    }

    fn node_mut(&mut self, idx: NodeIndex) -> Option<&mut Node<T>> {
        self.arena.get_mut(idx).and_then(Option::as_mut)
    }

    fn alloc_node(&mut self, node: Node<T>) -> NodeIndex {
        if let Some(idx) = self.free_list.pop() {
            self.arena[idx] = Some(node);
            idx
        } else {
            self.arena.push(Some(node));
            self.arena.len() - 1
        }
    }

    fn free_node(&mut self, idx: NodeIndex) -> Option<Node<T>> {
        let node = self.arena.get_mut(idx)?.take();
        if node.is_some() {
            self.free_list.push(idx);
        }
        node
    }

    // == Internal: Linked List Operations ==

    /// Unlinks a node, leaving it in the arena.
    fn detach(&mut self, idx: NodeIndex) {
        let (prev, next) = match self.node(idx) {
            Some(node) => (node.prev, node.next),
            None => return,
        };

        match self.node_mut(prev) {
            Some(node) => node.next = next,
            None => self.head = next,
        }
        match self.node_mut(next) {
            Some(node) => node.prev = prev,
            None => self.tail = prev,
        }

        if let Some(node) = self.node_mut(idx) {
            node.prev = NULL_INDEX;
            node.next = NULL_INDEX;
        }
    }

    /// Links a detached node at the most-recent end.
    fn push_back(&mut self, idx: NodeIndex) {
        let old_tail = self.tail;
        if let Some(node) = self.node_mut(idx) {
            node.prev = old_tail;
            node.next = NULL_INDEX;
        }
        match self.node_mut(old_tail) {
            Some(node) => node.next = idx,
            None => self.head = idx,
        }
        self.tail = idx;
    }
}

// == Iterator ==
/// Iterator over `(key, value)` pairs, oldest first.
pub struct Iter<'a, T> {
    list: &'a LruList<T>,
    cursor: NodeIndex,
    remaining: usize,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = (&'a str, &'a T);

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.list.node(self.cursor)?;
        self.cursor = node.next;
        self.remaining = self.remaining.saturating_sub(1);
        Some((node.key.as_str(), &node.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<'a, T> IntoIterator for &'a LruList<T> {
    type Item = (&'a str, &'a T);
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
