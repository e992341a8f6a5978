//! Handle bookkeeping for pages whose elements live outside Rust (the browser DOM).
//! Identity is resolved on the Rust side so the page itself is never tagged.

use std::collections::HashSet;

use super::document::ElementHandle;

/// What the registry needs from a foreign element.
pub trait ForeignNode {
    fn same_node(&self, other: &Self) -> bool;
    fn connected(&self) -> bool;
}

/// Maps foreign nodes to stable [`ElementHandle`]s. Handles are never reused.
#[derive(Debug)]
pub struct HandleRegistry<N> {
    entries: Vec<(ElementHandle, N)>,
    pinned: HashSet<ElementHandle>,
    next: u32,
}

impl<N> Default for HandleRegistry<N> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            pinned: HashSet::new(),
            next: 0,
        }
    }
}

impl<N: ForeignNode> HandleRegistry<N> {
    /// Handle for `node`, allocating one on first sight.
    pub fn adopt(&mut self, node: N) -> ElementHandle {
        if let Some((handle, _)) = self.entries.iter().find(|(_, n)| n.same_node(&node)) {
            return *handle;
        }
        let handle = self.allocate();
        self.entries.push((handle, node));
        handle
    }

    /// A fresh handle bound to nothing; lookups on it miss.
    pub fn allocate(&mut self) -> ElementHandle {
        let handle = ElementHandle(self.next);
        self.next += 1;
        handle
    }

    /// Keeps `handle` registered even while its node is detached.
    pub fn pin(&mut self, handle: ElementHandle) {
        self.pinned.insert(handle);
    }

    pub fn get(&self, handle: ElementHandle) -> Option<&N> {
        self.entries
            .iter()
            .find(|(h, _)| *h == handle)
            .map(|(_, n)| n)
    }

    pub fn remove(&mut self, handle: ElementHandle) -> Option<N> {
        self.pinned.remove(&handle);
        let idx = self.entries.iter().position(|(h, _)| *h == handle)?;
        Some(self.entries.swap_remove(idx).1)
    }

    /// Drops every unpinned entry whose node is no longer in the document.
    pub fn prune(&mut self) -> Vec<ElementHandle> {
        let pinned = &self.pinned;
        let mut dropped = Vec::new();
        self.entries.retain(|(h, n)| {
            let keep = pinned.contains(h) || n.connected();
            if !keep {
                dropped.push(*h);
            }
            keep
        });
        dropped
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
