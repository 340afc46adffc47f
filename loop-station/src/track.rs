//! Doubly-linked pod tracks.
//!
//! A `Track` is an ordered doubly-linked list of pods with head and tail
//! access. Nodes live in an arena of recyclable slots and link to their
//! neighbours by index, which keeps the whole structure in safe Rust while
//! preserving O(1) insertion at either end and O(1) unlinking of a located
//! node. Where a pod joins is decided by its class: priority pods join at
//! the head, standard pods at the tail.

use std::fmt;

use tracing::{debug, trace};

use crate::pod::{Pod, PodClass};

/// Error returned by positional access with an index past the end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("pod index {index} out of bounds for track of length {len}")]
pub struct OutOfBounds {
    /// The requested index.
    pub index: usize,
    /// The track length at the time of the request.
    pub len: usize,
}

/// Position of a node's slot in the arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct NodeIndex(usize);

/// One link in the chain: a pod and its two neighbours.
#[derive(Debug)]
struct Node {
    pod: Pod,
    prev: Option<NodeIndex>,
    next: Option<NodeIndex>,
}

/// An ordered doubly-linked list of pods.
///
/// The track owns its pods: removal hands the pod back by value, so a pod
/// is on exactly one track (or in exactly one caller's hands) at any time.
/// Pods that cannot answer the admission probe are dropped rather than
/// admitted, and scans skip pods that fault mid-scan.
///
/// # Examples
///
/// ```
/// use loop_station::pod::{Pod, PodClass};
/// use loop_station::track::Track;
///
/// let mut track = Track::new();
/// track.add(Pod::new(4, PodClass::Standard));
/// track.add(Pod::new(6, PodClass::Priority));
///
/// // Priority pods join at the head.
/// assert_eq!(track.get(0).unwrap().capacity(), Ok(6));
/// assert_eq!(track.len(), 2);
///
/// let removed = track.remove(0).unwrap();
/// assert_eq!(removed.capacity(), Ok(6));
/// assert_eq!(track.len(), 1);
/// ```
#[derive(Debug, Default)]
pub struct Track {
    /// Node arena. `None` slots are vacated and listed in `free`.
    slots: Vec<Option<Node>>,
    /// Vacated slots available for reuse.
    free: Vec<NodeIndex>,
    head: Option<NodeIndex>,
    tail: Option<NodeIndex>,
    /// Number of pods on the track; always the number of reachable nodes.
    len: usize,
    /// Passengers seated through this track's boarding scan.
    boarded: usize,
}

impl Track {
    /// Creates an empty track.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if the track holds no pods.
    pub fn is_empty(&self) -> bool {
        self.head.is_none()
    }

    /// Returns the number of pods on the track, responsive or not.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns how many passengers have been seated through
    /// [`board_passenger`](Track::board_passenger) on this track.
    ///
    /// Boarding a pod directly through a reference does not count here.
    pub fn boarded_count(&self) -> usize {
        self.boarded
    }

    /// Admits a pod onto the track.
    ///
    /// The pod is probed for its class first; a pod that cannot answer is
    /// dropped on the spot and the track is left unchanged, which the
    /// `false` return reports. Priority pods join at the head, standard
    /// pods at the tail.
    pub fn add(&mut self, pod: Pod) -> bool {
        let class = match pod.class() {
            Ok(class) => class,
            Err(_) => {
                debug!("pod dropped at admission: not responding");
                return false;
            }
        };

        let index = self.alloc(Node {
            pod,
            prev: None,
            next: None,
        });
        match class {
            PodClass::Priority => self.link_front(index),
            PodClass::Standard => self.link_back(index),
        }
        true
    }

    /// Returns the pod at a 0-based position, walking from the head.
    ///
    /// # Errors
    ///
    /// Fails when `index >= len()`.
    pub fn get(&self, index: usize) -> Result<&Pod, OutOfBounds> {
        let node_index = self.locate(index)?;
        Ok(&self.node(node_index).pod)
    }

    /// Mutable counterpart of [`get`](Track::get).
    ///
    /// # Errors
    ///
    /// Fails when `index >= len()`.
    pub fn get_mut(&mut self, index: usize) -> Result<&mut Pod, OutOfBounds> {
        let node_index = self.locate(index)?;
        Ok(&mut self.node_mut(node_index).pod)
    }

    /// Unlinks the pod at a 0-based position and returns it.
    ///
    /// Later pods shift one position towards the head. Works at either
    /// end and in the middle; removing the sole pod leaves the track
    /// empty.
    ///
    /// # Errors
    ///
    /// Fails when `index >= len()`, leaving the track unchanged.
    pub fn remove(&mut self, index: usize) -> Result<Pod, OutOfBounds> {
        let node_index = self.locate(index)?;
        Ok(self.unlink(node_index))
    }

    /// Removes and returns the head pod, if any.
    pub fn pop_front(&mut self) -> Option<Pod> {
        let head = self.head?;
        Some(self.unlink(head))
    }

    /// Removes and returns the tail pod, if any.
    pub fn pop_back(&mut self) -> Option<Pod> {
        let tail = self.tail?;
        Some(self.unlink(tail))
    }

    /// Returns the head pod without removing it.
    pub fn front(&self) -> Option<&Pod> {
        self.head.map(|index| &self.node(index).pod)
    }

    /// Mutable counterpart of [`front`](Track::front).
    pub fn front_mut(&mut self) -> Option<&mut Pod> {
        match self.head {
            Some(index) => Some(&mut self.node_mut(index).pod),
            None => None,
        }
    }

    /// Returns the tail pod without removing it.
    pub fn back(&self) -> Option<&Pod> {
        self.tail.map(|index| &self.node(index).pod)
    }

    /// Mutable counterpart of [`back`](Track::back).
    pub fn back_mut(&mut self) -> Option<&mut Pod> {
        match self.tail {
            Some(index) => Some(&mut self.node_mut(index).pod),
            None => None,
        }
    }

    /// Returns true if an equal pod is on the track.
    ///
    /// Pods compare by value (class, capacity, manifest, condition), not
    /// by identity.
    pub fn contains(&self, pod: &Pod) -> bool {
        self.iter().any(|candidate| candidate == pod)
    }

    /// Returns the position of the first pod carrying this passenger.
    ///
    /// A pod that faults during the query is skipped without aborting the
    /// scan. `None` when no responsive pod carries the name, including on
    /// an empty track.
    pub fn find_passenger(&self, name: &str) -> Option<usize> {
        self.iter()
            .position(|pod| pod.contains_passenger(name).unwrap_or(false))
    }

    /// Returns the position of the first pod that fails its self-test.
    ///
    /// The self-test can itself trip a marginal pod, so this scan may be
    /// what reveals the fault it reports. `None` when every pod passes,
    /// including on an empty track.
    pub fn find_first_faulty(&mut self) -> Option<usize> {
        let mut current = self.head;
        let mut index = 0;
        while let Some(node_index) = current {
            current = self.node(node_index).next;
            if self.node_mut(node_index).pod.self_test().is_err() {
                return Some(index);
            }
            index += 1;
        }
        None
    }

    /// Seats a passenger in the first suitable pod, scanning from the
    /// head.
    ///
    /// Pods that fault on any probe are skipped. Only the priority arm
    /// constrains the pod's class (priority pod and priority ticket); the
    /// fallback arm seats any ticket in any pod with a free seat, so
    /// standard-seeking passengers may end up in priority pods and vice
    /// versa. On success the track's boarded counter grows by one.
    ///
    /// Returns false when a full scan finds no seat.
    pub fn board_passenger(&mut self, name: &str, ticket: PodClass) -> bool {
        let mut current = self.head;
        let mut index = 0;
        while let Some(node_index) = current {
            current = self.node(node_index).next;
            let pod = &mut self.node_mut(node_index).pod;
            match pod.class() {
                Ok(class) => {
                    if class == PodClass::Priority && ticket == PodClass::Priority {
                        if matches!(pod.is_full(), Ok(false)) && pod.board(name).is_ok() {
                            self.boarded += 1;
                            return true;
                        }
                    } else if matches!(pod.is_full(), Ok(false)) && pod.board(name).is_ok() {
                        self.boarded += 1;
                        return true;
                    }
                }
                Err(_) => trace!(index, "skipping unresponsive pod"),
            }
            index += 1;
        }
        false
    }

    /// Removes every pod from the track and resets the counters.
    pub fn clear(&mut self) {
        self.slots.clear();
        self.free.clear();
        self.head = None;
        self.tail = None;
        self.len = 0;
        self.boarded = 0;
    }

    /// Walks the track head to tail.
    pub fn iter(&self) -> impl Iterator<Item = &Pod> {
        let mut current = self.head;
        std::iter::from_fn(move || {
            let node = self.node(current?);
            current = node.next;
            Some(&node.pod)
        })
    }

    /// Walks the track tail to head.
    pub fn iter_rev(&self) -> impl Iterator<Item = &Pod> {
        let mut current = self.tail;
        std::iter::from_fn(move || {
            let node = self.node(current?);
            current = node.prev;
            Some(&node.pod)
        })
    }

    /// Finds the node at a 0-based position.
    fn locate(&self, index: usize) -> Result<NodeIndex, OutOfBounds> {
        if index >= self.len {
            return Err(OutOfBounds {
                index,
                len: self.len,
            });
        }

        let mut current = self.head;
        let mut remaining = index;
        while let Some(node_index) = current {
            if remaining == 0 {
                return Ok(node_index);
            }
            remaining -= 1;
            current = self.node(node_index).next;
        }

        // The bounds check above makes this unreachable while the length
        // invariant holds.
        Err(OutOfBounds {
            index,
            len: self.len,
        })
    }

    /// Splices a node out of the chain and returns its pod.
    ///
    /// Each side of the node either rewires a neighbour or moves the end
    /// pointer, which covers head, tail, interior, and sole-pod removal
    /// alike. The vacated slot goes back on the free list.
    fn unlink(&mut self, index: NodeIndex) -> Pod {
        let node = self.release(index);
        match node.prev {
            Some(prev) => self.node_mut(prev).next = node.next,
            None => self.head = node.next,
        }
        match node.next {
            Some(next) => self.node_mut(next).prev = node.prev,
            None => self.tail = node.prev,
        }
        self.len -= 1;
        node.pod
    }

    /// Links an allocated node in as the new head.
    fn link_front(&mut self, index: NodeIndex) {
        match self.head {
            Some(head) => {
                self.node_mut(head).prev = Some(index);
                self.node_mut(index).next = Some(head);
                self.head = Some(index);
            }
            None => {
                self.head = Some(index);
                self.tail = Some(index);
            }
        }
        self.len += 1;
    }

    /// Links an allocated node in as the new tail.
    fn link_back(&mut self, index: NodeIndex) {
        match self.tail {
            Some(tail) => {
                self.node_mut(tail).next = Some(index);
                self.node_mut(index).prev = Some(tail);
                self.tail = Some(index);
            }
            None => {
                self.head = Some(index);
                self.tail = Some(index);
            }
        }
        self.len += 1;
    }

    /// Places a node in a vacated slot, or grows the arena.
    fn alloc(&mut self, node: Node) -> NodeIndex {
        match self.free.pop() {
            Some(index) => {
                self.slots[index.0] = Some(node);
                index
            }
            None => {
                self.slots.push(Some(node));
                NodeIndex(self.slots.len() - 1)
            }
        }
    }

    /// Takes a node out of its slot and marks the slot free.
    fn release(&mut self, index: NodeIndex) -> Node {
        // Safe: links only ever hold indices of occupied slots.
        let node = self.slots[index.0].take().unwrap();
        self.free.push(index);
        node
    }

    fn node(&self, index: NodeIndex) -> &Node {
        // Safe: links only ever hold indices of occupied slots.
        self.slots[index.0].as_ref().unwrap()
    }

    fn node_mut(&mut self, index: NodeIndex) -> &mut Node {
        // Safe: links only ever hold indices of occupied slots.
        self.slots[index.0].as_mut().unwrap()
    }
}

impl fmt::Display for Track {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for pod in self.iter() {
            if !first {
                f.write_str(" <-> ")?;
            }
            write!(f, "{pod}")?;
            first = false;
        }
        Ok(())
    }
}

#[cfg(test)]
impl Track {
    /// Walks the chain both ways and cross-checks every structural
    /// invariant against the counters and end pointers.
    fn assert_links(&self) {
        let mut forward = Vec::new();
        let mut current = self.head;
        while let Some(index) = current {
            forward.push(index);
            assert!(forward.len() <= self.slots.len(), "next links form a cycle");
            current = self.node(index).next;
        }
        assert_eq!(forward.len(), self.len, "len must count reachable nodes");

        let mut backward = Vec::new();
        let mut current = self.tail;
        while let Some(index) = current {
            backward.push(index);
            assert!(backward.len() <= self.slots.len(), "prev links form a cycle");
            current = self.node(index).prev;
        }
        backward.reverse();
        assert_eq!(forward, backward, "prev links must mirror next links");

        assert_eq!(self.head, forward.first().copied());
        assert_eq!(self.tail, forward.last().copied());
        if let Some(&first) = forward.first() {
            assert_eq!(self.node(first).prev, None, "head must have no prev");
        }
        if let Some(&last) = forward.last() {
            assert_eq!(self.node(last).next, None, "tail must have no next");
        }

        let occupied = self.slots.iter().filter(|slot| slot.is_some()).count();
        assert_eq!(occupied, self.len, "every occupied slot must be reachable");
        assert_eq!(
            self.free.len() + self.len,
            self.slots.len(),
            "every slot must be either free or occupied"
        );
    }
}
