//! # Spatial Index Module
//!
//! An arena-backed quadtree over axis-aligned hitboxes.
//!
//! Elements live in a slab owned by the tree and are referred to by stable
//! [`ElementId`] handles; tree nodes reference elements by handle only, so
//! moving or erasing an element never invalidates another element's handle.
//!
//! Region traversal uses a two-phase deletion protocol: the visitor returns
//! [`Visit::Remove`] for elements it wants gone, the tree collects those
//! handles during traversal and commits the removals once traversal has
//! finished. Visitors therefore never mutate the tree mid-walk.
//!
//! The map generator builds a small statically-subdivided tree over room
//! centers for its connectivity queries; callers indexing live entities
//! usually want [`SubdivisionPolicy::Lazy`] or [`SubdivisionPolicy::Dynamic`].

use crate::geometry::Area;

/// Stable handle to an element stored in a [`QuadTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ElementId(usize);

/// How a tree manages its child nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubdivisionPolicy {
    /// Subdivide the whole tree to max depth at construction. Predictable
    /// query cost, no rebalancing work during inserts.
    Static,
    /// Split a node into four quadrants on first overflow.
    Lazy,
    /// Like `Lazy`, but children collapse back into their parent once the
    /// parent's subtree drops to capacity.
    Dynamic,
}

/// Visitor verdict for one element during a region traversal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visit {
    /// Keep the element.
    Continue,
    /// Remove the element once traversal completes.
    Remove,
}

#[derive(Debug)]
struct Entry<T> {
    hitbox: Area,
    value: T,
    node: usize,
}

#[derive(Debug)]
struct Node {
    area: Area,
    depth: u32,
    parent: Option<usize>,
    elements: Vec<ElementId>,
    /// Children in quadrant order: top-left, top-right, bottom-left,
    /// bottom-right.
    children: Option<[usize; 4]>,
}

/// A quadtree storing movable bounded elements.
///
/// # Examples
///
/// ```
/// use warren::{Area, QuadTree, SubdivisionPolicy};
///
/// let mut tree = QuadTree::new(Area::new(0, 0, 100, 100), 10, 2, SubdivisionPolicy::Lazy);
/// let id = tree.insert(Area::new(10, 10, 4, 4), "crate");
/// assert_eq!(tree.len(), 1);
/// assert!(tree.has_collision(&Area::new(12, 12, 2, 2)));
/// assert_eq!(tree.remove(id), Some("crate"));
/// assert!(tree.is_empty());
/// ```
#[derive(Debug)]
pub struct QuadTree<T> {
    nodes: Vec<Node>,
    node_free: Vec<usize>,
    slab: Vec<Option<Entry<T>>>,
    slab_free: Vec<usize>,
    len: usize,
    max_depth: u32,
    max_size: usize,
    policy: SubdivisionPolicy,
}

const ROOT: usize = 0;

impl<T> QuadTree<T> {
    /// Creates a tree over `area` with the given depth budget, per-node
    /// capacity and subdivision policy.
    pub fn new(area: Area, max_depth: u32, max_size: usize, policy: SubdivisionPolicy) -> Self {
        let mut tree = Self {
            nodes: vec![Node {
                area,
                depth: 0,
                parent: None,
                elements: Vec::new(),
                children: None,
            }],
            node_free: Vec::new(),
            slab: Vec::new(),
            slab_free: Vec::new(),
            len: 0,
            max_depth,
            max_size: max_size.max(1),
            policy,
        };
        if policy == SubdivisionPolicy::Static {
            tree.subdivide_fully(ROOT);
        }
        tree
    }

    /// The bounding area this tree covers.
    pub fn area(&self) -> Area {
        self.nodes[ROOT].area
    }

    /// Number of stored elements.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the tree stores no elements.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Removes every element and resets the node structure.
    pub fn clear(&mut self) {
        let area = self.area();
        let (max_depth, max_size, policy) = (self.max_depth, self.max_size, self.policy);
        *self = Self::new(area, max_depth, max_size, policy);
    }

    /// Inserts an element with the given hitbox, returning its handle.
    ///
    /// A hitbox straddling a node's center (or poking outside the tree's
    /// area) stays at that node rather than descending further.
    pub fn insert(&mut self, hitbox: Area, value: T) -> ElementId {
        let id = self.alloc_entry(hitbox, value);
        self.place(id, ROOT);
        self.len += 1;
        id
    }

    /// Removes an element, returning its value.
    pub fn remove(&mut self, id: ElementId) -> Option<T> {
        let entry = self.slab.get_mut(id.0)?.take()?;
        self.slab_free.push(id.0);
        self.detach(id, entry.node);
        self.len -= 1;
        if self.policy == SubdivisionPolicy::Dynamic {
            self.maybe_collapse(entry.node);
        }
        Some(entry.value)
    }

    /// Borrows an element's value.
    pub fn get(&self, id: ElementId) -> Option<&T> {
        self.slab.get(id.0)?.as_ref().map(|e| &e.value)
    }

    /// Mutably borrows an element's value.
    pub fn get_mut(&mut self, id: ElementId) -> Option<&mut T> {
        self.slab.get_mut(id.0)?.as_mut().map(|e| &mut e.value)
    }

    /// An element's current hitbox.
    pub fn hitbox(&self, id: ElementId) -> Option<Area> {
        self.slab.get(id.0)?.as_ref().map(|e| e.hitbox)
    }

    /// Moves an element to a new hitbox, re-slotting it in the tree.
    ///
    /// Returns false when the handle is stale.
    pub fn update_pos(&mut self, id: ElementId, hitbox: Area) -> bool {
        let node = match self.slab.get_mut(id.0).and_then(Option::as_mut) {
            Some(entry) => {
                entry.hitbox = hitbox;
                entry.node
            }
            None => return false,
        };
        self.detach(id, node);
        self.place(id, ROOT);
        if self.policy == SubdivisionPolicy::Dynamic {
            self.maybe_collapse(node);
        }
        true
    }

    /// Finds the first element satisfying the predicate, in handle order.
    pub fn find<F>(&self, mut pred: F) -> Option<ElementId>
    where
        F: FnMut(&T) -> bool,
    {
        self.slab.iter().enumerate().find_map(|(i, slot)| {
            slot.as_ref()
                .filter(|entry| pred(&entry.value))
                .map(|_| ElementId(i))
        })
    }

    /// Whether any element's hitbox intersects the region.
    pub fn has_collision(&self, region: &Area) -> bool {
        self.has_collision_if(region, |_| true)
    }

    /// Whether any element intersecting the region also satisfies the
    /// predicate.
    pub fn has_collision_if<F>(&self, region: &Area, mut pred: F) -> bool
    where
        F: FnMut(&T) -> bool,
    {
        let mut candidates = Vec::new();
        self.collect_region(ROOT, region, &mut candidates);
        candidates.into_iter().any(|id| {
            let entry = self.slab[id.0].as_ref().expect("collected handle is live");
            entry.hitbox.intersects(region) && pred(&entry.value)
        })
    }

    /// Visits every element whose hitbox intersects the region.
    ///
    /// The visitor may request deletion of the element it is currently
    /// seeing by returning [`Visit::Remove`]; deletions are committed after
    /// the traversal completes.
    pub fn visit<F>(&mut self, region: &Area, mut visitor: F)
    where
        F: FnMut(ElementId, &T) -> Visit,
    {
        let mut candidates = Vec::new();
        self.collect_region(ROOT, region, &mut candidates);
        let mut doomed = Vec::new();
        for id in candidates {
            let entry = self.slab[id.0].as_ref().expect("collected handle is live");
            if entry.hitbox.intersects(region) && visitor(id, &entry.value) == Visit::Remove {
                doomed.push(id);
            }
        }
        for id in doomed {
            self.remove(id);
        }
    }

    /// All element handles in pre-order node traversal, elements in
    /// insertion order within each node.
    ///
    /// The order is deterministic for a fixed insertion sequence; the map
    /// generator leans on that for its neighbor-linking sweep.
    pub fn traversal_order(&self) -> Vec<ElementId> {
        let mut out = Vec::with_capacity(self.len);
        let everything = self.area();
        self.collect_region(ROOT, &everything, &mut out);
        out
    }

    // -- internals ---------------------------------------------------------

    fn alloc_entry(&mut self, hitbox: Area, value: T) -> ElementId {
        let entry = Entry {
            hitbox,
            value,
            node: ROOT,
        };
        match self.slab_free.pop() {
            Some(idx) => {
                self.slab[idx] = Some(entry);
                ElementId(idx)
            }
            None => {
                self.slab.push(Some(entry));
                ElementId(self.slab.len() - 1)
            }
        }
    }

    fn alloc_node(&mut self, node: Node) -> usize {
        match self.node_free.pop() {
            Some(idx) => {
                self.nodes[idx] = node;
                idx
            }
            None => {
                self.nodes.push(node);
                self.nodes.len() - 1
            }
        }
    }

    /// Descends from `start` to the deepest node whose quadrant fully
    /// contains the element's hitbox, splitting overflowing leaves on the
    /// way when the policy allows it.
    fn place(&mut self, id: ElementId, start: usize) {
        let hitbox = self.slab[id.0].as_ref().unwrap().hitbox;
        let mut node = start;
        loop {
            if self.nodes[node].children.is_none()
                && self.policy != SubdivisionPolicy::Static
                && self.nodes[node].elements.len() >= self.max_size
                && self.nodes[node].depth < self.max_depth
            {
                self.subdivide(node);
            }

            match self.child_containing(node, &hitbox) {
                Some(child) => node = child,
                None => break,
            }
        }
        self.nodes[node].elements.push(id);
        self.slab[id.0].as_mut().unwrap().node = node;
    }

    fn child_containing(&self, node: usize, hitbox: &Area) -> Option<usize> {
        let children = self.nodes[node].children?;
        children
            .iter()
            .copied()
            .find(|&child| self.nodes[child].area.contains_area(hitbox))
    }

    /// Splits a leaf into four quadrants and pushes down every element whose
    /// hitbox fits entirely inside one of them.
    fn subdivide(&mut self, node: usize) -> bool {
        let area = self.nodes[node].area;
        if self.nodes[node].children.is_some()
            || self.nodes[node].depth >= self.max_depth
            || area.width < 2
            || area.height < 2
        {
            return false;
        }

        let depth = self.nodes[node].depth + 1;
        let quadrants = area.quadrants();
        let mut children = [0usize; 4];
        for (slot, quadrant) in children.iter_mut().zip(quadrants) {
            *slot = self.alloc_node(Node {
                area: quadrant,
                depth,
                parent: Some(node),
                elements: Vec::new(),
                children: None,
            });
        }
        self.nodes[node].children = Some(children);

        let residents = std::mem::take(&mut self.nodes[node].elements);
        for id in residents {
            let hitbox = self.slab[id.0].as_ref().unwrap().hitbox;
            match self.child_containing(node, &hitbox) {
                Some(child) => {
                    self.nodes[child].elements.push(id);
                    self.slab[id.0].as_mut().unwrap().node = child;
                }
                None => self.nodes[node].elements.push(id),
            }
        }
        true
    }

    fn subdivide_fully(&mut self, node: usize) {
        if self.subdivide(node) {
            let children = self.nodes[node].children.unwrap();
            for child in children {
                self.subdivide_fully(child);
            }
        }
    }

    fn detach(&mut self, id: ElementId, node: usize) {
        let elements = &mut self.nodes[node].elements;
        if let Some(pos) = elements.iter().position(|&e| e == id) {
            elements.swap_remove(pos);
        }
    }

    fn subtree_len(&self, node: usize) -> usize {
        let mut count = self.nodes[node].elements.len();
        if let Some(children) = self.nodes[node].children {
            for child in children {
                count += self.subtree_len(child);
            }
        }
        count
    }

    /// Collapses a node's subtree back into it once the whole subtree fits
    /// within one node's capacity, then tries the same on the parent.
    fn maybe_collapse(&mut self, node: usize) {
        let mut current = Some(node);
        while let Some(n) = current {
            if self.nodes[n].children.is_some() && self.subtree_len(n) <= self.max_size {
                self.collapse(n);
            }
            current = self.nodes[n].parent;
        }
    }

    fn collapse(&mut self, node: usize) {
        let Some(children) = self.nodes[node].children.take() else {
            return;
        };
        let mut gathered = Vec::new();
        for child in children {
            self.drain_subtree(child, &mut gathered);
        }
        for id in gathered {
            self.slab[id.0].as_mut().unwrap().node = node;
            self.nodes[node].elements.push(id);
        }
    }

    fn drain_subtree(&mut self, node: usize, out: &mut Vec<ElementId>) {
        out.append(&mut self.nodes[node].elements);
        if let Some(children) = self.nodes[node].children.take() {
            for child in children {
                self.drain_subtree(child, out);
            }
        }
        self.node_free.push(node);
    }

    /// Pre-order walk over nodes whose area intersects the region,
    /// collecting every resident element handle. Region filtering against
    /// individual hitboxes happens at the call sites; the two-phase
    /// deletion in `visit` builds on this read-only pass.
    fn collect_region(&self, node: usize, region: &Area, out: &mut Vec<ElementId>) {
        // The root also holds elements straddling quadrant seams or lying
        // outside the tree area, so it is always walked.
        if node != ROOT && !self.nodes[node].area.intersects(region) {
            return;
        }
        out.extend_from_slice(&self.nodes[node].elements);
        if let Some(children) = self.nodes[node].children {
            for child in children {
                self.collect_region(child, region, out);
            }
        }
    }
}
