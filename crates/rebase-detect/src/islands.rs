//! Grouping bottom faces into connected islands.
//!
//! Two faces belong to the same island when they share a (near-duplicate)
//! vertex, transitively. Connectivity is tracked with a disjoint-set
//! forest over face indices instead of an explicit adjacency graph.

use rebase_math::Point2;

use crate::bottom::BottomFace;

/// Disjoint-set forest with path compression and union by rank.
#[derive(Debug, Clone)]
pub struct DisjointSet {
    parent: Vec<usize>,
    rank: Vec<u8>,
}

impl DisjointSet {
    /// `n` singleton sets `{0}, {1}, ..., {n-1}`.
    pub fn new(n: usize) -> Self {
        Self {
            parent: (0..n).collect(),
            rank: vec![0; n],
        }
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        self.parent.len()
    }

    /// True when the forest has no elements.
    pub fn is_empty(&self) -> bool {
        self.parent.is_empty()
    }

    /// Representative of `x`'s set. Compresses the path on the way back.
    pub fn find(&mut self, x: usize) -> usize {
        let mut root = x;
        while self.parent[root] != root {
            root = self.parent[root];
        }
        let mut node = x;
        while self.parent[node] != root {
            let next = self.parent[node];
            self.parent[node] = root;
            node = next;
        }
        root
    }

    /// Merge the sets containing `a` and `b`. Returns false if they were
    /// already joined.
    pub fn union(&mut self, a: usize, b: usize) -> bool {
        let ra = self.find(a);
        let rb = self.find(b);
        if ra == rb {
            return false;
        }
        match self.rank[ra].cmp(&self.rank[rb]) {
            std::cmp::Ordering::Less => self.parent[ra] = rb,
            std::cmp::Ordering::Greater => self.parent[rb] = ra,
            std::cmp::Ordering::Equal => {
                self.parent[rb] = ra;
                self.rank[ra] += 1;
            }
        }
        true
    }
}

/// A connected group of bottom faces, by index into the face list.
///
/// Indices ascend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Island {
    /// Member face indices.
    pub faces: Vec<usize>,
}

impl Island {
    /// Number of faces in the island.
    pub fn len(&self) -> usize {
        self.faces.len()
    }

    /// True when the island has no faces (never produced by partitioning).
    pub fn is_empty(&self) -> bool {
        self.faces.is_empty()
    }
}

fn points_close(a: &Point2, b: &Point2, threshold: f64) -> bool {
    (a.x - b.x).abs() < threshold && (a.y - b.y).abs() < threshold
}

fn faces_touch(a: &BottomFace, b: &BottomFace, threshold: f64) -> bool {
    a.points
        .iter()
        .any(|pa| b.points.iter().any(|pb| points_close(pa, pb, threshold)))
}

/// Partition faces into islands.
///
/// Every pair `(i, j)` with `j < i` is compared, so this is quadratic in
/// the number of bottom faces. Islands come out in the order their root
/// is first met while scanning indices `0..n`; that order numbers the
/// bases and must stay stable for identical input.
pub fn partition_islands(faces: &[BottomFace], closeness: f64) -> Vec<Island> {
    let mut forest = DisjointSet::new(faces.len());

    for i in 0..faces.len() {
        for j in 0..i {
            if faces_touch(&faces[j], &faces[i], closeness) {
                forest.union(i, j);
            }
        }
    }

    let mut root_slot: Vec<Option<usize>> = vec![None; faces.len()];
    let mut islands: Vec<Island> = Vec::new();
    for i in 0..faces.len() {
        let root = forest.find(i);
        let slot = *root_slot[root].get_or_insert_with(|| {
            islands.push(Island { faces: Vec::new() });
            islands.len() - 1
        });
        islands[slot].faces.push(i);
    }

    islands
}
