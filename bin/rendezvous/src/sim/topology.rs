//! Overlay shape: a ring with random chords.

use std::collections::BTreeSet;

use rand::Rng;

/// Undirected adjacency between simulated nodes.
#[derive(Debug, Clone)]
pub(crate) struct Topology {
    adjacency: Vec<BTreeSet<usize>>,
}

impl Topology {
    /// Ring of `nodes` plus up to `chords` random links per node.
    pub(crate) fn ring_with_chords<R: Rng>(nodes: usize, chords: usize, rng: &mut R) -> Self {
        let mut topology = Self {
            adjacency: vec![BTreeSet::new(); nodes],
        };

        for node in 0..nodes {
            topology.link(node, (node + 1) % nodes);
            for _ in 0..chords {
                topology.link(node, rng.random_range(0..nodes));
            }
        }
        topology
    }

    fn link(&mut self, a: usize, b: usize) {
        if a == b {
            return;
        }
        if let Some(set) = self.adjacency.get_mut(a) {
            set.insert(b);
        }
        if let Some(set) = self.adjacency.get_mut(b) {
            set.insert(a);
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.adjacency.len()
    }

    pub(crate) fn neighbors(&self, node: usize) -> impl Iterator<Item = usize> + '_ {
        self.adjacency.get(node).into_iter().flatten().copied()
    }

    pub(crate) fn link_count(&self) -> usize {
        self.adjacency.iter().map(BTreeSet::len).sum::<usize>() / 2
    }
}
