//! A single growing cluster: the set of bits/checks it currently owns, its
//! incremental GF(2) system, and the two ways it can be solved locally.

use std::collections::{BTreeSet, HashMap, HashSet, VecDeque};

use crate::gf2::Gf2Plu;
use crate::pcm::ParityCheckMatrix;

/// Arena index into the decoder's `Vec<Cluster>`. Stands in for the raw
/// pointers the source implementation used to link clusters together.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClusterId(usize);

impl ClusterId {
    pub fn from_raw(index: usize) -> Self {
        Self(index)
    }

    pub fn raw(self) -> usize {
        self.0
    }
}

#[derive(Debug)]
pub struct Cluster {
    id: ClusterId,
    active: bool,
    bits: BTreeSet<usize>,
    checks: BTreeSet<usize>,
    /// Checks in `checks` with at least one bit neighbor still outside the
    /// cluster. Pruned lazily in [`Cluster::candidate_bits`] rather than kept
    /// perfectly up to date on every `add_bit`, mirroring the design doc's
    /// "if row j contributed no outside neighbors, remove j" growth step.
    boundary_checks: BTreeSet<usize>,
    /// Checks with syndrome bit 1 that have been absorbed into this cluster.
    /// Never shrinks: once a check's unsatisfied syndrome is assigned to a
    /// cluster it stays assigned, even if the check later becomes interior.
    enclosed_syndromes: BTreeSet<usize>,
    gf2: Gf2Plu,
}

impl Cluster {
    /// Seeds a new cluster from a single unsatisfied check, with no bits yet.
    pub fn seed(id: ClusterId, check: usize, syndrome: &[bool]) -> Self {
        let mut cluster = Self {
            id,
            active: true,
            bits: BTreeSet::new(),
            checks: BTreeSet::new(),
            boundary_checks: BTreeSet::new(),
            enclosed_syndromes: BTreeSet::new(),
            gf2: Gf2Plu::new(),
        };
        cluster.checks.insert(check);
        cluster.boundary_checks.insert(check);
        if syndrome[check] {
            cluster.enclosed_syndromes.insert(check);
        }
        cluster.gf2.add_check(check, &[], syndrome[check]);
        cluster
    }

    /// Seeds a new, empty cluster meant to be grown from a single bit via
    /// [`Cluster::add_bit`] rather than from an unsatisfied check.
    pub fn seed_from_bit(id: ClusterId) -> Self {
        Self {
            id,
            active: true,
            bits: BTreeSet::new(),
            checks: BTreeSet::new(),
            boundary_checks: BTreeSet::new(),
            enclosed_syndromes: BTreeSet::new(),
            gf2: Gf2Plu::new(),
        }
    }

    pub fn id(&self) -> ClusterId {
        self.id
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn deactivate(&mut self) {
        self.active = false;
    }

    pub fn bits(&self) -> &BTreeSet<usize> {
        &self.bits
    }

    pub fn checks(&self) -> &BTreeSet<usize> {
        &self.checks
    }

    pub fn enclosed_syndromes(&self) -> &BTreeSet<usize> {
        &self.enclosed_syndromes
    }

    /// Necessary (not sufficient) precondition for validity (spec invariant
    /// 3): a cluster with an odd number of enclosed unsatisfied checks can
    /// never locally explain its syndrome, regardless of which bits it adds.
    pub fn enclosed_syndrome_parity_allows_validity(&self) -> bool {
        self.enclosed_syndromes.len() % 2 == 0
    }

    /// Size used to decide which side of a merge survives: the larger
    /// cluster (by total node count) absorbs the smaller one.
    pub fn size(&self) -> usize {
        self.bits.len() + self.checks.len()
    }

    pub fn is_valid(&self) -> bool {
        self.gf2.is_valid()
    }

    /// Global bit indices set in this cluster's local particular solution.
    pub fn solution(&self) -> Vec<usize> {
        self.gf2.solution()
    }

    /// Adds `bit` to the cluster if not already present. Safe to call
    /// redundantly: a bit already owned by this cluster is a no-op, which is
    /// what makes growth/merge bookkeeping tolerant of contested claims that
    /// get resolved into the same cluster.
    pub fn add_bit(&mut self, bit: usize, h: &ParityCheckMatrix) {
        if !self.bits.insert(bit) {
            return;
        }
        self.gf2.add_column(bit);
        let affected: Vec<usize> = h
            .bit_checks(bit)
            .iter()
            .copied()
            .filter(|c| self.checks.contains(c))
            .collect();
        self.gf2.add_bit(bit, &affected);
    }

    /// Adds `check` to the cluster if not already present.
    pub fn add_check(&mut self, check: usize, h: &ParityCheckMatrix, syndrome: &[bool]) {
        if !self.checks.insert(check) {
            return;
        }
        if syndrome[check] {
            self.enclosed_syndromes.insert(check);
        }
        let has_outside_neighbor = h.check_support(check).iter().any(|b| !self.bits.contains(b));
        if has_outside_neighbor {
            self.boundary_checks.insert(check);
        }
        let support: Vec<usize> = h
            .check_support(check)
            .iter()
            .copied()
            .filter(|b| self.bits.contains(b))
            .collect();
        self.gf2.add_check(check, &support, syndrome[check]);
    }

    /// Candidate bits for the next growth round (design doc §4.2 step 2):
    /// rebuilds the boundary by checking, for each check currently believed
    /// to be on the boundary, whether it still has a neighbor bit outside
    /// the cluster — pruning it from `boundary_checks` if not — then
    /// collects every such neighbor bit not already owned. Returned in
    /// ascending order so callers get a deterministic frontier.
    pub fn candidate_bits(&mut self, h: &ParityCheckMatrix) -> Vec<usize> {
        let mut candidates = BTreeSet::new();
        self.boundary_checks.retain(|&check| {
            let mut still_boundary = false;
            for &bit in h.check_support(check) {
                if !self.bits.contains(&bit) {
                    candidates.insert(bit);
                    still_boundary = true;
                }
            }
            still_boundary
        });
        candidates.into_iter().collect()
    }

    /// Checks touching `bit` that this cluster does not yet own, computed
    /// after `bit` has already been added.
    pub fn candidate_checks_for_bit(&self, bit: usize, h: &ParityCheckMatrix) -> Vec<usize> {
        h.bit_checks(bit)
            .iter()
            .copied()
            .filter(|c| !self.checks.contains(c))
            .collect()
    }

    /// Absorbs every bit and check of `other` into `self`. Used when a
    /// smaller cluster merges into a larger one; idempotent per-member, so a
    /// member both sides already happen to share is harmless.
    pub fn absorb(&mut self, other: &Cluster, h: &ParityCheckMatrix, syndrome: &[bool]) {
        for &bit in &other.bits {
            self.add_bit(bit, h);
        }
        for &check in &other.checks {
            self.add_check(check, h, syndrome);
        }
    }

    /// Spanning-tree peeling solver, exact for codes whose every column has
    /// weight 2. A bit that is fully enclosed (both its checks are in the
    /// cluster) is an edge between those two checks; a bit with only one
    /// check globally (an open boundary, column weight 1) is a pendant edge
    /// that can never close a cycle and is resolved last at its check, after
    /// every other bit incident to that check. Returns `None` if the
    /// induced check-graph has a cycle, a column of weight other than 1 or
    /// 2, a bit not yet fully enclosed, or a disconnected remainder — the
    /// caller should fall back to the general-purpose matrix solver then.
    pub fn peel_decode(&self, h: &ParityCheckMatrix, syndrome: &[bool]) -> Option<Vec<usize>> {
        enum Edge {
            Internal(usize, usize),
            Boundary(usize),
        }

        let mut adjacency: HashMap<usize, Vec<Edge>> = HashMap::new();
        let mut internal_pairs: Vec<(usize, usize)> = Vec::new();
        for &bit in &self.bits {
            let global = h.bit_checks(bit);
            let enclosed: Vec<usize> =
                global.iter().copied().filter(|c| self.checks.contains(c)).collect();
            match (global.len(), enclosed.len()) {
                (1, 1) => adjacency.entry(enclosed[0]).or_default().push(Edge::Boundary(bit)),
                (2, 2) if enclosed[0] != enclosed[1] => {
                    adjacency.entry(enclosed[0]).or_default().push(Edge::Internal(bit, enclosed[1]));
                    adjacency.entry(enclosed[1]).or_default().push(Edge::Internal(bit, enclosed[0]));
                    internal_pairs.push((enclosed[0], enclosed[1]));
                }
                _ => return None,
            }
        }

        // Iterative union-find with path halving, used only to detect
        // whether the cluster's internal (check-to-check) edges close a
        // cycle; pendant boundary edges can never do so.
        let mut parent: HashMap<usize, usize> = self.checks.iter().map(|&c| (c, c)).collect();
        fn find(parent: &mut HashMap<usize, usize>, mut x: usize) -> usize {
            while parent[&x] != x {
                let grandparent = parent[&parent[&x]];
                parent.insert(x, grandparent);
                x = grandparent;
            }
            x
        }
        for &(c1, c2) in &internal_pairs {
            let r1 = find(&mut parent, c1);
            let r2 = find(&mut parent, c2);
            if r1 == r2 {
                return None;
            }
            parent.insert(r1, r2);
        }

        let mut real_degree: HashMap<usize, usize> = self
            .checks
            .iter()
            .map(|&c| {
                let d = adjacency
                    .get(&c)
                    .map_or(0, |edges| edges.iter().filter(|e| matches!(e, Edge::Internal(..))).count());
                (c, d)
            })
            .collect();
        let mut residual: HashMap<usize, bool> =
            self.checks.iter().map(|&c| (c, syndrome[c])).collect();
        let mut processed_checks: HashSet<usize> = HashSet::new();
        let mut processed_bits: HashSet<usize> = HashSet::new();
        let mut solution = Vec::new();
        let mut queue: VecDeque<usize> =
            real_degree.iter().filter(|&(_, &d)| d <= 1).map(|(&c, _)| c).collect();

        while let Some(check) = queue.pop_front() {
            if processed_checks.contains(&check) {
                continue;
            }
            let edges = adjacency.get(&check);
            let unprocessed_boundary: Vec<usize> = edges
                .map(|edges| {
                    edges
                        .iter()
                        .filter_map(|e| match e {
                            Edge::Boundary(bit) if !processed_bits.contains(bit) => Some(*bit),
                            _ => None,
                        })
                        .collect()
                })
                .unwrap_or_default();
            let internal_edge = edges.and_then(|edges| {
                edges.iter().find_map(|e| match e {
                    Edge::Internal(bit, other) if !processed_bits.contains(bit) => Some((*bit, *other)),
                    _ => None,
                })
            });

            // All but one of this check's remaining edges are free/redundant
            // once it is ready to resolve; the reserved edge (the internal
            // one if present, else the last boundary bit) absorbs whatever
            // residual is left, and the rest are set to zero.
            let free_count = if internal_edge.is_some() {
                unprocessed_boundary.len()
            } else {
                unprocessed_boundary.len().saturating_sub(1)
            };
            for &bit in unprocessed_boundary.iter().take(free_count) {
                processed_bits.insert(bit);
            }

            if let Some((bit, other)) = internal_edge {
                let value = residual[&check];
                if value {
                    solution.push(bit);
                }
                processed_bits.insert(bit);
                processed_checks.insert(check);
                if let Some(r) = residual.get_mut(&other) {
                    *r ^= value;
                }
                if let Some(d) = real_degree.get_mut(&other) {
                    *d = d.saturating_sub(1);
                    if *d <= 1 && !processed_checks.contains(&other) {
                        queue.push_back(other);
                    }
                }
            } else {
                if let Some(&last_boundary) = unprocessed_boundary.get(free_count) {
                    let value = residual[&check];
                    if value {
                        solution.push(last_boundary);
                    }
                    processed_bits.insert(last_boundary);
                } else if residual[&check] {
                    // No edges left at all to absorb a nonzero residual.
                    return None;
                }
                processed_checks.insert(check);
            }
        }

        if processed_checks.len() != self.checks.len() {
            return None;
        }
        solution.sort_unstable();
        Some(solution)
    }
}

/// Splits `arena` into two mutable references at distinct indices `i` and
/// `j`. Needed because merging two clusters requires mutating one while
/// reading (then dropping) the other, and both live in the same `Vec`.
pub fn two_mut(arena: &mut [Cluster], i: usize, j: usize) -> (&mut Cluster, &mut Cluster) {
    assert_ne!(i, j, "cannot borrow the same cluster mutably twice");
    if i < j {
        let (left, right) = arena.split_at_mut(j);
        (&mut left[i], &mut right[0])
    } else {
        let (left, right) = arena.split_at_mut(i);
        (&mut right[0], &mut left[j])
    }
}
