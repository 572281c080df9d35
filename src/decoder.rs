//! Top-level Union-Find decoding loop: seed clusters around the syndrome,
//! grow and merge them until every cluster admits a local GF(2) solution,
//! then union the per-cluster solutions into a single error estimate.

use std::collections::HashMap;

use derive_builder::Builder;

use crate::cluster::{two_mut, Cluster, ClusterId};
use crate::error::DecoderError;
use crate::membership::MembershipMap;
use crate::pcm::ParityCheckMatrix;

/// Follows a chain of same-round merge redirects to the id a cluster's
/// members actually ended up owned by. See [`UfDecoder::grow_round`].
fn resolve(redirect: &HashMap<ClusterId, ClusterId>, mut id: ClusterId) -> ClusterId {
    while let Some(&next) = redirect.get(&id) {
        id = next;
    }
    id
}

/// Has `cluster` reached the termination condition for `variant`? spec.md
/// §4.7: the Peel variant (spanning-tree peeling on a weight-2 code) only
/// needs even enclosed-syndrome parity to guarantee a local solution exists;
/// the Matrix variant needs the stronger GF(2) `is_valid` (no `0 = 1` row).
fn cluster_reached_termination(cluster: &Cluster, variant: DecoderVariant) -> bool {
    match variant {
        DecoderVariant::Peel => cluster.enclosed_syndrome_parity_allows_validity(),
        DecoderVariant::Matrix => cluster.is_valid(),
    }
}

/// Which local solver a cluster uses once it stops growing.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum DecoderVariant {
    /// Spanning-tree peeling, exact and linear-time for weight-2 codes.
    /// Falls back to [`DecoderVariant::Matrix`] behavior for any cluster
    /// peeling does not apply to (a cycle, or a column of the wrong weight).
    Peel,
    /// General GF(2) elimination via the cluster's incremental RREF.
    Matrix,
}

/// Validated, immutable configuration for a decode call.
///
/// Negative raw inputs are rejected by [`DecodeOptions::validate`] rather
/// than by the type system, mirroring how the teacher's settings layer
/// accepts loosely typed CLI input and validates it explicitly before use.
#[derive(Builder, Clone, Debug)]
pub struct DecodeOptions {
    #[builder(default = "DecoderVariant::Matrix")]
    pub variant: DecoderVariant,
    /// Per-bit growth priority: lower weight is claimed first when a growth
    /// round must be capped by `bits_per_step`. `None` leaves candidates in
    /// their natural (ascending index) order.
    #[builder(default, setter(strip_option))]
    pub bit_weights: Option<Vec<f64>>,
    /// Maximum number of new bits a single cluster may claim per growth
    /// round. `<= 0` means unbounded.
    #[builder(default = "0")]
    bits_per_step: i64,
    /// Maximum number of simultaneously active clusters the bit-seeded
    /// variant may create. `<= 0` means unbounded.
    #[builder(default = "0")]
    cluster_count_limit: i64,
}

impl DecodeOptions {
    pub fn bits_per_step(&self) -> Option<usize> {
        (self.bits_per_step > 0).then_some(self.bits_per_step as usize)
    }

    pub fn cluster_count_limit(&self) -> Option<usize> {
        (self.cluster_count_limit > 0).then_some(self.cluster_count_limit as usize)
    }

    pub fn validate(&self) -> Result<(), DecoderError> {
        if self.bits_per_step < 0 {
            return Err(DecoderError::InvalidParameter(
                "bits_per_step must be >= 0".to_string(),
            ));
        }
        if self.cluster_count_limit < 0 {
            return Err(DecoderError::InvalidParameter(
                "cluster_count_limit must be >= 0".to_string(),
            ));
        }
        if let Some(weights) = &self.bit_weights {
            if weights.iter().any(|w| !w.is_finite()) {
                return Err(DecoderError::InvalidParameter(
                    "bit_weights must contain only finite values".to_string(),
                ));
            }
        }
        Ok(())
    }
}

impl Default for DecodeOptions {
    fn default() -> Self {
        DecodeOptionsBuilder::default()
            .build()
            .expect("default-valued options are always valid")
    }
}

/// Union-Find decoder for a fixed parity-check matrix.
pub struct UfDecoder<'a> {
    h: &'a ParityCheckMatrix,
}

impl<'a> UfDecoder<'a> {
    pub fn new(h: &'a ParityCheckMatrix) -> Self {
        Self { h }
    }

    pub fn parity_check_matrix(&self) -> &ParityCheckMatrix {
        self.h
    }

    /// Decodes `syndrome`, seeding one cluster per unsatisfied check.
    pub fn decode(
        &self,
        syndrome: &[bool],
        options: &DecodeOptions,
    ) -> Result<Vec<bool>, DecoderError> {
        options.validate()?;
        self.validate_inputs(syndrome, options)?;

        let mut arena: Vec<Cluster> = Vec::new();
        let mut membership = MembershipMap::new();
        let mut active_ids: Vec<ClusterId> = Vec::new();

        for (check, &unsatisfied) in syndrome.iter().enumerate() {
            if unsatisfied {
                let id = ClusterId::from_raw(arena.len());
                arena.push(Cluster::seed(id, check, syndrome));
                membership.claim_check(check, id);
                active_ids.push(id);
            }
        }

        if active_ids.is_empty() {
            return Ok(vec![false; self.h.num_bits()]);
        }

        let round_limit = self.h.num_bits() + self.h.num_checks() + 1;
        for _ in 0..round_limit {
            active_ids.retain(|id| arena[id.raw()].is_active());
            if active_ids
                .iter()
                .all(|id| cluster_reached_termination(&arena[id.raw()], options.variant))
            {
                break;
            }
            self.grow_round(&mut arena, &mut membership, syndrome, options, &active_ids)?;
        }
        active_ids.retain(|id| arena[id.raw()].is_active());
        if !active_ids
            .iter()
            .all(|id| cluster_reached_termination(&arena[id.raw()], options.variant))
        {
            return Err(DecoderError::InternalInvariantViolation(
                "clusters exhausted the reachable graph without reaching a valid state"
                    .to_string(),
            ));
        }

        self.extract(&arena, &active_ids, syndrome, options)
    }

    /// Bit-seeded variant (§4.8): clusters are grown from a caller-supplied
    /// set of bits rather than from unsatisfied checks, and growth continues
    /// until every unsatisfied check is owned by a cluster that has reached
    /// a valid local state.
    pub fn decode_bit_seeded(
        &self,
        syndrome: &[bool],
        seed_bits: &[usize],
        options: &DecodeOptions,
    ) -> Result<Vec<bool>, DecoderError> {
        options.validate()?;
        self.validate_inputs(syndrome, options)?;
        for &bit in seed_bits {
            if bit >= self.h.num_bits() {
                return Err(DecoderError::InvalidParameter(format!(
                    "seed bit {bit} is out of range for a {}-bit matrix",
                    self.h.num_bits()
                )));
            }
        }

        let mut arena: Vec<Cluster> = Vec::new();
        let mut membership = MembershipMap::new();
        let mut active_ids: Vec<ClusterId> = Vec::new();

        for &bit in seed_bits {
            if membership.is_bit_owned(bit) {
                continue;
            }
            if let Some(limit) = options.cluster_count_limit() {
                if active_ids.len() >= limit {
                    break;
                }
            }
            let id = ClusterId::from_raw(arena.len());
            let mut cluster = Cluster::seed_from_bit(id);
            cluster.add_bit(bit, self.h);
            membership.claim_bit(bit, id);
            for check in cluster.candidate_checks_for_bit(bit, self.h) {
                if membership.is_check_owned(check) {
                    continue;
                }
                cluster.add_check(check, self.h, syndrome);
                membership.claim_check(check, id);
            }
            arena.push(cluster);
            active_ids.push(id);
        }

        let is_fully_covered = |arena: &[Cluster], membership: &MembershipMap| {
            (0..self.h.num_checks()).filter(|&c| syndrome[c]).all(|c| {
                membership.check_owner(c).is_some_and(|id| {
                    cluster_reached_termination(&arena[id.raw()], options.variant)
                })
            })
        };

        let round_limit = self.h.num_bits() + self.h.num_checks() + 1;
        for _ in 0..round_limit {
            if is_fully_covered(&arena, &membership) {
                break;
            }
            active_ids.retain(|id| arena[id.raw()].is_active());
            self.grow_round(&mut arena, &mut membership, syndrome, options, &active_ids)?;
        }
        if !is_fully_covered(&arena, &membership) {
            return Err(DecoderError::InternalInvariantViolation(
                "bit-seeded growth did not reach every unsatisfied check".to_string(),
            ));
        }

        active_ids.retain(|id| arena[id.raw()].is_active());
        self.extract(&arena, &active_ids, syndrome, options)
    }

    fn validate_inputs(
        &self,
        syndrome: &[bool],
        options: &DecodeOptions,
    ) -> Result<(), DecoderError> {
        self.h.validate_syndrome(syndrome)?;
        if let Some(weights) = &options.bit_weights {
            if weights.len() != self.h.num_bits() {
                return Err(DecoderError::ShapeMismatch(format!(
                    "bit_weights has length {}, matrix has {} bits",
                    weights.len(),
                    self.h.num_bits()
                )));
            }
        }
        Ok(())
    }

    fn extract(
        &self,
        arena: &[Cluster],
        active_ids: &[ClusterId],
        syndrome: &[bool],
        options: &DecodeOptions,
    ) -> Result<Vec<bool>, DecoderError> {
        let mut e = vec![false; self.h.num_bits()];
        for id in active_ids {
            let cluster = &arena[id.raw()];
            let local = match options.variant {
                DecoderVariant::Peel => cluster
                    .peel_decode(self.h, syndrome)
                    .unwrap_or_else(|| cluster.solution()),
                DecoderVariant::Matrix => cluster.solution(),
            };
            for bit in local {
                e[bit] = true;
            }
        }
        let recomputed = self.h.multiply(&e)?;
        if recomputed != syndrome {
            return Err(DecoderError::InternalInvariantViolation(
                "decoded error estimate does not reproduce the syndrome".to_string(),
            ));
        }
        Ok(e)
    }

    /// Grows every still-invalid cluster in `active_ids` by one round,
    /// claiming unowned bits/checks outright and scheduling a merge whenever
    /// two clusters contest the same bit or check.
    fn grow_round(
        &self,
        arena: &mut Vec<Cluster>,
        membership: &mut MembershipMap,
        syndrome: &[bool],
        options: &DecodeOptions,
        active_ids: &[ClusterId],
    ) -> Result<(), DecoderError> {
        let mut merges: Vec<(ClusterId, ClusterId)> = Vec::new();

        for &id in active_ids {
            if !arena[id.raw()].is_active()
                || cluster_reached_termination(&arena[id.raw()], options.variant)
            {
                continue;
            }
            let mut candidates = arena[id.raw()].candidate_bits(self.h);
            if candidates.is_empty() {
                continue;
            }
            // bits_per_step only caps growth when a weight ordering exists to
            // pick the cheapest candidates from (spec.md §6: "effective only
            // with weights"); unweighted growth always adds every candidate.
            if let (Some(cap), Some(weights)) = (options.bits_per_step(), &options.bit_weights) {
                if candidates.len() > cap {
                    candidates.sort_by(|&a, &b| {
                        weights[a]
                            .partial_cmp(&weights[b])
                            .unwrap_or(std::cmp::Ordering::Equal)
                    });
                    candidates.truncate(cap);
                    candidates.sort_unstable();
                }
            }

            for bit in candidates {
                match membership.bit_owner(bit) {
                    None => {
                        arena[id.raw()].add_bit(bit, self.h);
                        membership.claim_bit(bit, id);
                    }
                    Some(owner) if owner == id => {}
                    Some(owner) => {
                        arena[id.raw()].add_bit(bit, self.h);
                        arena[owner.raw()].add_bit(bit, self.h);
                        merges.push((id, owner));
                    }
                }
                for check in arena[id.raw()].candidate_checks_for_bit(bit, self.h) {
                    match membership.check_owner(check) {
                        None => {
                            arena[id.raw()].add_check(check, self.h, syndrome);
                            membership.claim_check(check, id);
                        }
                        Some(owner) if owner == id => {}
                        Some(owner) => {
                            arena[id.raw()].add_check(check, self.h, syndrome);
                            arena[owner.raw()].add_check(check, self.h, syndrome);
                            merges.push((id, owner));
                        }
                    }
                }
            }
        }

        // A single round can record more than one merge pair touching the
        // same cluster (three or more clusters contesting one high-degree
        // bit/check). Applying them in order may present a pair where one
        // side was already absorbed by an earlier pair in this same batch;
        // `redirect` tracks where an absorbed id's members actually ended up
        // so such a pair still resolves to its current survivor instead of
        // silently dropping the merge.
        let mut redirect: HashMap<ClusterId, ClusterId> = HashMap::new();
        for (a, b) in merges {
            let a = resolve(&redirect, a);
            let b = resolve(&redirect, b);
            if a == b {
                continue;
            }
            if let Some((survivor, absorbed)) = self.merge(arena, membership, a, b, syndrome) {
                redirect.insert(absorbed, survivor);
            }
        }
        Ok(())
    }

    /// Merges `a` and `b`, keeping the larger side, and returns
    /// `(survivor, absorbed)`. `None` if both ids already named the same
    /// active cluster or one was already inactive (defensive; should not
    /// happen for a freshly resolved pair).
    fn merge(
        &self,
        arena: &mut [Cluster],
        membership: &mut MembershipMap,
        a: ClusterId,
        b: ClusterId,
        syndrome: &[bool],
    ) -> Option<(ClusterId, ClusterId)> {
        if a == b || !arena[a.raw()].is_active() || !arena[b.raw()].is_active() {
            return None;
        }
        let (small, large) = if arena[a.raw()].size() <= arena[b.raw()].size() {
            (a, b)
        } else {
            (b, a)
        };
        let (small_ref, large_ref) = two_mut(arena, small.raw(), large.raw());
        large_ref.absorb(small_ref, self.h, syndrome);
        small_ref.deactivate();
        membership.reassign_all(small, large);
        Some((large, small))
    }
}
