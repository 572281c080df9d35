//! End-to-end scenarios straight out of the decoder's own design doc: small,
//! hand-checkable codes where the expected syndrome-matching correction (or
//! class of corrections) is known in advance.

use uf_decoder::{DecodeOptions, DecodeOptionsBuilder, DecoderVariant, ParityCheckMatrix, UfDecoder};

fn to_bits(bits: &[u8]) -> Vec<bool> {
    bits.iter().map(|&b| b != 0).collect()
}

/// Repetition-style chain: check j couples bits j and j+1. Scenarios A/B/E
/// in the design doc are stated against exactly this shape.
fn chain_pcm(checks: usize) -> ParityCheckMatrix {
    let rows: Vec<Vec<usize>> = (0..checks).map(|c| vec![c, c + 1]).collect();
    ParityCheckMatrix::from_rows(checks + 1, rows).unwrap()
}

// Scenario A: single error in the interior of a length-4 repetition code.
#[test]
fn scenario_a_single_error_peels_to_matching_bit() {
    let h = chain_pcm(3);
    let syndrome = to_bits(&[1, 1, 0]);
    let options = DecodeOptionsBuilder::default()
        .variant(DecoderVariant::Peel)
        .build()
        .unwrap();
    let e = UfDecoder::new(&h).decode(&syndrome, &options).unwrap();
    assert_eq!(e, to_bits(&[0, 1, 0, 0]));
    assert_eq!(h.multiply(&e).unwrap(), syndrome);
}

// Scenario B: two separated errors; the decoder need not reproduce the
// original error pattern, only a syndrome-matching one.
#[test]
fn scenario_b_two_separated_errors_reproduce_syndrome() {
    let h = chain_pcm(3);
    let syndrome = to_bits(&[1, 0, 1]);
    let options = DecodeOptionsBuilder::default()
        .variant(DecoderVariant::Peel)
        .build()
        .unwrap();
    let e = UfDecoder::new(&h).decode(&syndrome, &options).unwrap();
    assert_eq!(h.multiply(&e).unwrap(), syndrome);
}

// Scenario C: zero syndrome creates no clusters and returns the zero vector.
#[test]
fn scenario_c_zero_syndrome_returns_zero_vector() {
    let h = chain_pcm(5);
    let syndrome = vec![false; 5];
    let e = UfDecoder::new(&h)
        .decode(&syndrome, &DecodeOptions::default())
        .unwrap();
    assert_eq!(e, vec![false; 6]);
}

// Scenario D: trivial 1x1 system.
#[test]
fn scenario_d_trivial_one_by_one() {
    let h = ParityCheckMatrix::from_rows(1, vec![vec![0]]).unwrap();
    let syndrome = to_bits(&[1]);
    let e = UfDecoder::new(&h)
        .decode(&syndrome, &DecodeOptions::default())
        .unwrap();
    assert_eq!(e, to_bits(&[1]));
}

// Scenario E: weighted growth capped at one candidate per step on a 4-cycle.
#[test]
fn scenario_e_weighted_growth_cap_on_four_cycle() {
    let rows = vec![vec![0, 1], vec![1, 2], vec![2, 3], vec![3, 0]];
    let h = ParityCheckMatrix::from_rows(4, rows).unwrap();
    let syndrome = to_bits(&[1, 0, 1, 0]);
    let options = DecodeOptionsBuilder::default()
        .variant(DecoderVariant::Matrix)
        .bit_weights(vec![0.1, 0.9, 0.2, 0.8])
        .bits_per_step(1)
        .build()
        .unwrap();
    let e = UfDecoder::new(&h).decode(&syndrome, &options).unwrap();
    assert_eq!(h.multiply(&e).unwrap(), syndrome);
}

// Scenario F: two unsatisfied checks whose clusters come to share a bit
// after growth must merge into a single cluster, not stay partitioned.
#[test]
fn scenario_f_merging_clusters_reach_consistent_solution() {
    // Checks 0 and 2 are both unsatisfied; bit 1 is shared between the
    // clusters seeded at check 0 (via bit 0) and check 2 (via bit 2) once
    // each has grown one layer, forcing a merge at bit 1/check 1.
    let rows = vec![vec![0, 1], vec![1, 2], vec![2, 3]];
    let h = ParityCheckMatrix::from_rows(4, rows).unwrap();
    let syndrome = to_bits(&[1, 0, 1]);
    let e = UfDecoder::new(&h)
        .decode(&syndrome, &DecodeOptions::default())
        .unwrap();
    assert_eq!(h.multiply(&e).unwrap(), syndrome);
}

#[test]
fn matrix_variant_matches_peel_variant_on_weight_two_code() {
    let h = chain_pcm(6);
    let syndrome = to_bits(&[0, 1, 1, 0, 0, 0]);
    let peel_options = DecodeOptionsBuilder::default()
        .variant(DecoderVariant::Peel)
        .build()
        .unwrap();
    let matrix_options = DecodeOptionsBuilder::default()
        .variant(DecoderVariant::Matrix)
        .build()
        .unwrap();
    let decoder = UfDecoder::new(&h);
    let e_peel = decoder.decode(&syndrome, &peel_options).unwrap();
    let e_matrix = decoder.decode(&syndrome, &matrix_options).unwrap();
    assert_eq!(h.multiply(&e_peel).unwrap(), syndrome);
    assert_eq!(h.multiply(&e_matrix).unwrap(), syndrome);
}

#[test]
fn bit_seeded_variant_covers_every_unsatisfied_check() {
    let h = chain_pcm(5);
    let syndrome = to_bits(&[0, 1, 1, 0, 0]);
    let options = DecodeOptions::default();
    let e = UfDecoder::new(&h)
        .decode_bit_seeded(&syndrome, &[2], &options)
        .unwrap();
    assert_eq!(h.multiply(&e).unwrap(), syndrome);
}

#[test]
fn shape_mismatch_is_reported_not_panicked() {
    let h = chain_pcm(3);
    let err = UfDecoder::new(&h)
        .decode(&[false, true], &DecodeOptions::default())
        .unwrap_err();
    assert!(err.to_string().contains("syndrome"));
}
