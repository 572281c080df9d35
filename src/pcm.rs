//! Sparse parity-check matrix over GF(2).
//!
//! This is the minimal stand-in for the external collaborator that would, in
//! a full system, parse `H` from a code's on-disk representation. It offers
//! only what the decoder and its tests need: validated construction plus
//! row/column iteration.

use crate::error::DecoderError;
use serde::{Deserialize, Serialize};

/// A binary `m x n` matrix stored as, per check row, the sorted list of bit
/// (column) indices with a `1` entry. A column-major index is built
/// alongside it so that both "bits touching a check" and "checks touching a
/// bit" are O(1) lookups, which is what cluster growth needs on every step.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ParityCheckMatrix {
    num_bits: usize,
    /// `rows[check]` is the sorted, deduplicated list of bits in that check.
    rows: Vec<Vec<usize>>,
    /// `cols[bit]` is the sorted, deduplicated list of checks containing that bit.
    cols: Vec<Vec<usize>>,
}

impl ParityCheckMatrix {
    /// Builds a matrix from one support list per check row. Entries are
    /// sorted and deduplicated; an entry referencing a bit `>= num_bits` is
    /// rejected.
    pub fn from_rows(num_bits: usize, rows: Vec<Vec<usize>>) -> Result<Self, DecoderError> {
        let mut cols = vec![Vec::new(); num_bits];
        let mut cleaned_rows = Vec::with_capacity(rows.len());
        for (check, support) in rows.into_iter().enumerate() {
            let mut support = support;
            support.sort_unstable();
            support.dedup();
            for &bit in &support {
                if bit >= num_bits {
                    return Err(DecoderError::ShapeMismatch(format!(
                        "check {check} references bit {bit}, but matrix has only {num_bits} bits"
                    )));
                }
                cols[bit].push(check);
            }
            cleaned_rows.push(support);
        }
        Ok(Self { num_bits, rows: cleaned_rows, cols })
    }

    #[inline]
    pub fn num_bits(&self) -> usize {
        self.num_bits
    }

    #[inline]
    pub fn num_checks(&self) -> usize {
        self.rows.len()
    }

    /// Bits in the given check, in ascending order.
    #[inline]
    pub fn check_support(&self, check: usize) -> &[usize] {
        &self.rows[check]
    }

    /// Checks touching the given bit, in ascending order.
    #[inline]
    pub fn bit_checks(&self, bit: usize) -> &[usize] {
        &self.cols[bit]
    }

    #[inline]
    pub fn column_weight(&self, bit: usize) -> usize {
        self.cols[bit].len()
    }

    /// True if every column has weight exactly 2: the case the spanning-tree
    /// peeling solver is exact for.
    pub fn is_weight_two(&self) -> bool {
        (0..self.num_bits).all(|bit| self.column_weight(bit) == 2)
    }

    /// Computes `H * e` over GF(2) for a dense error vector.
    pub fn multiply(&self, e: &[bool]) -> Result<Vec<bool>, DecoderError> {
        if e.len() != self.num_bits {
            return Err(DecoderError::ShapeMismatch(format!(
                "error vector has length {}, matrix has {} bits",
                e.len(),
                self.num_bits
            )));
        }
        let mut s = vec![false; self.num_checks()];
        for (check, support) in self.rows.iter().enumerate() {
            let mut parity = false;
            for &bit in support {
                parity ^= e[bit];
            }
            s[check] = parity;
        }
        Ok(s)
    }

    /// Validates a syndrome's length against this matrix's check count.
    pub fn validate_syndrome(&self, s: &[bool]) -> Result<(), DecoderError> {
        if s.len() != self.num_checks() {
            return Err(DecoderError::InvalidSyndrome(format!(
                "syndrome has length {}, matrix has {} checks",
                s.len(),
                self.num_checks()
            )));
        }
        Ok(())
    }
}
