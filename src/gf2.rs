//! Incremental reduced row-echelon form (RREF) over GF(2).
//!
//! A cluster's local system grows one check (row) or one bit (column) at a
//! time. Recomputing the full elimination from scratch on every growth step
//! would make decoding quadratic-or-worse in the number of growth rounds;
//! instead this keeps a running RREF and only touches the rows/columns a
//! given growth step actually affects.
//!
//! Two invariants make the incremental update sound:
//! - Once a column becomes a pivot column, it stays a pivot column (in
//!   strict RREF, exactly one row has a 1 there, forever).
//! - A newly added column cannot be nonzero in any row that existed before
//!   it did, except the rows the caller explicitly marks as affected — so
//!   its effect on every *other* row can be derived purely by replaying the
//!   history of row-XOR operations recorded while eliminating.

use std::collections::{BTreeSet, HashMap, HashSet};

#[derive(Clone, Debug, Default)]
struct RowData {
    cols: BTreeSet<usize>,
    rhs: bool,
}

fn xor_into(target: &mut RowData, source: &RowData) {
    for &c in &source.cols {
        if !target.cols.remove(&c) {
            target.cols.insert(c);
        }
    }
    target.rhs ^= source.rhs;
}

#[derive(Clone, Debug, Default)]
pub struct Gf2Plu {
    col_ids: Vec<usize>,
    col_index: HashMap<usize, usize>,
    row_ids: Vec<usize>,
    row_index: HashMap<usize, usize>,
    raw_rows: Vec<RowData>,
    reduced_rows: Vec<RowData>,
    pivot_col_of_row: Vec<Option<usize>>,
    pivot_row_of_col: HashMap<usize, usize>,
    /// Chronological log of `reduced_rows[target] ^= reduced_rows[source]`,
    /// recorded at the time each elimination step happened. Replayed (not
    /// undone) when a new column needs to be propagated onto rows that
    /// predate it.
    ops_log: Vec<(usize, usize)>,
}

impl Gf2Plu {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn num_rows(&self) -> usize {
        self.row_ids.len()
    }

    pub fn num_cols(&self) -> usize {
        self.col_ids.len()
    }

    pub fn has_row(&self, global_check: usize) -> bool {
        self.row_index.contains_key(&global_check)
    }

    pub fn has_col(&self, global_bit: usize) -> bool {
        self.col_index.contains_key(&global_bit)
    }

    fn register_column(&mut self, global_bit: usize) -> usize {
        if let Some(&idx) = self.col_index.get(&global_bit) {
            return idx;
        }
        let idx = self.col_ids.len();
        self.col_ids.push(global_bit);
        self.col_index.insert(global_bit, idx);
        idx
    }

    /// Registers a new bit as a column without yet touching any row. Used
    /// when a cluster claims a bit before it has learned which of its
    /// existing checks (if any) the bit participates in.
    pub fn add_column(&mut self, global_bit: usize) {
        self.register_column(global_bit);
    }

    /// Informs the system that `global_bit` (already a column, or becoming
    /// one here) has a `1` entry in every row of `affected_checks` that is
    /// already present locally. Propagates the new column through the
    /// elimination history so derived rows see its effect too.
    pub fn add_bit(&mut self, global_bit: usize, affected_checks: &[usize]) {
        let local_col = self.register_column(global_bit);
        let mut dirty: HashSet<usize> = HashSet::new();
        for &check in affected_checks {
            if let Some(&local_row) = self.row_index.get(&check) {
                self.raw_rows[local_row].cols.insert(local_col);
                dirty.insert(local_row);
            }
        }
        if dirty.is_empty() {
            return;
        }
        for &(target, source) in &self.ops_log {
            if dirty.contains(&source) && !dirty.remove(&target) {
                dirty.insert(target);
            }
        }
        let mut touched: Vec<usize> = dirty.into_iter().collect();
        touched.sort_unstable();
        for &row in &touched {
            self.reduced_rows[row].cols.insert(local_col);
        }
        // A row with no pivot was, until now, either a genuinely empty row or
        // a "0 = rhs" row pending resolution; either way it never ran the
        // pivot-assignment half of elimination because it had nothing to
        // pivot on. Now that it may hold its first nonzero entry, give it the
        // same treatment a brand-new row gets in `add_check`: let it claim
        // the column as its own pivot, or cancel against a sibling row that
        // claims it first.
        for &row in &touched {
            if self.pivot_col_of_row[row].is_none() && !self.reduced_rows[row].cols.is_empty() {
                self.eliminate_row(row);
            }
        }
    }

    /// Adds a new check (row). `global_bits` is the full support of that
    /// check restricted to bits already in the cluster; any bit not yet
    /// registered as a column is registered here. `rhs` is the syndrome bit
    /// for this check.
    pub fn add_check(&mut self, global_check: usize, global_bits: &[usize], rhs: bool) {
        if self.row_index.contains_key(&global_check) {
            return;
        }
        let local_row = self.row_ids.len();
        self.row_ids.push(global_check);
        self.row_index.insert(global_check, local_row);
        let cols: BTreeSet<usize> =
            global_bits.iter().map(|&b| self.register_column(b)).collect();
        let row = RowData { cols, rhs };
        self.raw_rows.push(row.clone());
        self.reduced_rows.push(row);
        self.pivot_col_of_row.push(None);
        self.eliminate_row(local_row);
    }

    fn eliminate_row(&mut self, local_row: usize) {
        loop {
            let hit = self.reduced_rows[local_row]
                .cols
                .iter()
                .find_map(|c| self.pivot_row_of_col.get(c).copied().map(|r| (r, *c)));
            match hit {
                Some((prow, _)) if prow != local_row => {
                    let source = self.reduced_rows[prow].clone();
                    xor_into(&mut self.reduced_rows[local_row], &source);
                    self.ops_log.push((local_row, prow));
                }
                _ => break,
            }
        }
        if let Some(&pivot_col) = self.reduced_rows[local_row].cols.iter().next() {
            self.pivot_row_of_col.insert(pivot_col, local_row);
            self.pivot_col_of_row[local_row] = Some(pivot_col);
            let rows_to_fix: Vec<usize> = (0..self.reduced_rows.len())
                .filter(|&r| r != local_row && self.reduced_rows[r].cols.contains(&pivot_col))
                .collect();
            for r in rows_to_fix {
                let source = self.reduced_rows[local_row].clone();
                xor_into(&mut self.reduced_rows[r], &source);
                self.ops_log.push((r, local_row));
            }
        }
    }

    /// True iff the system so far has no `0 = 1` contradiction row. Free
    /// (non-pivot) columns simply mean the system is underdetermined, not
    /// invalid — a particular solution still exists.
    ///
    /// Computed live rather than latched: a row with no pivot and an empty
    /// column set is a contradiction only as long as it has rhs `true`, and
    /// `add_bit` can turn such a row into a genuine equation (or redundant
    /// `0 = 0` row) the moment it gains a column of its own.
    pub fn is_valid(&self) -> bool {
        !self
            .reduced_rows
            .iter()
            .any(|row| row.cols.is_empty() && row.rhs)
    }

    /// A particular solution (free variables set to zero), keyed by global
    /// bit id, restricted to bits that are set.
    pub fn solution(&self) -> Vec<usize> {
        let mut set_bits = Vec::new();
        for (row, pivot) in self.pivot_col_of_row.iter().enumerate() {
            if let Some(col) = pivot {
                if self.reduced_rows[row].rhs {
                    set_bits.push(self.col_ids[*col]);
                }
            }
        }
        set_bits
    }
}
