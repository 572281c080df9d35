//! Union-Find decoder for binary linear codes defined by a sparse GF(2)
//! parity-check matrix.
//!
//! Given an observed syndrome, [`UfDecoder`] grows disjoint clusters of
//! bits and checks around the unsatisfied checks until each cluster's local
//! GF(2) system admits a solution, then unions the per-cluster solutions
//! into a single error estimate. See each module for the corresponding
//! piece: [`pcm`] for the input matrix, [`cluster`] and [`gf2`] for the
//! growth/merge engine and its incremental linear algebra, [`membership`]
//! for the disjoint-set bookkeeping, and [`decoder`] for the top-level loop.

#![forbid(unsafe_code)]

pub mod cluster;
pub mod decoder;
pub mod error;
pub mod gf2;
pub mod graphs;
pub mod membership;
pub mod pcm;

pub use cluster::{Cluster, ClusterId};
pub use decoder::{DecodeOptions, DecodeOptionsBuilder, DecoderVariant, UfDecoder};
pub use error::DecoderError;
pub use graphs::ClusterGraph;
pub use pcm::ParityCheckMatrix;
