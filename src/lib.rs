//! Read core for genomic variation databases.
//!
//! This crate implements the compute-heavy part of serving a variation
//! database: decoding binary-packed per-individual genotypes, resolving
//! genotype codes to allele strings, expanding population hierarchies, and
//! aggregating genotype/allele frequencies over population scopes.  A small
//! sibling concern, projecting sparse phenotype attribute rows into dense
//! records, lives in [`pheno`].
//!
//! All row fetching goes through the narrow traits in [`db`]; the core
//! itself performs no I/O and holds no connection state, so an embedding
//! server is free to run independent aggregations in parallel.

pub mod common;
pub mod db;
pub mod freqs;
pub mod genotypes;
pub mod pheno;
pub mod pops;
