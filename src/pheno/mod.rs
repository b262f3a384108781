//! Phenotype feature handling.

pub mod attribs;
