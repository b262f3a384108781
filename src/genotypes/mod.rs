//! Genotype decoding and resolution.

use crate::common::{GenotypeCodeId, IndividualId};

pub mod codec;
pub mod resolve;

/// One individual's genotype at one variation.
///
/// Produced by the codec, enriched by the resolver; ephemeral and
/// recomputed per query.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize, derive_new::new)]
pub struct GenotypeAssignment {
    pub individual_id: IndividualId,
    pub genotype_code_id: GenotypeCodeId,
    /// Resolved allele string, `None` when the genotype code is unknown.
    pub allele: Option<String>,
}
