//! Common functionality.

/// Identifier of an individual (sample).
pub type IndividualId = u64;
/// Identifier of a genotype code.
pub type GenotypeCodeId = u64;
/// Identifier of an allele code.
pub type AlleleCodeId = u64;
/// Identifier of a population.
pub type PopulationId = u64;
/// Identifier of a phenotype feature.
pub type FeatureId = u64;

/// Delimiter between the per-haplotype alleles of a genotype string, e.g.,
/// `"A|T"` for a diploid genotype.
pub const GENOTYPE_DELIMITER: &str = "|";

/// Key identifying one population scope in a frequency table.
///
/// Membership rows may carry a display name (e.g., `"1000GENOMES:CEU"`) or
/// only the numeric population id; frequency tables are keyed by whichever
/// is available.
#[derive(
    Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub enum PopulationKey {
    /// Population known by numeric id only.
    Id(PopulationId),
    /// Population known by display name.
    Name(String),
}

impl std::fmt::Display for PopulationKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PopulationKey::Id(id) => write!(f, "{}", id),
            PopulationKey::Name(name) => write!(f, "{}", name),
        }
    }
}
