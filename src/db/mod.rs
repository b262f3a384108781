//! Record types and the narrow read interface to the variation store.
//!
//! The core never opens its own connection; the embedding data-access layer
//! implements the traits below over whatever backend it uses.  All fetches
//! are batched by id set so one population-level query costs a bounded
//! number of round trips.

use std::collections::BTreeSet;

use crate::common::{AlleleCodeId, FeatureId, GenotypeCodeId, IndividualId, PopulationId};

pub mod mem;

/// One haplotype position of a genotype code.
///
/// Several rows share a `genotype_code_id`, one per haplotype position
/// (two for diploid genotypes); `haplotype_id` gives the declared order.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize, derive_new::new)]
pub struct GenotypeCode {
    pub genotype_code_id: GenotypeCodeId,
    pub haplotype_id: u32,
    pub allele_code_id: AlleleCodeId,
}

/// Leaf lookup from allele code to allele symbol.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize, derive_new::new)]
pub struct AlleleCode {
    pub allele_code_id: AlleleCodeId,
    pub allele: String,
}

/// One edge of the population hierarchy.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize, derive_new::new)]
pub struct PopulationEdge {
    pub super_population_id: PopulationId,
    pub sub_population_id: PopulationId,
}

/// Membership of an individual in a population.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize, derive_new::new)]
pub struct IndividualPopulation {
    pub individual_id: IndividualId,
    pub population_id: PopulationId,
    /// Display name of the population, when the store has one.
    pub population_name: Option<String>,
}

/// Binary-packed genotypes of one variation (or one sub-SNP thereof).
///
/// `blob_id` identifies the row the bytes came from and keys the per-request
/// decode cache.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize, derive_new::new)]
pub struct GenotypeBlob {
    pub blob_id: u64,
    pub bytes: Vec<u8>,
}

/// Sparse phenotype feature attribute row.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize, derive_new::new)]
pub struct AttributeRow {
    pub phenotype_feature_id: FeatureId,
    pub attrib_type_id: u32,
    pub value: String,
}

/// Phenotype description attached to a phenotype feature.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize, derive_new::new)]
pub struct PhenotypeDescription {
    pub phenotype_feature_id: FeatureId,
    pub phenotype_id: u64,
    pub description: String,
}

/// Read access to genotype and allele code tables.
pub trait GenotypeStore {
    /// Fetch all `GenotypeCode` rows for the given genotype code ids.
    fn fetch_genotype_codes(
        &self,
        ids: &BTreeSet<GenotypeCodeId>,
    ) -> Result<Vec<GenotypeCode>, anyhow::Error>;

    /// Fetch all `AlleleCode` rows for the given allele code ids.
    fn fetch_allele_codes(
        &self,
        ids: &BTreeSet<AlleleCodeId>,
    ) -> Result<Vec<AlleleCode>, anyhow::Error>;
}

/// Read access to population structure and membership tables.
pub trait PopulationStore {
    /// Fetch the edges leading out of `root` (its direct sub-populations).
    fn fetch_population_edges(
        &self,
        root: PopulationId,
    ) -> Result<Vec<PopulationEdge>, anyhow::Error>;

    /// Fetch population membership rows for the given individuals.
    fn fetch_individual_populations(
        &self,
        ids: &BTreeSet<IndividualId>,
    ) -> Result<Vec<IndividualPopulation>, anyhow::Error>;
}

/// Read access to phenotype feature attribute tables.
pub trait AttribStore {
    /// Fetch attribute rows for the given phenotype features.
    fn fetch_attribute_rows(
        &self,
        feature_ids: &BTreeSet<FeatureId>,
    ) -> Result<Vec<AttributeRow>, anyhow::Error>;

    /// Fetch phenotype descriptions for the given phenotype features.
    fn fetch_phenotype_descriptions(
        &self,
        feature_ids: &BTreeSet<FeatureId>,
    ) -> Result<Vec<PhenotypeDescription>, anyhow::Error>;
}
