//! In-memory implementation of the store traits.
//!
//! Used throughout the test suite; also handy for embedders that already
//! hold the relevant rows (e.g., a fixture-driven report generator).

use std::collections::BTreeSet;

use crate::common::{AlleleCodeId, FeatureId, GenotypeCodeId, IndividualId, PopulationId};

use super::{
    AlleleCode, AttribStore, AttributeRow, GenotypeCode, GenotypeStore, IndividualPopulation,
    PhenotypeDescription, PopulationEdge, PopulationStore,
};

/// Plain-vector store backing all three fetch traits.
#[derive(Debug, Default, Clone)]
pub struct MemStore {
    pub genotype_codes: Vec<GenotypeCode>,
    pub allele_codes: Vec<AlleleCode>,
    pub population_edges: Vec<PopulationEdge>,
    pub individual_populations: Vec<IndividualPopulation>,
    pub attribute_rows: Vec<AttributeRow>,
    pub phenotype_descriptions: Vec<PhenotypeDescription>,
}

impl GenotypeStore for MemStore {
    fn fetch_genotype_codes(
        &self,
        ids: &BTreeSet<GenotypeCodeId>,
    ) -> Result<Vec<GenotypeCode>, anyhow::Error> {
        Ok(self
            .genotype_codes
            .iter()
            .filter(|gc| ids.contains(&gc.genotype_code_id))
            .cloned()
            .collect())
    }

    fn fetch_allele_codes(
        &self,
        ids: &BTreeSet<AlleleCodeId>,
    ) -> Result<Vec<AlleleCode>, anyhow::Error> {
        Ok(self
            .allele_codes
            .iter()
            .filter(|ac| ids.contains(&ac.allele_code_id))
            .cloned()
            .collect())
    }
}

impl PopulationStore for MemStore {
    fn fetch_population_edges(
        &self,
        root: PopulationId,
    ) -> Result<Vec<PopulationEdge>, anyhow::Error> {
        Ok(self
            .population_edges
            .iter()
            .filter(|edge| edge.super_population_id == root)
            .cloned()
            .collect())
    }

    fn fetch_individual_populations(
        &self,
        ids: &BTreeSet<IndividualId>,
    ) -> Result<Vec<IndividualPopulation>, anyhow::Error> {
        Ok(self
            .individual_populations
            .iter()
            .filter(|ip| ids.contains(&ip.individual_id))
            .cloned()
            .collect())
    }
}

impl AttribStore for MemStore {
    fn fetch_attribute_rows(
        &self,
        feature_ids: &BTreeSet<FeatureId>,
    ) -> Result<Vec<AttributeRow>, anyhow::Error> {
        Ok(self
            .attribute_rows
            .iter()
            .filter(|row| feature_ids.contains(&row.phenotype_feature_id))
            .cloned()
            .collect())
    }

    fn fetch_phenotype_descriptions(
        &self,
        feature_ids: &BTreeSet<FeatureId>,
    ) -> Result<Vec<PhenotypeDescription>, anyhow::Error> {
        Ok(self
            .phenotype_descriptions
            .iter()
            .filter(|desc| feature_ids.contains(&desc.phenotype_feature_id))
            .cloned()
            .collect())
    }
}
