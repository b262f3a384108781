//! Genotype and allele frequency aggregation over population scopes.
//!
//! Combines the codec, the resolver, and the hierarchy walker: decode every
//! packed blob of the target variation, resolve the distinct genotype codes
//! in one batch, fetch population membership for the genotyped individuals,
//! then fold counts per `(population, genotype)`.  The fold is commutative
//! and associative over individual records, so the resulting tables do not
//! depend on fetch order.

use std::collections::{BTreeMap, BTreeSet};

use crate::common::{
    GenotypeCodeId, IndividualId, PopulationId, PopulationKey, GENOTYPE_DELIMITER,
};
use crate::db::{GenotypeBlob, GenotypeStore, IndividualPopulation, PopulationStore};
use crate::genotypes::codec::BlobCache;
use crate::genotypes::resolve;
use crate::pops::hierarchy;

/// Genotype counts per population scope.
///
/// Built fresh per query, never cached across calls.
#[derive(Debug, Default, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct FrequencyTable {
    /// Count per population key and genotype string, e.g.
    /// `{"HapMap-CEU": {"C|T": 59, "C|C": 102}}`.
    pub genotype_counts: BTreeMap<PopulationKey, BTreeMap<String, u32>>,
}

impl FrequencyTable {
    /// Count one observed genotype for one population scope.
    fn record(&mut self, key: PopulationKey, genotype: &str) {
        *self
            .genotype_counts
            .entry(key)
            .or_default()
            .entry(genotype.to_string())
            .or_insert(0) += 1;
    }

    /// Whether no genotype was observed at all.
    pub fn is_empty(&self) -> bool {
        self.genotype_counts.is_empty()
    }

    /// Derive per-allele counts by splitting each genotype at the haplotype
    /// delimiter; `"A|T"` counted twice contributes 2 to `A` and 2 to `T`.
    pub fn allele_counts(&self) -> BTreeMap<PopulationKey, BTreeMap<String, u32>> {
        let mut result: BTreeMap<PopulationKey, BTreeMap<String, u32>> = BTreeMap::new();
        for (key, genotypes) in &self.genotype_counts {
            let alleles = result.entry(key.clone()).or_default();
            for (genotype, count) in genotypes {
                for allele in genotype.split(GENOTYPE_DELIMITER) {
                    *alleles.entry(allele.to_string()).or_insert(0) += count;
                }
            }
        }
        result
    }

    /// Relative genotype frequencies per population scope.
    pub fn genotype_frequencies(&self) -> BTreeMap<PopulationKey, BTreeMap<String, f64>> {
        let mut result: BTreeMap<PopulationKey, BTreeMap<String, f64>> = BTreeMap::new();
        for (key, genotypes) in &self.genotype_counts {
            let total: u32 = genotypes.values().sum();
            if total == 0 {
                continue;
            }
            result.insert(
                key.clone(),
                genotypes
                    .iter()
                    .map(|(genotype, count)| {
                        (genotype.clone(), f64::from(*count) / f64::from(total))
                    })
                    .collect(),
            );
        }
        result
    }
}

/// Result of one aggregation pass.
#[derive(Debug, Default, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct FrequencyReport {
    /// The frequency tables.
    pub table: FrequencyTable,
    /// Number of packed records skipped because of corrupt encoding.
    pub skipped_records: u32,
}

/// Order-independent fold of assignments into a frequency table.
///
/// `scope` of `None` means "all populations" (single-entity mode); otherwise
/// only membership rows whose population id is in scope contribute.
/// Individuals whose genotype code did not resolve contribute nothing.
pub fn tally(
    assignments: &BTreeMap<IndividualId, GenotypeCodeId>,
    genotypes: &BTreeMap<GenotypeCodeId, String>,
    membership: &[IndividualPopulation],
    scope: Option<&BTreeSet<PopulationId>>,
) -> FrequencyTable {
    let mut table = FrequencyTable::default();
    for ip in membership {
        if let Some(scope) = scope {
            if !scope.contains(&ip.population_id) {
                continue;
            }
        }
        let genotype = assignments
            .get(&ip.individual_id)
            .and_then(|gc_id| genotypes.get(gc_id));
        if let Some(genotype) = genotype {
            table.record(population_key(ip), genotype);
        }
    }
    table
}

fn population_key(ip: &IndividualPopulation) -> PopulationKey {
    match &ip.population_name {
        Some(name) => PopulationKey::Name(name.clone()),
        None => PopulationKey::Id(ip.population_id),
    }
}

/// Decode all blobs into one individual-to-genotype-code mapping.
///
/// A corrupt blob is skipped and counted; one bad record must not abort a
/// population-level report.  When an individual occurs in several blobs the
/// last assignment wins.
fn collect_assignments(
    blobs: &[GenotypeBlob],
    cache: &mut BlobCache,
) -> (BTreeMap<IndividualId, GenotypeCodeId>, u32) {
    let mut assignments = BTreeMap::new();
    let mut skipped = 0u32;
    for blob in blobs {
        match cache.decode(blob) {
            Ok(pairs) => {
                assignments.extend(pairs.iter().copied());
            }
            Err(e) => {
                tracing::warn!("skipping corrupt genotype blob {}: {}", blob.blob_id, e);
                skipped += 1;
            }
        }
    }
    (assignments, skipped)
}

/// Aggregate genotype counts for one variation across all its genotyped
/// individuals, grouped by population for display.
///
/// Single-entity mode: no population scope is applied; every membership row
/// of a genotyped individual contributes.
pub fn aggregate_variation(
    blobs: &[GenotypeBlob],
    store: &(impl GenotypeStore + PopulationStore),
) -> Result<FrequencyReport, anyhow::Error> {
    aggregate(blobs, store, None)
}

/// Aggregate genotype counts over the population hierarchy rooted at `root`.
///
/// The scope is `root` plus all transitive sub-populations; individuals
/// whose membership does not intersect the scope contribute nothing.
pub fn aggregate_population(
    root: PopulationId,
    blobs: &[GenotypeBlob],
    store: &(impl GenotypeStore + PopulationStore),
) -> Result<FrequencyReport, anyhow::Error> {
    let scope = hierarchy::expand(root, store)?;
    aggregate(blobs, store, Some(&scope))
}

fn aggregate(
    blobs: &[GenotypeBlob],
    store: &(impl GenotypeStore + PopulationStore),
    scope: Option<&BTreeSet<PopulationId>>,
) -> Result<FrequencyReport, anyhow::Error> {
    let mut cache = BlobCache::default();
    let (assignments, skipped_records) = collect_assignments(blobs, &mut cache);
    tracing::debug!(
        "aggregating {} individuals from {} blobs ({} skipped)",
        assignments.len(),
        blobs.len(),
        skipped_records
    );

    let code_ids: BTreeSet<GenotypeCodeId> = assignments.values().copied().collect();
    let genotypes = resolve::resolve(&code_ids, store)?;

    let individual_ids: BTreeSet<IndividualId> = assignments.keys().copied().collect();
    let membership = store.fetch_individual_populations(&individual_ids)?;

    Ok(FrequencyReport {
        table: tally(&assignments, &genotypes, &membership, scope),
        skipped_records,
    })
}
