//! Resolution of genotype codes to allele strings.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use itertools::Itertools;

use crate::common::{AlleleCodeId, GenotypeCodeId, GENOTYPE_DELIMITER};
use crate::db::{GenotypeBlob, GenotypeStore};

use super::codec::BlobCache;
use super::GenotypeAssignment;

/// Resolve each requested genotype code to its allele string.
///
/// Fetches all code rows in one call and all referenced allele codes in a
/// second call; a population-level query may reference thousands of distinct
/// codes, so per-code round trips are not an option.  Rows sharing a
/// genotype code id are ordered by `haplotype_id` before joining, so
/// `"A|T"` and `"T|A"` stay distinct regardless of fetch order.
///
/// A genotype code with no rows, or with an unresolvable allele code, is
/// absent from the result (unknown genotype); callers treat absence as
/// "unknown", never as an error.
pub fn resolve(
    ids: &BTreeSet<GenotypeCodeId>,
    store: &impl GenotypeStore,
) -> Result<BTreeMap<GenotypeCodeId, String>, anyhow::Error> {
    if ids.is_empty() {
        return Ok(BTreeMap::new());
    }

    let code_rows = store.fetch_genotype_codes(ids)?;
    let allele_ids: BTreeSet<AlleleCodeId> =
        code_rows.iter().map(|gc| gc.allele_code_id).collect();
    let alleles: HashMap<AlleleCodeId, String> = store
        .fetch_allele_codes(&allele_ids)?
        .into_iter()
        .map(|ac| (ac.allele_code_id, ac.allele))
        .collect();
    tracing::debug!(
        "resolving {} genotype codes over {} allele codes",
        ids.len(),
        alleles.len()
    );

    let mut result = BTreeMap::new();
    for (gc_id, mut rows) in code_rows
        .into_iter()
        .map(|gc| (gc.genotype_code_id, gc))
        .into_group_map()
    {
        rows.sort_by_key(|gc| gc.haplotype_id);
        let parts: Option<Vec<&str>> = rows
            .iter()
            .map(|gc| alleles.get(&gc.allele_code_id).map(|s| s.as_str()))
            .collect();
        match parts {
            Some(parts) => {
                result.insert(gc_id, parts.join(GENOTYPE_DELIMITER));
            }
            None => {
                tracing::trace!("genotype code {} has unresolved allele code", gc_id);
            }
        }
    }

    Ok(result)
}

/// Decode one blob and resolve its genotype codes into assignments.
///
/// Convenience for single-variation callers; aggregation batches across
/// blobs instead (see [`crate::freqs`]).
pub fn individual_genotypes(
    blob: &GenotypeBlob,
    cache: &mut BlobCache,
    store: &impl GenotypeStore,
) -> Result<Vec<GenotypeAssignment>, anyhow::Error> {
    let pairs = cache.decode(blob)?.to_vec();
    let ids: BTreeSet<GenotypeCodeId> = pairs.iter().map(|&(_, gc_id)| gc_id).collect();
    let genotypes = resolve(&ids, store)?;

    Ok(pairs
        .into_iter()
        .map(|(individual_id, genotype_code_id)| {
            GenotypeAssignment::new(
                individual_id,
                genotype_code_id,
                genotypes.get(&genotype_code_id).cloned(),
            )
        })
        .collect())
}
