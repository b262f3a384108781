//! Projection of sparse phenotype attribute rows into dense records.
//!
//! The attribute table stores one row per `(phenotype_feature, attribute
//! type)`; only a small fixed subset of attribute types is of interest for
//! reporting.  Projection groups the rows per feature and keeps the
//! recognized kinds, dropping everything else silently.

use std::collections::{BTreeMap, BTreeSet};

use indexmap::IndexMap;

use crate::common::FeatureId;
use crate::db::{AttribStore, AttributeRow, PhenotypeDescription};

/// The attribute kinds recognized for projection.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    serde::Serialize,
    serde::Deserialize,
)]
pub enum AttribKind {
    /// Risk allele reported for the feature.
    #[strum(serialize = "risk_allele")]
    RiskAllele,
    /// Association p-value.
    #[strum(serialize = "p_value")]
    PValue,
    /// Odds ratio.
    #[strum(serialize = "odds_ratio")]
    OddsRatio,
    /// Regression beta coefficient.
    #[strum(serialize = "beta")]
    Beta,
}

/// Build the mapping from attribute type id to recognized kind.
///
/// Configuration rather than derived data; the ids are the ones the
/// variation schema assigns to these four attribute types.
pub fn build_attrib_type_map() -> IndexMap<u32, AttribKind> {
    indexmap::indexmap! {
        14 => AttribKind::RiskAllele,
        15 => AttribKind::PValue,
        23 => AttribKind::OddsRatio,
        24 => AttribKind::Beta,
    }
}

/// Dense per-feature projection of the recognized attributes.
///
/// All fields are optional; the attribute table is sparse and most features
/// carry only a subset.
#[derive(Debug, Default, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct PhenotypeFeatureRecord {
    /// Id of the attached phenotype, when the description pass ran.
    pub phenotype_id: Option<u64>,
    /// Phenotype description, when the description pass ran.
    pub description: Option<String>,
    pub risk_allele: Option<String>,
    pub p_value: Option<String>,
    pub odds_ratio: Option<String>,
    pub beta: Option<String>,
}

impl PhenotypeFeatureRecord {
    /// Value of the given attribute kind, if recorded.
    pub fn get(&self, kind: AttribKind) -> Option<&str> {
        match kind {
            AttribKind::RiskAllele => self.risk_allele.as_deref(),
            AttribKind::PValue => self.p_value.as_deref(),
            AttribKind::OddsRatio => self.odds_ratio.as_deref(),
            AttribKind::Beta => self.beta.as_deref(),
        }
    }

    fn set(&mut self, kind: AttribKind, value: String) {
        match kind {
            AttribKind::RiskAllele => self.risk_allele = Some(value),
            AttribKind::PValue => self.p_value = Some(value),
            AttribKind::OddsRatio => self.odds_ratio = Some(value),
            AttribKind::Beta => self.beta = Some(value),
        }
    }
}

/// Project sparse attribute rows into dense records, keyed by feature id.
///
/// Rows with unrecognized attribute type ids are dropped, not errors.
pub fn project(
    rows: &[AttributeRow],
    type_map: &IndexMap<u32, AttribKind>,
) -> BTreeMap<FeatureId, PhenotypeFeatureRecord> {
    let mut result: BTreeMap<FeatureId, PhenotypeFeatureRecord> = BTreeMap::new();
    for row in rows {
        if let Some(&kind) = type_map.get(&row.attrib_type_id) {
            result
                .entry(row.phenotype_feature_id)
                .or_default()
                .set(kind, row.value.clone());
        } else {
            tracing::trace!(
                "dropping attribute row of unrecognized type {}",
                row.attrib_type_id
            );
        }
    }
    result
}

/// Project attribute rows onto features seeded from the description pass.
///
/// Every described feature appears in the result even when it has zero
/// recognized attribute rows, so consumers can report "no risk allele
/// recorded" rather than "feature missing".
pub fn project_described(
    descriptions: &[PhenotypeDescription],
    rows: &[AttributeRow],
    type_map: &IndexMap<u32, AttribKind>,
) -> BTreeMap<FeatureId, PhenotypeFeatureRecord> {
    let mut result: BTreeMap<FeatureId, PhenotypeFeatureRecord> = BTreeMap::new();
    for desc in descriptions {
        let record = result.entry(desc.phenotype_feature_id).or_default();
        record.phenotype_id = Some(desc.phenotype_id);
        record.description = Some(desc.description.clone());
    }
    for (feature_id, projected) in project(rows, type_map) {
        let record = result.entry(feature_id).or_default();
        record.risk_allele = projected.risk_allele;
        record.p_value = projected.p_value;
        record.odds_ratio = projected.odds_ratio;
        record.beta = projected.beta;
    }
    result
}

/// Fetch and project the attribute records of the given features.
pub fn project_features(
    feature_ids: &BTreeSet<FeatureId>,
    store: &impl AttribStore,
    type_map: &IndexMap<u32, AttribKind>,
) -> Result<BTreeMap<FeatureId, PhenotypeFeatureRecord>, anyhow::Error> {
    let descriptions = store.fetch_phenotype_descriptions(feature_ids)?;
    let rows = store.fetch_attribute_rows(feature_ids)?;
    tracing::debug!(
        "projecting {} attribute rows over {} described features",
        rows.len(),
        descriptions.len()
    );
    Ok(project_described(&descriptions, &rows, type_map))
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use crate::db::{mem::MemStore, AttributeRow, PhenotypeDescription};

    use super::{AttribKind, PhenotypeFeatureRecord};

    #[test]
    fn attrib_type_map_matches_schema() {
        let map = super::build_attrib_type_map();

        assert_eq!(map.get(&14), Some(&AttribKind::RiskAllele));
        assert_eq!(map.get(&15), Some(&AttribKind::PValue));
        assert_eq!(map.get(&23), Some(&AttribKind::OddsRatio));
        assert_eq!(map.get(&24), Some(&AttribKind::Beta));
        assert_eq!(map.len(), 4);
    }

    #[test]
    fn attrib_kind_display() {
        assert_eq!(AttribKind::RiskAllele.to_string(), "risk_allele");
        assert_eq!(AttribKind::PValue.to_string(), "p_value");
    }

    #[test]
    fn unrecognized_types_are_dropped() {
        let rows = vec![
            AttributeRow::new(1, 14, String::from("A")),
            AttributeRow::new(1, 99, String::from("X")),
        ];

        let result = super::project(&rows, &super::build_attrib_type_map());

        assert_eq!(
            result.get(&1),
            Some(&PhenotypeFeatureRecord {
                risk_allele: Some(String::from("A")),
                ..Default::default()
            })
        );
        assert_eq!(result.len(), 1);
    }

    #[test]
    fn rows_group_by_feature() {
        let rows = vec![
            AttributeRow::new(1, 14, String::from("A")),
            AttributeRow::new(2, 15, String::from("2e-12")),
            AttributeRow::new(2, 23, String::from("1.3")),
        ];

        let result = super::project(&rows, &super::build_attrib_type_map());

        assert_eq!(result.len(), 2);
        assert_eq!(result[&1].get(AttribKind::RiskAllele), Some("A"));
        assert_eq!(result[&2].get(AttribKind::PValue), Some("2e-12"));
        assert_eq!(result[&2].get(AttribKind::OddsRatio), Some("1.3"));
        assert_eq!(result[&2].get(AttribKind::RiskAllele), None);
    }

    #[test]
    fn described_features_survive_without_attribs() {
        let descriptions = vec![
            PhenotypeDescription::new(1, 500, String::from("Type 2 diabetes")),
            PhenotypeDescription::new(2, 501, String::from("Height")),
        ];
        let rows = vec![AttributeRow::new(1, 14, String::from("T"))];

        let result =
            super::project_described(&descriptions, &rows, &super::build_attrib_type_map());

        assert_eq!(result.len(), 2);
        assert_eq!(result[&1].risk_allele.as_deref(), Some("T"));
        assert_eq!(result[&2].description.as_deref(), Some("Height"));
        assert_eq!(result[&2].risk_allele, None);
    }

    #[test]
    fn project_features_fetches_both_passes() -> Result<(), anyhow::Error> {
        let store = MemStore {
            attribute_rows: vec![AttributeRow::new(1, 24, String::from("0.07"))],
            phenotype_descriptions: vec![PhenotypeDescription::new(
                1,
                500,
                String::from("BMI"),
            )],
            ..Default::default()
        };

        let result = super::project_features(
            &[1].into_iter().collect(),
            &store,
            &super::build_attrib_type_map(),
        )?;

        assert_eq!(result[&1].phenotype_id, Some(500));
        assert_eq!(result[&1].description.as_deref(), Some("BMI"));
        assert_eq!(result[&1].beta.as_deref(), Some("0.07"));
        Ok(())
    }
}
