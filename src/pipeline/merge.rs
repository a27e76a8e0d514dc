//! Species binding and metadata joins.
//!
//! Species identity is a positional association: slot i of the grid is
//! entry i of the species list (parity checked at reshape time). The two
//! metadata joins are independent left-joins; unmatched keys carry `None`
//! fields downstream instead of dropping the row here, and are logged
//! once each as data-quality warnings.

use crate::types::{EnrichedObservation, LongObservation, SpeciesMeta, SurveyMeta};
use std::collections::{HashMap, HashSet};
use tracing::warn;

/// Key survey metadata by survey number. Later duplicates win, matching
/// a last-write lookup over the metadata sheet.
pub fn survey_meta_map(rows: Vec<SurveyMeta>) -> HashMap<u32, SurveyMeta> {
    rows.into_iter().map(|row| (row.survey, row)).collect()
}

/// Key species metadata by species name.
pub fn species_meta_map(rows: Vec<SpeciesMeta>) -> HashMap<String, SpeciesMeta> {
    rows.into_iter()
        .map(|row| (row.species.clone(), row))
        .collect()
}

/// Attach species identity and both metadata joins to the long table.
pub fn enrich(
    observations: impl Iterator<Item = LongObservation>,
    species: &[String],
    surveys: &HashMap<u32, SurveyMeta>,
    reference: &HashMap<String, SpeciesMeta>,
) -> Vec<EnrichedObservation> {
    let mut unmatched_species = HashSet::new();
    let mut unmatched_surveys = HashSet::new();

    let enriched = observations
        .map(|observation| {
            let name = &species[observation.slot];
            let species_meta = reference.get(name);
            let survey_meta = surveys.get(&observation.survey);

            if species_meta.is_none() && unmatched_species.insert(name.clone()) {
                warn!(species = %name, "no reference data for species");
            }
            if survey_meta.is_none() && unmatched_surveys.insert(observation.survey) {
                warn!(survey = observation.survey, "no metadata for survey");
            }

            EnrichedObservation {
                survey: observation.survey,
                species: name.clone(),
                size_band: observation.size_band,
                abundance: observation.abundance,
                large_abundance: observation.large_abundance,
                large_size: observation.large_size,
                diet: species_meta.map(|m| m.diet.clone()),
                observer: survey_meta.map(|m| m.observer.clone()),
                area: survey_meta.and_then(|m| m.area),
                a: species_meta.and_then(|m| m.a),
                b: species_meta.and_then(|m| m.b),
            }
        })
        .collect();
    enriched
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SIZE_BANDS;

    fn observation(survey: u32, slot: usize) -> LongObservation {
        LongObservation {
            survey,
            slot,
            size_band: SIZE_BANDS[0],
            abundance: 2.0,
            large_abundance: 0.0,
            large_size: 0.0,
        }
    }

    fn survey_meta(survey: u32) -> SurveyMeta {
        SurveyMeta {
            survey,
            transect: "T1".to_string(),
            observer: "AB".to_string(),
            area: Some(100.0),
        }
    }

    fn species_meta(name: &str) -> SpeciesMeta {
        SpeciesMeta {
            species: name.to_string(),
            diet: "Herbivore".to_string(),
            a: Some(0.01),
            b: Some(3.0),
        }
    }

    #[test]
    fn test_matched_joins_fill_all_fields() {
        let species = vec!["Naso lituratus".to_string()];
        let surveys = survey_meta_map(vec![survey_meta(1)]);
        let reference = species_meta_map(vec![species_meta("Naso lituratus")]);

        let enriched = enrich(
            vec![observation(1, 0)].into_iter(),
            &species,
            &surveys,
            &reference,
        );

        assert_eq!(enriched.len(), 1);
        let row = &enriched[0];
        assert_eq!(row.species, "Naso lituratus");
        assert_eq!(row.diet.as_deref(), Some("Herbivore"));
        assert_eq!(row.observer.as_deref(), Some("AB"));
        assert_eq!(row.area, Some(100.0));
        assert_eq!(row.a, Some(0.01));
        assert_eq!(row.b, Some(3.0));
    }

    #[test]
    fn test_unmatched_keys_carry_none_not_dropped() {
        let species = vec!["Siganus spinus".to_string()];
        let surveys = HashMap::new();
        let reference = HashMap::new();

        let enriched = enrich(
            vec![observation(7, 0)].into_iter(),
            &species,
            &surveys,
            &reference,
        );

        assert_eq!(enriched.len(), 1);
        let row = &enriched[0];
        assert!(row.diet.is_none());
        assert!(row.observer.is_none());
        assert!(row.area.is_none());
        assert!(row.a.is_none());
        assert!(row.b.is_none());
    }

    #[test]
    fn test_slots_bind_positionally() {
        let species = vec!["First sp".to_string(), "Second sp".to_string()];
        let surveys = HashMap::new();
        let reference = HashMap::new();

        let enriched = enrich(
            vec![observation(1, 0), observation(1, 1)].into_iter(),
            &species,
            &surveys,
            &reference,
        );
        assert_eq!(enriched[0].species, "First sp");
        assert_eq!(enriched[1].species, "Second sp");
    }
}
