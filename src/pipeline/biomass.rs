//! Length-weight biomass computation.
//!
//! Per-band biomass is `a * L^b * abundance / area / 1000 * 10000`
//! (species coefficients a and b, band midpoint L in cm, surveyed area in
//! m², result in kg/ha). The large band rides on all ten band rows of a
//! (survey, slot) pair, so its abundance is kept only on the smallest
//! band's row before its contribution is added; everywhere else it is
//! zeroed first.

use crate::types::{BiomassRecord, EnrichedObservation, SIZE_BANDS};

/// Rows excluded during biomass computation, by cause.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DropCounts {
    /// Missing a, b or area after the joins (stale reference data).
    pub missing_reference: usize,
    /// Combined biomass was zero, negative or not a number.
    pub non_positive: usize,
}

/// Estimated weight-per-area contribution of `abundance` individuals of
/// length `length` cm, in kg/ha.
fn band_biomass(a: f64, b: f64, length: f64, abundance: f64, area: f64) -> f64 {
    a * length.powf(b) * abundance / area / 1000.0 * 10000.0
}

/// Compute per-band biomass records, applying large-band deduplication
/// and the two drop rules.
pub fn compute(observations: Vec<EnrichedObservation>) -> (Vec<BiomassRecord>, DropCounts) {
    let mut records = Vec::new();
    let mut drops = DropCounts::default();

    for observation in observations {
        let (a, b, area) = match (observation.a, observation.b, observation.area) {
            (Some(a), Some(b), Some(area)) if area > 0.0 => (a, b, area),
            _ => {
                drops.missing_reference += 1;
                continue;
            }
        };

        // Large-band fields repeat on all ten rows of the block; count
        // them only on the smallest band's row.
        let large_abundance = if observation.size_band == SIZE_BANDS[0] {
            observation.large_abundance
        } else {
            0.0
        };

        let band = band_biomass(a, b, observation.size_band, observation.abundance, area);
        let large = band_biomass(a, b, observation.large_size, large_abundance, area);
        let biomass_kg_ha = band + large;

        if !(biomass_kg_ha > 0.0) {
            drops.non_positive += 1;
            continue;
        }

        records.push(BiomassRecord {
            survey: observation.survey,
            species: observation.species,
            diet: observation.diet.unwrap_or_default(),
            observer: observation.observer.unwrap_or_default(),
            abundance: observation.abundance + large_abundance,
            biomass_kg_ha,
        });
    }

    (records, drops)
}
