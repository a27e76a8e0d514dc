//! Final aggregation: sum abundance and biomass across size bands per
//! (survey, species, diet, observer).

use crate::types::{BiomassRecord, ResultRow, ResultTable};
use std::collections::BTreeMap;

/// Group and sum the per-band records. Output order is deterministic:
/// ascending by survey, then species, diet, observer.
pub fn aggregate(records: Vec<BiomassRecord>) -> ResultTable {
    let mut groups: BTreeMap<(u32, String, String, String), (f64, f64)> = BTreeMap::new();

    for record in records {
        let key = (record.survey, record.species, record.diet, record.observer);
        let entry = groups.entry(key).or_insert((0.0, 0.0));
        entry.0 += record.abundance;
        entry.1 += record.biomass_kg_ha;
    }

    let rows = groups
        .into_iter()
        .map(
            |((survey, species, diet, observer), (abundance, biomass_kg_ha))| ResultRow {
                survey,
                species,
                diet,
                observer,
                abundance,
                biomass_kg_ha,
            },
        )
        .collect();
    ResultTable { rows }
}
