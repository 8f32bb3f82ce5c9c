use crate::models::{AggregationTable, StationStats};

/// Stations ordered by name, compared byte by byte.
pub fn sort_stations(table: AggregationTable) -> Vec<StationStats> {
    let mut stations = table.into_stations();
    stations.sort_unstable_by(|a, b| a.name.cmp(&b.name));
    stations
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::readers::tokenizer::station_hash;

    #[test]
    fn test_sort_is_bytewise() {
        let mut table = AggregationTable::new();
        for name in ["Ségou", "San Juan", "Abéché", "Zürich", "Abha", "abc", "Ab"] {
            table
                .upsert(station_hash(name.as_bytes()), name.as_bytes(), 0)
                .unwrap();
        }

        let names: Vec<String> = sort_stations(table)
            .iter()
            .map(|s| s.name_lossy().into_owned())
            .collect();

        // 'é' (0xC3 0xA9) sorts after every ASCII byte; uppercase before lowercase.
        assert_eq!(
            names,
            vec!["Ab", "Abha", "Abéché", "San Juan", "Ségou", "Zürich", "abc"]
        );
    }
}
