use crate::api::CrimeRecord;
use std::collections::HashMap;

/// Owned snapshot of the fetched crime records plus the aggregates derived
/// from it. Replaced wholesale on every refresh, never mutated in place, so
/// every renderer reads one consistent collection.
#[derive(Default)]
pub struct CrimeDb {
    crimes: Vec<CrimeRecord>,
    total_count: usize,
    open_cases: usize,
    type_counts: Vec<(String, usize)>,
}

impl CrimeDb {
    pub fn replace(&mut self, count: usize, crimes: Vec<CrimeRecord>) {
        self.total_count = count;
        self.open_cases = crimes.iter().filter(|c| !c.arrested).count();
        self.type_counts = aggregate_types(&crimes);
        self.crimes = crimes;
    }

    /// Explicit empty state used after a failed fetch, so renderers never
    /// show stale content.
    pub fn clear(&mut self) {
        self.crimes.clear();
        self.total_count = 0;
        self.open_cases = 0;
        self.type_counts.clear();
    }

    pub fn crimes(&self) -> &[CrimeRecord] {
        &self.crimes
    }

    pub fn is_empty(&self) -> bool {
        self.crimes.is_empty()
    }

    pub fn total_count(&self) -> usize {
        self.total_count
    }

    pub fn open_cases(&self) -> usize {
        self.open_cases
    }

    pub fn type_counts(&self) -> &[(String, usize)] {
        &self.type_counts
    }

    pub fn find(&self, crime_id: i64) -> Option<&CrimeRecord> {
        self.crimes.iter().find(|c| c.crime_id == crime_id)
    }
}

fn aggregate_types(crimes: &[CrimeRecord]) -> Vec<(String, usize)> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    for crime in crimes {
        *counts.entry(crime.crime_type.clone()).or_default() += 1;
    }
    let mut list: Vec<(String, usize)> = counts.into_iter().collect();
    // Sorted by label so the donut and filter options stay stable between
    // refreshes.
    list.sort_by(|a, b| a.0.cmp(&b.0));
    list
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: i64, kind: &str, date: &str, lat: f64, lng: f64, arrested: bool) -> CrimeRecord {
        CrimeRecord {
            crime_id: id,
            crime_type: kind.to_string(),
            occurrence_date: date.to_string(),
            latitude: Some(lat),
            longitude: Some(lng),
            description: Some("x".to_string()),
            arrested,
        }
    }

    #[test]
    fn two_theft_scenario() {
        let mut db = CrimeDb::default();
        db.replace(
            2,
            vec![
                record(1, "Theft", "2024-01-01", 28.6, 77.2, false),
                record(2, "Theft", "2024-02-01", 19.0, 72.8, true),
            ],
        );

        assert_eq!(db.total_count(), 2);
        assert_eq!(db.open_cases(), 1);
        assert_eq!(db.type_counts(), &[("Theft".to_string(), 2)]);
        assert_eq!(db.crimes().len(), 2);
    }

    #[test]
    fn replace_is_wholesale() {
        let mut db = CrimeDb::default();
        db.replace(1, vec![record(1, "Theft", "2024-01-01", 28.6, 77.2, false)]);
        db.replace(1, vec![record(9, "Assault", "2024-03-01", 13.0, 80.2, true)]);

        assert_eq!(db.crimes().len(), 1);
        assert_eq!(db.crimes()[0].crime_id, 9);
        assert_eq!(db.open_cases(), 0);
        assert_eq!(db.type_counts(), &[("Assault".to_string(), 1)]);
    }

    #[test]
    fn clear_resets_aggregates() {
        let mut db = CrimeDb::default();
        db.replace(1, vec![record(1, "Theft", "2024-01-01", 28.6, 77.2, false)]);
        db.clear();

        assert!(db.is_empty());
        assert_eq!(db.total_count(), 0);
        assert_eq!(db.open_cases(), 0);
        assert!(db.type_counts().is_empty());
    }

    #[test]
    fn aggregate_is_sorted_by_label() {
        let crimes = vec![
            record(1, "Robbery", "2024-01-01", 28.6, 77.2, false),
            record(2, "Assault", "2024-01-02", 28.6, 77.2, false),
            record(3, "Robbery", "2024-01-03", 28.6, 77.2, false),
        ];
        assert_eq!(
            aggregate_types(&crimes),
            vec![("Assault".to_string(), 1), ("Robbery".to_string(), 2)]
        );
    }
}
