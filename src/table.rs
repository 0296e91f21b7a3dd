use crate::api::CrimeRecord;
use chrono::{DateTime, NaiveDate, NaiveDateTime};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeFilter {
    All,
    Only(String),
}

impl TypeFilter {
    pub fn matches(&self, crime_type: &str) -> bool {
        match self {
            TypeFilter::All => true,
            TypeFilter::Only(wanted) => crime_type.trim().eq_ignore_ascii_case(wanted.trim()),
        }
    }

    pub fn label(&self) -> &str {
        match self {
            TypeFilter::All => "ALL",
            TypeFilter::Only(t) => t,
        }
    }
}

#[derive(Debug, Clone)]
pub struct TableRow {
    pub id: String,
    pub crime_type: String,
    pub date: String,
    pub coords: String,
    pub arrested: bool,
    pub is_placeholder: bool,
}

impl TableRow {
    fn placeholder() -> Self {
        Self {
            id: String::new(),
            crime_type: "No crime records found".to_string(),
            date: String::new(),
            coords: String::new(),
            arrested: false,
            is_placeholder: true,
        }
    }
}

/// Projects the snapshot into display rows. Empty input (or a filter that
/// matches nothing) yields exactly one placeholder row.
pub fn build_rows(crimes: &[CrimeRecord], filter: &TypeFilter) -> Vec<TableRow> {
    let rows: Vec<TableRow> = crimes
        .iter()
        .filter(|c| filter.matches(&c.crime_type))
        .map(row_for)
        .collect();

    if rows.is_empty() {
        vec![TableRow::placeholder()]
    } else {
        rows
    }
}

fn row_for(crime: &CrimeRecord) -> TableRow {
    TableRow {
        id: crime.crime_id.to_string(),
        crime_type: crime.crime_type.clone(),
        date: format_date(&crime.occurrence_date),
        coords: format_coords(crime.latitude, crime.longitude),
        arrested: crime.arrested,
        is_placeholder: false,
    }
}

/// Formats the occurrence timestamp for display, falling back to the raw
/// string when none of the accepted layouts parse.
pub fn format_date(raw: &str) -> String {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return dt.format("%Y-%m-%d").to_string();
    }
    for layout in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, layout) {
            return dt.format("%Y-%m-%d").to_string();
        }
    }
    if let Ok(d) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return d.format("%Y-%m-%d").to_string();
    }
    raw.to_string()
}

/// Missing coordinates render as zero rather than dropping the row.
pub fn format_coords(lat: Option<f64>, lng: Option<f64>) -> String {
    format!("{:.4}, {:.4}", lat.unwrap_or(0.0), lng.unwrap_or(0.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: i64, kind: &str, arrested: bool) -> CrimeRecord {
        CrimeRecord {
            crime_id: id,
            crime_type: kind.to_string(),
            occurrence_date: "2024-01-01 10:30:00".to_string(),
            latitude: Some(28.6139),
            longitude: Some(77.209),
            description: None,
            arrested,
        }
    }

    #[test]
    fn empty_snapshot_yields_one_placeholder() {
        let rows = build_rows(&[], &TypeFilter::All);
        assert_eq!(rows.len(), 1);
        assert!(rows[0].is_placeholder);
    }

    #[test]
    fn n_records_yield_n_rows_in_order() {
        let crimes = vec![record(1, "Theft", false), record(2, "Assault", true)];
        let rows = build_rows(&crimes, &TypeFilter::All);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].id, "1");
        assert_eq!(rows[1].id, "2");
        assert!(rows.iter().all(|r| !r.is_placeholder));
    }

    #[test]
    fn filter_is_trimmed_and_case_insensitive() {
        let crimes = vec![
            record(1, " theft ", false),
            record(2, "Assault", false),
            record(3, "THEFT", true),
        ];
        let rows = build_rows(&crimes, &TypeFilter::Only("Theft".to_string()));
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].id, "1");
        assert_eq!(rows[1].id, "3");
    }

    #[test]
    fn date_formats_with_fallback() {
        assert_eq!(format_date("2024-01-01 10:30:00"), "2024-01-01");
        assert_eq!(format_date("2024-02-01"), "2024-02-01");
        assert_eq!(format_date("not-a-date"), "not-a-date");
    }

    #[test]
    fn missing_coords_render_as_zero() {
        assert_eq!(format_coords(None, None), "0.0000, 0.0000");
        assert_eq!(format_coords(Some(28.6139), Some(77.209)), "28.6139, 77.2090");
    }

    #[test]
    fn scenario_table_has_two_rows() {
        let crimes = vec![record(1, "Theft", false), record(2, "Theft", true)];
        assert_eq!(build_rows(&crimes, &TypeFilter::All).len(), 2);
    }
}
