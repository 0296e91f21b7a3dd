use crate::api::CrimeRecord;

pub const CSV_HEADER: &str = "Crime ID,Type,Date,Lat,Lng,Description,Arrested";

/// Serializes the snapshot to CSV. The description field is always quoted
/// with embedded quotes doubled; missing coordinates become empty fields.
/// Callers are responsible for the empty-snapshot notice.
pub fn render_csv(crimes: &[CrimeRecord]) -> String {
    let mut out = String::from(CSV_HEADER);
    out.push('\n');
    for crime in crimes {
        let description = crime.description.as_deref().unwrap_or("");
        out.push_str(&format!(
            "{},{},{},{},{},\"{}\",{}\n",
            crime.crime_id,
            crime.crime_type,
            crime.occurrence_date,
            crime.latitude.map(|v| v.to_string()).unwrap_or_default(),
            crime.longitude.map(|v| v.to_string()).unwrap_or_default(),
            description.replace('"', "\"\""),
            if crime.arrested { "Yes" } else { "No" },
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: i64, description: &str) -> CrimeRecord {
        CrimeRecord {
            crime_id: id,
            crime_type: "Theft".to_string(),
            occurrence_date: "2024-01-01 10:30:00".to_string(),
            latitude: Some(28.6),
            longitude: Some(77.2),
            description: Some(description.to_string()),
            arrested: false,
        }
    }

    // Minimal reader for the format render_csv emits: six plain fields with
    // one quoted field between the fifth and last comma.
    fn parse_row(row: &str) -> Vec<String> {
        let mut fields = Vec::new();
        let mut current = String::new();
        let mut in_quotes = false;
        let mut chars = row.chars().peekable();
        while let Some(c) = chars.next() {
            if in_quotes {
                if c == '"' {
                    if chars.peek() == Some(&'"') {
                        chars.next();
                        current.push('"');
                    } else {
                        in_quotes = false;
                    }
                } else {
                    current.push(c);
                }
            } else if c == '"' {
                in_quotes = true;
            } else if c == ',' {
                fields.push(std::mem::take(&mut current));
            } else {
                current.push(c);
            }
        }
        fields.push(current);
        fields
    }

    #[test]
    fn header_is_fixed() {
        let csv = render_csv(&[]);
        assert_eq!(csv.trim_end(), CSV_HEADER);
    }

    #[test]
    fn quotes_in_description_are_doubled() {
        let csv = render_csv(&[record(1, r#"stolen "red" bicycle"#)]);
        assert!(csv.contains(r#""stolen ""red"" bicycle""#));
    }

    #[test]
    fn round_trip_recovers_fields() {
        let original = record(42, r#"witness said "run", then fled"#);
        let csv = render_csv(&[original.clone()]);
        let row = csv.lines().nth(1).expect("one data row");
        let fields = parse_row(row);

        assert_eq!(fields.len(), 7);
        assert_eq!(fields[0], "42");
        assert_eq!(fields[1], "Theft");
        assert_eq!(fields[2], "2024-01-01 10:30:00");
        assert_eq!(fields[3], "28.6");
        assert_eq!(fields[4], "77.2");
        assert_eq!(fields[5], r#"witness said "run", then fled"#);
        assert_eq!(fields[6], "No");
    }

    #[test]
    fn missing_coordinates_are_empty_fields() {
        let mut r = record(1, "x");
        r.latitude = None;
        r.longitude = None;
        let csv = render_csv(&[r]);
        let row = csv.lines().nth(1).expect("one data row");
        let fields = parse_row(row);
        assert_eq!(fields[3], "");
        assert_eq!(fields[4], "");
    }
}
