//! CSV export of an event's registrations.

use crate::models::Registration;

pub const CSV_HEADER: &str = "Name,Email,College,ReferenceID,PaymentEvidence";

/// Renders registrations in ledger order. Every field is quoted.
pub fn registrations_to_csv(registrations: &[Registration]) -> String {
    let mut csv = String::with_capacity(64 * (registrations.len() + 1));
    csv.push_str(CSV_HEADER);
    csv.push('\n');

    for r in registrations {
        let row = [
            &r.name,
            &r.email,
            &r.college,
            &r.reference_id,
            &r.payment_evidence,
        ]
        .map(|field| quote(field))
        .join(",");
        csv.push_str(&row);
        csv.push('\n');
    }
    csv
}

/// Wraps in double quotes, doubling any embedded quote.
fn quote(field: &str) -> String {
    format!("\"{}\"", field.replace('"', "\"\""))
}

/// Download name for an event's export, e.g. `Tech_Fest_2025_registrations.csv`.
pub fn export_file_name(event_title: &str) -> String {
    let stem: String = event_title
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    format!("{}_registrations.csv", stem)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::registrant;
    use uuid::Uuid;

    /// RFC 4180 reader for the round-trip checks.
    fn parse_csv(input: &str) -> Vec<Vec<String>> {
        let mut rows = Vec::new();
        let mut row = Vec::new();
        let mut field = String::new();
        let mut in_quotes = false;
        let mut chars = input.chars().peekable();

        while let Some(c) = chars.next() {
            match (c, in_quotes) {
                ('"', true) if chars.peek() == Some(&'"') => {
                    field.push('"');
                    chars.next();
                }
                ('"', true) => in_quotes = false,
                ('"', false) => in_quotes = true,
                (',', false) => row.push(std::mem::take(&mut field)),
                ('\n', false) => {
                    row.push(std::mem::take(&mut field));
                    rows.push(std::mem::take(&mut row));
                }
                (other, _) => field.push(other),
            }
        }
        rows
    }

    fn registration(name: &str) -> Registration {
        let mut details = registrant("Someone");
        details.name = name.to_string();
        Registration::new(Uuid::new_v4(), details, "p@x.com")
    }

    #[test]
    fn test_header_only_for_empty_ledger() {
        assert_eq!(registrations_to_csv(&[]), format!("{}\n", CSV_HEADER));
    }

    #[test]
    fn test_every_field_is_quoted() {
        let csv = registrations_to_csv(&[registration("Alice")]);
        let line = csv.lines().nth(1).unwrap();
        assert_eq!(
            line,
            "\"Alice\",\"someone@mail.com\",\"City College\",\"REF-SOMEONE\",\"someone.png\""
        );
    }

    #[test]
    fn test_embedded_comma_round_trips() {
        let csv = registrations_to_csv(&[registration("Smith, John")]);
        let rows = parse_csv(&csv);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1][0], "Smith, John");
        assert_eq!(rows[1].len(), 5);
    }

    #[test]
    fn test_embedded_quotes_and_newlines_round_trip() {
        let tricky = "Jane \"JJ\" Doe\nSecond line";
        let csv = registrations_to_csv(&[registration(tricky), registration("Bob")]);
        let rows = parse_csv(&csv);
        assert_eq!(rows[1][0], tricky);
        assert_eq!(rows[2][0], "Bob");
    }

    #[test]
    fn test_typed_email_keeps_its_case() {
        let mut details = registrant("John");
        details.email = "John.Smith@Gmail.com".to_string();
        let registration = Registration::new(Uuid::new_v4(), details, "a@x.com");

        let rows = parse_csv(&registrations_to_csv(&[registration]));
        assert_eq!(rows[1][1], "John.Smith@Gmail.com");
    }

    #[test]
    fn test_export_file_name() {
        assert_eq!(
            export_file_name("Tech Fest: 2025"),
            "Tech_Fest__2025_registrations.csv"
        );
    }
}
