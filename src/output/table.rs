//! Console table rendering.

use comfy_table::{presets, Table};

use crate::models::PaperRecord;

/// Column headers, in display order
pub const TABLE_HEADERS: [&str; 6] = [
    "PubmedID",
    "Title",
    "Publication Date",
    "Non-academic Authors",
    "Company Affiliations",
    "Corresponding Email",
];

/// Render records as a grid-bordered table
pub fn render_table(records: &[PaperRecord]) -> String {
    let mut table = Table::new();
    table
        .load_preset(presets::ASCII_FULL)
        .set_header(TABLE_HEADERS.to_vec());

    for record in records {
        table.add_row(vec![
            record.id.to_string(),
            record.title.clone(),
            record.publication_date.clone(),
            record.joined_authors(),
            record.joined_affiliations(),
            record.email_or_na().to_string(),
        ]);
    }

    table.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PaperRecordBuilder;

    #[test]
    fn test_render_table_headers_and_rows() {
        let records = vec![
            PaperRecordBuilder::new("40064631")
                .title("Immunotherapy outcomes")
                .publication_date("2025")
                .build(),
            PaperRecordBuilder::new("40064100")
                .non_academic_authors(vec!["A. Smith".to_string(), "B. Jones".to_string()])
                .company_affiliations(vec!["Acme Bio".to_string()])
                .build(),
        ];

        let rendered = render_table(&records);

        let header_line = rendered.lines().nth(1).unwrap();
        let positions: Vec<usize> = TABLE_HEADERS
            .iter()
            .map(|h| header_line.find(h).unwrap())
            .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));

        assert!(rendered.starts_with('+'));
        assert!(rendered.contains("40064631"));
        assert!(rendered.contains("Immunotherapy outcomes"));
        assert!(rendered.contains("A. Smith, B. Jones"));
        assert!(rendered.contains("Acme Bio"));
        assert_eq!(rendered.matches("N/A").count(), 2);
    }

    #[test]
    fn test_render_table_empty() {
        let rendered = render_table(&[]);
        assert!(rendered.contains("PubmedID"));
        assert!(!rendered.contains("N/A"));
    }
}
