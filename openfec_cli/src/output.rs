use anyhow::Result;
use openfec_lib::openfec_query::{Record, SqlValue};
use serde::Serialize;
use tabled::settings::Style;
use tabled::{Table, Tabled};

#[derive(Clone, Debug, PartialEq)]
pub enum OutputFormat {
    Table,
    Json,
    Csv,
    Markdown,
}

impl OutputFormat {
    pub fn parse(value: &str) -> Self {
        match value {
            "json" => Self::Json,
            "csv" => Self::Csv,
            "md" | "markdown" => Self::Markdown,
            _ => Self::Table,
        }
    }
}

#[derive(Tabled, Serialize)]
pub struct ReceiptRow {
    #[tabled(rename = "Sub ID")]
    #[serde(rename = "Sub ID")]
    sub_id: String,
    #[tabled(rename = "Date")]
    #[serde(rename = "Date")]
    date: String,
    #[tabled(rename = "Contributor")]
    #[serde(rename = "Contributor")]
    contributor: String,
    #[tabled(rename = "State")]
    #[serde(rename = "State")]
    state: String,
    #[tabled(rename = "Amount")]
    #[serde(rename = "Amount")]
    amount: String,
    #[tabled(rename = "Committee")]
    #[serde(rename = "Committee")]
    committee: String,
}

#[derive(Tabled, Serialize)]
pub struct CandidateRow {
    #[tabled(rename = "Candidate ID")]
    #[serde(rename = "Candidate ID")]
    candidate_id: String,
    #[tabled(rename = "Name")]
    #[serde(rename = "Name")]
    name: String,
    #[tabled(rename = "Office")]
    #[serde(rename = "Office")]
    office: String,
    #[tabled(rename = "State")]
    #[serde(rename = "State")]
    state: String,
    #[tabled(rename = "District")]
    #[serde(rename = "District")]
    district: String,
    #[tabled(rename = "Party")]
    #[serde(rename = "Party")]
    party: String,
    #[tabled(rename = "Period")]
    #[serde(rename = "Period")]
    period: String,
    #[tabled(rename = "Term (yrs)")]
    #[serde(rename = "Term (yrs)")]
    term: String,
}

#[derive(Tabled, Serialize)]
pub struct LinkRow {
    #[tabled(rename = "Kind")]
    #[serde(rename = "Kind")]
    pub kind: String,
    #[tabled(rename = "URL")]
    #[serde(rename = "URL")]
    pub url: String,
}

// -- Row builders --

fn text(record: &Record, field: &str) -> String {
    record.value_of(field).to_string()
}

pub fn build_receipt_rows(records: &[Record]) -> Vec<ReceiptRow> {
    records
        .iter()
        .map(|r| ReceiptRow {
            sub_id: text(r, "sub_id"),
            date: text(r, "contribution_receipt_date"),
            contributor: text(r, "contributor_name"),
            state: text(r, "contributor_state"),
            amount: format_amount(&r.value_of("contribution_receipt_amount")),
            committee: match r.get("committee_name") {
                Some(name) if !name.is_null() => name.to_string(),
                _ => text(r, "committee_id"),
            },
        })
        .collect()
}

pub fn build_candidate_rows(records: &[Record]) -> Vec<CandidateRow> {
    records
        .iter()
        .map(|r| CandidateRow {
            candidate_id: text(r, "candidate_id"),
            name: text(r, "name"),
            office: text(r, "office"),
            state: text(r, "state"),
            district: text(r, "district"),
            party: text(r, "party"),
            period: text(r, "two_year_period"),
            term: text(r, "election_duration"),
        })
        .collect()
}

// -- Generic printers --

pub fn print_table<T: Tabled>(rows: Vec<T>) {
    println!("{}", Table::new(rows));
}

pub fn print_markdown<T: Tabled>(rows: Vec<T>) {
    let mut table = Table::new(rows);
    table.with(Style::markdown());
    println!("{}", table);
}

pub fn print_csv<T: Serialize>(rows: Vec<T>) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(std::io::stdout());
    for row in rows {
        wtr.serialize(row)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn print_json<T: Serialize>(data: &T) {
    match serde_json::to_string_pretty(data) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("Failed to serialize to JSON: {}", e),
    }
}

/// Prints rows in a tabular format. JSON callers print the full page
/// instead, so `Json` falls back to the rows themselves.
pub fn print_rows<T: Tabled + Serialize>(rows: Vec<T>, format: &OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Table => print_table(rows),
        OutputFormat::Markdown => print_markdown(rows),
        OutputFormat::Csv => print_csv(rows)?,
        OutputFormat::Json => print_json(&rows),
    }
    Ok(())
}

fn format_amount(value: &SqlValue) -> String {
    match value.as_f64() {
        Some(v) if v.is_finite() => {
            let sign = if v < 0.0 { "-" } else { "" };
            let cents = (v.abs() * 100.0).round() as i64;
            format!("{}${}.{:02}", sign, group_thousands(cents / 100), cents % 100)
        }
        _ => String::new(),
    }
}

fn group_thousands(n: i64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// Renders a cursor as `key=value&key=value`, the form `--cursor` accepts.
pub fn format_cursor(pairs: &[(String, String)]) -> String {
    pairs
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join("&")
}

#[cfg(test)]
mod tests {
    use super::*;

    // -- format_amount tests --

    #[test]
    fn test_format_amount_thousands() {
        assert_eq!(format_amount(&SqlValue::Real(1234567.5)), "$1,234,567.50");
    }

    #[test]
    fn test_format_amount_small() {
        assert_eq!(format_amount(&SqlValue::Real(25.0)), "$25.00");
        assert_eq!(format_amount(&SqlValue::Real(0.0)), "$0.00");
    }

    #[test]
    fn test_format_amount_refund() {
        assert_eq!(format_amount(&SqlValue::Real(-1500.0)), "-$1,500.00");
    }

    #[test]
    fn test_format_amount_missing() {
        assert_eq!(format_amount(&SqlValue::Null), "");
        assert_eq!(format_amount(&SqlValue::Real(f64::INFINITY)), "");
    }

    // -- Row builder tests --

    #[test]
    fn test_build_receipt_rows_mapping() {
        let record = Record::new()
            .with("sub_id", 4123_i64)
            .with("committee_id", "C00401224")
            .with("contributor_name", "DOE, JANE")
            .with("contributor_state", "CA")
            .with("contribution_receipt_date", "2024-01-05")
            .with("contribution_receipt_amount", 250.0);
        let rows = build_receipt_rows(&[record]);
        assert_eq!(rows.len(), 1);
        let row = &rows[0];
        assert_eq!(row.sub_id, "4123");
        assert_eq!(row.contributor, "DOE, JANE");
        assert_eq!(row.amount, "$250.00");
        assert_eq!(row.committee, "C00401224");
    }

    #[test]
    fn test_build_receipt_rows_prefers_committee_name() {
        let record = Record::new()
            .with("committee_id", "C00401224")
            .with("committee_name", "ACTBLUE");
        assert_eq!(build_receipt_rows(&[record])[0].committee, "ACTBLUE");
    }

    #[test]
    fn test_build_receipt_rows_nulls_render_empty() {
        let record = Record::new()
            .with("sub_id", 1_i64)
            .with("contributor_name", SqlValue::Null);
        let row = &build_receipt_rows(&[record])[0];
        assert_eq!(row.contributor, "");
        assert_eq!(row.date, "");
    }

    #[test]
    fn test_build_candidate_rows_mapping() {
        let record = Record::new()
            .with("candidate_id", "S0NY00188")
            .with("name", "DOE, JOHN")
            .with("office", "S")
            .with("state", "NY")
            .with("two_year_period", 2024_i64)
            .with("election_duration", 6_i64);
        let row = &build_candidate_rows(&[record])[0];
        assert_eq!(row.office, "S");
        assert_eq!(row.period, "2024");
        assert_eq!(row.term, "6");
        assert_eq!(row.district, "");
    }

    #[test]
    fn test_output_format_parse() {
        assert_eq!(OutputFormat::parse("json"), OutputFormat::Json);
        assert_eq!(OutputFormat::parse("md"), OutputFormat::Markdown);
        assert_eq!(OutputFormat::parse("anything"), OutputFormat::Table);
    }

    #[test]
    fn test_format_cursor() {
        let pairs = vec![
            ("last_index".to_string(), "6".to_string()),
            ("sort_null_only".to_string(), "true".to_string()),
        ];
        assert_eq!(format_cursor(&pairs), "last_index=6&sort_null_only=true");
    }
}
