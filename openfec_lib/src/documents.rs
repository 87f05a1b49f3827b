//! Document descriptions and links into the FEC document archive.

use std::sync::OnceLock;

use openfec_query::{Column, Expr};
use regex::Regex;

use crate::decoders;

const DOCQUERY: &str = "http://docquery.fec.gov";

fn braced_segments() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\{[^)]*\}").expect("static pattern"))
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

/// Human-readable title for a filed document, e.g. `"APRIL QUARTERLY 2024"`.
///
/// Picks the report type (with `{...}` annotations removed), then the
/// document type, then the decoded form type, then `Document`.
pub fn document_description(
    report_year: i32,
    report_type: Option<&str>,
    document_type: Option<&str>,
    form_type: Option<&str>,
) -> String {
    let form_type = non_empty(form_type);
    let mut clean = if let Some(report_type) = non_empty(report_type) {
        braced_segments().replace_all(report_type, "").into_owned()
    } else if let Some(document_type) = non_empty(document_type) {
        document_type.to_string()
    } else if let Some(name) = form_type.and_then(decoders::form_type_name) {
        name.to_string()
    } else {
        "Document".to_string()
    };

    if matches!(form_type, Some("RFAI") | Some("FRQ")) {
        clean = format!("RFAI: {}", clean);
    }
    format!("{} {}", clean.trim(), report_year)
}

/// PDF of a whole report, filed under the last three digits of its image
/// number.
pub fn make_report_pdf_url(image_number: &str) -> Option<String> {
    if image_number.is_empty() {
        return None;
    }
    let start = image_number
        .char_indices()
        .rev()
        .nth(2)
        .map(|(idx, _)| idx)
        .unwrap_or(0);
    Some(format!(
        "{}/pdf/{}/{}/{}.pdf",
        DOCQUERY,
        &image_number[start..],
        image_number,
        image_number
    ))
}

/// Single-page image viewer for a schedule item.
pub fn make_schedule_pdf_url(image_number: &str) -> Option<String> {
    if image_number.is_empty() {
        return None;
    }
    Some(format!("{}/cgi-bin/fecimg/?{}", DOCQUERY, image_number))
}

/// CSV export of an electronic filing. Negative file numbers have none.
pub fn make_csv_url(file_number: i64) -> Option<String> {
    match file_number {
        0..=99 => Some(format!("{}/csv/000/{}.csv", DOCQUERY, file_number)),
        n if n >= 100 => {
            let digits = n.to_string();
            Some(format!(
                "{}/csv/{}/{}.csv",
                DOCQUERY,
                &digits[digits.len() - 3..],
                digits
            ))
        }
        _ => None,
    }
}

/// Raw `.fec` file for a filing.
///
/// The image number's indicator digit (position 8 of an 18-digit number,
/// position 2 of an 11-digit one) selects the archive: `9` marks electronic
/// filings, anything else paper.
pub fn make_fec_url(image_number: &str, file_number: Option<i64>) -> Option<String> {
    let file_number = file_number.filter(|n| *n >= 0)?;
    let indicator = match image_number.chars().count() {
        18 => image_number.chars().nth(8),
        11 => image_number.chars().nth(2),
        _ => None,
    };
    let url = match indicator {
        Some('9') => format!("{}/dcdev/posted/{}.fec", DOCQUERY, file_number),
        _ => format!("{}/paper/posted/{}.fec", DOCQUERY, file_number),
    };
    Some(url)
}

/// Relative link to a section of the electronic regulations.
pub fn create_eregs_link(part: &str, section: Option<&str>) -> String {
    match non_empty(section) {
        Some(section) => format!("/regulations/{}-{}/CURRENT", part, section),
        None => format!("/regulations/{}/CURRENT", part),
    }
}

/// Election length in years by office code: senate 6, president 4,
/// everything else 2.
pub fn election_duration(office: &str) -> i64 {
    match office {
        "S" => 6,
        "P" => 4,
        _ => 2,
    }
}

/// [`election_duration`] as a SQL `CASE` over an office column.
pub fn election_duration_expr(office: &Column) -> Expr {
    Expr::Case {
        whens: vec![
            (office.eq("S"), Expr::value(6_i64)),
            (office.eq("P"), Expr::value(4_i64)),
        ],
        otherwise: Box::new(Expr::value(2_i64)),
    }
}
