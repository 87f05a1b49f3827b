//! CLI subcommand implementations.

pub mod candidates;
pub mod links;
pub mod receipts;

/// Splits `key=value&key=value` into pairs. Pieces without `=` become keys
/// with empty values.
pub fn parse_cursor(cursor: &str) -> Vec<(String, String)> {
    cursor
        .split('&')
        .filter(|piece| !piece.is_empty())
        .map(|piece| match piece.split_once('=') {
            Some((k, v)) => (k.trim().to_string(), v.trim().to_string()),
            None => (piece.trim().to_string(), String::new()),
        })
        .collect()
}
