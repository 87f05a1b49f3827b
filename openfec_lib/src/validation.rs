use std::sync::OnceLock;

use regex::Regex;

use crate::error::ApiError;

pub const VALID_STATES: &[&str] = &[
    "AL", "AK", "AZ", "AR", "CA", "CO", "CT", "DE", "FL", "GA", "HI", "ID", "IL", "IN", "IA",
    "KS", "KY", "LA", "ME", "MD", "MA", "MI", "MN", "MS", "MO", "MT", "NE", "NV", "NH", "NJ",
    "NM", "NY", "NC", "ND", "OH", "OK", "OR", "PA", "RI", "SC", "SD", "TN", "TX", "UT", "VT",
    "VA", "WA", "WV", "WI", "WY", "DC", "AS", "GU", "MP", "PR", "VI",
];

/// First two-year period with electronic FEC data.
pub const MIN_CYCLE: i32 = 1976;

/// Election lookup arguments as received from the caller.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ElectionArgs {
    pub office: Option<String>,
    pub cycle: Option<i32>,
    pub state: Option<String>,
    pub district: Option<String>,
}

impl ElectionArgs {
    fn get(&self, arg: &str) -> Option<String> {
        match arg {
            "office" => self.office.clone(),
            "cycle" => self.cycle.map(|c| c.to_string()),
            "state" => self.state.clone(),
            "district" => self.district.clone(),
            _ => None,
        }
    }
}

const REQUIRED_ELECTION_ARGS: &[&str] = &["office", "cycle"];

/// Extra arguments an office type needs to pin down one race.
fn office_args(office: &str) -> &'static [&'static str] {
    match office {
        "house" => &["state", "district"],
        "senate" => &["state"],
        _ => &[],
    }
}

/// Checks that an election lookup names enough to identify a race:
/// `office` and `cycle` always, plus `state` for senate and `state` and
/// `district` for house.
pub fn check_election_arguments(args: &ElectionArgs) -> Result<(), ApiError> {
    for arg in REQUIRED_ELECTION_ARGS {
        if args.get(arg).is_none() {
            return Err(ApiError::validation(format!(
                "Required parameter \"{}\" not found.",
                arg
            )));
        }
    }
    let office = args.office.as_deref().unwrap_or_default();
    for arg in office_args(&office.to_lowercase()) {
        if args.get(arg).is_none() {
            return Err(ApiError::validation(format!(
                "Must include argument \"{}\" with office type \"{}\"",
                arg, office
            )));
        }
    }
    Ok(())
}

fn non_word() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\W").expect("static pattern"))
}

/// Turns free text into a prefix-matching full-text query:
/// `"hello, world!"` becomes `"hello:* & world:*"`.
pub fn parse_fulltext(text: &str) -> String {
    non_word()
        .replace_all(text, " ")
        .split_whitespace()
        .map(|part| format!("{}:*", part))
        .collect::<Vec<_>>()
        .join(" & ")
}

/// Validate a state code: case-insensitive, must be a US state, DC or territory.
pub fn validate_state(input: &str) -> Result<String, ApiError> {
    let upper = input.trim().to_uppercase();
    if VALID_STATES.contains(&upper.as_str()) {
        Ok(upper)
    } else {
        Err(ApiError::validation(format!(
            "Unknown state code \"{}\"",
            input
        )))
    }
}

/// Validate an election cycle: an even year no earlier than 1976.
pub fn validate_cycle(cycle: i32) -> Result<i32, ApiError> {
    if cycle < MIN_CYCLE || cycle % 2 != 0 {
        return Err(ApiError::validation(format!(
            "Parameter \"cycle\" must be an even year from {} on, got {}",
            MIN_CYCLE, cycle
        )));
    }
    Ok(cycle)
}
