use anyhow::Result;
use clap::Args;
use openfec_lib::documents::election_duration_expr;
use openfec_lib::openfec_query::sorting::SortOptions;
use openfec_lib::openfec_query::Query;
use openfec_lib::{
    check_election_arguments, fetch_page, models, validation, Config, Db, ElectionArgs,
    FetchOptions, PageParams,
};

use crate::output::{build_candidate_rows, print_json, print_rows, OutputFormat};

#[derive(Args)]
pub struct CandidatesArgs {
    /// Office sought: house, senate or president
    #[arg(long)]
    pub office: Option<String>,

    /// Two-year election cycle (e.g. 2024)
    #[arg(long)]
    pub cycle: Option<i32>,

    /// US state code; required for house and senate
    #[arg(long)]
    pub state: Option<String>,

    /// Congressional district (e.g. 07); required for house
    #[arg(long)]
    pub district: Option<String>,

    /// Sort fields, comma separated; prefix with '-' for descending
    #[arg(long, value_delimiter = ',', default_value = "name")]
    pub sort: Vec<String>,

    /// Page number
    #[arg(long, default_value = "1")]
    pub page: i64,

    /// Results per page (defaults to the configured default)
    #[arg(long)]
    pub per_page: Option<i64>,
}

fn office_code(office: &str) -> &'static str {
    match office.to_lowercase().as_str() {
        "house" => "H",
        "senate" => "S",
        "president" => "P",
        _ => "",
    }
}

pub fn run(args: &CandidatesArgs, db: &Db, config: &Config, format: &OutputFormat) -> Result<()> {
    check_election_arguments(&ElectionArgs {
        office: args.office.clone(),
        cycle: args.cycle,
        state: args.state.clone(),
        district: args.district.clone(),
    })?;

    let model = models::candidate_history();
    let office = model.try_column("office")?;
    let mut query = Query::new(&model)
        .add_column(election_duration_expr(office), "election_duration");

    if let Some(ref name) = args.office {
        let code = office_code(name);
        if code.is_empty() {
            anyhow::bail!("unknown office '{}'. Valid values: house, senate, president", name);
        }
        query = query.filter(office.eq(code));
    }
    if let Some(cycle) = args.cycle {
        let cycle = validation::validate_cycle(cycle)?;
        query = query.filter(model.try_column("two_year_period")?.eq(cycle));
    }
    if let Some(ref state) = args.state {
        let state = validation::validate_state(state)?;
        query = query.filter(model.try_column("state")?.eq(state));
    }
    if let Some(ref district) = args.district {
        query = query.filter(model.try_column("district")?.eq(district.as_str()));
    }

    let mut params = PageParams::new()
        .with_per_page(args.per_page.unwrap_or(config.default_per_page))
        .with_page(args.page);
    for sort in &args.sort {
        params = params.with_sort(sort);
    }

    let index = model.try_column("idx")?.clone();
    let options = FetchOptions::default()
        .with_cap(config.cap())
        .with_multi(true)
        .with_sort(SortOptions::default().with_index_column(index));
    let page = fetch_page(db, query, &params, &model, &options)?;

    let p = &page.pagination;
    eprintln!("Page {}/{} ({} total candidates)", p.page, p.pages, p.count);
    match format {
        OutputFormat::Json => print_json(&page),
        _ => print_rows(build_candidate_rows(&page.results), format)?,
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_office_code() {
        assert_eq!(office_code("House"), "H");
        assert_eq!(office_code("senate"), "S");
        assert_eq!(office_code("president"), "P");
        assert_eq!(office_code("governor"), "");
    }
}
