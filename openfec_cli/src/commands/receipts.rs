use anyhow::{bail, Result};
use clap::Args;
use openfec_lib::openfec_query::{ColumnType, Query, SqlValue};
use openfec_lib::relations::related_committee;
use openfec_lib::{
    fetch_page, fetch_seek_page, models, validation, Config, Db, FetchOptions, PageParams,
};

use crate::commands::parse_cursor;
use crate::output::{build_receipt_rows, format_cursor, print_json, print_rows, OutputFormat};

#[derive(Args)]
pub struct ReceiptsArgs {
    /// Filter by recipient committee ID (e.g. C00401224)
    #[arg(long)]
    pub committee_id: Option<String>,

    /// Filter by contributor US state code (e.g. CA, TX, NY)
    #[arg(long)]
    pub state: Option<String>,

    /// Only receipts on or after this date (YYYY-MM-DD)
    #[arg(long)]
    pub min_date: Option<String>,

    /// Only receipts on or before this date (YYYY-MM-DD)
    #[arg(long)]
    pub max_date: Option<String>,

    /// Only receipts of at least this amount
    #[arg(long)]
    pub min_amount: Option<f64>,

    /// Two-year transaction period (even year, e.g. 2024)
    #[arg(long)]
    pub cycle: Option<i32>,

    /// Sort field; prefix with '-' for descending
    #[arg(long, default_value = "-contribution_receipt_date")]
    pub sort: String,

    /// Drop rows whose sort field is empty
    #[arg(long)]
    pub hide_null: bool,

    /// Results per page (defaults to the configured default)
    #[arg(long)]
    pub per_page: Option<i64>,

    /// Page number; switches to offset paging
    #[arg(long, conflicts_with = "cursor")]
    pub page: Option<i64>,

    /// Cursor printed after the previous page, e.g. "last_index=4123&last_contribution_receipt_date=2024-01-05"
    #[arg(long)]
    pub cursor: Option<String>,

    /// Include the recipient committee's name
    #[arg(long)]
    pub with_committee: bool,
}

pub fn run(args: &ReceiptsArgs, db: &Db, config: &Config, format: &OutputFormat) -> Result<()> {
    let model = models::schedule_a();
    let mut query = Query::new(&model);

    if let Some(ref committee_id) = args.committee_id {
        query = query.filter(model.try_column("committee_id")?.eq(committee_id.as_str()));
    }
    if let Some(ref state) = args.state {
        let state = validation::validate_state(state)?;
        query = query.filter(model.try_column("contributor_state")?.eq(state));
    }
    let date = model.try_column("contribution_receipt_date")?;
    let min_date = parse_date(args.min_date.as_deref())?;
    let max_date = parse_date(args.max_date.as_deref())?;
    if let (Some(min), Some(max)) = (&min_date, &max_date) {
        if min.as_date() > max.as_date() {
            bail!("--min-date ({}) must be on or before --max-date ({})", min, max);
        }
    }
    if let Some(min) = min_date {
        query = query.filter(date.expr().ge(min));
    }
    if let Some(max) = max_date {
        query = query.filter(date.expr().le(max));
    }
    if let Some(amount) = args.min_amount {
        query = query.filter(model.try_column("contribution_receipt_amount")?.expr().ge(amount));
    }
    if let Some(cycle) = args.cycle {
        let cycle = validation::validate_cycle(cycle)?;
        query = query.filter(model.try_column("two_year_transaction_period")?.eq(cycle));
    }
    if args.with_committee {
        let registry = models::registry();
        let committees = registry.try_get("CommitteeDetail")?;
        query = query
            .join(related_committee().build(&registry, &model)?)
            .add_column(committees.try_column("name")?, "committee_name");
    }

    let mut params = match args.cursor {
        Some(ref cursor) => PageParams::from_query_pairs(&parse_cursor(cursor))?,
        None => PageParams::new(),
    };
    params.per_page = Some(args.per_page.unwrap_or(config.default_per_page));
    params.sort = vec![args.sort.clone()];
    params.sort_hide_null = args.hide_null;

    let options = FetchOptions::default().with_cap(config.cap());
    let Some(index_column) = model.primary_key() else {
        bail!("model {} has no primary key", model.name());
    };

    if let Some(page) = args.page {
        let page = fetch_page(db, query, &params.with_page(page), &model, &options)?;
        let p = &page.pagination;
        eprintln!("Page {}/{} ({} total receipts)", p.page, p.pages, p.count);
        match format {
            OutputFormat::Json => print_json(&page),
            _ => print_rows(build_receipt_rows(&page.results), format)?,
        }
        return Ok(());
    }

    let page = fetch_seek_page(db, query, &params, index_column, &options)?;
    eprintln!(
        "{} receipts ({} total, {} per page)",
        page.results.len(),
        page.pagination.count,
        page.pagination.per_page
    );
    match format {
        OutputFormat::Json => print_json(&page),
        _ => print_rows(build_receipt_rows(&page.results), format)?,
    }
    if let Some(ref last) = page.pagination.last_indexes {
        eprintln!("Next page: --cursor '{}'", format_cursor(&last.to_query_pairs()));
    }
    Ok(())
}

fn parse_date(raw: Option<&str>) -> Result<Option<SqlValue>> {
    Ok(raw.map(|d| ColumnType::Date.parse_value(d)).transpose()?)
}
