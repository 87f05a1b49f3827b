use anyhow::{bail, Result};
use clap::Args;
use openfec_lib::documents::{
    create_eregs_link, make_csv_url, make_fec_url, make_report_pdf_url, make_schedule_pdf_url,
};

use crate::output::{print_rows, LinkRow, OutputFormat};

#[derive(Args)]
pub struct LinksArgs {
    /// Image number of a report or schedule page (11 or 18 digits)
    #[arg(long)]
    pub image_number: Option<String>,

    /// Electronic filing number
    #[arg(long)]
    pub file_number: Option<i64>,

    /// Regulation part (e.g. 100)
    #[arg(long)]
    pub reg_part: Option<String>,

    /// Regulation section within the part (e.g. 5)
    #[arg(long, requires = "reg_part")]
    pub reg_section: Option<String>,
}

pub fn build_links(args: &LinksArgs) -> Vec<LinkRow> {
    let mut links = Vec::new();
    let mut push = |kind: &str, url: Option<String>| {
        if let Some(url) = url {
            links.push(LinkRow {
                kind: kind.to_string(),
                url,
            });
        }
    };

    if let Some(ref image) = args.image_number {
        push("report_pdf", make_report_pdf_url(image));
        push("schedule_pdf", make_schedule_pdf_url(image));
    }
    if let Some(file_number) = args.file_number {
        push("csv", make_csv_url(file_number));
        let image = args.image_number.as_deref().unwrap_or_default();
        push("fec", make_fec_url(image, Some(file_number)));
    }
    if let Some(ref part) = args.reg_part {
        push(
            "regulation",
            Some(create_eregs_link(part, args.reg_section.as_deref())),
        );
    }
    links
}

pub fn run(args: &LinksArgs, format: &OutputFormat) -> Result<()> {
    if args.image_number.is_none() && args.file_number.is_none() && args.reg_part.is_none() {
        bail!("nothing to link: pass --image-number, --file-number or --reg-part");
    }
    let links = build_links(args);
    if links.is_empty() {
        bail!("no documents exist for the given identifiers");
    }
    print_rows(links, format)
}
