use anyhow::Context;
use clap::Args;
use serde_json::{json, Value};
use std::path::PathBuf;

use crate::cli::utils::parse_pair;
use crate::cli::OutputFormat;
use crate::table::filter::stringify;
use crate::table::{ColumnSpec, SortDirection, Table};
use crate::types::Row;

#[derive(Args, Debug)]
pub struct TableArgs {
    #[arg(help = "JSON file holding an array of row objects")]
    pub file: PathBuf,

    #[arg(long, help = "Column to sort by")]
    pub sort: Option<String>,

    #[arg(long, help = "Sort descending")]
    pub desc: bool,

    #[arg(long, value_name = "COL=TEXT", help = "Case-insensitive substring filter")]
    pub filter: Vec<String>,

    #[arg(long, value_name = "COL=N", help = "Inclusive lower bound")]
    pub min: Vec<String>,

    #[arg(long, value_name = "COL=N", help = "Inclusive upper bound")]
    pub max: Vec<String>,

    #[arg(long, help = "Rows per page")]
    pub page_size: Option<usize>,

    #[arg(long, default_value_t = 1, help = "1-based page number")]
    pub page: usize,
}

/// Columns in order of first appearance across the rows
fn columns_of(rows: &[Row]) -> Vec<ColumnSpec> {
    let mut keys: Vec<&String> = Vec::new();
    for key in rows.iter().flat_map(|r| r.keys()) {
        if !keys.contains(&key) {
            keys.push(key);
        }
    }
    keys.into_iter().map(|k| ColumnSpec::new(k.clone())).collect()
}

pub(crate) fn build(rows: Vec<Row>, args: &TableArgs) -> anyhow::Result<Table> {
    let columns = columns_of(&rows);
    let mut table = Table::new(rows, columns);
    if let Some(size) = args.page_size {
        table = table.page_size(size);
    }

    for raw in &args.filter {
        let (col, text) = parse_pair(raw)?;
        table.set_text_filter(&col, text)?;
    }
    for raw in &args.min {
        let (col, bound) = parse_pair(raw)?;
        table.set_range_min(&col, bound)?;
    }
    for raw in &args.max {
        let (col, bound) = parse_pair(raw)?;
        table.set_range_max(&col, bound)?;
    }
    if let Some(col) = &args.sort {
        let direction = if args.desc { SortDirection::Desc } else { SortDirection::Asc };
        table.set_sort(col, Some(direction))?;
    }
    table.set_page(args.page.saturating_sub(1));
    Ok(table)
}

pub fn handle(args: TableArgs, output_format: OutputFormat) -> anyhow::Result<()> {
    let raw = std::fs::read_to_string(&args.file).with_context(|| format!("Reading {}", args.file.display()))?;
    let rows: Vec<Row> = serde_json::from_str(&raw).context("Expected a JSON array of objects")?;
    let table = build(rows, &args)?;

    let page = table.page_index() + 1;
    let page_count = table.page_count();
    let matched = table.filtered_count();

    match output_format {
        OutputFormat::Json => {
            let body = json!({
                "page": page,
                "page_count": page_count,
                "matched": matched,
                "rows": table.page_rows(),
            });
            println!("{}", serde_json::to_string_pretty(&body)?);
        }
        OutputFormat::Text => {
            let keys: Vec<&str> = table.columns().iter().map(|c| c.key.as_str()).collect();
            println!("{}", keys.join("\t"));
            for row in table.page_rows() {
                let cells: Vec<String> = keys
                    .iter()
                    .map(|k| stringify(row.get(*k).unwrap_or(&Value::Null)))
                    .collect();
                println!("{}", cells.join("\t"));
            }
            println!("-- Page {} of {} ({} rows)", page, page_count, matched);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct Harness {
        #[command(flatten)]
        args: TableArgs,
    }

    fn args(flags: &[&str]) -> TableArgs {
        let mut argv = vec!["table", "rows.json"];
        argv.extend_from_slice(flags);
        Harness::parse_from(argv).args
    }

    fn rows() -> Vec<Row> {
        serde_json::from_value(json!([
            {"Title": "Filing", "FeeAmt": 1500},
            {"Title": "Hearing", "FeeAmt": 3000},
            {"Title": "Research", "FeeAmt": null},
            {"Title": "Drafting", "FeeAmt": 500}
        ]))
        .unwrap()
    }

    fn titles(table: &Table) -> Vec<String> {
        table.page_rows().iter().map(|r| stringify(&r["Title"])).collect()
    }

    #[test]
    fn range_filter_then_sort_desc() {
        let table = build(rows(), &args(&["--min", "FeeAmt=1000", "--sort", "FeeAmt", "--desc"])).unwrap();
        assert_eq!(titles(&table), vec!["Hearing", "Filing"]);
    }

    #[test]
    fn text_filter_and_paging() {
        let table = build(rows(), &args(&["--filter", "Title=ING", "--page-size", "2", "--page", "2"])).unwrap();
        assert_eq!(table.filtered_count(), 3);
        assert_eq!(titles(&table), vec!["Drafting"]);
    }

    #[test]
    fn out_of_range_page_is_clamped() {
        let table = build(rows(), &args(&["--page", "9"])).unwrap();
        assert_eq!(table.page_index(), table.page_count() - 1);
    }

    #[test]
    fn unknown_columns_are_errors() {
        assert!(build(rows(), &args(&["--sort", "Nope"])).is_err());
    }
}
