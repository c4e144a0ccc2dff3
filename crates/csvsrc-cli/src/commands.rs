use std::io::{self, Write};
use std::ops::ControlFlow;

use anyhow::{Context, Result, bail};
use tracing::{info, info_span};

use csvsrc_cli::config::resolve_config;
use csvsrc_cli::render::{catalog_table, columns_table, row_json, rows_table};
use csvsrc_ingest::{CancelFlag, Catalog, discover_tables};
use csvsrc_model::Row;

use crate::cli::{DescribeArgs, QueryArgs, RowFormatArg, SourceArgs};

fn discover(source: &SourceArgs) -> Result<Catalog> {
    let config = resolve_config(source.config.as_deref(), source.overrides())
        .context("load connection config")?;
    discover_tables(&config).context("discover tables")
}

/// Lists tables; returns true when any file failed to load.
pub fn run_tables(source: &SourceArgs) -> Result<bool> {
    let catalog = discover(source)?;
    println!("{}", catalog_table(&catalog));

    for path in &catalog.skipped_empty {
        println!("skipped (empty): {}", path.display());
    }
    for failure in &catalog.failures {
        println!("failed: {} ({})", failure.name, failure.error);
    }
    Ok(!catalog.failures.is_empty())
}

pub fn run_describe(source: &SourceArgs, args: &DescribeArgs) -> Result<()> {
    let catalog = discover(source)?;
    let Some(table) = catalog.table(&args.table) else {
        bail!("table not found: {}", args.table);
    };
    println!("{}", table.description);
    println!("{}", columns_table(table));
    Ok(())
}

pub fn run_query(source: &SourceArgs, args: &QueryArgs) -> Result<()> {
    let catalog = discover(source)?;
    let Some(table) = catalog.table(&args.table) else {
        bail!("table not found: {}", args.table);
    };
    let span = info_span!("query", table = %table.name);
    let _guard = span.enter();

    let limit = args.limit.unwrap_or(usize::MAX);
    let cancel = CancelFlag::new();
    let mut stdout = io::stdout().lock();
    let mut buffered: Vec<Row> = Vec::new();
    let mut write_error: Option<anyhow::Error> = None;
    let mut taken = 0usize;

    let mut sink = |row: Row| {
        taken += 1;
        match args.format {
            RowFormatArg::Table => buffered.push(row),
            RowFormatArg::Jsonl => {
                let line = row_json(table, &row).context("serialize row");
                if let Err(e) = line.and_then(|l| writeln!(stdout, "{l}").context("write row")) {
                    write_error = Some(e);
                    return ControlFlow::Break(());
                }
            }
        }
        if taken >= limit {
            ControlFlow::Break(())
        } else {
            ControlFlow::Continue(())
        }
    };

    let summary = if limit == 0 {
        Default::default()
    } else {
        catalog
            .stream(&table.name, &cancel, &mut sink)
            .with_context(|| format!("stream table {}", table.name))?
    };
    if let Some(error) = write_error {
        return Err(error);
    }
    if args.format == RowFormatArg::Table {
        writeln!(stdout, "{}", rows_table(table, &buffered)).context("write rows")?;
    }

    info!(
        emitted = summary.emitted,
        skipped = summary.skipped,
        "query complete"
    );
    Ok(())
}
