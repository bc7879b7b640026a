// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

mod chart;
mod config;
mod runtime;

use anyhow::{Context, Result, anyhow, bail};
use chart::TextChartFactory;
use config::Config;
use fingrid_app::{RecordId, Schema, current_year};
use fingrid_grid::{ChartClick, ChartSlot, DeleteOutcome, Page, SchemaInferredGrid};
use runtime::{HttpRuntime, StdinConfirm};
use std::env;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

fn main() {
    init_tracing();
    if let Err(error) = run() {
        eprintln!("{error:#}");
        std::process::exit(1);
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("FINGRID_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run() -> Result<()> {
    let options = parse_cli_args(env::args().skip(1), Config::default_path()?)?;
    if options.show_help {
        print_help();
        return Ok(());
    }

    if options.print_config_path {
        println!("{}", options.config_path.display());
        return Ok(());
    }

    if options.print_example {
        print!("{}", Config::example_config(&options.config_path));
        return Ok(());
    }

    let config = Config::load(&options.config_path).with_context(|| {
        format!(
            "load config {}; run `fingrid --print-example-config` to generate a v1 template",
            options.config_path.display()
        )
    })?;

    let client = fingrid_http::Client::new(config.base_url(), config.timeout()?)
        .with_context(|| {
            format!(
                "invalid [server] config in {}; fix base_url/timeout values",
                options.config_path.display()
            )
        })?
        .with_csrf(config.csrf_source());
    if options.check_only {
        return Ok(());
    }

    let mut runtime = HttpRuntime::new(client);
    let year = options.year.unwrap_or_else(current_year);
    let grid = SchemaInferredGrid::new(&mut runtime, config.grid_config());
    let chart = config
        .chart_url(year)
        .map(|url| ChartSlot::new(TextChartFactory, &url));
    let mut page = Page::new(grid, chart, year);
    if let Some(label) = config.filter_label() {
        page = page.with_filter_label(label);
    }

    page.open(&mut runtime).with_context(|| {
        format!(
            "load {} from {} -- is the server running and the collection path right?",
            config.collection(),
            config.base_url()
        )
    })?;

    page.select_month(options.month.as_deref());
    if let Some((series, point)) = options.drill {
        page.on_chart_click(&mut runtime, ChartClick::new(series, point))
            .with_context(|| format!("drill into series {series} point {point}"))?;
    }

    for column in &options.sort {
        let index = match page.grid().schema() {
            Some(schema) => resolve_column(schema, column)?,
            None => bail!("cannot sort by {column:?}: the collection is empty"),
        };
        page.grid_mut().click_header(index);
    }

    if let Some(id) = &options.delete {
        let id = RecordId::new(id.as_str());
        let mut confirm = StdinConfirm::new(options.assume_yes);
        match page
            .delete_row(&mut runtime, &id, &mut confirm)
            .with_context(|| format!("delete row {id}"))?
        {
            DeleteOutcome::Deleted(id) => eprintln!("deleted row {id}"),
            DeleteOutcome::Declined => eprintln!("kept row {id}"),
        }
    }

    let labels = page.labels();
    if let (Some(category), Some(period)) = (&labels.category_title, &labels.period_title) {
        println!("{category} / {period}");
    }
    print!("{}", page.render().to_text());
    if let Some(chart) = page.chart().and_then(ChartSlot::handle) {
        println!();
        print!("{}", chart.to_text());
    }
    Ok(())
}

/// Column index for a `--sort` argument, matched on key or title.
fn resolve_column(schema: &Schema, name: &str) -> Result<usize> {
    schema
        .columns()
        .iter()
        .position(|column| column.key == name || column.title.eq_ignore_ascii_case(name))
        .ok_or_else(|| {
            let keys: Vec<&str> = schema.keys().collect();
            anyhow!(
                "unknown column {name:?}; available: {}",
                keys.join(", ")
            )
        })
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct CliOptions {
    config_path: PathBuf,
    print_config_path: bool,
    print_example: bool,
    check_only: bool,
    show_help: bool,
    sort: Vec<String>,
    drill: Option<(usize, usize)>,
    month: Option<String>,
    year: Option<i32>,
    delete: Option<String>,
    assume_yes: bool,
}

fn parse_cli_args<I, S>(args: I, default_config_path: PathBuf) -> Result<CliOptions>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut options = CliOptions {
        config_path: default_config_path,
        print_config_path: false,
        print_example: false,
        check_only: false,
        show_help: false,
        sort: Vec::new(),
        drill: None,
        month: None,
        year: None,
        delete: None,
        assume_yes: false,
    };

    let mut iter = args.into_iter();
    while let Some(arg) = iter.next() {
        match arg.as_ref() {
            "--config" => {
                let value = iter
                    .next()
                    .ok_or_else(|| anyhow!("--config requires a file path"))?;
                options.config_path = PathBuf::from(value.as_ref());
            }
            "--print-config-path" => {
                options.print_config_path = true;
            }
            "--print-example-config" => {
                options.print_example = true;
            }
            "--check" => {
                options.check_only = true;
            }
            "--sort" => {
                let value = iter
                    .next()
                    .ok_or_else(|| anyhow!("--sort requires a column key or title"))?;
                options.sort.push(value.as_ref().to_owned());
            }
            "--drill" => {
                let value = iter
                    .next()
                    .ok_or_else(|| anyhow!("--drill requires SERIES:POINT"))?;
                options.drill = Some(parse_drill(value.as_ref())?);
            }
            "--month" => {
                let value = iter
                    .next()
                    .ok_or_else(|| anyhow!("--month requires a label such as Mar"))?;
                options.month = Some(value.as_ref().to_owned());
            }
            "--year" => {
                let value = iter
                    .next()
                    .ok_or_else(|| anyhow!("--year requires a year"))?;
                let year = value
                    .as_ref()
                    .parse()
                    .with_context(|| format!("invalid --year {:?}", value.as_ref()))?;
                options.year = Some(year);
            }
            "--delete" => {
                let value = iter
                    .next()
                    .ok_or_else(|| anyhow!("--delete requires a row id"))?;
                options.delete = Some(value.as_ref().to_owned());
            }
            "--yes" | "-y" => {
                options.assume_yes = true;
            }
            "--help" | "-h" => {
                options.show_help = true;
            }
            unknown => {
                return Err(anyhow!(
                    "unknown argument {unknown:?}; run with --help to see supported options"
                ));
            }
        }
    }

    Ok(options)
}

fn parse_drill(raw: &str) -> Result<(usize, usize)> {
    let (series, point) = raw
        .split_once(':')
        .ok_or_else(|| anyhow!("--drill expects SERIES:POINT (for example 1:2), got {raw:?}"))?;
    let series = series
        .trim()
        .parse()
        .with_context(|| format!("invalid series index in --drill {raw:?}"))?;
    let point = point
        .trim()
        .parse()
        .with_context(|| format!("invalid point index in --drill {raw:?}"))?;
    Ok((series, point))
}

fn print_help() {
    println!("fingrid");
    println!("  --config <path>          Use a specific config path");
    println!("  --print-config-path      Print resolved config path");
    println!("  --print-example-config   Print a v1 config template");
    println!("  --check                  Validate config and client setup, then exit");
    println!("  --sort <column>          Click a column header (repeatable)");
    println!("  --drill <series:point>   Filter the grid by a chart point");
    println!("  --month <label>          Month used instead of the clicked point");
    println!("  --year <year>            Chart and filter year (default: current)");
    println!("  --delete <id>            Delete a row after a y/N prompt");
    println!("  --yes                    Answer yes to the delete prompt");
    println!("  --help                   Show this help");
}
