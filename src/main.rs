//! Thin terminal front end over the clickwatch engine.
//!
//! Rendering proper (charts, live tables) belongs to an embedding UI; this
//! binary only drives the engine interactively so the feeds and the table
//! pipeline can be exercised end to end against a real cluster.

use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing_subscriber::EnvFilter;

use clickwatch::table::{FilterValue, SortDirection};
use clickwatch::{Dashboard, QueryClient};

#[derive(Parser, Debug)]
#[command(name = "clickwatch")]
#[command(about = "Live monitoring console for a ClickHouse cluster")]
struct Args {
    /// Base URL of any cluster node's HTTP interface
    /// (e.g. http://localhost:8123). Prompted for when omitted.
    #[arg(short, long)]
    url: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let mut stdin = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    let url = match args.url {
        Some(url) => url,
        None => {
            stdout.write_all(b"URL: ").await?;
            stdout.flush().await?;
            match stdin.next_line().await? {
                Some(line) if !line.trim().is_empty() => line.trim().to_string(),
                _ => anyhow::bail!("no URL given"),
            }
        }
    };

    let mut dashboard = Dashboard::new(Arc::new(QueryClient::new()));
    match dashboard.connect(&url).await {
        Ok(count) => println!("connected, {} node(s)", count),
        Err(err) => println!("topology fetch failed: {}", err),
    }

    print_help();

    while let Some(line) = stdin.next_line().await? {
        let parts: Vec<&str> = line.split_whitespace().collect();
        match parts.as_slice() {
            [] => {}
            ["q"] | ["quit"] => break,
            ["help"] => print_help(),
            ["grid"] => print_grid(&dashboard),
            ["select", idx] => {
                let Ok(idx) = idx.parse::<usize>() else {
                    println!("not an index: {}", idx);
                    continue;
                };
                if dashboard.select_node(idx).await {
                    if let Some(node) = dashboard.selected_node() {
                        println!("selected {} ({})", node.host_name, node.host_address);
                    }
                    print_table(&dashboard);
                } else {
                    println!("no node {}", idx);
                }
            }
            ["refresh"] => {
                if dashboard.refresh_logs().await {
                    print_table(&dashboard);
                } else {
                    println!("refresh failed or nothing selected");
                }
            }
            ["metrics"] => match dashboard.metric_series() {
                Some(series) if !series.is_empty() => {
                    println!(
                        "{} samples, latest at {}: mem {} B, user {} us, sys {} us",
                        series.len(),
                        series.timestamps[0],
                        series.memory[0],
                        series.user_time_us[0],
                        series.system_time_us[0],
                    );
                }
                Some(_) => println!("no metric samples yet"),
                None => println!("nothing selected"),
            },
            ["filter", column, value] => {
                if let Some(table) = dashboard.table_mut() {
                    table.set_column_filter(column, FilterValue::Select(value.to_string()));
                }
                print_table(&dashboard);
            }
            ["unfilter", column] => {
                if let Some(table) = dashboard.table_mut() {
                    table.clear_column_filter(column);
                }
                print_table(&dashboard);
            }
            ["search", needle] => {
                if let Some(table) = dashboard.table_mut() {
                    table.set_global_filter(needle);
                }
                print_table(&dashboard);
            }
            ["search"] => {
                if let Some(table) = dashboard.table_mut() {
                    table.set_global_filter("");
                }
                print_table(&dashboard);
            }
            ["sort", column, dir] => {
                let direction = match *dir {
                    "desc" => SortDirection::Descending,
                    _ => SortDirection::Ascending,
                };
                if let Some(table) = dashboard.table_mut() {
                    table.set_sort(column, direction);
                }
                print_table(&dashboard);
            }
            ["page", n] => {
                if let (Some(table), Ok(n)) = (dashboard.table_mut(), n.parse::<usize>()) {
                    table.goto_page(n);
                }
                print_table(&dashboard);
            }
            ["next"] => {
                if let Some(table) = dashboard.table_mut() {
                    table.next_page();
                }
                print_table(&dashboard);
            }
            ["prev"] => {
                if let Some(table) = dashboard.table_mut() {
                    table.previous_page();
                }
                print_table(&dashboard);
            }
            other => println!("unknown command: {:?} (try `help`)", other.join(" ")),
        }
    }

    Ok(())
}

fn print_help() {
    println!("commands:");
    println!("  grid                 show the health grid");
    println!("  select <n>           select a node and fetch its query log");
    println!("  refresh              re-fetch the selected node's query log");
    println!("  metrics              show the latest metric sample");
    println!("  filter <col> <v>     exact-match filter on a column");
    println!("  unfilter <col>       drop a column filter");
    println!("  search [text]        global fuzzy search (empty clears)");
    println!("  sort <col> asc|desc  sort the table");
    println!("  page <n> | next | prev");
    println!("  q                    quit");
}

fn print_grid(dashboard: &Dashboard) {
    if let Some(err) = dashboard.topology_error() {
        println!("topology error: {}", err);
        return;
    }
    let nodes = dashboard.nodes();
    if nodes.is_empty() {
        println!("no nodes");
        return;
    }

    let grid = dashboard.grid();
    for row in 0..grid.height {
        let mut line = String::new();
        for col in 0..grid.width {
            if let Some(idx) = grid.cell_index(row, col, nodes.len()) {
                line.push_str(&format!(
                    "[{:>2} {:<5} {}] ",
                    idx,
                    dashboard.health(idx).symbol(),
                    nodes[idx].host_name
                ));
            }
        }
        println!("{}", line.trim_end());
    }
}

fn print_table(dashboard: &Dashboard) {
    let Some(table) = dashboard.table() else {
        println!("nothing selected");
        return;
    };

    let columns: Vec<String> = table.columns().iter().map(|c| c.name.clone()).collect();
    println!("{}", columns.join(" | "));

    for row in table.displayed_page() {
        let cells: Vec<String> = columns
            .iter()
            .map(|c| row.get(c).map(|v| v.to_string()).unwrap_or_default())
            .collect();
        println!("{}", cells.join(" | "));
    }
    println!(
        "page {}/{}, {} row(s) after filters",
        table.view_state().page_index + 1,
        table.page_count(),
        table.filtered_row_count()
    );
}
