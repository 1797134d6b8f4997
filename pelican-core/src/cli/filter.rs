use crate::auth::Credentials;
use crate::chart::{Chart, TerminalSize};
use crate::client::RegistryClient;
use crate::filter::{FilterId, FilterResults, FilterSummary, MetricId};
use anyhow::{Context, Result};
use chrono::DateTime;
use clap::{Args, Subcommand};
use owo_colors::OwoColorize;
use std::time::Duration;

/// Where and how to reach the supervisor.
#[derive(Args, Debug, Clone)]
pub struct RegistryArgs {
    /// Supervisor base URL
    #[arg(long, global = true, default_value = "http://127.0.0.1:1525")]
    pub supervisor: String,

    #[arg(long, global = true, default_value = "cloud")]
    pub user: String,

    #[arg(long, global = true, default_value = "pelican")]
    pub password: String,

    /// Request timeout in seconds
    #[arg(long, global = true, default_value_t = 5)]
    pub timeout: u64,
}

impl RegistryArgs {
    pub fn client(&self) -> Result<RegistryClient> {
        let creds = Credentials::new(&self.user, &self.password);
        RegistryClient::new(&self.supervisor, &creds, Duration::from_secs(self.timeout))
            .context("failed to build registry client")
    }
}

#[derive(Subcommand, Debug)]
pub enum FilterCmd {
    /// Register a new filter
    Add {
        #[arg(long)]
        name: String,

        #[arg(long)]
        regex: String,
    },

    /// List registered filters
    List,

    /// Print per-minute counts for a filter
    Results { id: String },

    /// Draw match and error counts for a filter as a terminal chart
    Chart { id: String },

    /// Delete a filter
    Rm { id: String },
}

pub fn run(registry: &RegistryArgs, cmd: FilterCmd) -> Result<()> {
    let client = registry.client()?;

    match cmd {
        FilterCmd::Add { name, regex } => {
            let id = client.create(&name, &regex)?;
            println!("{} filter {}", "✔".green(), id.bold());
        }

        FilterCmd::List => {
            let filters = client.list()?;
            print!("{}", format_listing(&filters));
        }

        FilterCmd::Results { id } => {
            let results = client.results(&FilterId::from(id))?;
            for line in format_results(&results) {
                println!("{line}");
            }
        }

        FilterCmd::Chart { id } => {
            let results = client.results(&FilterId::from(id))?;
            let chart = Chart::from_results(&results, TerminalSize::detect())?;
            print!("{}", chart.render());
            if chart.truncated() {
                tracing::warn!(
                    columns = chart.columns(),
                    "series wider than terminal, oldest buckets shown"
                );
            }
        }

        FilterCmd::Rm { id } => {
            let id = FilterId::from(id);
            if client.delete(&id)? {
                println!("{} deleted {}", "✔".green(), id);
            } else {
                println!("{} no filter {}", "!".yellow(), id);
            }
        }
    }

    Ok(())
}

pub fn format_listing(filters: &[FilterSummary]) -> String {
    if filters.is_empty() {
        return "no filters registered\n".to_owned();
    }

    let name_width = filters.iter().map(|f| f.name.len()).max().unwrap_or(0);
    let mut out = String::new();
    for f in filters {
        out.push_str(&format!(
            "{}  {:<name_width$}  {}  ({})\n",
            f.id,
            f.name,
            f.pattern,
            f.owner,
        ));
    }
    out
}

/// One line per bucket: timestamp, matches, errors.
pub fn format_results(results: &FilterResults) -> Vec<String> {
    let matches = results.get(&MetricId::MATCHES);
    let errors = results.get(&MetricId::ERRORS);

    let mut buckets: Vec<_> = results.values().flat_map(|series| series.keys()).collect();
    buckets.sort();
    buckets.dedup();

    buckets
        .into_iter()
        .map(|bucket| {
            let stamp = DateTime::from_timestamp(bucket.0, 0)
                .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
                .unwrap_or_else(|| bucket.to_string());
            let m = matches.and_then(|s| s.get(bucket)).copied().unwrap_or(0);
            let e = errors.and_then(|s| s.get(bucket)).copied().unwrap_or(0);
            format!("{stamp}  matches={m}  errors={e}")
        })
        .collect()
}
