use anyhow::{Context, Result};
use serde::Serialize;
use std::process::ExitCode;
use tracing::{info, instrument};

use super::table::Table;
use super::{Cli, Commands, CompareTarget};
use crate::analyze::{ComparisonResult, TldCounts};
use crate::api::start_server;
use crate::config::AppConfig;
use crate::parsers::TldCategory;
use crate::pipeline::{current_dataset, save_unified, update_sources, AnalysisReport, Snapshot};
use crate::storage::DataStore;
use crate::supplemental::{group_managers, SupplementalData};

/// Runs the parsed command. Failures that are findings rather than errors
/// (failed sources, integrity violations) surface as a non-zero exit code.
#[instrument(skip_all, fields(command = ?cli.command))]
pub async fn run(cli: Cli, config: AppConfig) -> Result<ExitCode> {
    let store = DataStore::new(&config.data_dir);

    match cli.command {
        Commands::Update { force } => {
            let report = update_sources(&config, &store, force).await?;

            let mut table = Table::new(["Source", "Status"]);
            for source in &report.updated {
                table.row([source.name(), "updated"]);
            }
            for source in &report.unchanged {
                table.row([source.name(), "unchanged"]);
            }
            for (source, error) in &report.failed {
                table.row([source.name().to_string(), format!("failed: {}", error)]);
            }
            print!("{}", table);
            if report.rebuilt {
                println!("\nUnified dataset rebuilt in {}", store.root().display());
            }

            Ok(exit_code(report.failed.is_empty()))
        }

        Commands::Analyze { json } => {
            let report = Snapshot::load(&store).await?.analysis();
            if json {
                print_json(&report)?;
            } else {
                print_analysis(&report);
            }
            Ok(ExitCode::SUCCESS)
        }

        Commands::Compare { source, json } => {
            let snapshot = Snapshot::load(&store).await?;
            let (name, result) = match source {
                CompareTarget::Bootstrap => ("Bootstrap", snapshot.compare_bootstrap()),
                CompareTarget::TldList => ("TLD list", snapshot.compare_tld_list()),
            };
            if json {
                print_json(&result)?;
            } else {
                print_comparison(name, &result);
            }
            Ok(ExitCode::SUCCESS)
        }

        Commands::Build { output } => {
            let snapshot = Snapshot::load(&store).await?;
            let supplemental = SupplementalData::load(&config.supplemental_path).await?;
            let dataset = snapshot.unified(&supplemental);

            match output {
                Some(path) => {
                    let bytes = serde_json::to_vec_pretty(&dataset)?;
                    tokio::fs::write(&path, bytes)
                        .await
                        .with_context(|| format!("Failed to write {}", path.display()))?;
                    info!("Wrote unified dataset to {}", path.display());
                }
                None => save_unified(&store, &dataset).await?,
            }

            let uncovered = dataset.uncovered().map_or(0, |group| group.tlds.len());
            println!(
                "{} TLDs in {} service groups ({} without RDAP service)",
                dataset.tld_count(),
                dataset.services.len(),
                uncovered
            );
            Ok(ExitCode::SUCCESS)
        }

        Commands::Check => {
            let snapshot = Snapshot::load(&store).await?;
            let supplemental = SupplementalData::load(&config.supplemental_path).await?;
            let violations = snapshot.integrity(&supplemental);

            if violations.is_empty() {
                println!("Supplemental data is consistent with the IANA sources");
            } else {
                for violation in &violations {
                    println!("- {}", violation);
                }
                println!("\n{} integrity violation(s)", violations.len());
            }
            Ok(exit_code(violations.is_empty()))
        }

        Commands::Managers { json } => {
            let dataset = current_dataset(&store, &config.supplemental_path).await?;
            let supplemental = SupplementalData::load(&config.supplemental_path).await?;
            let groups = group_managers(&dataset, &supplemental.manager_aliases);

            if json {
                print_json(&groups)?;
            } else {
                let mut table = Table::new(["Manager", "TLDs"]);
                for group in &groups {
                    table.row([group.name.clone(), group.tld_count.to_string()]);
                    for member in &group.members {
                        table.row([format!("  {}", member.name), member.tld_count.to_string()]);
                    }
                }
                print!("{}", table);
            }
            Ok(ExitCode::SUCCESS)
        }

        Commands::Lookup { tld } => {
            let dataset = current_dataset(&store, &config.supplemental_path).await?;
            let Some((entry, group)) = dataset.find(&tld) else {
                eprintln!("Unknown TLD: {}", tld);
                return Ok(ExitCode::FAILURE);
            };

            let mut table = Table::new(["Field", "Value"]);
            table.row(["tld", entry.tld.as_str()]);
            table.row(["type", entry.tld_type.as_str()]);
            if let Some(idn) = &entry.idn {
                table.row(["unicode", idn.unicode.as_str()]);
                table.row(["ascii", idn.ascii.as_str()]);
            }
            if !entry.tags.is_empty() {
                table.row(["tags".to_string(), entry.tags.join(", ")]);
            }
            table.row(["manager", entry.manager.as_deref().unwrap_or("-")]);
            if group.rdap_servers.is_empty() {
                table.row(["rdap", "(none)"]);
            }
            for server in &group.rdap_servers {
                table.row(["rdap", server.as_str()]);
            }
            print!("{}", table);
            Ok(ExitCode::SUCCESS)
        }

        Commands::Serve { host, port } => {
            let host = host.unwrap_or_else(|| config.server.host.clone());
            let port = port.unwrap_or(config.server.port);
            start_server(&config, &host, port).await?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn exit_code(success: bool) -> ExitCode {
    if success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn counts_row(table: &mut Table, name: &str, counts: &TldCounts) {
    table.row([
        name.to_string(),
        counts.total.to_string(),
        counts.country_code.to_string(),
        counts.generic.to_string(),
        counts.idn.total.to_string(),
        counts.idn.country_code.to_string(),
        counts.idn.generic.to_string(),
        counts.idn.ascii.to_string(),
        counts.idn.unicode.to_string(),
    ]);
}

fn print_analysis(report: &AnalysisReport) {
    let mut totals = Table::new([
        "Source", "Total", "ccTLD", "gTLD", "IDN", "IDN ccTLD", "IDN gTLD", "xn--", "Unicode",
    ]);
    counts_row(&mut totals, "TLD list", &report.tld_list);
    counts_row(&mut totals, "Bootstrap", &report.bootstrap);
    counts_row(&mut totals, "Root zone DB", &report.registry.counts);
    println!("{}", totals);

    let registry = &report.registry;
    println!(
        "Root zone DB: {} delegated, {} undelegated ({} ccTLD, {} gTLD)\n",
        registry.delegated,
        registry.undelegated,
        registry.undelegated_country_code,
        registry.undelegated_generic
    );

    let mut categories = Table::new(["Category", "Entries", "Delegated"]);
    for category in TldCategory::ALL {
        categories.row([
            category.to_string(),
            registry.by_category.get(&category).copied().unwrap_or(0).to_string(),
            registry.delegated_by_category.get(&category).copied().unwrap_or(0).to_string(),
        ]);
    }
    print!("{}", categories);
}

fn print_comparison(name: &str, result: &ComparisonResult) {
    println!(
        "{}: {} labels, root zone DB: {} delegated, {} in both\n",
        name, result.source_count, result.registry_count, result.in_both
    );

    if !result.only_in_source.is_empty() {
        println!("Only in {} ({}):", name, result.only_in_source.len());
        println!("  {}\n", result.only_in_source.join(" "));
    }

    let mut missing = Table::new(["Category", "Missing", "TLDs"]);
    for (category, labels) in &result.only_in_registry {
        missing.row([category.to_string(), labels.len().to_string(), preview(labels)]);
    }
    println!("Only in root zone DB:");
    print!("{}", missing);
}

/// First few labels of a list, for table cells
fn preview(labels: &[String]) -> String {
    const SHOWN: usize = 8;
    if labels.len() <= SHOWN {
        labels.join(" ")
    } else {
        format!("{} ... (+{})", labels[..SHOWN].join(" "), labels.len() - SHOWN)
    }
}
