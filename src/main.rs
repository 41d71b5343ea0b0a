use anyhow::Context;
use clap::Parser;
use rmcp::{ServiceExt, transport::stdio};
use searchdata_mcp::cli::{Cli, Commands};
use searchdata_mcp::config::{Settings, expand_path};
use searchdata_mcp::format;
use searchdata_mcp::search::key::normalize_query;
use searchdata_mcp::tools::lookup::{LookupRequest, build_query};
use searchdata_mcp::{IndexServer, IndexState, cache, logging};
use std::process::ExitCode;
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    // stdout carries MCP traffic or command output; logs go to stderr
    logging::init(if matches!(cli.command, Commands::Serve) {
        tracing::Level::INFO
    } else {
        tracing::Level::WARN
    });

    let settings = Settings::load(cli.config.as_deref())?;
    let search_dir = cli
        .dir
        .clone()
        .map(expand_path)
        .or_else(|| settings.search_dir.clone())
        .context(
            "No search directory given. Pass --dir, set SEARCHDATA_DIR or add \
             search_dir to searchdata.toml",
        )?;

    // `check` validates every shard, so it never trusts a snapshot
    let cache_dir = if cli.no_cache || matches!(cli.command, Commands::Check) {
        None
    } else {
        settings.cache_dir()
    };

    let report = cache::load_or_build(&search_dir, cache_dir.as_deref())
        .await
        .with_context(|| format!("Failed to load search index from {}", search_dir.display()))?;
    let state = IndexState::new(report, &search_dir, settings.lookup.default_limit);

    match cli.command {
        Commands::Lookup {
            prefix,
            category,
            limit,
        } => {
            let request = LookupRequest {
                prefix,
                category,
                limit,
            };
            let query = build_query(&state, &request).map_err(anyhow::Error::msg)?;
            let results = state.store().search(&query);
            if cli.json {
                println!("{}", format::hits_json(&results, state.site_root()));
            } else {
                print!("{}", format::format_hits(&request.prefix, &results));
            }
        }
        Commands::Get { key } => {
            let entries = state.store().get_all(&normalize_query(&key));
            if cli.json {
                println!("{}", format::entries_json(&entries, state.site_root()));
            } else if entries.is_empty() {
                eprintln!("No entry with key '{}'.", normalize_query(&key));
            } else {
                for entry in &entries {
                    print!("{}", format::format_entry(entry, state.site_root()));
                }
            }
            if entries.is_empty() {
                return Ok(ExitCode::FAILURE);
            }
        }
        Commands::Stats => {
            let stats = state.store().stats();
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&stats)?);
            } else {
                print!("{}", format::format_stats(&stats, state.store().shards()));
            }
        }
        Commands::Check => {
            let failures = state.failures();
            if cli.json {
                println!("{}", format::failures_json(failures));
            } else if failures.is_empty() {
                println!(
                    "✓ {} shard(s), {} entries loaded without errors",
                    state.store().shards().len(),
                    state.store().len()
                );
            } else {
                print!("{}", format::format_failures(failures));
            }
            if !failures.is_empty() {
                return Ok(ExitCode::FAILURE);
            }
        }
        Commands::Serve => {
            if !state.failures().is_empty() {
                tracing::warn!(
                    "Serving with {} shard(s) missing; see index_info",
                    state.failures().len()
                );
            }
            tracing::info!(
                "Starting searchdata-mcp over stdio ({} entries)",
                state.store().len()
            );

            let server = IndexServer::new(Arc::new(state));
            let service = server.serve(stdio()).await.inspect_err(|e| {
                tracing::error!("Error serving MCP server: {:?}", e);
            })?;
            service.waiting().await?;
        }
    }

    Ok(ExitCode::SUCCESS)
}
