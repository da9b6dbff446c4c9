//! gitlab-jira-sync
//!
//! Main entry point for the CLI.

mod commands;

use anyhow::Context;
use clap::Parser;
use commands::{Cli, Commands};
use gitlab_jira_sync::config::{validate_config, GitLabIntegration, JiraIntegration, SyncConfig};
use gitlab_jira_sync::integrations::{GitLabAdapter, JiraAdapter};
use gitlab_jira_sync::model::ItemKind;
use gitlab_jira_sync::rules::RuleSet;
use gitlab_jira_sync::storage::{read_entries, MappingStore};
use gitlab_jira_sync::sync::{Reconciler, SyncSettings};
use std::process;

fn main() {
    // Initialize logging
    if let Err(e) = gitlab_jira_sync::logging::init() {
        eprintln!("Failed to initialize logging: {}", e);
    }

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Sync {
            only,
            apply_status,
            max_epics,
            max_issues,
        } => {
            let mut config = SyncConfig::load_or_default(&cli.config);
            if let Some(key) = cli.project_key.clone() {
                config.jira_project_key = Some(key);
            }
            if let Some(max) = max_epics {
                config.limits.max_epics_created = max;
            }
            if let Some(max) = max_issues {
                config.limits.max_issues_created = max;
            }
            config.apply_status |= apply_status;

            for problem in validate_config(&config) {
                tracing::warn!(problem = %problem, "Rules file problem");
            }

            let group = Cli::require(&cli.group, "--group", "GITLAB_GROUP")?;
            let project = Cli::require(&cli.project, "--project", "GITLAB_PROJECT")?;
            let settings = SyncSettings::from_config(&config, group, project);
            let rules = RuleSet::from_config(&config);

            let gitlab = gitlab_adapter(&cli)?;
            let jira = jira_adapter(&cli, &config)?;
            let mut store = MappingStore::open(&cli.mapping)
                .with_context(|| format!("Opening mapping store {}", cli.mapping.display()))?;

            let kinds = match only {
                Some(kind) => vec![kind],
                None => vec![ItemKind::Epic, ItemKind::Issue],
            };

            tracing::info!(
                project_key = ?settings.project_key,
                group = %settings.gitlab_group,
                project = %settings.gitlab_project,
                mappings = store.len(),
                "Starting sync"
            );

            let report = runtime()?.block_on(async {
                let mut reconciler = Reconciler::new(&gitlab, &jira, &rules, &mut store, &settings);
                reconciler.run(&kinds).await
            });

            println!("{}", report);

            if report.has_errors() {
                anyhow::bail!("sync finished with errors");
            }
        }

        Commands::Mappings { kind, source_id } => {
            if !cli.mapping.exists() {
                println!("No mappings recorded ({} does not exist)", cli.mapping.display());
                return Ok(());
            }

            let entries = read_entries(&cli.mapping)?;
            let shown: Vec<_> = entries
                .iter()
                .filter(|e| kind.map_or(true, |k| e.kind == k))
                .filter(|e| source_id.as_deref().map_or(true, |id| e.source_id == id))
                .collect();

            println!("{} mapping(s):", shown.len());
            for entry in shown {
                let recorded = entry
                    .recorded_at
                    .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
                    .unwrap_or_else(|| "-".to_string());
                println!(
                    "  {:<6} {:>10} -> {:<12} {}",
                    entry.kind, entry.source_id, entry.destination_id, recorded
                );
            }
        }

        Commands::Rules => {
            let config = SyncConfig::load(&cli.config)?;

            println!(
                "JIRA project: {}",
                config.jira_project_key.as_deref().unwrap_or("(not set)")
            );
            println!();
            println!("Rules ({}):", config.rules.len());
            for rule in &config.rules {
                println!("  {:?}", rule);
            }
            println!();
            println!("Filters ({}):", config.filters.len());
            for filter in &config.filters {
                println!(
                    "  {:<10} requires {}",
                    filter.issue_type,
                    filter.label.as_deref().unwrap_or("(no label)")
                );
            }

            let problems = validate_config(&config);
            if !problems.is_empty() {
                println!();
                println!("Problems ({}):", problems.len());
                for problem in &problems {
                    println!("  {}", problem);
                }
                anyhow::bail!("rules file has {} problem(s)", problems.len());
            }
        }

        Commands::Projects => {
            let group = Cli::require(&cli.group, "--group", "GITLAB_GROUP")?;
            let gitlab = gitlab_adapter(&cli)?;

            let projects = runtime()?.block_on(gitlab.list_group_projects(group))?;

            println!("{} project(s) in {}:", projects.len(), group);
            for project in projects {
                println!(
                    "  {:>8}  {:<30} {}",
                    project.id,
                    project.name,
                    project.path_with_namespace.as_deref().unwrap_or("")
                );
            }
        }
    }

    Ok(())
}

fn runtime() -> anyhow::Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")
}

fn gitlab_adapter(cli: &Cli) -> anyhow::Result<GitLabAdapter> {
    let url = Cli::require(&cli.gitlab_url, "--gitlab-url", "GITLAB_BASE_URL")?;
    let mut config = GitLabIntegration::new(url);
    if let Some(ref token) = cli.gitlab_token {
        config = config.with_token(token);
    } else {
        tracing::warn!("No GitLab token set, only public data will be visible");
    }
    Ok(GitLabAdapter::new(config)?)
}

fn jira_adapter(cli: &Cli, sync_config: &SyncConfig) -> anyhow::Result<JiraAdapter> {
    let url = Cli::require(&cli.jira_url, "--jira-url", "JIRA_URL")?;
    let token = Cli::require(&cli.jira_token, "--jira-token", "JIRA_TOKEN")?;
    let config = JiraIntegration::new(url, sync_config.epic_name_field.clone())
        .with_token(token)
        .with_invalid_certs(cli.insecure);
    Ok(JiraAdapter::new(config)?)
}
