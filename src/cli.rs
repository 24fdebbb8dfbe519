//! Command-line interface for tabspace.
//!
//! The subcommands work directly on the persisted model file. `demo` runs a
//! short activation scenario against the simulated browser instead.

use crate::engine::Engine;
use crate::simulated::SimulatedBrowser;
use crate::workspaces::{create_workspace, list_workspaces, rename_workspace};
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::fmt::Write as _;
use std::path::PathBuf;
use std::sync::Arc;
use tabspace_config::{Config, LogLevel};
use tabspace_store::{JsonFileStore, MemoryStore, Repository, TabId, Workspace, WorkspaceId};

/// tabspace - Browser tab workspaces backed by a hidden tab group
#[derive(Parser)]
#[command(name = "tabspace")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Log level (off, error, warn, info, debug, trace); overrides RUST_LOG and config
    #[arg(long, global = true, value_name = "LEVEL", value_parser = parse_log_level)]
    pub log_level: Option<LogLevel>,

    /// Path of the persisted model file; overrides config
    #[arg(long, global = true, value_name = "PATH")]
    pub state_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List workspaces and their tabs
    List,
    /// Create an empty workspace
    Create {
        /// Display name
        name: String,
    },
    /// Rename a workspace
    Rename {
        /// Workspace id as shown by `list`
        id: String,
        /// New display name
        name: String,
    },
    /// Print the effective configuration
    Config,
    /// Run an activation scenario against a simulated browser
    Demo,
}

fn parse_log_level(value: &str) -> Result<LogLevel, String> {
    LogLevel::from_name(value).ok_or_else(|| {
        let names: Vec<&str> = LogLevel::all().iter().map(|l| l.display_name()).collect();
        format!("expected one of: {}", names.join(", "))
    })
}

/// Execute a parsed command line.
pub async fn run(cli: Cli, mut config: Config) -> Result<()> {
    if let Some(path) = cli.state_file {
        config.state_file = Some(path);
    }

    match cli.command {
        Commands::List => {
            let repo = open_repository(&config);
            let workspaces = list_workspaces(&repo).await?;
            let active = repo.load_active().await?;
            print!("{}", render_workspaces(&workspaces, active.as_ref()));
        }
        Commands::Create { name } => {
            let repo = open_repository(&config);
            let workspace = create_workspace(&repo, &name)
                .await
                .with_context(|| format!("Failed to create workspace {:?}", name))?;
            println!("{}", workspace.id);
        }
        Commands::Rename { id, name } => {
            let repo = open_repository(&config);
            let id = WorkspaceId::new(id);
            let renamed = rename_workspace(&repo, &id, &name)
                .await
                .with_context(|| format!("Failed to rename workspace {}", id))?;
            if !renamed {
                println!("Workspace {} unchanged", id);
            }
        }
        Commands::Config => {
            let yaml = serde_yaml_ng::to_string(&config).context("Failed to serialize config")?;
            println!("# {}", Config::config_path().display());
            print!("{}", yaml);
            println!("# state file: {}", config.state_file_path().display());
        }
        Commands::Demo => run_demo(&config).await?,
    }
    Ok(())
}

fn open_repository(config: &Config) -> Repository<JsonFileStore> {
    let path = config.state_file_path();
    log::debug!("Using state file {:?}", path);
    Repository::new(JsonFileStore::new(path))
}

/// Format workspaces one per line, marking the active one with `*`.
pub fn render_workspaces(workspaces: &[Workspace], active: Option<&WorkspaceId>) -> String {
    if workspaces.is_empty() {
        return "No workspaces\n".to_string();
    }

    let mut out = String::new();
    for workspace in workspaces {
        let marker = if Some(&workspace.id) == active { '*' } else { ' ' };
        let tabs: Vec<String> = workspace.tabs.iter().map(ToString::to_string).collect();
        let _ = writeln!(
            out,
            "{} {:<24} {:<20} [{}]",
            marker,
            workspace.id.as_str(),
            workspace.name,
            tabs.join(", ")
        );
    }
    out
}

/// Two workspaces, one switch, one newly opened tab.
async fn run_demo(config: &Config) -> Result<()> {
    let browser = Arc::new(SimulatedBrowser::new());
    browser.seed_tabs(&[10, 11, 20]);

    let mut engine = Engine::new(config, MemoryStore::new(), Arc::clone(&browser));
    let research = create_workspace(&engine.repo, "Research").await?;
    let personal = create_workspace(&engine.repo, "Personal").await?;
    engine
        .repo
        .modify_workspaces(|workspaces| {
            for workspace in workspaces.iter_mut() {
                if workspace.id == research.id {
                    workspace.tabs = vec![TabId(10), TabId(11)];
                } else if workspace.id == personal.id {
                    workspace.tabs = vec![TabId(20)];
                }
            }
        })
        .await?;
    engine.repo.save_active(&research.id).await?;

    println!("Before:");
    print_state(&engine.repo, &browser).await?;

    engine.workspaces.request_activation(&personal.id).await?;
    engine.dispatcher.run_until_idle().await;
    println!("\nAfter activating {}:", personal.name);
    print_state(&engine.repo, &browser).await?;

    let opened = browser.open_tab();
    engine.dispatcher.run_until_idle().await;
    println!("\nAfter opening tab {}:", opened);
    print_state(&engine.repo, &browser).await?;

    Ok(())
}

async fn print_state(repo: &Repository<MemoryStore>, browser: &SimulatedBrowser) -> Result<()> {
    let workspaces = repo.load_workspaces().await?;
    let active = repo.load_active().await?;
    print!("{}", render_workspaces(&workspaces, active.as_ref()));
    for group in browser.groups() {
        let members: Vec<String> = browser
            .tabs_in_group(group.id)
            .iter()
            .map(ToString::to_string)
            .collect();
        println!(
            "  group {} {:?} collapsed={} [{}]",
            group.id,
            group.title.as_deref().unwrap_or(""),
            group.collapsed,
            members.join(", ")
        );
    }
    let loose: Vec<String> = browser.ungrouped_tabs().iter().map(ToString::to_string).collect();
    println!("  visible [{}]", loose.join(", "));
    Ok(())
}
