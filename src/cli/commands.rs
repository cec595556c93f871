//! Command dispatch
//!
//! Each subcommand loads what it needs through the [`ServiceContainer`] and
//! prints either colored text or JSON.

use std::io;
use std::path::Path;

use clap::CommandFactory;
use clap_complete::{generate, Shell};
use serde::Serialize;
use tracing::{debug, instrument};

use crate::application::services::{FamilyStats, GenealogyService};
use crate::application::ApplicationResult;
use crate::cli::args::{Cli, Commands, ConfigCommands};
use crate::cli::error::{CliError, CliResult};
use crate::cli::output;
use crate::config::{global_config_path, OutputFormat, Settings};
use crate::domain::{Family, TreeNode};
use crate::infrastructure::di::ServiceContainer;
use crate::infrastructure::InfraError;
use crate::render::{RenderNode, TreeNodeConvert};

/// One line of the `families` listing.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct FamilySummary<'a> {
    id: &'a str,
    name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    origin: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    color: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    father_name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    mother_name: Option<&'a str>,
    member_count: usize,
}

impl<'a> From<&'a Family> for FamilySummary<'a> {
    fn from(family: &'a Family) -> Self {
        Self {
            id: family.id.as_str(),
            name: &family.name,
            origin: family.origin.as_deref(),
            color: family.color.as_deref(),
            father_name: family.father_name.as_deref(),
            mother_name: family.mother_name.as_deref(),
            member_count: family.members.len(),
        }
    }
}

pub fn execute_command(cli: &Cli) -> CliResult<()> {
    let Some(command) = &cli.command else {
        return Ok(());
    };

    match command {
        Commands::Completion { shell } => {
            print_completions(*shell);
            Ok(())
        }
        Commands::Config { command } => cmd_config(command, &Settings::load()?),
        Commands::Families => {
            let container = ServiceContainer::new(Settings::load()?);
            cmd_families(&container, cli.file.as_deref())
        }
        Commands::Tree {
            family,
            all,
            search,
            format,
        } => {
            let container = ServiceContainer::new(Settings::load()?);
            let format = format.unwrap_or(container.settings.format);
            cmd_tree(
                &container,
                cli.file.as_deref(),
                family.as_deref(),
                *all,
                search.as_deref(),
                format,
            )
        }
        Commands::Stats => {
            let container = ServiceContainer::new(Settings::load()?);
            cmd_stats(&container, cli.file.as_deref())
        }
    }
}

fn print_completions(shell: Shell) {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    generate(shell, &mut cmd, name, &mut io::stdout());
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> CliResult<()> {
    let text = serde_json::to_string_pretty(value)
        .map_err(|e| InfraError::io("serialize output", e.into()))?;
    output::info(&text);
    Ok(())
}

fn cmd_config(command: &ConfigCommands, settings: &Settings) -> CliResult<()> {
    match command {
        ConfigCommands::Show => {
            output::info(&settings.to_toml()?);
        }
        ConfigCommands::Path => match global_config_path() {
            Some(path) => {
                let state = if path.exists() { "exists" } else { "not found" };
                output::field("global", &format!("{} ({})", path.display(), state));
            }
            None => output::warning("no config directory available on this platform"),
        },
    }
    Ok(())
}

#[instrument(level = "debug", skip(container))]
fn cmd_families(container: &ServiceContainer, file: Option<&Path>) -> CliResult<()> {
    let service = container.genealogy_service(file)?;
    let summaries: Vec<FamilySummary> = service.families().iter().map(Into::into).collect();

    if container.settings.format == OutputFormat::Json {
        return print_json(&summaries);
    }

    output::header(&format!("Families ({})", summaries.len()));
    for s in &summaries {
        let origin = s.origin.map(|o| format!(" [{o}]")).unwrap_or_default();
        output::detail(&format!(
            "{:>4}  {}{}  ({} members)",
            s.id, s.name, origin, s.member_count
        ));
    }
    Ok(())
}

#[instrument(level = "debug", skip(container))]
fn cmd_tree(
    container: &ServiceContainer,
    file: Option<&Path>,
    family: Option<&str>,
    all: bool,
    search: Option<&str>,
    format: OutputFormat,
) -> CliResult<()> {
    let service = container.genealogy_service(file)?;
    let options = container.render_options();

    if !all {
        let key = family.ok_or_else(|| CliError::Usage("family id or name required".into()))?;
        let family = service.find_family(key)?;
        let rendered = tree_for(&service, family, search)?
            .map(|tree| RenderNode::from_family(family, &tree, &options));
        return match rendered {
            Some(node) => print_tree(&node, format),
            None => {
                report_no_match(family, search);
                Ok(())
            }
        };
    }

    let mut rendered = Vec::new();
    let mut first_error = None;
    for family in service.families() {
        match tree_for(&service, family, search) {
            Ok(Some(tree)) => rendered.push(RenderNode::from_family(family, &tree, &options)),
            Ok(None) => debug!("family {} has no match", family.id),
            Err(e) => {
                output::error(&format!("{}: {}", family.name, e));
                if first_error.is_none() {
                    first_error = Some(e);
                }
            }
        }
    }

    if format == OutputFormat::Json {
        print_json(&rendered)?;
    } else {
        for node in &rendered {
            print_tree(node, format)?;
        }
    }
    match first_error {
        Some(e) => Err(e.into()),
        None => Ok(()),
    }
}

fn tree_for(
    service: &GenealogyService,
    family: &Family,
    search: Option<&str>,
) -> ApplicationResult<Option<TreeNode>> {
    match search {
        Some(term) => service.search(family, term),
        None => service.tree(family).map(Some),
    }
}

fn report_no_match(family: &Family, search: Option<&str>) {
    output::warning(&format!(
        "no member of {} matches '{}'",
        family.name,
        search.unwrap_or_default().trim()
    ));
}

fn print_tree(node: &RenderNode, format: OutputFormat) -> CliResult<()> {
    match format {
        OutputFormat::Json => print_json(node),
        OutputFormat::Text => {
            output::info(&node.to_tree_string());
            Ok(())
        }
    }
}

#[instrument(level = "debug", skip(container))]
fn cmd_stats(container: &ServiceContainer, file: Option<&Path>) -> CliResult<()> {
    let service = container.genealogy_service(file)?;
    let stats: FamilyStats = service.stats();

    if container.settings.format == OutputFormat::Json {
        return print_json(&stats);
    }

    output::header("Statistics");
    output::field("families", &stats.families);
    output::field("members", &stats.members);
    output::field("deceased", &stats.deceased);
    output::field("couples", &stats.couples);
    output::field("single-parent links", &stats.single_parent_links);
    output::field("roots", &stats.roots);
    Ok(())
}
