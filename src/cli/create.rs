//! Issue creation run: load, reconcile, then render and create row by row

use console::style;
use dialoguer::{theme::ColorfulTheme, Confirm};
use miette::{IntoDiagnostic, Result, WrapErr};
use std::fs;
use std::path::Path;

use crate::cli::args::Cli;
use crate::cli::helpers::{format_issue, truncate_str};
use crate::core::config::Config;
use crate::core::git::Git;
use crate::core::issue::RateLimit;
use crate::core::loader::{load_csv, reconcile};
use crate::core::provider::{GhClient, IssueClient};
use crate::template::{build_issue, extract_variables};

/// Options for one run, independent of how they were parsed
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    pub repo: Option<String>,
    pub dry_run: bool,
    pub yes: bool,
    /// Skip progress lines and the summary
    pub quiet: bool,
}

impl From<&Cli> for RunOptions {
    fn from(cli: &Cli) -> Self {
        Self {
            repo: cli.repo.clone(),
            dry_run: cli.dry_run,
            yes: cli.yes,
            quiet: cli.global.quiet,
        }
    }
}

/// Run statistics
#[derive(Debug, Default, PartialEq, Eq)]
pub struct RunStats {
    pub rows_processed: usize,
    pub issues_created: usize,
    pub issues_previewed: usize,
    pub errors: usize,
    /// The operator declined to continue after the header check
    pub aborted: bool,
}

/// Entry point for the binary
pub fn run(cli: Cli) -> Result<()> {
    let config = Config::load();
    let work_dir = std::env::current_dir().into_diagnostic()?;
    let client = GhClient::new(&work_dir).with_cli(config.gh());
    let options = RunOptions::from(&cli);

    if !options.dry_run {
        client.validate().map_err(|e| miette::miette!("{}", e))?;
    }

    let stats = execute(&cli.template, &cli.csv, &options, &config, &client, &work_dir)?;
    if stats.aborted {
        return Ok(());
    }

    if !options.quiet {
        print_summary(&stats, options.dry_run);
    }

    if stats.errors > 0 {
        return Err(miette::miette!(
            "{} of {} row(s) failed",
            stats.errors,
            stats.rows_processed
        ));
    }

    Ok(())
}

/// Process every CSV row against the template
///
/// File-level problems (unreadable template, bad CSV) are returned as errors
/// before any row is touched. Row-level problems are printed and counted.
pub fn execute(
    template_path: &Path,
    csv_path: &Path,
    options: &RunOptions,
    config: &Config,
    client: &dyn IssueClient,
    work_dir: &Path,
) -> Result<RunStats> {
    let template = fs::read_to_string(template_path)
        .into_diagnostic()
        .wrap_err_with(|| format!("Failed to read template file {}", template_path.display()))?;

    let table = load_csv(csv_path).map_err(|e| miette::miette!("Failed to read CSV file: {}", e))?;

    let variables = extract_variables(&template);
    tracing::debug!(?variables, "template variables");

    let report = reconcile(&table.headers, &variables).map_err(|e| miette::miette!("{}", e))?;
    for warning in report.warnings() {
        eprintln!("{} Warning: {}", style("!").yellow(), warning);
    }

    let mut stats = RunStats::default();

    let needs_confirmation = !report.missing_headers.is_empty() && !options.dry_run && !options.yes;
    if needs_confirmation && !confirm_missing()? {
        println!("{}", style("Aborted. No issues were created.").yellow());
        stats.aborted = true;
        return Ok(stats);
    }

    let repo = match resolve_repository(options.repo.as_deref(), config, client, work_dir) {
        Ok(repo) => repo,
        Err(e) if options.dry_run => {
            tracing::debug!(error = %e, "no target repository for dry run");
            "(unresolved)".to_string()
        }
        Err(e) => return Err(e),
    };

    if !options.quiet {
        println!(
            "{} Target repository: {}{}",
            style("→").blue(),
            style(&repo).cyan(),
            if options.dry_run {
                style(" (dry run)").dim().to_string()
            } else {
                String::new()
            }
        );
    }

    if table.rows.is_empty() {
        if !options.quiet {
            println!("{}", style("No data rows in CSV file.").yellow());
        }
        return Ok(stats);
    }

    if !options.dry_run {
        match client.rate_limit() {
            Ok(rate) => warn_rate_limit(&rate, table.rows.len()),
            Err(e) => tracing::debug!(error = %e, "rate limit query failed"),
        }
    }
    if !options.quiet {
        println!();
    }

    for (row, line) in table.row_maps().iter().zip(table.lines.iter().copied()) {
        stats.rows_processed += 1;

        let issue = match build_issue(&template, row) {
            Ok(issue) => issue,
            Err(e) => {
                eprintln!(
                    "{} Row {}: {:?}",
                    style("✗").red(),
                    line,
                    miette::Report::new(e)
                );
                stats.errors += 1;
                continue;
            }
        };

        if options.dry_run {
            println!(
                "{} Row {}: {}",
                style("○").dim(),
                line,
                style(truncate_str(&issue.title, 60)).bold()
            );
            println!("{}", style("─".repeat(50)).dim());
            println!("{}", format_issue(&issue));
            println!("{}", style("─".repeat(50)).dim());
            println!();
            stats.issues_previewed += 1;
            continue;
        }

        match client.create_issue(&issue, &repo) {
            Ok(created) => {
                if !options.quiet {
                    println!(
                        "{} Row {}: Issue #{} created: {}",
                        style("✓").green(),
                        line,
                        style(created.number).cyan(),
                        created.html_url
                    );
                }
                stats.issues_created += 1;
            }
            Err(e) => {
                eprintln!("{} Row {}: {}", style("✗").red(), line, e);
                stats.errors += 1;
            }
        }
    }

    Ok(stats)
}

/// Pick the target repository: flag, config, `gh`, then the origin remote
fn resolve_repository(
    flag: Option<&str>,
    config: &Config,
    client: &dyn IssueClient,
    work_dir: &Path,
) -> Result<String> {
    if let Some(repo) = flag {
        return Ok(repo.to_string());
    }

    if let Some(ref repo) = config.repo {
        crate::core::provider::validate_repo(repo).map_err(|e| miette::miette!("{}", e))?;
        return Ok(repo.clone());
    }

    let gh_err = match client.current_repository() {
        Ok(repo) => return Ok(repo),
        Err(e) => e,
    };
    tracing::debug!(error = %gh_err, "gh could not determine the repository");

    Git::new(work_dir).github_repository("origin").map_err(|git_err| {
        tracing::debug!(error = %git_err, "origin remote is not usable");
        miette::miette!(
            help = "Please specify the repository using --repo option or run in a git repository",
            "Failed to determine repository: {}",
            gh_err
        )
    })
}

/// Ask whether to continue when template variables have no CSV column
fn confirm_missing() -> Result<bool> {
    if !console::user_attended() {
        tracing::info!("not a terminal; continuing without confirmation");
        return Ok(true);
    }

    Confirm::with_theme(&ColorfulTheme::default())
        .with_prompt("Some template variables will render empty. Continue?")
        .default(false)
        .interact()
        .into_diagnostic()
}

fn warn_rate_limit(rate: &RateLimit, rows: usize) {
    tracing::debug!(limit = rate.limit, remaining = rate.remaining, "API rate limit");

    if (rate.remaining as usize) < rows {
        let reset = chrono::DateTime::from_timestamp(rate.reset as i64, 0)
            .map(|t| {
                t.with_timezone(&chrono::Local)
                    .format("%Y-%m-%d %H:%M:%S")
                    .to_string()
            })
            .unwrap_or_else(|| rate.reset.to_string());
        eprintln!(
            "{} Warning: {} rows to process but only {} of {} API requests remain (resets at {})",
            style("!").yellow(),
            rows,
            rate.remaining,
            rate.limit,
            reset
        );
    }
}

fn print_summary(stats: &RunStats, dry_run: bool) {
    println!("{}", style("─".repeat(50)).dim());
    println!("{}", style("Summary").bold());
    println!("{}", style("─".repeat(50)).dim());
    println!("  Rows processed:   {}", style(stats.rows_processed).cyan());
    if dry_run {
        println!("  Issues previewed: {}", style(stats.issues_previewed).cyan());
    } else {
        println!("  Issues created:   {}", style(stats.issues_created).green());
    }
    if stats.errors > 0 {
        println!("  Errors:           {}", style(stats.errors).red());
    }

    if dry_run {
        println!();
        println!("{}", style("Dry run complete. No issues were created.").yellow());
    }
}
