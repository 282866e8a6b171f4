//! repolist CLI binary entry point.
//! Delegates to library modules and maps outcomes to exit codes.

use clap::Parser;
use regex::Regex;
use repolist::check::run_check;
use repolist::cli::{Cli, Commands, NO_BASE};
use repolist::config::{self, OutputMode, Overrides};
use repolist::directory::{Directory, HttpDirectory};
use repolist::overlay::Listing;
use repolist::xml::{render, Document};
use repolist::{output, sort, strip, utils, Result};
use std::fs;
use std::path::{Path, PathBuf};

const EXIT_OK: i32 = 0;
const EXIT_FAILED: i32 = 1;
const EXIT_FATAL: i32 = 2;

fn main() {
    let cli = Cli::parse();
    if let Err(e) = init_tracing(cli.verbose) {
        eprintln!("{} {}", utils::warn_prefix(), e);
    }
    let code = match run(cli.cmd) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{} {}", utils::error_prefix(), e);
            EXIT_FATAL
        }
    };
    std::process::exit(code);
}

fn init_tracing(verbose: bool) -> std::result::Result<(), String> {
    let level = if verbose { "debug" } else { "warn" };
    let filter = tracing_subscriber::EnvFilter::try_from_env("REPOLIST_LOG")
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| format!("failed to initialize logging: {e}"))
}

fn run(cmd: Commands) -> Result<i32> {
    match cmd {
        Commands::Version => {
            println!("{}", env!("CARGO_PKG_VERSION"));
            Ok(EXIT_OK)
        }
        Commands::Check {
            base,
            current,
            output,
            directory_url,
            skip_email,
            repo_root,
        } => {
            let eff = config::resolve_effective(&Overrides {
                repo_root: repo_root.as_deref(),
                output: output.as_deref(),
                directory_url: directory_url.as_deref(),
                skip_email,
                insecure: None,
            })?;
            let current = load_listing(Path::new(&current), &eff.repo_root)?;
            let base = if base == NO_BASE {
                None
            } else {
                Some(load_listing(Path::new(&base), &eff.repo_root)?)
            };
            let report = if eff.email_check {
                let directory = HttpDirectory::new(&eff.directory_url, eff.directory_timeout)?;
                run_check(&current, base.as_ref(), Some(&directory as &dyn Directory))
            } else {
                run_check(&current, base.as_ref(), None)
            };
            output::print_check(&report, eff.output);
            Ok(if report.ok() { EXIT_OK } else { EXIT_FAILED })
        }
        Commands::Sort { path, write, check } => {
            let path = PathBuf::from(path);
            let (original, sorted) = sort::sort_file(&path)?;
            let changed = original != sorted;
            if check {
                if changed {
                    eprintln!(
                        "{} {} is not sorted; run `repolist sort --write`",
                        utils::note_prefix(),
                        path.display()
                    );
                    return Ok(EXIT_FAILED);
                }
                return Ok(EXIT_OK);
            }
            if write {
                if changed {
                    write_file(&path, &sorted)?;
                    eprintln!("{} formatted {}", utils::note_prefix(), path.display());
                }
            } else {
                print!("{sorted}");
            }
            Ok(EXIT_OK)
        }
        Commands::StripInsecure {
            path,
            write,
            pattern,
            repo_root,
        } => {
            let eff = config::resolve_effective(&Overrides {
                repo_root: repo_root.as_deref(),
                insecure: pattern.as_deref(),
                ..Overrides::default()
            })?;
            let insecure = Regex::new(&eff.insecure_pattern)?;
            let path = PathBuf::from(path);
            let label = utils::display_path(&path, &eff.repo_root);
            let mut doc = Document::load_as(&path, &label)?;
            let removed = strip::strip_insecure(&mut doc, &insecure);
            output::print_stripped(&removed, &label);
            let rendered = render(&doc);
            if write {
                if !removed.is_empty() {
                    write_file(&path, &rendered)?;
                }
            } else {
                print!("{rendered}");
            }
            Ok(EXIT_OK)
        }
        Commands::Sources {
            path,
            output,
            pattern,
            repo_root,
        } => {
            let eff = config::resolve_effective(&Overrides {
                repo_root: repo_root.as_deref(),
                output: output.as_deref(),
                insecure: pattern.as_deref(),
                ..Overrides::default()
            })?;
            let insecure = Regex::new(&eff.insecure_pattern)?;
            let path = PathBuf::from(path);
            let doc = Document::load_as(&path, &utils::display_path(&path, &eff.repo_root))?;
            let mode = match eff.output {
                OutputMode::Json => OutputMode::Json,
                _ => OutputMode::Human,
            };
            output::print_sources(&strip::list_sources(&doc, &insecure), mode);
            Ok(EXIT_OK)
        }
    }
}

fn load_listing(path: &Path, repo_root: &Path) -> Result<Listing> {
    Listing::load(path, &utils::display_path(path, repo_root))
}

fn write_file(path: &Path, contents: &str) -> Result<()> {
    fs::write(path, contents).map_err(|e| repolist::Error::Io {
        path: path.to_path_buf(),
        source: e,
    })
}
