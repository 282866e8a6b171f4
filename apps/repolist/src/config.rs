//! Configuration discovery and effective settings resolution.
//!
//! repolist reads `repolist.toml|yaml|yml` from the repository root (or
//! closest ancestor) and merges it with CLI flags to produce an `Effective`
//! config. Defaults:
//! - `output`: `human`
//! - `directory.url`: `https://bugs.gentoo.org`
//! - `directory.timeout_secs`: 10
//! - `directory.enabled`: true
//! - `strip.insecure`: `^git:`
//!
//! Overrides precedence: CLI > config file > defaults.

use crate::directory::{DEFAULT_TIMEOUT_SECS, DEFAULT_URL};
use crate::error::{Error, Result};
use crate::strip::DEFAULT_INSECURE;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

const CONFIG_FILES: [&str; 3] = ["repolist.toml", "repolist.yaml", "repolist.yml"];

#[derive(Debug, Default, Deserialize, Clone)]
/// User-directory section under `[directory]`.
pub struct DirectoryCfg {
    pub url: Option<String>,
    pub timeout_secs: Option<u64>,
    pub enabled: Option<bool>,
}

#[derive(Debug, Default, Deserialize, Clone)]
/// Source-stripping section under `[strip]`.
pub struct StripCfg {
    /// Regex matched against `<source>` URLs.
    pub insecure: Option<String>,
}

#[derive(Debug, Default, Deserialize, Clone)]
/// Root configuration loaded from `repolist.toml|yaml`.
pub struct RepolistConfig {
    pub output: Option<String>,
    pub directory: Option<DirectoryCfg>,
    pub strip: Option<StripCfg>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Diagnostic rendering for `check` and `sources`.
pub enum OutputMode {
    Human,
    Github,
    Json,
}

impl OutputMode {
    pub fn parse(s: &str) -> Result<Self> {
        match s {
            "human" => Ok(OutputMode::Human),
            "github" => Ok(OutputMode::Github),
            "json" => Ok(OutputMode::Json),
            other => Err(Error::Config(format!(
                "unknown output mode '{other}' (expected human|github|json)"
            ))),
        }
    }
}

#[derive(Debug, Clone)]
/// Fully-resolved configuration used by commands after applying precedence.
pub struct Effective {
    pub repo_root: PathBuf,
    pub output: OutputMode,
    pub directory_url: String,
    pub directory_timeout: Duration,
    pub email_check: bool,
    pub insecure_pattern: String,
}

/// CLI values that take precedence over the config file.
#[derive(Debug, Default, Clone)]
pub struct Overrides<'a> {
    pub repo_root: Option<&'a str>,
    pub output: Option<&'a str>,
    pub directory_url: Option<&'a str>,
    pub skip_email: bool,
    pub insecure: Option<&'a str>,
}

/// Walk upward from `start` to detect the repository root.
///
/// Stops when a `repolist.toml|yaml|yml` or a `.git` directory is found.
pub fn detect_repo_root(start: &Path) -> PathBuf {
    let mut cur = start;
    loop {
        if CONFIG_FILES.iter().any(|f| cur.join(f).exists()) || cur.join(".git").exists() {
            return cur.to_path_buf();
        }
        match cur.parent() {
            Some(p) => cur = p,
            None => return start.to_path_buf(),
        }
    }
}

/// Load `RepolistConfig` from `repolist.toml` or `repolist.yaml|yml`.
///
/// Returns `Ok(None)` when no config file exists; an unreadable or invalid
/// file is an error rather than silently ignored.
pub fn load_config(root: &Path) -> Result<Option<RepolistConfig>> {
    let toml_path = root.join(CONFIG_FILES[0]);
    if toml_path.exists() {
        let s = fs::read_to_string(&toml_path).map_err(|e| Error::io(&toml_path, e))?;
        let cfg = toml::from_str(&s)
            .map_err(|e| Error::Config(format!("{}: {e}", toml_path.display())))?;
        return Ok(Some(cfg));
    }
    for yml in &CONFIG_FILES[1..] {
        let p = root.join(yml);
        if p.exists() {
            let s = fs::read_to_string(&p).map_err(|e| Error::io(&p, e))?;
            let cfg = serde_yaml::from_str(&s)
                .map_err(|e| Error::Config(format!("{}: {e}", p.display())))?;
            return Ok(Some(cfg));
        }
    }
    Ok(None)
}

/// Resolve `Effective` by merging CLI flags, discovered config, and defaults.
pub fn resolve_effective(cli: &Overrides<'_>) -> Result<Effective> {
    let start = PathBuf::from(cli.repo_root.unwrap_or("."));
    let start = fs::canonicalize(&start).unwrap_or(start);
    let repo_root = detect_repo_root(&start);
    let cfg = load_config(&repo_root)?.unwrap_or_default();
    let directory = cfg.directory.unwrap_or_default();

    let output = cli
        .output
        .map(str::to_string)
        .or(cfg.output)
        .unwrap_or_else(|| "human".to_string());
    let directory_url = cli
        .directory_url
        .map(str::to_string)
        .or(directory.url)
        .unwrap_or_else(|| DEFAULT_URL.to_string());
    let insecure_pattern = cli
        .insecure
        .map(str::to_string)
        .or(cfg.strip.and_then(|s| s.insecure))
        .unwrap_or_else(|| DEFAULT_INSECURE.to_string());

    Ok(Effective {
        output: OutputMode::parse(&output)?,
        directory_url,
        directory_timeout: Duration::from_secs(
            directory.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS),
        ),
        email_check: !cli.skip_email && directory.enabled.unwrap_or(true),
        insecure_pattern,
        repo_root,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::tempdir;

    fn at(root: &Path) -> Overrides<'_> {
        Overrides {
            repo_root: root.to_str(),
            ..Overrides::default()
        }
    }

    #[test]
    fn defaults_without_config() {
        let dir = tempdir().unwrap();
        fs::create_dir(dir.path().join(".git")).unwrap();
        let eff = resolve_effective(&at(dir.path())).unwrap();
        assert_eq!(eff.output, OutputMode::Human);
        assert_eq!(eff.directory_url, DEFAULT_URL);
        assert_eq!(eff.directory_timeout, Duration::from_secs(10));
        assert!(eff.email_check);
        assert_eq!(eff.insecure_pattern, "^git:");
    }

    #[test]
    fn detect_and_load_toml() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        let mut f = fs::File::create(root.join("repolist.toml")).unwrap();
        writeln!(
            f,
            "{}",
            r#"
output = "github"
[directory]
url = "https://bugs.example.org"
timeout_secs = 3
[strip]
insecure = "^(git|http):"
    "#
        )
        .unwrap();
        let nested = root.join("files");
        fs::create_dir(&nested).unwrap();

        let eff = resolve_effective(&at(&nested)).unwrap();
        assert_eq!(eff.repo_root, fs::canonicalize(root).unwrap());
        assert_eq!(eff.output, OutputMode::Github);
        assert_eq!(eff.directory_url, "https://bugs.example.org");
        assert_eq!(eff.directory_timeout, Duration::from_secs(3));
        assert_eq!(eff.insecure_pattern, "^(git|http):");
    }

    #[test]
    fn load_yaml_and_cli_precedence() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        fs::write(
            root.join("repolist.yaml"),
            "output: json\ndirectory:\n  enabled: true\n  url: https://a.example\n",
        )
        .unwrap();

        let cli = Overrides {
            repo_root: root.to_str(),
            output: Some("human"),
            directory_url: Some("http://127.0.0.1:8080"),
            skip_email: true,
            insecure: None,
        };
        let eff = resolve_effective(&cli).unwrap();
        assert_eq!(eff.output, OutputMode::Human);
        assert_eq!(eff.directory_url, "http://127.0.0.1:8080");
        assert!(!eff.email_check);
    }

    #[test]
    fn disabled_directory_turns_off_email_check() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("repolist.toml"), "[directory]\nenabled = false\n").unwrap();
        let eff = resolve_effective(&at(dir.path())).unwrap();
        assert!(!eff.email_check);
    }

    #[test]
    fn invalid_values_are_errors() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("repolist.toml"), "output = \"xml\"\n").unwrap();
        assert!(matches!(
            resolve_effective(&at(dir.path())),
            Err(Error::Config(_))
        ));

        fs::write(dir.path().join("repolist.toml"), "output = [").unwrap();
        assert!(matches!(
            resolve_effective(&at(dir.path())),
            Err(Error::Config(_))
        ));
    }
}
