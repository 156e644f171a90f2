//! Configuration loading and resolution.

use std::path::{Path, PathBuf};
use std::time::Duration;

use pagegrep::{PoolConfig, RunOptions};

/// Environment variable naming the template table file.
pub const TEMPLATES_ENV: &str = "PAGEGREP_TEMPLATES";

/// Template file picked up from the working directory when nothing else is set.
pub const DEFAULT_TEMPLATES_FILE: &str = "regex_templates";

/// Where the template table comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateSource {
    /// Named by flag or environment; failing to load it is fatal.
    Explicit(PathBuf),
    /// Found in the working directory.
    Discovered(PathBuf),
    /// No table; every template reference is dropped.
    None,
}

impl TemplateSource {
    pub fn path(&self) -> Option<&Path> {
        match self {
            TemplateSource::Explicit(p) | TemplateSource::Discovered(p) => Some(p),
            TemplateSource::None => None,
        }
    }
}

/// Resolve the template table path.
pub fn resolve_templates_path(explicit: Option<&str>) -> TemplateSource {
    let env = std::env::var(TEMPLATES_ENV).ok();
    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    resolve_templates_path_in(explicit, env.as_deref(), &cwd)
}

/// Flag > environment variable > `regex_templates` in `cwd` > none.
pub fn resolve_templates_path_in(
    explicit: Option<&str>,
    env: Option<&str>,
    cwd: &Path,
) -> TemplateSource {
    if let Some(path) = explicit {
        return TemplateSource::Explicit(PathBuf::from(path));
    }

    if let Some(path) = env.filter(|p| !p.is_empty()) {
        return TemplateSource::Explicit(PathBuf::from(path));
    }

    let local = cwd.join(DEFAULT_TEMPLATES_FILE);
    if local.is_file() {
        return TemplateSource::Discovered(local);
    }

    TemplateSource::None
}

/// Settings for one `run` invocation.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub input: PathBuf,
    pub output: PathBuf,
    pub templates: TemplateSource,
    pub unique: bool,
    pub timeout: Option<Duration>,
    pub progress_every: usize,
}

impl RunConfig {
    pub fn pool_config(&self) -> PoolConfig {
        PoolConfig {
            timeout: self.timeout,
            ..PoolConfig::default()
        }
    }

    pub fn run_options(&self) -> RunOptions {
        RunOptions {
            unique: self.unique,
            progress_every: self.progress_every,
        }
    }
}
