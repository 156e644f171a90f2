//! Subcommand implementations for the `pagegrep` binary.

pub mod run;
pub mod sample;
pub mod validate;

use pagegrep::{HarvestResult, TemplateTable};

use crate::config::TemplateSource;

/// Load the template table named by `source`, or an empty one.
pub fn load_templates(source: &TemplateSource) -> HarvestResult<TemplateTable> {
    match source.path() {
        Some(path) => TemplateTable::load(path),
        None => {
            tracing::debug!("no template table configured");
            Ok(TemplateTable::empty())
        }
    }
}
