//! `pagegrep sample`: write a demo input file.

use std::path::Path;

use anyhow::Context;

use crate::error::{exit_codes, CliResult};

pub fn run(count: usize, output: &Path) -> CliResult<i32> {
    pagegrep::write_demo_samples(output, count)
        .with_context(|| format!("failed to write {}", output.display()))?;
    println!("Wrote {count} sample(s) to {}", output.display());
    Ok(exit_codes::SUCCESS)
}
