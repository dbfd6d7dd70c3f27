//! Init command - writes a `.bugmine.toml` with every default spelled out.

use std::path::Path;

use anyhow::Context as _;
use bugmine_core::Settings;

use crate::ui::{print_command_header, print_success, print_warning};

/// Executes `bugmine init`. An existing file is left alone unless `force`.
pub fn run(path: &Path, force: bool) -> super::Result {
    print_command_header("init");

    if path.exists() && !force {
        print_warning(&format!(
            "{} already exists (use --force to overwrite)",
            path.display()
        ));
        return Ok(());
    }

    Settings::new()
        .save(path)
        .with_context(|| format!("failed to write {}", path.display()))?;

    print_success(&format!("created {}", path.display()));
    Ok(())
}
