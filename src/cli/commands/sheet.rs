//! Worksheet maintenance: create, import and export.
//!
//! These commands work on the raw grid and do not need a logged-in user.

use std::path::{Path, PathBuf};

use anyhow::{Context as _, bail};

use super::Context;
use crate::model::COLUMNS;
use crate::sheet::{RawTable, SheetStore, normalize_with_report, to_raw};

/// Create an empty worksheet with the canonical header row.
pub fn cmd_init(ctx: &Context, force: bool) -> anyhow::Result<()> {
    let worksheet = &ctx.options.worksheet;
    ctx.rt.block_on(async {
        let store = ctx.store().await?;
        let existing = store.worksheets().await?;
        if existing.iter().any(|name| name == worksheet) && !force {
            bail!("worksheet '{worksheet}' already exists (use --force to replace it)");
        }

        let empty = RawTable::new(COLUMNS.iter().map(|c| c.to_string()).collect());
        store.overwrite(worksheet, &empty).await?;

        println!(
            "Initialized worksheet '{worksheet}' in {}",
            ctx.db_path().display()
        );
        Ok::<_, anyhow::Error>(())
    })
}

/// Replace the worksheet with a JSON grid. Rows are read the same way a
/// session reads them and written back in canonical form.
pub fn cmd_import(ctx: &Context, path: &Path) -> anyhow::Result<()> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("cannot read {}", path.display()))?;
    let raw = RawTable::from_json(&contents)
        .with_context(|| format!("{} is not a worksheet grid", path.display()))?;

    let (tracks, report) = normalize_with_report(&raw);
    let worksheet = &ctx.options.worksheet;

    ctx.rt.block_on(async {
        let store = ctx.store().await?;
        store.overwrite(worksheet, &to_raw(&tracks)).await?;
        Ok::<_, anyhow::Error>(())
    })?;

    println!("Imported {} track(s) into '{worksheet}'.", report.tracks);
    if report.empty_rows > 0 {
        println!("  skipped {} empty row(s)", report.empty_rows);
    }
    if report.degraded_cells > 0 {
        println!("  {} unreadable cell(s) left blank", report.degraded_cells);
    }
    if !report.synthesized_columns.is_empty() {
        println!(
            "  missing column(s) left blank: {}",
            report.synthesized_columns.join(", ")
        );
    }
    Ok(())
}

/// Write the stored worksheet as pretty JSON.
pub fn cmd_export(ctx: &Context, output: Option<&PathBuf>) -> anyhow::Result<()> {
    let worksheet = &ctx.options.worksheet;
    let raw = ctx.rt.block_on(async {
        let store = ctx.store().await?;
        Ok::<_, anyhow::Error>(store.read(worksheet).await?)
    })?;

    let json = raw.to_json_pretty()?;
    match output {
        Some(path) => {
            std::fs::write(path, json)
                .with_context(|| format!("cannot write {}", path.display()))?;
            println!("Exported {} row(s) to {}", raw.len(), path.display());
        }
        None => println!("{json}"),
    }
    Ok(())
}
