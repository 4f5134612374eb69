//! List command implementation
//!
//! Implements `phpbuild list`: every prefix under the install root.

use anyhow::{Context, Result};
use serde_json::json;

use crate::core::record::FileVariantStore;
use crate::infra::dirs::PhpbuildDirs;

/// Execute the list command
pub async fn execute(json: bool) -> Result<()> {
    let dirs = PhpbuildDirs::new();
    let root = dirs.install_root();

    let mut builds: Vec<(String, bool)> = Vec::new();
    if root.is_dir() {
        let entries = std::fs::read_dir(&root)
            .with_context(|| format!("Failed to read {}", root.display()))?;
        for entry in entries {
            let entry = entry?;
            if !entry.file_type()?.is_dir() {
                continue;
            }
            let has_record = FileVariantStore::record_path(&entry.path()).is_file();
            builds.push((entry.file_name().to_string_lossy().into_owned(), has_record));
        }
    }
    builds.sort();

    if json {
        let out: Vec<_> = builds
            .iter()
            .map(|(name, has_record)| {
                json!({
                    "name": name,
                    "prefix": dirs.install_prefix(name),
                    "has_variant_record": has_record,
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    if builds.is_empty() {
        println!("No builds installed.");
        return Ok(());
    }

    println!("Installed builds:");
    println!();
    for (name, has_record) in &builds {
        if *has_record {
            println!("  {name}");
        } else {
            println!("  {name} (no variant record)");
        }
    }
    println!();
    println!("{} build(s) installed.", builds.len());
    Ok(())
}
