//! Info command implementation
//!
//! Implements `phpbuild info <build>`: prints the persisted variant record.

use anyhow::{Context, Result};

use crate::core::record::FileVariantStore;
use crate::core::variant::VariantValue;
use crate::error::PhpbuildError;
use crate::infra::dirs::PhpbuildDirs;

/// Execute the info command
pub async fn execute(build: &str, json: bool) -> Result<()> {
    let dirs = PhpbuildDirs::new();
    let store = FileVariantStore::new(dirs.install_root());

    let record = store
        .read(build)
        .with_context(|| format!("Failed to load build '{build}'"))?
        .ok_or_else(|| PhpbuildError::BuildNotFound {
            build: build.to_string(),
        })?;

    if json {
        println!("{}", serde_json::to_string_pretty(&record)?);
        return Ok(());
    }

    println!("Build: {build}");
    println!("Prefix: {}", dirs.install_prefix(build).display());
    println!();

    println!("Enabled variants:");
    for (name, value) in &record.enabled_variants {
        match value {
            VariantValue::Flag(true) => println!("  +{name}"),
            VariantValue::Flag(false) => println!("  -{name}"),
            VariantValue::Value(v) => println!("  +{name}={v}"),
        }
    }

    if !record.disabled_variants.is_empty() {
        println!();
        println!("Disabled variants:");
        for name in &record.disabled_variants {
            println!("  -{name}");
        }
    }

    if !record.extra_options.is_empty() {
        println!();
        println!("Extra configure options:");
        for option in &record.extra_options {
            println!("  {option}");
        }
    }

    Ok(())
}
