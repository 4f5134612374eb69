//! Variants command implementation
//!
//! Implements `phpbuild variants`.

use anyhow::Result;
use serde_json::json;

use crate::core::variant::VariantRegistry;

/// Execute the variants command
pub async fn execute(json: bool) -> Result<()> {
    let registry = VariantRegistry::builtin();

    if json {
        let variants: Vec<_> = registry
            .variants()
            .iter()
            .map(|v| {
                json!({
                    "name": v.name,
                    "description": v.description,
                    "flags": v.flags,
                    "accepts_value": v.accepts_value,
                    "conflicts": v.conflicts,
                    "requires": v.requires,
                })
            })
            .collect();
        let virtuals: Vec<_> = registry
            .virtuals()
            .iter()
            .map(|v| json!({ "name": v.name, "members": v.members }))
            .collect();
        let out = json!({ "variants": variants, "virtual_variants": virtuals });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    println!("Variants:");
    println!();
    for v in registry.variants() {
        let name = if v.accepts_value {
            format!("{}[=value]", v.name)
        } else {
            v.name.to_string()
        };
        println!("  {name:<18} {}", v.description);
        if !v.requires.is_empty() {
            println!("  {:<18} requires: {}", "", v.requires.join(", "));
        }
        if !v.conflicts.is_empty() {
            println!("  {:<18} conflicts with: {}", "", v.conflicts.join(", "));
        }
    }

    println!();
    println!("Virtual variants:");
    println!();
    for v in registry.virtuals() {
        println!("  {:<18} {}", v.name, v.members.join(", "));
    }

    println!();
    println!("Using variants to build PHP:");
    println!();
    println!("  phpbuild install 5.4.1 +default");
    println!("  phpbuild install 5.4.1 +mysql +pdo");
    println!("  phpbuild install 5.4.1 +default +openssl=/usr/local/opt/openssl -- --with-libdir=lib64");
    Ok(())
}
