//! `agentenv list` — show provisioned agent environments.
//!
//! Read-only: environments are never removed by agentenv.

use anyhow::{Context, Result};
use chrono::Local;
use serde_json::{json, Value};
use std::fs;
use std::path::Path;

use agentenv_runtime::{EnvironmentInfo, Provisioner};

/// `agentenv list`
pub fn cmd_list(provisioner: &Provisioner, json_output: bool) -> Result<()> {
    let root = provisioner.agents_root();
    let envs = provisioner
        .list()
        .with_context(|| format!("Read agents directory {}", root.display()))?;

    if json_output {
        let entries: Vec<Value> = envs.iter().map(to_json).collect::<Result<_>>()?;
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    if envs.is_empty() {
        eprintln!("No agent environments found at {}", root.display());
        return Ok(());
    }

    eprintln!("🗂  Agent environments ({}) in {}:", envs.len(), root.display());
    eprintln!();
    let mut total_size: u64 = 0;
    for env in &envs {
        let size = dir_size(&env.path);
        total_size += size;
        let state = match env.installed_at {
            Some(at) => format!(
                "requirements installed {}",
                at.with_timezone(&Local).format("%Y-%m-%d %H:%M")
            ),
            None => "no requirements installed".to_string(),
        };
        eprintln!("  • {} ({}, {})", env.name, format_size(size), state);
    }
    eprintln!();
    eprintln!("Total: {} ({} environments)", format_size(total_size), envs.len());
    Ok(())
}

fn to_json(env: &EnvironmentInfo) -> Result<Value> {
    let mut value = serde_json::to_value(env)?;
    if let Some(obj) = value.as_object_mut() {
        obj.insert("size_bytes".to_string(), json!(dir_size(&env.path)));
    }
    Ok(value)
}

/// Bytes owned by a directory tree. Symlinks are not followed: venvs link
/// `lib64 -> lib` and `bin/python` to the host interpreter.
fn dir_size(path: &Path) -> u64 {
    let Ok(entries) = fs::read_dir(path) else {
        return 0;
    };
    entries
        .flatten()
        .map(|entry| match entry.file_type() {
            Ok(ft) if ft.is_symlink() => 0,
            Ok(ft) if ft.is_dir() => dir_size(&entry.path()),
            Ok(_) => entry.metadata().map(|m| m.len()).unwrap_or(0),
            Err(_) => 0,
        })
        .sum()
}

/// Format byte size to human-readable string.
fn format_size(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{} B", bytes)
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else if bytes < 1024 * 1024 * 1024 {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    } else {
        format!("{:.2} GB", bytes as f64 / (1024.0 * 1024.0 * 1024.0))
    }
}
