use anyhow::Context;
use regex_lite::Regex;

fn main() -> anyhow::Result<()> {
    let mut args = std::env::args().skip(1);
    match args.next().as_deref() {
        Some("arch-check") => arch_check(),
        Some(cmd) => anyhow::bail!("Unknown xtask command: {cmd}"),
        None => anyhow::bail!("Usage: cargo xtask <command>\n\nCommands:\n  arch-check"),
    }
}

/// Hexagonal-layering guard: `use_cases` and `domain` orchestrate through
/// `application::ports` trait objects and must never import an
/// infrastructure crate directly.
fn arch_check() -> anyhow::Result<()> {
    let output = std::process::Command::new("cargo")
        .args(["metadata", "--format-version", "1", "--no-deps"])
        .output()
        .context("running cargo metadata")?;
    if !output.status.success() {
        anyhow::bail!("cargo metadata failed")
    }

    let metadata: serde_json::Value =
        serde_json::from_slice(&output.stdout).context("parsing cargo metadata output")?;
    let packages = metadata["packages"].as_array().cloned().unwrap_or_default();

    let forbidden = Regex::new(r"^use\s+(sqlx|reqwest|axum|dashmap)\b").unwrap();
    let mut violations = Vec::new();

    for package in &packages {
        let name = package["name"].as_str().unwrap_or_default();
        if name != "coup-engine" && name != "coup-domain" {
            continue;
        }
        let manifest_path = package["manifest_path"].as_str().unwrap_or_default();
        let crate_root = std::path::Path::new(manifest_path)
            .parent()
            .map(|p| p.join("src"))
            .unwrap_or_default();

        let guarded = if name == "coup-domain" {
            crate_root.clone()
        } else {
            crate_root.join("use_cases")
        };

        walk(&guarded, &mut |path, contents| {
            for (lineno, line) in contents.lines().enumerate() {
                if forbidden.is_match(line.trim_start()) {
                    violations.push(format!("{}:{}: {}", path.display(), lineno + 1, line.trim()));
                }
            }
        })?;
    }

    if !violations.is_empty() {
        anyhow::bail!("layering violation: infrastructure imported outside infrastructure/:\n{}", violations.join("\n"));
    }

    println!("arch-check passed: {} packages scanned", packages.len());
    Ok(())
}

fn walk(dir: &std::path::Path, on_file: &mut dyn FnMut(&std::path::Path, &str)) -> anyhow::Result<()> {
    if !dir.exists() {
        return Ok(());
    }
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if path.is_dir() {
            walk(&path, on_file)?;
        } else if path.extension().and_then(|e| e.to_str()) == Some("rs") {
            let contents = std::fs::read_to_string(&path)?;
            on_file(&path, &contents);
        }
    }
    Ok(())
}
