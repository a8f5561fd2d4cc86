//! Build script for selfheal
//!
//! Stamps `BUILD_TIME`, `GIT_HASH` and `RUST_VERSION` into the binary.

use std::process::Command;

fn main() {
    let build_time = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs())
        .unwrap_or_default();
    println!("cargo:rustc-env=BUILD_TIME={}", build_time);

    let docs_rs = std::env::var("DOCS_RS").is_ok();

    let git_hash = if docs_rs {
        "docs-rs-build".to_string()
    } else {
        command_output("git", &["rev-parse", "--short", "HEAD"]).unwrap_or_else(|| "unknown".to_string())
    };
    println!("cargo:rustc-env=GIT_HASH={}", git_hash);

    let rust_version = if docs_rs {
        "stable".to_string()
    } else {
        command_output("rustc", &["--version"]).unwrap_or_else(|| "unknown".to_string())
    };
    println!("cargo:rustc-env=RUST_VERSION={}", rust_version);

    println!("cargo:rerun-if-changed=.git/HEAD");
    println!("cargo:rerun-if-changed=.git/refs/heads/");
    println!("cargo:rerun-if-changed=Cargo.toml");
}

/// Trimmed stdout of a successful command
fn command_output(program: &str, args: &[&str]) -> Option<String> {
    let output = Command::new(program).args(args).output().ok()?;
    if !output.status.success() {
        return None;
    }
    let text = String::from_utf8(output.stdout).ok()?;
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}
