//! Stamps the commit and build time reported by `GET /version`.
//!
//! Container builds have no `.git`, so `SOURCE_COMMIT` (set by the CI image
//! build) takes precedence over asking git.

use std::process::Command;

fn git_rev(args: &[&str]) -> Option<String> {
    let output = Command::new("git").args(args).output().ok()?;
    if !output.status.success() {
        return None;
    }
    let rev = String::from_utf8(output.stdout).ok()?;
    Some(rev.trim().to_string()).filter(|r| !r.is_empty())
}

fn main() {
    let full = std::env::var("SOURCE_COMMIT")
        .ok()
        .filter(|c| !c.trim().is_empty())
        .or_else(|| git_rev(&["rev-parse", "HEAD"]))
        .unwrap_or_else(|| "unknown".to_string());
    let short: String = if full == "unknown" {
        full.clone()
    } else {
        full.chars().take(7).collect()
    };

    println!("cargo:rustc-env=GIT_COMMIT_FULL={}", full);
    println!("cargo:rustc-env=GIT_COMMIT_SHORT={}", short);
    println!(
        "cargo:rustc-env=BUILD_TIMESTAMP={}",
        chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ")
    );

    println!("cargo:rerun-if-env-changed=SOURCE_COMMIT");
    println!("cargo:rerun-if-changed=.git/HEAD");
    println!("cargo:rerun-if-changed=build.rs");
}
