//! Embeds commit, build time, and cargo profile for `--help` and the banner.
//!
//! Each value can be pinned through the matching `BLADECON_BUILD_*` variable
//! for reproducible builds; otherwise it is probed, with "unknown" when git or
//! date are missing.

use std::env;
use std::fs;
use std::process::Command;
use std::time::{SystemTime, UNIX_EPOCH};

const GIT_HASH_ENV: &str = "BLADECON_BUILD_GIT_HASH";
const TIMESTAMP_ENV: &str = "BLADECON_BUILD_TIMESTAMP";
const PROFILE_ENV: &str = "BLADECON_BUILD_PROFILE";

fn main() {
    watch_git_head();
    for var in [GIT_HASH_ENV, TIMESTAMP_ENV, PROFILE_ENV] {
        println!("cargo:rerun-if-env-changed={var}");
    }

    let commit = pinned(GIT_HASH_ENV).unwrap_or_else(commit_id);
    let built = pinned(TIMESTAMP_ENV).unwrap_or_else(utc_now);
    let profile = pinned(PROFILE_ENV)
        .or_else(|| pinned("PROFILE"))
        .unwrap_or_else(|| "unknown".to_string());

    println!("cargo:rustc-env={GIT_HASH_ENV}={commit}");
    println!("cargo:rustc-env={TIMESTAMP_ENV}={built}");
    println!("cargo:rustc-env={PROFILE_ENV}={profile}");
}

fn pinned(var: &str) -> Option<String> {
    env::var(var).ok().filter(|value| !value.trim().is_empty())
}

/// Rebuild when HEAD moves, including commits on the checked-out branch.
fn watch_git_head() {
    println!("cargo:rerun-if-changed=.git/HEAD");
    let branch = fs::read_to_string(".git/HEAD")
        .ok()
        .and_then(|head| head.trim().strip_prefix("ref: ").map(str::to_string));
    if let Some(branch) = branch {
        println!("cargo:rerun-if-changed=.git/{branch}");
    }
}

/// Short commit hash, suffixed `-dirty` when the tree has local edits.
fn commit_id() -> String {
    let Some(hash) = capture("git", &["rev-parse", "--short=12", "HEAD"]) else {
        return "unknown".to_string();
    };
    let dirty = Command::new("git")
        .args(["diff", "--quiet", "HEAD", "--"])
        .status()
        .is_ok_and(|status| status.code() == Some(1));
    if dirty {
        format!("{hash}-dirty")
    } else {
        hash
    }
}

fn utc_now() -> String {
    capture("date", &["-u", "+%Y-%m-%dT%H:%M:%SZ"]).unwrap_or_else(|| {
        let secs = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |elapsed| elapsed.as_secs());
        format!("unix:{secs}")
    })
}

fn capture(program: &str, args: &[&str]) -> Option<String> {
    let output = Command::new(program).args(args).output().ok()?;
    if !output.status.success() {
        return None;
    }
    let text = String::from_utf8(output.stdout).ok()?;
    Some(text.trim().to_string()).filter(|text| !text.is_empty())
}
