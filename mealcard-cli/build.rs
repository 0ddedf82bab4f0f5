use std::env;
use std::path::{Path, PathBuf};
use std::process::Command;

// Stamps `--version` with the commit the binary was built from. Packagers
// building outside a checkout can set MEALCARD_BUILD_SHA themselves.
fn main() {
    println!("cargo:rerun-if-env-changed=MEALCARD_BUILD_SHA");
    println!("cargo:rerun-if-changed=build.rs");

    let workspace = env::var_os("CARGO_MANIFEST_DIR")
        .map(PathBuf::from)
        .and_then(|dir| dir.parent().map(Path::to_path_buf))
        .unwrap_or_else(|| PathBuf::from(".."));

    // Only watch HEAD when it exists; a missing path makes cargo rerun
    // the script on every build.
    let head = workspace.join(".git").join("HEAD");
    if head.is_file() {
        println!("cargo:rerun-if-changed={}", head.display());
    }

    let sha = env::var("MEALCARD_BUILD_SHA")
        .ok()
        .filter(|s| !s.trim().is_empty())
        .or_else(|| commit_of(&workspace))
        .unwrap_or_else(|| "unknown".to_string());

    println!("cargo:rustc-env=MEALCARD_BUILD_SHA={sha}");
}

fn commit_of(repo: &Path) -> Option<String> {
    let output = Command::new("git")
        .arg("-C")
        .arg(repo)
        .args(["rev-parse", "--short", "HEAD"])
        .output()
        .ok()?;
    if !output.status.success() {
        return None;
    }
    let sha = String::from_utf8(output.stdout).ok()?;
    let sha = sha.trim();
    (!sha.is_empty()).then(|| sha.to_string())
}
