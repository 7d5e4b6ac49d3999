use std::process::Command;

// Bake the nearest git tag into the binary so `--version` reports releases
// even when the manifest version lags behind.
fn main() {
    println!("cargo:rerun-if-changed=build.rs");

    let tag = Command::new("git")
        .args(["describe", "--tags", "--abbrev=0"])
        .output()
        .ok()
        .filter(|output| output.status.success())
        .and_then(|output| String::from_utf8(output.stdout).ok())
        .map(|raw| raw.trim().to_string())
        .filter(|tag| !tag.is_empty());

    if let Some(tag) = tag {
        println!("cargo:rustc-env=GIT_TAG={tag}");
    }
}
