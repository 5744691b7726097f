use std::process::Command;

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-changed=assets/catalog");
    println!("cargo:rerun-if-changed=.git/HEAD");

    let tag = Command::new("git")
        .args(["describe", "--tags", "--abbrev=0"])
        .output()
        .ok()
        .filter(|output| output.status.success())
        .and_then(|output| String::from_utf8(output.stdout).ok())
        .map(|tag| tag.trim().to_string())
        .filter(|tag| !tag.is_empty());

    if let Some(tag) = tag {
        println!("cargo:rustc-env=GIT_TAG={tag}");
    }
}
