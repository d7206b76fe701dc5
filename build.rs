fn main() {
    println!("cargo:rerun-if-changed=.git/HEAD");
    println!("cargo:rerun-if-changed=.git/refs/");

    // Best-effort: builds outside a git checkout (release tarballs, vendored
    // CI images) get an empty hash and the CLI reports the bare version.
    let hash = git_short_hash().unwrap_or_default();
    println!("cargo:rustc-env=GIT_HASH={hash}");
}

fn git_short_hash() -> Option<String> {
    let out = std::process::Command::new("git")
        .args(["rev-parse", "--short", "HEAD"])
        .output()
        .ok()?;
    if !out.status.success() {
        return None;
    }
    Some(String::from_utf8_lossy(&out.stdout).trim().to_string())
}
