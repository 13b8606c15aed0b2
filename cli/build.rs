use std::process::Command;

fn main() {
    // Release pipelines stamp the version through the environment; local
    // builds describe the checkout instead.
    if let Ok(version) = std::env::var("DASHBOARD_BOOTSTRAP_VERSION") {
        println!("cargo:rustc-env=DASHBOARD_BOOTSTRAP_VERSION={version}");
    } else if let Ok(output) = Command::new("git")
        .args(["describe", "--tags", "--always", "--dirty"])
        .output()
        && output.status.success()
    {
        let version = String::from_utf8_lossy(&output.stdout).trim().to_string();
        println!("cargo:rustc-env=DASHBOARD_BOOTSTRAP_VERSION={version}");
    }

    println!("cargo:rerun-if-changed=../.git/HEAD");
    println!("cargo:rerun-if-changed=../.git/refs/");
    println!("cargo:rerun-if-env-changed=DASHBOARD_BOOTSTRAP_VERSION");
}
