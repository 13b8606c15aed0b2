/// Version string baked in at build time, falling back to the crate version.
#[must_use]
pub fn current() -> &'static str {
    option_env!("DASHBOARD_BOOTSTRAP_VERSION").unwrap_or(env!("CARGO_PKG_VERSION"))
}

/// Run the version command.
pub fn run() {
    println!("dashboard-bootstrap {}", current());
}
