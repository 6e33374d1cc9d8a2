use std::path::Path;

use assert_cmd::Command;

/// Build a `pmb` invocation isolated from the developer's real config,
/// session file and environment overrides.
pub fn pmb_cmd(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("pmb").expect("binary");
    cmd.env("PMB_CONFIG", dir.join("config.toml"));
    cmd.env("PMB_SESSION", dir.join("session.json"));
    cmd.env_remove("PMB_ENDPOINT");
    cmd.env_remove("PMB_ORG");
    cmd.env_remove("RUST_LOG");
    cmd
}
