#![allow(clippy::expect_used, clippy::unwrap_used)]

use assert_cmd::Command;
use std::path::Path;
use std::time::Duration;

#[allow(dead_code)]
pub const CMD_TIMEOUT: Duration = Duration::from_secs(30);

/// Variables the binary reads; cleared so the host environment can't leak in.
const ENV_VARS: &[&str] = &[
    "GITHUB_OWNER",
    "GITHUB_REPO",
    "GITHUB_BRANCH",
    "LISTWATCH_CONFIG",
    "LISTWATCH_SOURCE_URL",
    "LISTWATCH_SEND_INTERVAL_MS",
    "TELEGRAM_BOT_TOKEN",
    "TELEGRAM_CHAT_ID",
    "TELEGRAM_API_BASE",
    "TELEGRAM_PARSE_MODE",
    "STATE_DIR",
];

/// Sample list used as the upstream document.
#[allow(dead_code)]
pub const BASE_LIST: &str = "# Awesome-Selfhosted\n\n## Software\n\n### Analytics\n\n- [Alpha](https://alpha.example) - First tool. ([Source Code](https://git.example/alpha)) `MIT` `Go`\n- [Beta](https://beta.example) - Second tool. `GPL-3.0` `Docker`\n";

/// Create a `listwatch` command running in `workdir` with a clean environment.
#[allow(dead_code)]
pub fn listwatch_cmd(workdir: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("listwatch"));
    cmd.timeout(CMD_TIMEOUT);
    cmd.current_dir(workdir);
    for var in ENV_VARS {
        cmd.env_remove(var);
    }
    cmd.env("NO_COLOR", "1");
    cmd
}

/// A command wired to a mock server for both the list and the Bot API.
#[allow(dead_code)]
pub fn listwatch_against(server_uri: &str, workdir: &Path) -> Command {
    let mut cmd = listwatch_cmd(workdir);
    cmd.env(
        "LISTWATCH_SOURCE_URL",
        format!("{server_uri}/awesome-selfhosted/awesome-selfhosted/master/README.md"),
    )
    .env("TELEGRAM_API_BASE", server_uri)
    .env("TELEGRAM_BOT_TOKEN", "123:abc")
    .env("TELEGRAM_CHAT_ID", "-1001234")
    .env("LISTWATCH_SEND_INTERVAL_MS", "0")
    .env("STATE_DIR", workdir.join("state"));
    cmd
}
