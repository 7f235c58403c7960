//! Command-line argument definitions using clap.

use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;
use syncdns::config::{DEFAULT_LABEL, DEFAULT_STATE_PATH};
use syncdns::SyncConfig;

/// Keep AdGuard Home DNS rewrites in sync with Docker container labels
///
/// Containers declare rewrites with a label such as
/// syncdns.rewrites="Rewrite(app.local,10.0.0.5)". The rewrite is added while
/// the container runs and removed when it stops.
#[derive(Parser, Debug)]
#[command(name = "syncdnsd")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// AdGuard Home base URL (e.g. http://adguard.lan:3000)
    #[arg(long, env = "AdguardURL")]
    pub adguard_url: Option<String>,

    /// AdGuard Home username
    #[arg(long, env = "AdguardUser")]
    pub adguard_user: Option<String>,

    /// AdGuard Home password
    #[arg(long, env = "AdguardPassword", hide_env_values = true)]
    pub adguard_password: Option<String>,

    /// File recording which container owns which rewrite
    #[arg(long, env = "SYNCDNS_STATE_FILE", default_value = DEFAULT_STATE_PATH)]
    pub state_file: PathBuf,

    /// Container label holding rewrite declarations
    #[arg(long, env = "SYNCDNS_LABEL", default_value = DEFAULT_LABEL)]
    pub label: String,

    /// Give up on an AdGuard request after this many seconds (default: wait forever)
    #[arg(long, env = "SYNCDNS_TIMEOUT")]
    pub timeout_secs: Option<u64>,

    /// Log filter (e.g. info, debug, syncdns=trace)
    #[arg(long, env = "SYNCDNS_LOG", default_value = "info")]
    pub log_level: String,
}

impl Cli {
    /// Turn parsed arguments into an engine config.
    pub fn into_config(self) -> syncdns::Result<SyncConfig> {
        Ok(
            SyncConfig::new(self.adguard_url, self.adguard_user, self.adguard_password)?
                .state_path(self.state_file)
                .label(self.label)
                .timeout(self.timeout_secs.map(Duration::from_secs)),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_build_config() {
        let cli = Cli::try_parse_from([
            "syncdnsd",
            "--adguard-url",
            "http://adguard.lan",
            "--adguard-user",
            "admin",
            "--adguard-password",
            "pw",
            "--state-file",
            "/tmp/state.json",
            "--timeout-secs",
            "5",
        ])
        .unwrap();

        let config = cli.into_config().unwrap();
        assert_eq!(config.authority_url, "http://adguard.lan");
        assert_eq!(config.state_path, PathBuf::from("/tmp/state.json"));
        assert_eq!(config.label, "syncdns.rewrites");
        assert_eq!(config.timeout, Some(Duration::from_secs(5)));
    }

    #[test]
    fn test_missing_credentials_rejected() {
        let cli = Cli::try_parse_from(["syncdnsd", "--adguard-url", "http://adguard.lan"]).unwrap();
        let err = cli.into_config().unwrap_err();
        assert!(err.to_string().contains("AdguardUser"));
    }
}
