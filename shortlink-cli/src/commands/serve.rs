use anyhow::{Context, Result};
use shortlink_core::config::{ShortlinkConfig, DEFAULT_CONFIG_FILE};
use shortlink_core::logging::init_logging;
use shortlink_core::ShortlinkServer;
use std::path::PathBuf;

/// Flags given to `shortlink serve`
#[derive(Debug, Default)]
pub struct ServeArgs {
    pub config: Option<PathBuf>,
    pub host: Option<String>,
    pub port: Option<u16>,
    pub base_url: Option<String>,
}

/// Resolve configuration: defaults, then file, then `SL_*`, then flags
pub fn load_config(args: ServeArgs) -> Result<ShortlinkConfig> {
    let mut config = match &args.config {
        // An explicit file must exist
        Some(path) => {
            let mut config = ShortlinkConfig::default();
            config.merge(ShortlinkConfig::from_file(path)?);
            config.apply_env_vars();
            config
        }
        None => ShortlinkConfig::load_from(DEFAULT_CONFIG_FILE)?,
    };

    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(base_url) = args.base_url {
        config.server.base_url = Some(base_url);
    }

    config.validate()?;
    Ok(config)
}

pub fn run(args: ServeArgs) -> Result<()> {
    let config = load_config(args)?;
    init_logging(&config.logging);

    let mut runtime = tokio::runtime::Builder::new_multi_thread();
    runtime.enable_all();
    if let Some(workers) = config.server.workers {
        runtime.worker_threads(workers);
    }
    let runtime = runtime.build().context("Failed to start tokio runtime")?;

    runtime.block_on(ShortlinkServer::new(config).serve())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_flags_override_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[server]\nport = 9100\nhost = \"0.0.0.0\"\n\n[cache]\ncapacity = 42"
        )
        .unwrap();

        let config = load_config(ServeArgs {
            config: Some(file.path().to_path_buf()),
            port: Some(9200),
            base_url: Some("https://sho.rt".to_string()),
            ..Default::default()
        })
        .unwrap();

        assert_eq!(config.server.port, 9200);
        assert_eq!(config.cache.capacity, 42);
        assert_eq!(config.server.public_base_url(), "https://sho.rt");
    }

    #[test]
    fn test_missing_explicit_file_fails() {
        let result = load_config(ServeArgs {
            config: Some(PathBuf::from("/definitely/not/here.toml")),
            ..Default::default()
        });
        assert!(result.is_err());
    }

    #[test]
    fn test_invalid_flag_value_fails_validation() {
        let result = load_config(ServeArgs {
            config: None,
            base_url: Some("ftp://sho.rt".to_string()),
            ..Default::default()
        });
        assert!(result.is_err());
    }
}
