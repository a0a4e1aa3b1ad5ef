use std::fs;
use std::path::{Path, PathBuf};

use super::error::ConfigError;
use super::paths::ConfigPaths;
use super::types::{LogTarget, WidgetConfig};

/// Widget settings plus where they came from and where logs go.
#[derive(Debug)]
pub struct LoadedConfig {
    pub config: WidgetConfig,
    pub paths: ConfigPaths,
    pub log_target: LogTarget,
    pub config_exists: bool,
}

/// Reads the config file, falling back to defaults when it does not exist,
/// and creates the config and log directories.
pub fn load_config(path_override: Option<PathBuf>) -> Result<LoadedConfig, ConfigError> {
    let paths = ConfigPaths::resolve(path_override)?;
    let read = read_config(&paths.config_file)?;
    let log_target = read.config.logging.target(&paths.logs_dir);
    fs::create_dir_all(&paths.config_dir)?;
    fs::create_dir_all(&log_target.directory)?;
    if read.exists {
        secure_file_permissions(&paths.config_file)?;
    }
    Ok(LoadedConfig {
        config: read.config,
        paths,
        log_target,
        config_exists: read.exists,
    })
}

fn read_config(path: &Path) -> Result<ConfigRead, ConfigError> {
    match fs::read_to_string(path) {
        Ok(contents) => Ok(ConfigRead {
            config: toml::from_str(&contents)?,
            exists: true,
        }),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(ConfigRead {
            config: WidgetConfig::default(),
            exists: false,
        }),
        Err(err) => Err(ConfigError::Io(err)),
    }
}

struct ConfigRead {
    config: WidgetConfig,
    exists: bool,
}

// The file holds the API token.
fn secure_file_permissions(path: &Path) -> Result<(), ConfigError> {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mut perms = fs::metadata(path)?.permissions();
        if perms.mode() & 0o077 != 0 {
            perms.set_mode(0o600);
            fs::set_permissions(path, perms)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use secrecy::ExposeSecret;
    use tempfile::tempdir;

    use super::*;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempdir().unwrap();
        let loaded = load_config(Some(dir.path().join("config.toml"))).unwrap();
        assert!(!loaded.config_exists);
        assert_eq!(loaded.config.bot_name, "ChatBot");
        assert_eq!(loaded.config.typing.interval_ms, 50);
    }

    #[test]
    fn partial_file_merges_with_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let mut file = fs::File::create(&path).unwrap();
        writeln!(
            file,
            r##"
api_endpoint = "http://localhost:8080/v1/chat-messages"
api_token = "app-123"

[theme]
primary_color = "#ff0000"

[typing]
interval_ms = 20
"##
        )
        .unwrap();

        let loaded = load_config(Some(path.clone())).unwrap();
        let config = loaded.config;
        assert!(loaded.config_exists);
        assert_eq!(config.api_endpoint, "http://localhost:8080/v1/chat-messages");
        assert_eq!(config.resolved_token().expose_secret(), "app-123");
        assert_eq!(config.theme.primary_color, "#ff0000");
        assert_eq!(config.theme.background_color, "#f4f4f4");
        assert_eq!(config.typing.interval_ms, 20);
        assert!(config.typing.enabled);
        assert_eq!(config.placeholder_text, "Thinking ...");
    }

    #[cfg(unix)]
    #[test]
    fn tightens_permissions_on_existing_file() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "bot_name = \"Quant\"\n").unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o644)).unwrap();

        let loaded = load_config(Some(path.clone())).unwrap();
        assert_eq!(loaded.config.bot_name, "Quant");
        let mode = fs::metadata(&path).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o600);
    }

    #[test]
    fn creates_configured_log_directory() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let logs = dir.path().join("logs").join("widget.log");
        fs::write(
            &path,
            format!("[logging]\npath = {:?}\n", logs.to_string_lossy()),
        )
        .unwrap();

        let loaded = load_config(Some(path)).unwrap();
        assert_eq!(loaded.log_target.directory, dir.path().join("logs"));
        assert_eq!(loaded.log_target.basename, "widget");
        assert!(loaded.log_target.directory.is_dir());
    }

    #[test]
    fn rejects_invalid_toml() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "api_endpoint = [").unwrap();
        assert!(matches!(
            load_config(Some(path)),
            Err(ConfigError::Toml(_))
        ));
    }
}
