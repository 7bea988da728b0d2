use crate::cli::Cli;
use crate::error::{FavoritesError, Result};
use crate::storage::FileStore;
use crate::store::{StoreOptions, DEFAULT_STORAGE_KEY};
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

/// Typed settings resolved from CLI flags and environment
#[derive(Debug, Clone)]
pub struct Settings {
    pub api_url: Url,
    pub token: Option<String>,
    pub data_dir: Option<PathBuf>,
    pub timeout: Duration,
}

impl Settings {
    pub fn from_cli(cli: &Cli) -> Result<Self> {
        let api_url = Url::parse(&cli.api_url).map_err(|e| {
            FavoritesError::ConfigError(format!("Invalid API URL {:?}: {}", cli.api_url, e))
        })?;
        if !matches!(api_url.scheme(), "http" | "https") {
            return Err(FavoritesError::ConfigError(format!(
                "API URL must be http or https: {}",
                api_url
            )));
        }

        if cli.timeout == 0 {
            return Err(FavoritesError::ConfigError(
                "Timeout must be at least 1 second".to_string(),
            ));
        }

        let token = cli
            .token
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(String::from);

        Ok(Self {
            api_url,
            token,
            data_dir: cli.data_dir.clone(),
            timeout: Duration::from_secs(cli.timeout),
        })
    }

    pub fn file_store(&self) -> Result<FileStore> {
        match &self.data_dir {
            Some(dir) => Ok(FileStore::new(dir)),
            None => FileStore::default_location(),
        }
    }

    pub fn store_options(&self) -> StoreOptions {
        StoreOptions {
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            lookup_timeout: self.timeout,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn parse(args: &[&str]) -> Cli {
        let mut argv = vec!["github-favorites"];
        argv.extend_from_slice(args);
        Cli::parse_from(argv)
    }

    #[test]
    fn test_explicit_flags() {
        let cli = parse(&[
            "--api-url",
            "http://localhost:9000/api",
            "--token",
            "  abc ",
            "--data-dir",
            "/tmp/favs",
            "--timeout",
            "3",
            "list",
        ]);
        let settings = Settings::from_cli(&cli).unwrap();

        assert_eq!(settings.api_url.as_str(), "http://localhost:9000/api");
        assert_eq!(settings.token.as_deref(), Some("abc"));
        assert_eq!(settings.timeout, Duration::from_secs(3));
        assert_eq!(settings.file_store().unwrap().dir(), std::path::Path::new("/tmp/favs"));
        assert_eq!(settings.store_options().storage_key, "users");
    }

    #[test]
    fn test_rejects_bad_url_and_timeout() {
        let cli = parse(&["--api-url", "not a url", "list"]);
        assert!(matches!(Settings::from_cli(&cli), Err(FavoritesError::ConfigError(_))));

        let cli = parse(&["--api-url", "ftp://example.com", "list"]);
        assert!(matches!(Settings::from_cli(&cli), Err(FavoritesError::ConfigError(_))));

        let cli = parse(&["--api-url", "https://api.github.com", "--timeout", "0", "list"]);
        assert!(matches!(Settings::from_cli(&cli), Err(FavoritesError::ConfigError(_))));
    }

    #[test]
    fn test_blank_token_is_none() {
        let cli = parse(&["--api-url", "https://api.github.com", "--token", "", "list"]);
        assert_eq!(Settings::from_cli(&cli).unwrap().token, None);
    }
}
