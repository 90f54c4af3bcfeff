/// Where the history export comes from
use crate::chrome;
use crate::error::LoadError;
use crate::settings::Settings;
use url::Url;

/// Produces the raw text of the history export
#[allow(async_fn_in_trait)]
pub trait HistorySource {
    async fn read_history(&self) -> Result<String, LoadError>;

    /// User-configured URL patterns to skip on top of the builtin ones
    async fn extra_filters(&self) -> Vec<String> {
        Vec::new()
    }
}

/// Reads the export path from extension storage, then the file itself
#[derive(Debug, Default)]
pub struct ExtensionHistorySource;

impl HistorySource for ExtensionHistorySource {
    async fn read_history(&self) -> Result<String, LoadError> {
        let settings = chrome::load_settings().await.map_err(LoadError::Storage)?;
        let url = history_file_url(&settings)?;

        log::debug!("Reading history file {}", url);
        chrome::read_local_file(url.as_str(), settings.load_timeout_ms).await
    }

    async fn extra_filters(&self) -> Vec<String> {
        match chrome::load_settings().await {
            Ok(settings) => settings.extra_filters,
            Err(e) => {
                log::warn!("Using builtin URL filters only: {}", e);
                Vec::new()
            }
        }
    }
}

/// Build the `file:///` URL of the configured export file
pub fn history_file_url(settings: &Settings) -> Result<Url, LoadError> {
    let path = settings
        .history_path()
        .ok_or(LoadError::NotConfigured)?;

    let candidate = if path.starts_with("file:") {
        path.to_string()
    } else {
        format!("file:///{}", path.trim_start_matches('/'))
    };

    Url::parse(&candidate)
        .ok()
        .filter(|url| url.scheme() == "file")
        .ok_or_else(|| LoadError::InvalidPath(path.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings_with_path(path: &str) -> Settings {
        Settings {
            history_json: Some(path.to_string()),
            ..Settings::default()
        }
    }

    #[test]
    fn test_unix_path() {
        let url = history_file_url(&settings_with_path("/home/user/.wereyouhere/urls.json")).unwrap();

        assert_eq!(url.as_str(), "file:///home/user/.wereyouhere/urls.json");
    }

    #[test]
    fn test_relative_looking_path_is_rooted() {
        let url = history_file_url(&settings_with_path("tmp/urls.json")).unwrap();

        assert_eq!(url.as_str(), "file:///tmp/urls.json");
    }

    #[test]
    fn test_windows_path() {
        let url = history_file_url(&settings_with_path(r"C:\Users\me\urls.json")).unwrap();

        assert_eq!(url.as_str(), "file:///C:/Users/me/urls.json");
    }

    #[test]
    fn test_spaces_are_encoded() {
        let url = history_file_url(&settings_with_path("/tmp/my history.json")).unwrap();

        assert_eq!(url.as_str(), "file:///tmp/my%20history.json");
    }

    #[test]
    fn test_file_url_is_kept() {
        let url = history_file_url(&settings_with_path("file:///srv/urls.json")).unwrap();

        assert_eq!(url.as_str(), "file:///srv/urls.json");
    }

    #[test]
    fn test_missing_path() {
        assert_eq!(history_file_url(&Settings::default()), Err(LoadError::NotConfigured));
        assert_eq!(history_file_url(&settings_with_path("   ")), Err(LoadError::NotConfigured));
    }
}
