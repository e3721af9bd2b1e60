use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

const DEFAULT_WELCOME_MESSAGE: &str = "Welcome to PMO Virtual Interview";
const DEFAULT_CHANNEL_URL: &str = "https://www.youtube.com/channel/example";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppSettings {
    welcome_message: String,
    channel_url: Option<String>,
}

#[derive(Clone, Debug, Default)]
pub struct AppSettingsDraft {
    pub welcome_message: Option<String>,
    pub channel_url: Option<String>,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum AppSettingsError {
    #[error("invalid channel URL")]
    InvalidChannelUrl,
}

impl AppSettingsDraft {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate and normalize the draft into persisted settings.
    ///
    /// A blank welcome message falls back to the default greeting.
    ///
    /// # Errors
    ///
    /// Returns `AppSettingsError` if the channel URL is present but invalid.
    pub fn validate(self) -> Result<AppSettings, AppSettingsError> {
        let welcome_message = normalize_optional(self.welcome_message)
            .unwrap_or_else(|| DEFAULT_WELCOME_MESSAGE.to_owned());
        let channel_url = normalize_optional(self.channel_url);

        if let Some(url) = channel_url.as_ref() {
            if Url::parse(url).is_err() {
                return Err(AppSettingsError::InvalidChannelUrl);
            }
        }

        Ok(AppSettings {
            welcome_message,
            channel_url,
        })
    }
}

impl AppSettings {
    #[must_use]
    pub fn welcome_message(&self) -> &str {
        &self.welcome_message
    }

    #[must_use]
    pub fn channel_url(&self) -> Option<&str> {
        self.channel_url.as_deref()
    }

    /// Start a draft pre-filled with the current values.
    #[must_use]
    pub fn to_draft(&self) -> AppSettingsDraft {
        AppSettingsDraft {
            welcome_message: Some(self.welcome_message.clone()),
            channel_url: self.channel_url.clone(),
        }
    }
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            welcome_message: DEFAULT_WELCOME_MESSAGE.to_owned(),
            channel_url: Some(DEFAULT_CHANNEL_URL.to_owned()),
        }
    }
}

fn normalize_optional(value: Option<String>) -> Option<String> {
    value
        .map(|val| val.trim().to_string())
        .filter(|val| !val.is_empty())
}
