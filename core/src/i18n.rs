use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Display language. Every user-facing message exists in both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Lang {
    #[default]
    Ja,
    En,
}

impl Lang {
    #[must_use]
    pub fn code(self) -> &'static str {
        match self {
            Self::Ja => "ja",
            Self::En => "en",
        }
    }
}

impl FromStr for Lang {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "ja" | "jp" | "japanese" | "日本語" => Ok(Self::Ja),
            "en" | "english" => Ok(Self::En),
            _ => anyhow::bail!("Unknown language '{s}'. Use 'ja' (日本語) or 'en' (English)"),
        }
    }
}

impl fmt::Display for Lang {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// A message carried in both display languages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub ja: String,
    pub en: String,
}

impl Message {
    pub fn new(ja: impl Into<String>, en: impl Into<String>) -> Self {
        Self {
            ja: ja.into(),
            en: en.into(),
        }
    }

    #[must_use]
    pub fn text(&self, lang: Lang) -> &str {
        match lang {
            Lang::Ja => &self.ja,
            Lang::En => &self.en,
        }
    }
}

/// Outcome of a journal operation, rendered by whichever front end called it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "message", rename_all = "lowercase")]
pub enum Status {
    Success(Message),
    Info(Message),
    Warning(Message),
    Error(Message),
}

impl Status {
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    #[must_use]
    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }

    #[must_use]
    pub fn message(&self) -> &Message {
        match self {
            Self::Success(m) | Self::Info(m) | Self::Warning(m) | Self::Error(m) => m,
        }
    }

    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Success(_) => "success",
            Self::Info(_) => "info",
            Self::Warning(_) => "warning",
            Self::Error(_) => "error",
        }
    }

    #[must_use]
    pub fn text(&self, lang: Lang) -> &str {
        self.message().text(lang)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lang_parse() {
        assert_eq!("ja".parse::<Lang>().unwrap(), Lang::Ja);
        assert_eq!("日本語".parse::<Lang>().unwrap(), Lang::Ja);
        assert_eq!("English".parse::<Lang>().unwrap(), Lang::En);
        assert_eq!(" EN ".parse::<Lang>().unwrap(), Lang::En);
        assert!("fr".parse::<Lang>().is_err());
    }

    #[test]
    fn test_message_text() {
        let msg = Message::new("保存しました", "Saved");
        assert_eq!(msg.text(Lang::Ja), "保存しました");
        assert_eq!(msg.text(Lang::En), "Saved");
    }

    #[test]
    fn test_status_serializes_with_tag() {
        let status = Status::Warning(Message::new("注意", "Careful"));
        let json = serde_json::to_value(&status).unwrap();
        assert_eq!(json["status"], "warning");
        assert_eq!(json["message"]["en"], "Careful");
        assert!(!status.is_success());
        assert_eq!(status.kind(), "warning");
    }
}
