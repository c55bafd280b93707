use std::fmt;
use std::str::FromStr;

use anyhow::bail;
use serde::Serialize;

use crate::i18n::{Lang, Message, Status};
use crate::models::PetName;

/// The eight pages of the diary, in menu order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Page {
    #[default]
    Photos,
    BasicInfo,
    Handprint,
    Milestones,
    GrowthGuide,
    Birthday,
    GrowthDiary,
    Notes,
}

impl Page {
    pub const ALL: [Page; 8] = [
        Self::Photos,
        Self::BasicInfo,
        Self::Handprint,
        Self::Milestones,
        Self::GrowthGuide,
        Self::Birthday,
        Self::GrowthDiary,
        Self::Notes,
    ];

    /// 1-based position in the menu.
    #[must_use]
    pub fn number(self) -> usize {
        Self::ALL.iter().position(|p| *p == self).unwrap_or_default() + 1
    }

    #[must_use]
    pub fn slug(self) -> &'static str {
        match self {
            Self::Photos => "photos",
            Self::BasicInfo => "basic-info",
            Self::Handprint => "handprint",
            Self::Milestones => "milestones",
            Self::GrowthGuide => "growth-guide",
            Self::Birthday => "birthday",
            Self::GrowthDiary => "growth-diary",
            Self::Notes => "notes",
        }
    }

    /// Menu title including its number, e.g. `3. 手形の記録`.
    #[must_use]
    pub fn title(self) -> Message {
        let (ja, en) = match self {
            Self::Photos => ("写真ページ", "Photo Page"),
            Self::BasicInfo => ("基本事項", "Basic Info"),
            Self::Handprint => ("手形の記録", "Handprint"),
            Self::Milestones => ("初めてできたこと", "First Milestones"),
            Self::GrowthGuide => ("成長目安", "Growth Guide"),
            Self::Birthday => ("誕生日メッセージ", "Birthday Message"),
            Self::GrowthDiary => ("成長日記", "Growth Diary"),
            Self::Notes => ("メモ欄", "Notes"),
        };
        let n = self.number();
        Message::new(format!("{n}. {ja}"), format!("{n}. {en}"))
    }

    /// Fixed notice shown on pages that have no data of their own.
    #[must_use]
    pub fn notice(self) -> Option<Status> {
        match self {
            Self::GrowthGuide => Some(Status::Info(Message::new(
                "このページは現在準備中です。今後、年齢や行動に応じた成長チェックを実装予定です。",
                "This page is under preparation. Growth checks based on age and behavior will be implemented.",
            ))),
            _ => None,
        }
    }
}

impl FromStr for Page {
    type Err = anyhow::Error;

    /// Accepts the slug or the menu number.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Ok(n) = s.parse::<usize>() {
            if let Some(page) = n.checked_sub(1).and_then(|i| Self::ALL.get(i)) {
                return Ok(*page);
            }
            bail!("Page number must be between 1 and {}", Self::ALL.len());
        }
        let lower = s.to_lowercase();
        Self::ALL
            .into_iter()
            .find(|p| p.slug() == lower)
            .ok_or_else(|| anyhow::anyhow!("Unknown page '{s}'"))
    }
}

impl fmt::Display for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

/// Who is being viewed, on which page, in which language. Built per request by
/// each front end and passed down explicitly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub pet: PetName,
    pub page: Page,
    pub lang: Lang,
}

impl Session {
    #[must_use]
    pub fn new(pet: PetName, lang: Lang) -> Self {
        Self {
            pet,
            page: Page::default(),
            lang,
        }
    }

    #[must_use]
    pub fn on(mut self, page: Page) -> Self {
        self.page = page;
        self
    }

    /// Render a message in this session's language.
    #[must_use]
    pub fn text<'a>(&self, message: &'a Message) -> &'a str {
        message.text(self.lang)
    }
}
