use anyhow::{Context, Result};
use std::path::Path;

use petdiary_core::fields::format_timestamp;
use petdiary_core::i18n::Message;
use petdiary_core::models::{GrowthDraft, GrowthLogEntry};
use petdiary_core::service::JournalService;
use petdiary_core::session::Session;

use super::helpers::{
    loaded, parse_date, parse_timestamp, print_empty, print_json, print_table, report, truncate,
};

pub(crate) struct GrowthInput {
    pub at: Option<String>,
    pub meal: String,
    pub grams: u16,
    pub potty: String,
    pub walk: String,
    pub sleep: String,
    pub memo: String,
}

pub(crate) fn cmd_growth_log(
    svc: &JournalService,
    session: &Session,
    input: GrowthInput,
    json: bool,
) -> Result<()> {
    let draft = GrowthDraft {
        timestamp: parse_timestamp(input.at)?,
        meal: input.meal,
        meal_grams: input.grams,
        potty: input.potty,
        walk: input.walk,
        sleep: input.sleep,
        memo: input.memo,
    };

    if !json {
        if let Some(warning) = svc.birth_date_warning(&session.pet) {
            eprintln!("Warning: {}", warning.text(session.lang));
        }
    }

    report(session, &svc.log_growth(&session.pet, draft), json)
}

pub(crate) fn cmd_growth_list(
    svc: &JournalService,
    session: &Session,
    dates: Vec<String>,
    keyword: Option<&str>,
    json: bool,
) -> Result<()> {
    let dates = dates
        .into_iter()
        .map(|d| parse_date(Some(d)))
        .collect::<Result<Vec<_>>>()?;
    let entries = loaded(session, svc.search_growth(&session.pet, &dates, keyword));

    if json {
        return print_json(&entries);
    }
    if entries.is_empty() {
        print_empty(
            session,
            &Message::new("該当する記録がありません", "No matching entries"),
        );
        return Ok(());
    }
    print_entries(session, &entries);
    Ok(())
}

fn print_entries(session: &Session, entries: &[GrowthLogEntry]) {
    let rows = entries
        .iter()
        .map(|e| {
            vec![
                format_timestamp(e.timestamp),
                e.days_since_birth.map_or("-".into(), |d| d.to_string()),
                truncate(&e.meal, 20),
                e.meal_grams.to_string(),
                truncate(&e.potty, 15),
                truncate(&e.walk, 15),
                truncate(&e.sleep, 15),
                truncate(&e.memo, 30),
            ]
        })
        .collect();
    print_table(
        session.lang,
        &[
            ("日付時間", "Date/time"),
            ("生後日数", "Day"),
            ("食事内容", "Meal"),
            ("グラム", "g"),
            ("おしっこ・うんち", "Potty"),
            ("散歩", "Walk"),
            ("睡眠", "Sleep"),
            ("MEMO", "Memo"),
        ],
        rows,
    );
}

/// Replace the pet's growth log with the entries in a JSON file, as produced by
/// `growth list --json`.
pub(crate) fn cmd_growth_edit(
    svc: &JournalService,
    session: &Session,
    file: &Path,
    json: bool,
) -> Result<()> {
    let content = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read {}", file.display()))?;
    let entries: Vec<GrowthLogEntry> =
        serde_json::from_str(&content).context("Invalid growth log JSON")?;
    report(session, &svc.replace_growth_log(&session.pet, &entries), json)
}
