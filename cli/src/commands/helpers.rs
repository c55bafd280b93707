use anyhow::{Context, Result, bail};
use chrono::{Local, NaiveDate, NaiveDateTime, NaiveTime};
use serde::Serialize;
use std::path::Path;
use tabled::{builder::Builder, settings::Style};

use petdiary_core::fields;
use petdiary_core::i18n::{Lang, Message, Status};
use petdiary_core::models::PetName;
use petdiary_core::service::load_warning;
use petdiary_core::session::{Page, Session};
use petdiary_core::store::Loaded;

/// Build the session for a page command. Every page except the menu needs a pet.
pub(crate) fn open_session(pet: Option<&str>, lang: Lang, page: Page) -> Result<Session> {
    let name = pet.context("No pet selected. Pass --pet <NAME> or set PETDIARY_PET")?;
    let pet = PetName::parse(name)?;
    Ok(Session::new(pet, lang).on(page))
}

pub(crate) fn parse_date(date_str: Option<String>) -> Result<NaiveDate> {
    match date_str {
        None => Ok(Local::now().date_naive()),
        Some(s) => match s.as_str() {
            "today" => Ok(Local::now().date_naive()),
            "yesterday" => Ok(Local::now().date_naive() - chrono::Duration::days(1)),
            "tomorrow" => Ok(Local::now().date_naive() + chrono::Duration::days(1)),
            _ => fields::parse_date(&s).with_context(|| {
                format!("Invalid date '{s}'. Use YYYY-MM-DD or today/yesterday/tomorrow")
            }),
        },
    }
}

pub(crate) fn parse_time(time_str: Option<String>) -> Result<NaiveTime> {
    match time_str {
        None => Ok(Local::now().time()),
        Some(s) if s == "now" => Ok(Local::now().time()),
        Some(s) => {
            fields::parse_time(&s).with_context(|| format!("Invalid time '{s}'. Use HH:MM or HH:MM:SS"))
        }
    }
}

pub(crate) fn parse_timestamp(ts_str: Option<String>) -> Result<NaiveDateTime> {
    match ts_str {
        None => Ok(Local::now().naive_local()),
        Some(s) if s == "now" => Ok(Local::now().naive_local()),
        Some(s) => fields::parse_timestamp(&s).with_context(|| {
            format!("Invalid date/time '{s}'. Use 'YYYY-MM-DD HH:MM[:SS]' or 'now'")
        }),
    }
}

pub(crate) fn read_image(path: &Path) -> Result<Vec<u8>> {
    let bytes = std::fs::read(path)
        .with_context(|| format!("Failed to read image file: {}", path.display()))?;
    if bytes.is_empty() {
        bail!("Image file is empty: {}", path.display());
    }
    Ok(bytes)
}

/// Print the outcome of a save. An error status fails the command.
pub(crate) fn report(session: &Session, status: &Status, json: bool) -> Result<()> {
    let text = status.text(session.lang);
    if json {
        println!(
            "{}",
            serde_json::json!({ "status": status.kind(), "message": text })
        );
    } else {
        match status {
            Status::Success(_) | Status::Info(_) => println!("{text}"),
            Status::Warning(_) => eprintln!("Warning: {text}"),
            Status::Error(_) => {}
        }
    }
    if status.is_error() {
        bail!("{text}");
    }
    Ok(())
}

/// Surface a degraded read on stderr and hand back the value.
pub(crate) fn loaded<T>(session: &Session, loaded: Loaded<T>) -> T {
    if let Some(status) = load_warning(&loaded) {
        eprintln!("Warning: {}", status.text(session.lang));
    }
    loaded.value
}

pub(crate) fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub(crate) fn print_empty(session: &Session, message: &Message) {
    eprintln!("{}", session.text(message));
}

/// Render a table whose header row is chosen by language.
pub(crate) fn print_table(lang: Lang, headers: &[(&str, &str)], rows: Vec<Vec<String>>) {
    let mut builder = Builder::default();
    builder.push_record(headers.iter().map(|(ja, en)| match lang {
        Lang::Ja => (*ja).to_string(),
        Lang::En => (*en).to_string(),
    }));
    for row in rows {
        builder.push_record(row);
    }
    let table = builder.build().with(Style::rounded()).to_string();
    println!("{table}");
}

pub(crate) fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let end = s.char_indices().nth(max - 3).map_or(s.len(), |(i, _)| i);
        format!("{}...", &s[..end])
    }
}
