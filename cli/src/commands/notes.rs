use anyhow::Result;

use petdiary_core::fields::format_date;
use petdiary_core::i18n::Message;
use petdiary_core::service::JournalService;
use petdiary_core::session::Session;

use super::helpers::{loaded, parse_date, print_empty, print_json, print_table, report};

pub(crate) fn cmd_notes_add(
    svc: &JournalService,
    session: &Session,
    text: &str,
    date: Option<String>,
    json: bool,
) -> Result<()> {
    let date = parse_date(date)?;
    report(session, &svc.add_note_on(&session.pet, date, text), json)
}

pub(crate) fn cmd_notes_list(
    svc: &JournalService,
    session: &Session,
    latest: bool,
    json: bool,
) -> Result<()> {
    let mut notes = loaded(session, svc.notes(&session.pet));
    if latest {
        notes.truncate(1);
    }

    if json {
        return print_json(&notes);
    }
    if notes.is_empty() {
        print_empty(session, &Message::new("メモはまだありません", "No notes yet"));
        return Ok(());
    }
    if latest {
        println!("{}", notes[0].text);
        return Ok(());
    }
    let rows = notes
        .into_iter()
        .map(|n| vec![format_date(n.date), n.text])
        .collect();
    print_table(session.lang, &[("日付", "Date"), ("メモ", "Note")], rows);
    Ok(())
}
