use anyhow::{Context, Result};
use std::path::Path;

use petdiary_core::fields::{format_date, format_time};
use petdiary_core::i18n::Message;
use petdiary_core::models::{HandprintRecord, ImageSlot, MilestoneDraft};
use petdiary_core::service::JournalService;
use petdiary_core::session::Session;

use super::helpers::{
    loaded, parse_date, parse_time, print_empty, print_json, print_table, read_image, report,
};

/// Fields given on the command line; anything left out keeps its current value.
#[derive(Default)]
pub(crate) struct BasicUpdate {
    pub birth_date: Option<String>,
    pub birth_time: Option<String>,
    pub place: Option<String>,
    pub weather: Option<String>,
    pub weight: Option<String>,
    pub height: Option<String>,
    pub message: Option<String>,
}

fn no_record() -> Message {
    Message::new("まだ記録がありません", "Nothing recorded yet")
}

pub(crate) fn cmd_basic_set(
    svc: &JournalService,
    session: &Session,
    update: BasicUpdate,
    json: bool,
) -> Result<()> {
    let mut record = loaded(session, svc.basic_form(&session.pet));
    if let Some(d) = update.birth_date {
        record.birth_date = parse_date(Some(d))?;
    }
    if let Some(t) = update.birth_time {
        record.birth_time = parse_time(Some(t))?;
    }
    if let Some(v) = update.place {
        record.place = v;
    }
    if let Some(v) = update.weather {
        record.weather = v;
    }
    if let Some(v) = update.weight {
        record.birth_weight = v;
    }
    if let Some(v) = update.height {
        record.birth_height = v;
    }
    if let Some(v) = update.message {
        record.message = v;
    }

    let status = svc.save_basic(&session.pet, record);
    report(session, &status, json)
}

pub(crate) fn cmd_basic_show(svc: &JournalService, session: &Session, json: bool) -> Result<()> {
    let record = loaded(session, svc.basic(&session.pet));
    if json {
        return print_json(&record);
    }
    let Some(r) = record else {
        print_empty(session, &no_record());
        return Ok(());
    };
    let rows = [
        ("生まれた日", "Birth date", format_date(r.birth_date)),
        ("生まれた時間", "Birth time", format_time(r.birth_time)),
        ("場所", "Place", r.place),
        ("天気", "Weather", r.weather),
        ("体重", "Weight", r.birth_weight),
        ("身長", "Height", r.birth_height),
        ("メッセージ", "Message", r.message),
    ]
    .into_iter()
    .map(|(ja, en, value)| vec![Message::new(ja, en).text(session.lang).to_string(), value])
    .collect();
    print_table(session.lang, &[("項目", "Field"), ("内容", "Value")], rows);
    Ok(())
}

fn save_image_if_given(
    svc: &JournalService,
    session: &Session,
    slot: ImageSlot,
    image: Option<&Path>,
    json: bool,
) -> Result<()> {
    if let Some(path) = image {
        let bytes = read_image(path)?;
        report(session, &svc.save_photo(&session.pet, slot, &bytes), json)?;
    }
    Ok(())
}

pub(crate) fn cmd_handprint_set(
    svc: &JournalService,
    session: &Session,
    date: Option<String>,
    comment: Option<String>,
    image: Option<&Path>,
    json: bool,
) -> Result<()> {
    save_image_if_given(svc, session, ImageSlot::Hand, image, json)?;

    let current = loaded(session, svc.handprint_form(&session.pet));
    let record = HandprintRecord {
        date: match date {
            Some(d) => parse_date(Some(d))?,
            None => current.date,
        },
        comment: comment.unwrap_or(current.comment),
    };
    report(session, &svc.save_handprint(&session.pet, record), json)
}

pub(crate) fn cmd_handprint_show(
    svc: &JournalService,
    session: &Session,
    json: bool,
) -> Result<()> {
    let record = loaded(session, svc.handprint(&session.pet));
    let image = svc.photo_path(&session.pet, ImageSlot::Hand);
    if json {
        return print_json(&serde_json::json!({ "record": record, "image": image }));
    }
    match record {
        Some(r) => print_table(
            session.lang,
            &[("日付", "Date"), ("コメント", "Comment")],
            vec![vec![format_date(r.date), r.comment]],
        ),
        None => print_empty(session, &no_record()),
    }
    if let Some(path) = image {
        println!("{}", path.display());
    }
    Ok(())
}

/// Parse `DATE=TEXT` milestone arguments.
fn parse_milestone(arg: &str) -> Result<MilestoneDraft> {
    let (date, text) = arg
        .split_once('=')
        .with_context(|| format!("Invalid milestone '{arg}'. Use DATE=TEXT (e.g. 2024-02-01=sat up)"))?;
    Ok(MilestoneDraft {
        date: parse_date(Some(date.trim().to_string()))?,
        description: text.trim().to_string(),
    })
}

pub(crate) fn cmd_milestones_set(
    svc: &JournalService,
    session: &Session,
    entries: &[String],
    json: bool,
) -> Result<()> {
    let drafts = entries
        .iter()
        .map(|e| parse_milestone(e))
        .collect::<Result<Vec<_>>>()?;
    report(session, &svc.save_milestones(&session.pet, &drafts), json)
}

pub(crate) fn cmd_milestones_show(
    svc: &JournalService,
    session: &Session,
    json: bool,
) -> Result<()> {
    let milestones = loaded(session, svc.milestones(&session.pet));
    if json {
        return print_json(&milestones);
    }
    if milestones.is_empty() {
        print_empty(session, &no_record());
        return Ok(());
    }
    let rows = milestones
        .into_iter()
        .map(|m| vec![format_date(m.date), m.weekday, m.description])
        .collect();
    print_table(
        session.lang,
        &[("日付", "Date"), ("曜日", "Weekday"), ("できたこと", "Milestone")],
        rows,
    );
    Ok(())
}

pub(crate) fn cmd_birthday_set(
    svc: &JournalService,
    session: &Session,
    message: &str,
    image: Option<&Path>,
    json: bool,
) -> Result<()> {
    save_image_if_given(svc, session, ImageSlot::Bday, image, json)?;
    report(session, &svc.save_birthday(&session.pet, message), json)
}

pub(crate) fn cmd_birthday_show(
    svc: &JournalService,
    session: &Session,
    json: bool,
) -> Result<()> {
    let record = loaded(session, svc.birthday(&session.pet));
    let image = svc.photo_path(&session.pet, ImageSlot::Bday);
    if json {
        return print_json(&serde_json::json!({ "record": record, "image": image }));
    }
    match record {
        Some(r) => println!("{}", r.message),
        None => print_empty(session, &no_record()),
    }
    if let Some(path) = image {
        println!("{}", path.display());
    }
    Ok(())
}
