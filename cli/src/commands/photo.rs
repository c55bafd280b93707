use anyhow::Result;
use std::path::Path;

use petdiary_core::i18n::Message;
use petdiary_core::models::ImageSlot;
use petdiary_core::service::JournalService;
use petdiary_core::session::Session;

use super::helpers::{print_json, print_table, read_image, report};

pub(crate) fn cmd_photo_add(
    svc: &JournalService,
    session: &Session,
    slot: ImageSlot,
    file: &Path,
    json: bool,
) -> Result<()> {
    let bytes = read_image(file)?;
    let status = svc.save_photo(&session.pet, slot, &bytes);
    report(session, &status, json)
}

pub(crate) fn cmd_photo_show(
    svc: &JournalService,
    session: &Session,
    slot: Option<ImageSlot>,
    json: bool,
) -> Result<()> {
    let slots: Vec<ImageSlot> = slot.map_or_else(|| ImageSlot::ALL.to_vec(), |s| vec![s]);
    let found: Vec<(ImageSlot, Option<String>)> = slots
        .into_iter()
        .map(|s| {
            let path = svc
                .photo_path(&session.pet, s)
                .map(|p| p.display().to_string());
            (s, path)
        })
        .collect();

    if json {
        let map: serde_json::Map<String, serde_json::Value> = found
            .into_iter()
            .map(|(s, p)| (s.to_string(), p.map_or(serde_json::Value::Null, Into::into)))
            .collect();
        return print_json(&map);
    }

    let none = Message::new("(未登録)", "(none)");
    let rows = found
        .into_iter()
        .map(|(s, p)| vec![s.to_string(), p.unwrap_or_else(|| session.text(&none).to_string())])
        .collect();
    print_table(session.lang, &[("画像", "Slot"), ("ファイル", "File")], rows);
    Ok(())
}
