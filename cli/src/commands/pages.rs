use anyhow::Result;
use serde::Serialize;

use petdiary_core::i18n::Lang;
use petdiary_core::session::Page;

use super::helpers::{print_json, print_table};

#[derive(Serialize)]
struct PageInfo<'a> {
    number: usize,
    slug: &'static str,
    title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    notice: Option<&'a str>,
}

pub(crate) fn cmd_pages(lang: Lang, page: Option<Page>, json: bool) -> Result<()> {
    let pages: Vec<Page> = match page {
        Some(p) => vec![p],
        None => Page::ALL.to_vec(),
    };
    let notices: Vec<_> = pages.iter().map(|p| p.notice()).collect();
    let infos: Vec<PageInfo<'_>> = pages
        .iter()
        .zip(&notices)
        .map(|(p, notice)| PageInfo {
            number: p.number(),
            slug: p.slug(),
            title: p.title().text(lang).to_string(),
            notice: notice.as_ref().map(|m| m.text(lang)),
        })
        .collect();

    if json {
        return print_json(&infos);
    }

    if let (Some(_), [info]) = (page, infos.as_slice()) {
        println!("{}", info.title);
        if let Some(notice) = info.notice {
            println!("{notice}");
        }
        return Ok(());
    }

    let rows = infos
        .iter()
        .map(|i| vec![i.title.clone(), i.slug.to_string()])
        .collect();
    print_table(lang, &[("ページ", "Page"), ("コマンド名", "Slug")], rows);
    Ok(())
}
