mod growth;
mod helpers;
mod notes;
mod pages;
mod photo;
mod profile;

pub(crate) use growth::{GrowthInput, cmd_growth_edit, cmd_growth_list, cmd_growth_log};
pub(crate) use helpers::open_session;
pub(crate) use notes::{cmd_notes_add, cmd_notes_list};
pub(crate) use pages::cmd_pages;
pub(crate) use photo::{cmd_photo_add, cmd_photo_show};
pub(crate) use profile::{
    BasicUpdate, cmd_basic_set, cmd_basic_show, cmd_birthday_set, cmd_birthday_show,
    cmd_handprint_set, cmd_handprint_show, cmd_milestones_set, cmd_milestones_show,
};
