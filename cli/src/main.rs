mod commands;
mod config;
mod server;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process;
use tracing_subscriber::EnvFilter;

use crate::commands::{
    BasicUpdate, GrowthInput, cmd_basic_set, cmd_basic_show, cmd_birthday_set,
    cmd_birthday_show, cmd_growth_edit, cmd_growth_list, cmd_growth_log, cmd_handprint_set,
    cmd_handprint_show, cmd_milestones_set, cmd_milestones_show, cmd_notes_add, cmd_notes_list,
    cmd_pages, cmd_photo_add, cmd_photo_show, open_session,
};
use crate::config::Config;
use petdiary_core::i18n::Lang;
use petdiary_core::models::ImageSlot;
use petdiary_core::service::JournalService;
use petdiary_core::session::Page;

#[derive(Parser)]
#[command(
    name = "petdiary",
    version,
    about = "A pet growth diary: photos, milestones, meals and notes",
    long_about = "A pet growth diary.\n\nRecords are kept as CSV files and images in a local data \
                  directory. Pick a pet with --pet and a page subcommand, or run `petdiary serve` \
                  for the JSON API."
)]
struct Cli {
    /// Pet whose diary to open
    #[arg(long, global = true, env = "PETDIARY_PET")]
    pet: Option<String>,
    /// Display language: ja (日本語) or en (English)
    #[arg(long, global = true, default_value = "ja", env = "PETDIARY_LANG")]
    lang: Lang,
    /// Data directory (default: the platform data directory)
    #[arg(long, global = true, env = "PETDIARY_DATA_DIR", value_name = "DIR")]
    data_dir: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the diary pages, or show one page's title and notice
    Pages {
        /// Page slug or number (e.g. "growth-guide" or 5)
        page: Option<Page>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// 1. Photo page
    Photo {
        #[command(subcommand)]
        command: PhotoCommands,
    },
    /// 2. Basic info: birth date, place and first message
    Basic {
        #[command(subcommand)]
        command: BasicCommands,
    },
    /// 3. Handprint record
    Handprint {
        #[command(subcommand)]
        command: HandprintCommands,
    },
    /// 4. First milestones
    Milestones {
        #[command(subcommand)]
        command: MilestoneCommands,
    },
    /// 6. Birthday message
    Birthday {
        #[command(subcommand)]
        command: BirthdayCommands,
    },
    /// 7. Growth diary: meals, potty, walks and sleep
    Growth {
        #[command(subcommand)]
        command: GrowthCommands,
    },
    /// 8. Notes
    Notes {
        #[command(subcommand)]
        command: NotesCommands,
    },
    /// Start the JSON API server
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "8080")]
        port: u16,
        /// Address to bind to (default: 127.0.0.1, use 0.0.0.0 to expose to network)
        #[arg(short, long, default_value = "127.0.0.1")]
        bind: String,
    },
}

#[derive(Subcommand)]
enum PhotoCommands {
    /// Store an image in a slot, replacing any previous one
    Add {
        /// Slot: photo1, photo2, hand, bday
        slot: ImageSlot,
        /// Image file (JPEG)
        file: PathBuf,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show where the pet's images are stored
    Show {
        /// Slot to show (default: all)
        slot: Option<ImageSlot>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
enum BasicCommands {
    /// Save basic info. Omitted fields keep their current value.
    Set {
        /// Birth date (YYYY-MM-DD)
        #[arg(long)]
        birth_date: Option<String>,
        /// Birth time (HH:MM)
        #[arg(long)]
        birth_time: Option<String>,
        /// Place of birth
        #[arg(long)]
        place: Option<String>,
        /// Weather on the day
        #[arg(long)]
        weather: Option<String>,
        /// Birth weight
        #[arg(long)]
        weight: Option<String>,
        /// Birth height
        #[arg(long)]
        height: Option<String>,
        /// Message
        #[arg(long)]
        message: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show basic info
    Show {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
enum HandprintCommands {
    /// Save the handprint record
    Set {
        /// Date taken (YYYY-MM-DD, default: stored date or today)
        #[arg(long)]
        date: Option<String>,
        /// Comment
        #[arg(long)]
        comment: Option<String>,
        /// Handprint image to store in the `hand` slot
        #[arg(long, value_name = "FILE")]
        image: Option<PathBuf>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show the handprint record
    Show {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
enum MilestoneCommands {
    /// Replace the pet's milestones (up to 5; blank entries are skipped)
    Set {
        /// Milestones as DATE=TEXT, e.g. "2024-02-01=sat up"
        #[arg(required = true)]
        entries: Vec<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show milestones
    Show {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
enum BirthdayCommands {
    /// Save the birthday message
    Set {
        /// Message text
        message: String,
        /// Birthday photo to store in the `bday` slot
        #[arg(long, value_name = "FILE")]
        image: Option<PathBuf>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show the birthday message
    Show {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
enum GrowthCommands {
    /// Add a growth diary entry
    Log {
        /// When (YYYY-MM-DD HH:MM, default: now)
        #[arg(long)]
        at: Option<String>,
        /// What was eaten
        #[arg(long, default_value = "")]
        meal: String,
        /// Amount eaten in grams (0-500)
        #[arg(short, long, default_value = "0")]
        grams: u16,
        /// Potty notes
        #[arg(long, default_value = "")]
        potty: String,
        /// Walk notes
        #[arg(long, default_value = "")]
        walk: String,
        /// Sleep notes
        #[arg(long, default_value = "")]
        sleep: String,
        /// Free memo
        #[arg(long, default_value = "")]
        memo: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// List entries, optionally filtered by date and keyword
    List {
        /// Only these dates (repeatable)
        #[arg(long = "date")]
        dates: Vec<String>,
        /// Case-insensitive keyword matched against every field
        #[arg(short, long)]
        keyword: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Replace the pet's growth log with entries from a JSON file
    Edit {
        /// JSON array of entries, in the format of `growth list --json`
        file: PathBuf,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
enum NotesCommands {
    /// Add a note. Earlier notes are kept.
    Add {
        /// Note text
        text: String,
        /// Date (YYYY-MM-DD, default: today)
        #[arg(long)]
        date: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// List notes, newest first
    List {
        /// Only the most recent note
        #[arg(long)]
        latest: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

fn init_tracing(default_filter: &str) {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let serving = matches!(cli.command, Commands::Serve { .. });
    init_tracing(if serving { "info" } else { "warn" });

    if let Err(e) = run(cli).await {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

#[allow(clippy::too_many_lines)]
async fn run(cli: Cli) -> Result<()> {
    let Cli {
        pet,
        lang,
        data_dir,
        command,
    } = cli;
    let pet = pet.as_deref();

    let config = Config::load(data_dir)?;
    let svc = JournalService::open(&config.data_dir)?;

    match command {
        Commands::Pages { page, json } => cmd_pages(lang, page, json),
        Commands::Serve { port, bind } => server::start_server(svc, port, &bind).await,
        Commands::Photo { command } => {
            let session = open_session(pet, lang, Page::Photos)?;
            match command {
                PhotoCommands::Add { slot, file, json } => {
                    cmd_photo_add(&svc, &session, slot, &file, json)
                }
                PhotoCommands::Show { slot, json } => cmd_photo_show(&svc, &session, slot, json),
            }
        }
        Commands::Basic { command } => {
            let session = open_session(pet, lang, Page::BasicInfo)?;
            match command {
                BasicCommands::Set {
                    birth_date,
                    birth_time,
                    place,
                    weather,
                    weight,
                    height,
                    message,
                    json,
                } => cmd_basic_set(
                    &svc,
                    &session,
                    BasicUpdate {
                        birth_date,
                        birth_time,
                        place,
                        weather,
                        weight,
                        height,
                        message,
                    },
                    json,
                ),
                BasicCommands::Show { json } => cmd_basic_show(&svc, &session, json),
            }
        }
        Commands::Handprint { command } => {
            let session = open_session(pet, lang, Page::Handprint)?;
            match command {
                HandprintCommands::Set {
                    date,
                    comment,
                    image,
                    json,
                } => cmd_handprint_set(&svc, &session, date, comment, image.as_deref(), json),
                HandprintCommands::Show { json } => cmd_handprint_show(&svc, &session, json),
            }
        }
        Commands::Milestones { command } => {
            let session = open_session(pet, lang, Page::Milestones)?;
            match command {
                MilestoneCommands::Set { entries, json } => {
                    cmd_milestones_set(&svc, &session, &entries, json)
                }
                MilestoneCommands::Show { json } => cmd_milestones_show(&svc, &session, json),
            }
        }
        Commands::Birthday { command } => {
            let session = open_session(pet, lang, Page::Birthday)?;
            match command {
                BirthdayCommands::Set {
                    message,
                    image,
                    json,
                } => cmd_birthday_set(&svc, &session, &message, image.as_deref(), json),
                BirthdayCommands::Show { json } => cmd_birthday_show(&svc, &session, json),
            }
        }
        Commands::Growth { command } => {
            let session = open_session(pet, lang, Page::GrowthDiary)?;
            match command {
                GrowthCommands::Log {
                    at,
                    meal,
                    grams,
                    potty,
                    walk,
                    sleep,
                    memo,
                    json,
                } => cmd_growth_log(
                    &svc,
                    &session,
                    GrowthInput {
                        at,
                        meal,
                        grams,
                        potty,
                        walk,
                        sleep,
                        memo,
                    },
                    json,
                ),
                GrowthCommands::List {
                    dates,
                    keyword,
                    json,
                } => cmd_growth_list(&svc, &session, dates, keyword.as_deref(), json),
                GrowthCommands::Edit { file, json } => {
                    cmd_growth_edit(&svc, &session, &file, json)
                }
            }
        }
        Commands::Notes { command } => {
            let session = open_session(pet, lang, Page::Notes)?;
            match command {
                NotesCommands::Add { text, date, json } => {
                    cmd_notes_add(&svc, &session, &text, date, json)
                }
                NotesCommands::List { latest, json } => {
                    cmd_notes_list(&svc, &session, latest, json)
                }
            }
        }
    }
}
