use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDate};
use tracing::{info, warn};

use crate::error::StoreError;
use crate::fields;
use crate::i18n::{Message, Status};
use crate::models::{
    BirthdayRecord, Category, GrowthDraft, GrowthLogEntry, HandprintRecord, ImageSlot,
    MAX_MILESTONES_PER_SUBMISSION, MilestoneDraft, MilestoneRecord, NoteEntry, PetName,
    ProfileEntry, ProfileRecord, columns, validate_meal_grams,
};
use crate::store::{Loaded, RecordStore};
use crate::table::{Row, TableId, col};

const PROFILE_KEY: &[&str] = &[col::NAME, col::PAGE];

/// One method per page of the diary. Store failures are caught here and turned
/// into [`Status`] values; nothing below this layer reaches the user as a fault.
pub struct JournalService {
    store: RecordStore,
}

impl JournalService {
    pub fn open(data_dir: &Path) -> anyhow::Result<Self> {
        let store = RecordStore::open(data_dir)?;
        Ok(Self { store })
    }

    #[must_use]
    pub fn store(&self) -> &RecordStore {
        &self.store
    }

    // --- Shared profile table ---

    fn profile_entries(&self, pet: &PetName, category: Category) -> Loaded<Vec<ProfileEntry>> {
        self.store
            .query_by_pet(TableId::Profile, pet, Some(category))
            .map(|rows| rows.iter().filter_map(ProfileEntry::from_row).collect())
    }

    fn upsert_profile(&self, pet: &PetName, entries: &[ProfileEntry], saved: Message) -> Status {
        let rows = entries.iter().map(|e| e.to_row(pet)).collect();
        match self.store.upsert_by_key(TableId::Profile, PROFILE_KEY, rows) {
            Ok(()) => {
                info!(pet = %pet, count = entries.len(), "profile rows saved");
                Status::Success(saved)
            }
            Err(e) => failure(&e),
        }
    }

    /// Replace every row of one (pet, category) group with the edited rows, as the
    /// editable grid does. An empty list clears the group.
    pub fn replace_profile_group(
        &self,
        pet: &PetName,
        category: Category,
        entries: &[ProfileEntry],
    ) -> Status {
        if let Err(e) = validate_profile_group(category, entries) {
            return Status::Error(e.message());
        }
        let entries: Vec<ProfileEntry> = entries
            .iter()
            .cloned()
            .map(|e| match e {
                ProfileEntry::Milestone(m) => {
                    ProfileEntry::Milestone(MilestoneRecord::new(m.date, m.description))
                }
                other => other,
            })
            .collect();
        let rows = entries.iter().map(|e| e.to_row(pet)).collect();
        match self.store.replace_where(
            TableId::Profile,
            &[(col::NAME, pet.as_str()), (col::PAGE, category.label())],
            rows,
        ) {
            Ok(()) => Status::Success(Message::new("変更を保存しました！", "Changes saved!")),
            Err(e) => failure(&e),
        }
    }

    // --- Page 1: photos ---

    /// Save an image into its slot. Failure is reported through the status, never raised.
    pub fn save_photo(&self, pet: &PetName, slot: ImageSlot, bytes: &[u8]) -> Status {
        match self.store.save_image(pet, slot, bytes) {
            Ok(path) => {
                info!(pet = %pet, slot = %slot, path = %path.display(), "image saved");
                Status::Success(Message::new("画像を保存しました！", "Image saved!"))
            }
            Err(e) => {
                warn!(pet = %pet, slot = %slot, error = %e, "image save failed");
                Status::Error(Message::new(
                    format!("画像の保存中にエラーが発生しました: {e}"),
                    format!("An error occurred while saving the image: {e}"),
                ))
            }
        }
    }

    #[must_use]
    pub fn photo_path(&self, pet: &PetName, slot: ImageSlot) -> Option<PathBuf> {
        self.store.image_path(pet, slot)
    }

    // --- Page 2: basic info ---

    pub fn basic(&self, pet: &PetName) -> Loaded<Option<ProfileRecord>> {
        self.profile_entries(pet, Category::Basic).map(|entries| {
            entries.into_iter().find_map(|e| match e {
                ProfileEntry::Basic(r) => Some(r),
                _ => None,
            })
        })
    }

    /// The stored record, or the blank form defaults (born now, everything else empty).
    pub fn basic_form(&self, pet: &PetName) -> Loaded<ProfileRecord> {
        self.basic(pet).map(|r| {
            r.unwrap_or_else(|| {
                let now = Local::now().naive_local();
                ProfileRecord {
                    birth_date: now.date(),
                    birth_time: now.time(),
                    place: String::new(),
                    weather: String::new(),
                    birth_weight: String::new(),
                    birth_height: String::new(),
                    message: String::new(),
                }
            })
        })
    }

    pub fn save_basic(&self, pet: &PetName, record: ProfileRecord) -> Status {
        self.upsert_profile(
            pet,
            &[ProfileEntry::Basic(record)],
            Message::new("保存しました！", "Saved!"),
        )
    }

    // --- Page 3: handprint ---

    pub fn handprint(&self, pet: &PetName) -> Loaded<Option<HandprintRecord>> {
        self.profile_entries(pet, Category::Handprint).map(|entries| {
            entries.into_iter().find_map(|e| match e {
                ProfileEntry::Handprint(r) => Some(r),
                _ => None,
            })
        })
    }

    pub fn handprint_form(&self, pet: &PetName) -> Loaded<HandprintRecord> {
        self.handprint(pet).map(|r| {
            r.unwrap_or_else(|| HandprintRecord {
                date: Local::now().date_naive(),
                comment: String::new(),
            })
        })
    }

    pub fn save_handprint(&self, pet: &PetName, record: HandprintRecord) -> Status {
        self.upsert_profile(
            pet,
            &[ProfileEntry::Handprint(record)],
            Message::new("手形情報を保存しました！", "Handprint saved!"),
        )
    }

    // --- Page 4: milestones ---

    pub fn milestones(&self, pet: &PetName) -> Loaded<Vec<MilestoneRecord>> {
        self.profile_entries(pet, Category::Milestones).map(|entries| {
            entries
                .into_iter()
                .filter_map(|e| match e {
                    ProfileEntry::Milestone(r) => Some(r),
                    _ => None,
                })
                .collect()
        })
    }

    /// Replace the pet's milestones with the non-blank drafts of one submission.
    ///
    /// A submission where every slot is blank writes nothing.
    pub fn save_milestones(&self, pet: &PetName, drafts: &[MilestoneDraft]) -> Status {
        if let Err(e) = validate_milestone_batch(drafts) {
            return Status::Error(e.message());
        }
        let entries: Vec<ProfileEntry> = drafts
            .iter()
            .filter(|d| !d.description.trim().is_empty())
            .map(|d| ProfileEntry::Milestone(MilestoneRecord::new(d.date, d.description.trim())))
            .collect();
        if entries.is_empty() {
            return Status::Warning(Message::new(
                "できたことを1つ以上入力してください",
                "Please enter at least one milestone",
            ));
        }
        self.upsert_profile(
            pet,
            &entries,
            Message::new(
                "初めてできたことを保存しました！",
                "First milestones saved!",
            ),
        )
    }

    // --- Page 6: birthday ---

    pub fn birthday(&self, pet: &PetName) -> Loaded<Option<BirthdayRecord>> {
        self.profile_entries(pet, Category::Birthday).map(|entries| {
            entries.into_iter().find_map(|e| match e {
                ProfileEntry::Birthday(r) => Some(r),
                _ => None,
            })
        })
    }

    pub fn save_birthday(&self, pet: &PetName, message: &str) -> Status {
        self.upsert_profile(
            pet,
            &[ProfileEntry::Birthday(BirthdayRecord {
                message: message.to_string(),
            })],
            Message::new("誕生日の記録を保存しました！", "Birthday message saved!"),
        )
    }

    // --- Page 7: growth diary ---

    fn basic_row(&self, pet: &PetName) -> Loaded<Option<Row>> {
        self.store
            .query_by_pet(TableId::Profile, pet, Some(Category::Basic))
            .map(|rows| rows.into_iter().next())
    }

    /// Birth date from the basic info page. `None` when nothing is saved or the
    /// stored value does not parse; it is never guessed.
    pub fn birth_date(&self, pet: &PetName) -> Loaded<Option<NaiveDate>> {
        self.basic_row(pet)
            .map(|row| row.and_then(|r| fields::optional_date(&r, columns::BIRTH_DATE)))
    }

    /// Why days since birth cannot be derived for new growth entries, if it can't.
    #[must_use]
    pub fn birth_date_warning(&self, pet: &PetName) -> Option<Status> {
        let row = self.basic_row(pet);
        if let Some(status) = load_warning(&row) {
            return Some(status);
        }
        match row.value {
            None => Some(Status::Warning(Message::new(
                "基本事項に生まれた日が保存されていません。基本事項ページで設定してください。",
                "Birth date not found in basic info. Please set it on the Basic Info page.",
            ))),
            Some(r) if fields::optional_date(&r, columns::BIRTH_DATE).is_none() => {
                Some(Status::Warning(Message::new(
                    "基本事項に生まれた日が正しく保存されていません。正しい形式で再入力してください。",
                    "Birth date is not correctly saved in basic info. Please re-enter it in the correct format.",
                )))
            }
            Some(_) => None,
        }
    }

    pub fn log_growth(&self, pet: &PetName, draft: GrowthDraft) -> Status {
        if let Err(e) = validate_meal_grams(draft.meal_grams) {
            return invalid(&e);
        }
        let birth = self.birth_date(pet);
        if let Some(e) = &birth.error {
            warn!(pet = %pet, error = %e, "birth date unavailable, days since birth left unset");
        }
        let entry = draft.into_entry(birth.value);
        match self
            .store
            .append_rows(TableId::GrowthLog, vec![entry.to_row(pet)])
        {
            Ok(()) => {
                info!(pet = %pet, days = ?entry.days_since_birth, "growth entry saved");
                Status::Success(Message::new("記録を保存しました！", "Record saved!"))
            }
            Err(e) => failure(&e),
        }
    }

    pub fn growth_log(&self, pet: &PetName) -> Loaded<Vec<GrowthLogEntry>> {
        self.store
            .query_by_pet(TableId::GrowthLog, pet, None)
            .map(|rows| rows.iter().map(GrowthLogEntry::from_row).collect())
    }

    /// Entries whose date is any of `dates` (all if empty) and which contain `keyword`.
    pub fn search_growth(
        &self,
        pet: &PetName,
        dates: &[NaiveDate],
        keyword: Option<&str>,
    ) -> Loaded<Vec<GrowthLogEntry>> {
        let keyword = keyword.map(str::trim).filter(|k| !k.is_empty());
        self.growth_log(pet).map(|entries| {
            entries
                .into_iter()
                .filter(|e| dates.is_empty() || dates.contains(&e.timestamp.date()))
                .filter(|e| keyword.is_none_or(|k| e.contains_keyword(pet, k)))
                .collect()
        })
    }

    /// Replace the pet's whole growth log with an edited set.
    pub fn replace_growth_log(&self, pet: &PetName, entries: &[GrowthLogEntry]) -> Status {
        if let Err(e) = entries
            .iter()
            .try_for_each(|e| validate_meal_grams(e.meal_grams))
        {
            return invalid(&e);
        }
        let rows = entries.iter().map(|e| e.to_row(pet)).collect();
        match self
            .store
            .replace_where(TableId::GrowthLog, &[(col::NAME, pet.as_str())], rows)
        {
            Ok(()) => Status::Success(Message::new("編集内容を保存しました！", "Changes saved!")),
            Err(e) => failure(&e),
        }
    }

    // --- Page 8: notes ---

    /// Append a note dated today. Earlier notes are kept as history.
    pub fn add_note(&self, pet: &PetName, text: &str) -> Status {
        self.add_note_on(pet, Local::now().date_naive(), text)
    }

    pub fn add_note_on(&self, pet: &PetName, date: NaiveDate, text: &str) -> Status {
        let entry = NoteEntry {
            date,
            text: text.to_string(),
        };
        match self.store.append_rows(TableId::Notes, vec![entry.to_row(pet)]) {
            Ok(()) => Status::Success(Message::new("メモを保存しました！", "Memo saved!")),
            Err(e) => failure(&e),
        }
    }

    /// Notes newest first; notes from the same day keep their saved order reversed.
    pub fn notes(&self, pet: &PetName) -> Loaded<Vec<NoteEntry>> {
        self.store
            .query_by_pet(TableId::Notes, pet, None)
            .map(|rows| {
                let mut notes: Vec<NoteEntry> = rows.iter().map(NoteEntry::from_row).collect();
                notes.reverse();
                notes.sort_by(|a, b| b.date.cmp(&a.date));
                notes
            })
    }

    pub fn latest_note(&self, pet: &PetName) -> Loaded<Option<NoteEntry>> {
        self.notes(pet).map(|n| n.into_iter().next())
    }
}

/// Checks an edited profile group before it replaces the stored one.
pub fn validate_profile_group(category: Category, entries: &[ProfileEntry]) -> Result<(), StoreError> {
    if category == Category::Notes {
        return Err(StoreError::Validation(
            "notes are kept as history and cannot be replaced by an edit".to_string(),
        ));
    }
    if let Some(bad) = entries.iter().find(|e| e.category() != category) {
        return Err(StoreError::Validation(format!(
            "a {} row cannot be saved as {category}",
            bad.category()
        )));
    }
    if category.is_single() && entries.len() > 1 {
        return Err(StoreError::Validation(format!(
            "only one {category} record can be saved per pet"
        )));
    }
    Ok(())
}

pub fn validate_milestone_batch(drafts: &[MilestoneDraft]) -> Result<(), StoreError> {
    if drafts.len() > MAX_MILESTONES_PER_SUBMISSION {
        return Err(StoreError::Validation(format!(
            "at most {MAX_MILESTONES_PER_SUBMISSION} milestones can be entered at once"
        )));
    }
    Ok(())
}

fn failure(e: &StoreError) -> Status {
    warn!(error = %e, "store operation failed");
    Status::Error(e.message())
}

fn invalid(e: &anyhow::Error) -> Status {
    Status::Error(StoreError::Validation(e.to_string()).message())
}

/// Bilingual warning for a degraded read, for adapters to show next to the data.
#[must_use]
pub fn load_warning<T>(loaded: &Loaded<T>) -> Option<Status> {
    loaded.error.as_ref().map(|e| Status::Warning(e.message()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::i18n::Lang;
    use chrono::{NaiveDateTime, NaiveTime};
    use tempfile::TempDir;

    fn setup() -> (TempDir, JournalService) {
        let dir = TempDir::new().unwrap();
        let svc = JournalService::open(dir.path()).unwrap();
        (dir, svc)
    }

    fn pet(name: &str) -> PetName {
        PetName::parse(name).unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn at(y: i32, m: u32, d: u32, h: u32) -> NaiveDateTime {
        date(y, m, d).and_hms_opt(h, 0, 0).unwrap()
    }

    fn profile(birth: NaiveDate) -> ProfileRecord {
        ProfileRecord {
            birth_date: birth,
            birth_time: NaiveTime::from_hms_opt(6, 30, 0).unwrap(),
            place: "Osaka".to_string(),
            weather: "sunny".to_string(),
            birth_weight: "120g".to_string(),
            birth_height: "10cm".to_string(),
            message: "welcome".to_string(),
        }
    }

    fn draft(ts: NaiveDateTime, meal: &str, grams: u16) -> GrowthDraft {
        GrowthDraft {
            timestamp: ts,
            meal: meal.to_string(),
            meal_grams: grams,
            potty: String::new(),
            walk: String::new(),
            sleep: String::new(),
            memo: String::new(),
        }
    }

    fn milestone(d: NaiveDate, text: &str) -> MilestoneDraft {
        MilestoneDraft {
            date: d,
            description: text.to_string(),
        }
    }

    #[test]
    fn test_basic_round_trip() {
        let (_dir, svc) = setup();
        let momo = pet("Momo");
        assert!(svc.basic(&momo).value.is_none());

        let status = svc.save_basic(&momo, profile(date(2024, 1, 1)));
        assert!(status.is_success());
        assert_eq!(svc.basic(&momo).value, Some(profile(date(2024, 1, 1))));
    }

    #[test]
    fn test_basic_form_defaults_when_unsaved() {
        let (_dir, svc) = setup();
        let form = svc.basic_form(&pet("Momo")).value;
        assert_eq!(form.birth_date, Local::now().date_naive());
        assert!(form.place.is_empty());
    }

    #[test]
    fn test_days_since_birth_derived_on_log() {
        let (_dir, svc) = setup();
        let momo = pet("Momo");
        svc.save_basic(&momo, profile(date(2024, 1, 1)));

        let status = svc.log_growth(&momo, draft(at(2024, 1, 10, 8), "kibble", 50));
        assert!(status.is_success());

        let log = svc.growth_log(&momo).value;
        assert_eq!(log.len(), 1);
        assert_eq!(log[0].days_since_birth, Some(9));
        assert_eq!(log[0].meal, "kibble");
        assert_eq!(log[0].meal_grams, 50);
    }

    #[test]
    fn test_days_since_birth_unset_without_profile() {
        let (_dir, svc) = setup();
        let kuro = pet("Kuro");
        assert!(svc.log_growth(&kuro, draft(at(2024, 3, 1, 9), "", 0)).is_success());
        assert_eq!(svc.growth_log(&kuro).value[0].days_since_birth, None);
    }

    #[test]
    fn test_malformed_birth_date_leaves_days_unset() {
        let (_dir, svc) = setup();
        let momo = pet("Momo");
        std::fs::write(
            svc.store().table_path(TableId::Profile),
            "名前,ページ,生まれた日\nMomo,基本事項,not-a-date\n",
        )
        .unwrap();

        assert_eq!(svc.birth_date(&momo).value, None);
        let warning = svc.birth_date_warning(&momo).unwrap();
        assert!(!warning.is_error());
        assert!(warning.text(Lang::En).contains("not correctly saved"));

        assert!(svc.log_growth(&momo, draft(at(2024, 1, 10, 8), "kibble", 50)).is_success());
        assert_eq!(svc.growth_log(&momo).value[0].days_since_birth, None);
    }

    #[test]
    fn test_birth_date_warning_by_profile_state() {
        let (_dir, svc) = setup();
        let momo = pet("Momo");
        let missing = svc.birth_date_warning(&momo).unwrap();
        assert!(missing.text(Lang::En).contains("not found"));

        svc.save_basic(&momo, profile(date(2024, 1, 1)));
        assert!(svc.birth_date_warning(&momo).is_none());
        assert_eq!(svc.birth_date(&momo).value, Some(date(2024, 1, 1)));
    }

    #[test]
    fn test_meal_grams_over_limit_rejected() {
        let (_dir, svc) = setup();
        let momo = pet("Momo");
        let status = svc.log_growth(&momo, draft(at(2024, 1, 10, 8), "feast", 501));
        assert!(status.is_error());
        assert!(svc.growth_log(&momo).value.is_empty());
    }

    #[test]
    fn test_handprint_resave_keeps_one_row() {
        let (_dir, svc) = setup();
        let momo = pet("Momo");
        svc.save_handprint(
            &momo,
            HandprintRecord {
                date: date(2024, 2, 1),
                comment: "soft paws".to_string(),
            },
        );
        svc.save_handprint(
            &momo,
            HandprintRecord {
                date: date(2024, 2, 1),
                comment: "updated".to_string(),
            },
        );

        let rows = svc
            .store()
            .query_by_pet(TableId::Profile, &momo, Some(Category::Handprint))
            .value;
        assert_eq!(rows.len(), 1);
        assert_eq!(svc.handprint(&momo).value.unwrap().comment, "updated");
    }

    #[test]
    fn test_profile_categories_do_not_clobber_each_other() {
        let (_dir, svc) = setup();
        let momo = pet("Momo");
        svc.save_basic(&momo, profile(date(2024, 1, 1)));
        svc.save_birthday(&momo, "happy first birthday");

        assert!(svc.basic(&momo).value.is_some());
        assert_eq!(
            svc.birthday(&momo).value.unwrap().message,
            "happy first birthday"
        );
    }

    #[test]
    fn test_milestones_replace_previous_batch() {
        let (_dir, svc) = setup();
        let momo = pet("Momo");
        let first = [
            milestone(date(2024, 2, 1), "sat up"),
            milestone(date(2024, 2, 3), "rolled over"),
            milestone(date(2024, 2, 5), "barked"),
        ];
        assert!(svc.save_milestones(&momo, &first).is_success());
        assert_eq!(svc.milestones(&momo).value.len(), 3);

        let second = [
            milestone(date(2024, 3, 1), "fetched"),
            milestone(date(2024, 3, 2), "   "),
        ];
        assert!(svc.save_milestones(&momo, &second).is_success());

        let stored = svc.milestones(&momo).value;
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].description, "fetched");
        assert_eq!(stored[0].weekday, "Friday");
    }

    #[test]
    fn test_blank_milestones_warn_and_write_nothing() {
        let (_dir, svc) = setup();
        let momo = pet("Momo");
        svc.save_milestones(&momo, &[milestone(date(2024, 2, 1), "sat up")]);

        let status = svc.save_milestones(&momo, &[milestone(date(2024, 3, 1), "")]);
        assert!(matches!(status, Status::Warning(_)));
        assert_eq!(svc.milestones(&momo).value.len(), 1);
    }

    #[test]
    fn test_too_many_milestones_rejected() {
        let (_dir, svc) = setup();
        let drafts: Vec<_> = (1..=6)
            .map(|d| milestone(date(2024, 2, d), "step"))
            .collect();
        assert!(svc.save_milestones(&pet("Momo"), &drafts).is_error());
    }

    #[test]
    fn test_replace_profile_group_rejects_mismatched_category() {
        let (_dir, svc) = setup();
        let status = svc.replace_profile_group(
            &pet("Momo"),
            Category::Handprint,
            &[ProfileEntry::Birthday(BirthdayRecord {
                message: "oops".to_string(),
            })],
        );
        assert!(status.is_error());
    }

    #[test]
    fn test_replace_profile_group_rejects_notes() {
        let (_dir, svc) = setup();
        assert!(
            svc.replace_profile_group(&pet("Momo"), Category::Notes, &[])
                .is_error()
        );
    }

    #[test]
    fn test_replace_profile_group_empty_clears() {
        let (_dir, svc) = setup();
        let momo = pet("Momo");
        svc.save_milestones(&momo, &[milestone(date(2024, 2, 1), "sat up")]);
        assert!(
            svc.replace_profile_group(&momo, Category::Milestones, &[])
                .is_success()
        );
        assert!(svc.milestones(&momo).value.is_empty());
    }

    #[test]
    fn test_replace_profile_group_recomputes_weekday() {
        let (_dir, svc) = setup();
        let momo = pet("Momo");
        let edited = ProfileEntry::Milestone(MilestoneRecord {
            date: date(2024, 3, 1),
            weekday: "whenever".to_string(),
            description: "fetched".to_string(),
        });
        assert!(
            svc.replace_profile_group(&momo, Category::Milestones, &[edited])
                .is_success()
        );
        assert_eq!(svc.milestones(&momo).value[0].weekday, "Friday");
    }

    #[test]
    fn test_search_growth_by_date_and_keyword() {
        let (_dir, svc) = setup();
        let momo = pet("Momo");
        svc.log_growth(&momo, draft(at(2024, 1, 10, 8), "Kibble", 40));
        svc.log_growth(&momo, draft(at(2024, 1, 10, 18), "chicken", 60));
        svc.log_growth(&momo, draft(at(2024, 1, 11, 8), "kibble", 45));

        let by_date = svc.search_growth(&momo, &[date(2024, 1, 10)], None).value;
        assert_eq!(by_date.len(), 2);

        let by_keyword = svc.search_growth(&momo, &[], Some("KIBBLE")).value;
        assert_eq!(by_keyword.len(), 2);

        let both = svc
            .search_growth(&momo, &[date(2024, 1, 10)], Some("kibble"))
            .value;
        assert_eq!(both.len(), 1);
        assert_eq!(both[0].meal_grams, 40);

        assert_eq!(svc.search_growth(&momo, &[], Some("  ")).value.len(), 3);
    }

    #[test]
    fn test_search_growth_keyword_matches_pet_name() {
        let (_dir, svc) = setup();
        let momo = pet("Momo");
        svc.log_growth(&momo, draft(at(2024, 1, 10, 8), "kibble", 40));
        svc.log_growth(&pet("Kuro"), draft(at(2024, 1, 10, 9), "kibble", 30));

        let hits = svc.search_growth(&momo, &[], Some("MOMO")).value;
        assert_eq!(hits.len(), 1);
        assert!(svc.search_growth(&momo, &[], Some("kuro")).value.is_empty());
    }

    #[test]
    fn test_replace_growth_log_only_touches_one_pet() {
        let (_dir, svc) = setup();
        let momo = pet("Momo");
        let kuro = pet("Kuro");
        svc.log_growth(&momo, draft(at(2024, 1, 10, 8), "kibble", 40));
        svc.log_growth(&kuro, draft(at(2024, 1, 10, 9), "fish", 30));

        assert!(svc.replace_growth_log(&momo, &[]).is_success());
        assert!(svc.growth_log(&momo).value.is_empty());
        assert_eq!(svc.growth_log(&kuro).value.len(), 1);
    }

    #[test]
    fn test_replace_growth_log_validates_grams() {
        let (_dir, svc) = setup();
        let momo = pet("Momo");
        let mut entry = draft(at(2024, 1, 10, 8), "kibble", 40).into_entry(None);
        entry.meal_grams = 900;
        assert!(svc.replace_growth_log(&momo, &[entry]).is_error());
    }

    #[test]
    fn test_notes_newest_first() {
        let (_dir, svc) = setup();
        let momo = pet("Momo");
        svc.add_note_on(&momo, date(2024, 1, 5), "old");
        svc.add_note_on(&momo, date(2024, 3, 1), "newest");
        svc.add_note_on(&momo, date(2024, 2, 1), "middle");

        let notes = svc.notes(&momo).value;
        let texts: Vec<_> = notes.iter().map(|n| n.text.as_str()).collect();
        assert_eq!(texts, ["newest", "middle", "old"]);
        assert_eq!(svc.latest_note(&momo).value.unwrap().text, "newest");
    }

    #[test]
    fn test_same_day_notes_latest_saved_first() {
        let (_dir, svc) = setup();
        let momo = pet("Momo");
        svc.add_note_on(&momo, date(2024, 1, 5), "morning");
        svc.add_note_on(&momo, date(2024, 1, 5), "evening");
        assert_eq!(svc.latest_note(&momo).value.unwrap().text, "evening");
    }

    #[test]
    fn test_photo_save_and_path() {
        let (_dir, svc) = setup();
        let momo = pet("Momo");
        assert!(svc.photo_path(&momo, ImageSlot::Hand).is_none());
        assert!(svc.save_photo(&momo, ImageSlot::Hand, b"jpeg").is_success());
        let path = svc.photo_path(&momo, ImageSlot::Hand).unwrap();
        assert_eq!(std::fs::read(path).unwrap(), b"jpeg");
    }

    #[test]
    fn test_photo_save_failure_is_status() {
        let (dir, svc) = setup();
        let images = dir.path().join(crate::store::IMAGE_DIR);
        std::fs::remove_dir_all(&images).unwrap();
        std::fs::write(&images, b"not a directory").unwrap();

        let status = svc.save_photo(&pet("Momo"), ImageSlot::Photo1, b"jpeg");
        assert!(status.is_error());
    }

    #[test]
    fn test_malformed_table_reports_warning() {
        let (dir, svc) = setup();
        std::fs::write(
            dir.path().join(TableId::Notes.file_name()),
            "名前,ページ\nMomo,メモ欄,x,y\n",
        )
        .unwrap();

        let loaded = svc.notes(&pet("Momo"));
        assert!(loaded.value.is_empty());
        assert!(load_warning(&loaded).is_some());
        assert!(svc.add_note(&pet("Momo"), "hi").is_error());
    }
}
