use std::fs::{self, File, OpenOptions};
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use fs2::FileExt;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::{Result, StoreError};
use crate::models::{Category, ImageSlot, PetName};
use crate::table::{Row, Table, TableId, col};

pub const IMAGE_DIR: &str = "images";
const LOCK_FILE: &str = ".journal.lock";

/// A value read from the store together with the error that degraded it, if any.
///
/// Reads never fail outright: a malformed file yields an empty value plus the error.
#[derive(Debug)]
pub struct Loaded<T> {
    pub value: T,
    pub error: Option<StoreError>,
}

impl<T> Loaded<T> {
    pub fn ok(value: T) -> Self {
        Self { value, error: None }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Loaded<U> {
        Loaded {
            value: f(self.value),
            error: self.error,
        }
    }
}

/// File-backed tables and images under one data directory.
///
/// Every read-modify-write holds both an in-process mutex and an exclusive
/// advisory lock on `.journal.lock`, so concurrent requests and concurrent
/// processes cannot lose each other's updates.
pub struct RecordStore {
    root: PathBuf,
    write_lock: Mutex<()>,
}

// Field order is drop order: the file lock is released before the mutex.
struct WriteGuard<'a> {
    _file: File,
    _local: MutexGuard<'a, ()>,
}

impl RecordStore {
    pub fn open(root: &Path) -> Result<Self> {
        let images = root.join(IMAGE_DIR);
        fs::create_dir_all(&images).map_err(|e| StoreError::persistence(&images, e))?;
        Ok(Self {
            root: root.to_path_buf(),
            write_lock: Mutex::new(()),
        })
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    #[must_use]
    pub fn table_path(&self, table: TableId) -> PathBuf {
        self.root.join(table.file_name())
    }

    /// `images/<pet>_<slot>.jpg`. Path separators in the name are replaced so the
    /// file always lands inside the images directory.
    #[must_use]
    pub fn image_file(&self, pet: &PetName, slot: ImageSlot) -> PathBuf {
        let safe: String = pet
            .as_str()
            .chars()
            .map(|c| match c {
                '/' | '\\' | '\0' => '_',
                c => c,
            })
            .collect();
        self.root
            .join(IMAGE_DIR)
            .join(format!("{safe}_{}.jpg", slot.as_str()))
    }

    fn lock(&self) -> Result<WriteGuard<'_>> {
        let local = self
            .write_lock
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let path = self.root.join(LOCK_FILE);
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&path)
            .map_err(|e| StoreError::persistence(&path, e))?;
        // Released when the file is closed.
        file.lock_exclusive()
            .map_err(|e| StoreError::persistence(&path, e))?;
        Ok(WriteGuard {
            _file: file,
            _local: local,
        })
    }

    fn read_table(&self, table: TableId) -> Result<Table> {
        let path = self.table_path(table);
        let file = match File::open(&path) {
            Ok(f) => f,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Table::new()),
            Err(e) => return Err(StoreError::parse(&path, e)),
        };
        Table::read_csv(file).map_err(|e| StoreError::parse(&path, format!("{e:#}")))
    }

    /// Write to a temp file beside the target, then rename over it.
    fn write_table(&self, table: TableId, data: &Table) -> Result<()> {
        let path = self.table_path(table);
        let tmp = self
            .root
            .join(format!(".{}-{}.tmp", table.file_name(), Uuid::new_v4()));

        let result = File::create(&tmp)
            .map_err(|e| StoreError::persistence(&tmp, e))
            .and_then(|file| {
                data.write_csv(BufWriter::new(file))
                    .map_err(|e| StoreError::from_csv_write(&tmp, e))
            })
            .and_then(|()| fs::rename(&tmp, &path).map_err(|e| StoreError::persistence(&path, e)));

        if result.is_err() {
            let _ = fs::remove_file(&tmp);
        }
        result
    }

    /// Load a table. A missing file is an empty table; a malformed one is an empty
    /// table plus the parse error.
    pub fn load_table(&self, table: TableId) -> Loaded<Table> {
        match self.read_table(table) {
            Ok(t) => Loaded::ok(t),
            Err(e) => {
                warn!(table = table.file_name(), error = %e, "failed to load table");
                Loaded {
                    value: Table::new(),
                    error: Some(e),
                }
            }
        }
    }

    /// Load, modify, and persist under the write lock. A table that fails to parse is
    /// never rewritten.
    fn modify(&self, table: TableId, f: impl FnOnce(&mut Table)) -> Result<()> {
        let _guard = self.lock()?;
        let mut data = self.read_table(table)?;
        f(&mut data);
        self.write_table(table, &data)
    }

    /// Remove every row whose `key_fields` projection equals that of any new row, then
    /// append the new rows.
    pub fn upsert_by_key(&self, table: TableId, key_fields: &[&str], new_rows: Vec<Row>) -> Result<()> {
        if key_fields.is_empty() {
            return Err(StoreError::Validation("upsert needs at least one key field".to_string()));
        }
        let keys: Vec<Vec<String>> = new_rows.iter().map(|r| r.key(key_fields)).collect();
        self.modify(table, |data| {
            let removed = data.retain(|r| !keys.contains(&r.key(key_fields)));
            debug!(table = table.file_name(), removed, added = new_rows.len(), "upsert");
            data.extend(new_rows);
        })
    }

    /// Remove every row matching all of `key`, then append `new_rows`. Unlike
    /// [`Self::upsert_by_key`] the group is named explicitly, so it can be replaced by
    /// an empty batch.
    pub fn replace_where(&self, table: TableId, key: &[(&str, &str)], new_rows: Vec<Row>) -> Result<()> {
        self.modify(table, |data| {
            let removed = data.retain(|r| !key.iter().all(|(c, v)| r.get(c) == Some(*v)));
            debug!(table = table.file_name(), removed, added = new_rows.len(), "replace group");
            data.extend(new_rows);
        })
    }

    pub fn append_rows(&self, table: TableId, new_rows: Vec<Row>) -> Result<()> {
        self.modify(table, |data| {
            debug!(table = table.file_name(), added = new_rows.len(), "append");
            data.extend(new_rows);
        })
    }

    /// Rows for one pet, optionally one category, in stored order.
    pub fn query_by_pet(
        &self,
        table: TableId,
        pet: &PetName,
        category: Option<Category>,
    ) -> Loaded<Vec<Row>> {
        self.load_table(table).map(|data| {
            data.rows()
                .filter(|r| r.get(col::NAME) == Some(pet.as_str()))
                .filter(|r| {
                    category.is_none_or(|c| {
                        r.get(col::PAGE)
                            .and_then(Category::from_label)
                            .is_some_and(|found| found == c)
                    })
                })
                .map(|r| r.to_row())
                .collect()
        })
    }

    /// Write image bytes to the pet's slot, replacing any previous image.
    pub fn save_image(&self, pet: &PetName, slot: ImageSlot, bytes: &[u8]) -> Result<PathBuf> {
        let path = self.image_file(pet, slot);
        let tmp = self
            .root
            .join(IMAGE_DIR)
            .join(format!(".{}.tmp", Uuid::new_v4()));
        let _guard = self.lock()?;
        let result = fs::write(&tmp, bytes)
            .map_err(|e| StoreError::persistence(&tmp, e))
            .and_then(|()| fs::rename(&tmp, &path).map_err(|e| StoreError::persistence(&path, e)));
        if result.is_err() {
            let _ = fs::remove_file(&tmp);
        }
        result.map(|()| path)
    }

    /// The stored image for a slot, if one has been saved.
    #[must_use]
    pub fn image_path(&self, pet: &PetName, slot: ImageSlot) -> Option<PathBuf> {
        let path = self.image_file(pet, slot);
        path.is_file().then_some(path)
    }
}
