use std::collections::HashSet;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use log::{debug, info, warn};
use tempfile::NamedTempFile;

use crate::models::Record;

use super::codec::{self, DELIMITER};
use super::error::StoreError;
use super::pager::Pager;
use super::paths::StorePaths;

/// Owns the ordered table of records together with the content file and asset
/// directory backing it.
///
/// The content file is the source of truth. Every mutation builds the complete
/// new table, writes it through [`RecordStore::commit`] and then reloads, so
/// the in-memory table is never patched in place.
#[derive(Debug)]
pub struct RecordStore {
    paths: StorePaths,
    records: Vec<Record>,
}

impl RecordStore {
    /// Prepare the on-disk layout if this is a first run, then load the table.
    pub fn open(paths: StorePaths) -> Result<Self, StoreError> {
        paths.ensure_layout()?;
        Self::load_from(paths)
    }

    /// Load an existing store without creating anything. A missing content
    /// file is an error here.
    pub fn load_from(paths: StorePaths) -> Result<Self, StoreError> {
        let mut store = Self {
            paths,
            records: Vec::new(),
        };
        store.load()?;
        Ok(store)
    }

    /// Re-read and decode the content file, replacing the cached table. On
    /// failure the cache is left empty since it can no longer be trusted.
    pub fn load(&mut self) -> Result<&[Record], StoreError> {
        self.records.clear();

        let path = &self.paths.content_file;
        let bytes = fs::read(path).map_err(StoreError::io("read content file", path))?;
        let records = codec::decode(&bytes)?;
        warn_on_duplicate_titles(&records);

        debug!("loaded {} record(s) from {}", records.len(), path.display());
        self.records = records;
        Ok(&self.records)
    }

    pub fn paths(&self) -> &StorePaths {
        &self.paths
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Titles at positions `[skip, skip + max)` of the current ordering.
    pub fn enumerate(&self, skip: usize, max: usize) -> Pager<'_> {
        Pager::new(&self.records, skip, max)
    }

    /// Zero-based position of the first record with this title.
    pub fn position(&self, title: &str) -> Option<usize> {
        self.records.iter().position(|record| record.title == title)
    }

    pub fn resolve_filename(&self, title: &str) -> Result<&str, StoreError> {
        self.records
            .iter()
            .find(|record| record.title == title)
            .map(|record| record.filename.as_str())
            .ok_or_else(|| StoreError::NotFound(title.to_string()))
    }

    /// Absolute location of the audio file behind `title`. The file itself
    /// may be missing; that is only noticed when something tries to use it.
    pub fn asset_path(&self, title: &str) -> Result<PathBuf, StoreError> {
        let filename = self.resolve_filename(title)?;
        self.asset_file(filename)
    }

    /// Import audio files, in order. Each source is moved into the asset
    /// directory and appended to the end of the table as its own commit, so an
    /// error part-way leaves the earlier imports in place.
    pub fn add<P: AsRef<Path>>(&mut self, sources: &[P]) -> Result<(), StoreError> {
        for source in sources {
            self.add_one(source.as_ref())?;
        }
        Ok(())
    }

    fn add_one(&mut self, source: &Path) -> Result<(), StoreError> {
        let record = Record::from_source_path(source).ok_or_else(|| {
            StoreError::Validation(format!("{} has no usable file name", source.display()))
        })?;
        validate_title(&record.title)?;
        if !codec::is_encodable(&record.filename) {
            return Err(StoreError::Validation(format!(
                "file name {:?} may not contain '{DELIMITER}' or line breaks",
                record.filename
            )));
        }
        if self.position(&record.title).is_some() {
            return Err(StoreError::DuplicateTitle(record.title));
        }
        let target = self.paths.asset_dir.join(&record.filename);
        match fs::symlink_metadata(&target) {
            Ok(_) => {
                return Err(StoreError::Validation(format!(
                    "the audio folder already has a file named {:?}",
                    record.filename
                )))
            }
            Err(err) if err.kind() == io::ErrorKind::NotFound => {}
            Err(err) => return Err(StoreError::io("inspect", &target)(err)),
        }

        fs::rename(source, &target).map_err(StoreError::io("move audio file to", &target))?;

        let mut next = self.records.clone();
        next.push(record.clone());
        if let Err(err) = self.commit(&next) {
            if let Err(undo) = fs::rename(&target, source) {
                warn!(
                    "could not return {} to {}: {undo}",
                    target.display(),
                    source.display()
                );
            }
            return Err(err);
        }

        info!("added \"{}\" ({})", record.title, record.filename);
        self.load()?;
        Ok(())
    }

    /// Remove the first record titled `title`, optionally deleting its audio
    /// file as well. The row removal is committed before the file name is even
    /// resolved, so a bad name or a failed removal still leaves the entry
    /// gone. Unknown titles are ignored.
    pub fn delete(&mut self, title: &str, delete_asset: bool) -> Result<(), StoreError> {
        let Some(index) = self.position(title) else {
            debug!("delete: no entry titled \"{title}\"");
            return Ok(());
        };

        let mut next = self.records.clone();
        let removed = next.remove(index);

        self.commit(&next)?;
        info!("deleted \"{}\"", removed.title);
        self.load()?;

        if delete_asset {
            let asset = self.asset_file(&removed.filename)?;
            fs::remove_file(&asset).map_err(StoreError::io("remove audio file", &asset))?;
            info!("removed {}", asset.display());
        }
        Ok(())
    }

    /// Change a record's title in place; its position and file are kept.
    /// Surrounding whitespace in `new_title` is dropped.
    pub fn rename(&mut self, old_title: &str, new_title: &str) -> Result<(), StoreError> {
        let new_title = new_title.trim();
        validate_title(new_title)?;

        let Some(index) = self.position(old_title) else {
            debug!("rename: no entry titled \"{old_title}\"");
            return Ok(());
        };
        if old_title == new_title {
            return Ok(());
        }
        if self.position(new_title).is_some() {
            return Err(StoreError::DuplicateTitle(new_title.to_string()));
        }

        let mut next = self.records.clone();
        next[index].title = new_title.to_string();
        self.commit(&next)?;
        info!("renamed \"{old_title}\" to \"{new_title}\"");
        self.load()?;
        Ok(())
    }

    /// Swap `title` with the entry before it. No-op when it is already first
    /// or not present.
    pub fn move_up(&mut self, title: &str) -> Result<(), StoreError> {
        match self.position(title) {
            Some(index) if index > 0 => self.swap(index - 1, index),
            _ => Ok(()),
        }
    }

    /// Swap `title` with the entry after it. No-op when it is already last
    /// or not present.
    pub fn move_down(&mut self, title: &str) -> Result<(), StoreError> {
        match self.position(title) {
            Some(index) if index + 1 < self.records.len() => self.swap(index, index + 1),
            _ => Ok(()),
        }
    }

    fn swap(&mut self, a: usize, b: usize) -> Result<(), StoreError> {
        let mut next = self.records.clone();
        next.swap(a, b);
        self.commit(&next)?;
        info!("swapped \"{}\" and \"{}\"", next[a].title, next[b].title);
        self.load()?;
        Ok(())
    }

    /// Replace the content file with `records`. The data goes into a fresh
    /// temporary file beside the content file, is synced, and is then renamed
    /// over it, so readers see either the old table or the new one in full.
    fn commit(&self, records: &[Record]) -> Result<(), StoreError> {
        let dir = self.paths.content_dir();
        let mut tmp =
            NamedTempFile::new_in(dir).map_err(StoreError::io("create temporary file in", dir))?;
        let tmp_path = tmp.path().to_path_buf();

        tmp.write_all(codec::encode(records).as_bytes())
            .map_err(StoreError::io("write", &tmp_path))?;
        tmp.as_file()
            .sync_all()
            .map_err(StoreError::io("sync", &tmp_path))?;

        let target = &self.paths.content_file;
        tmp.persist(target).map_err(|err| StoreError::Io {
            action: "replace content file",
            path: target.clone(),
            source: err.error,
        })?;
        Ok(())
    }

    /// Join a stored file name onto the asset directory, refusing names that
    /// would escape it.
    fn asset_file(&self, filename: &str) -> Result<PathBuf, StoreError> {
        let name = Path::new(filename);
        if filename.is_empty() || name.file_name() != Some(name.as_os_str()) {
            return Err(StoreError::Validation(format!(
                "{filename:?} is not a plain file name inside the audio folder"
            )));
        }
        Ok(self.paths.asset_dir.join(name))
    }
}

fn validate_title(title: &str) -> Result<(), StoreError> {
    if title.trim().is_empty() {
        return Err(StoreError::Validation("Title must not be empty.".to_string()));
    }
    if !codec::is_encodable(title) {
        return Err(StoreError::Validation(format!(
            "Title may not contain '{DELIMITER}' or line breaks."
        )));
    }
    Ok(())
}

fn warn_on_duplicate_titles(records: &[Record]) {
    let mut seen = HashSet::with_capacity(records.len());
    for record in records {
        if !seen.insert(record.title.as_str()) {
            warn!(
                "duplicate title \"{}\" in content file; only the first entry is addressable",
                record.title
            );
        }
    }
}
