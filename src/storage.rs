// Reads and writes files inside the application directories.
//
// Every write goes through `atomic_write` under an exclusive sidecar lock, so a
// reader never observes a half-written file and concurrent writers serialise.
use crate::context::{AppContext, Directory};
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use fs2::FileExt;
use serde::Serialize;
use serde_json::{Map, Value};
use std::fs;
use std::path::{Component, Path, PathBuf};
use strum::EnumIter;

const LOCK_SUFFIX: &str = ".lock";
const TMP_SUFFIX: &str = ".tmp";

/// Image encodings accepted by [`FileStore::write_image`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter)]
pub enum ImageFormat {
    Png,
    Jpg,
}

impl ImageFormat {
    const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];
    const JPG_SIGNATURE: [u8; 3] = [0xFF, 0xD8, 0xFF];

    /// Sniffs the format from the leading bytes of an encoded image.
    pub fn detect(bytes: &[u8]) -> Option<Self> {
        if bytes.starts_with(&Self::PNG_SIGNATURE) {
            Some(ImageFormat::Png)
        } else if bytes.starts_with(&Self::JPG_SIGNATURE) {
            Some(ImageFormat::Jpg)
        } else {
            None
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            ImageFormat::Png => "png",
            ImageFormat::Jpg => "jpg",
        }
    }
}

/// Where a file lives: a base directory, an optional nested folder, a name
/// and an optional extension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileLocation {
    pub directory: Directory,
    pub folder: Option<String>,
    pub name: String,
    pub extension: String,
}

impl FileLocation {
    pub fn new(directory: Directory, name: &str, extension: &str) -> Self {
        Self {
            directory,
            folder: None,
            name: name.to_string(),
            extension: extension.to_string(),
        }
    }

    /// Places the file inside `folder` (may contain `/`-separated segments).
    pub fn in_folder(mut self, folder: &str) -> Self {
        self.folder = Some(folder.to_string());
        self
    }

    /// `name.extension`, or just `name` when the extension is empty.
    pub fn file_name(&self) -> String {
        if self.extension.is_empty() {
            self.name.clone()
        } else {
            format!("{}.{}", self.name, self.extension)
        }
    }

    /// Name used when a write must not replace an existing file.
    pub fn copy_file_name(&self) -> String {
        if self.extension.is_empty() {
            format!("{} copy", self.name)
        } else {
            format!("{} copy.{}", self.name, self.extension)
        }
    }
}

/// Rejects folder names that would escape their base directory.
fn validate_relative(segment: &str) -> Result<()> {
    let path = Path::new(segment);
    let escapes = path.components().any(|c| {
        matches!(
            c,
            Component::ParentDir | Component::RootDir | Component::Prefix(_)
        )
    });
    if escapes {
        anyhow::bail!("Path '{}' must stay inside its directory", segment);
    }
    Ok(())
}

fn sidecar_path(file_path: &Path, suffix: &str) -> PathBuf {
    let name = file_path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    file_path.with_file_name(format!(".{}{}", name, suffix))
}

fn is_sidecar(name: &str) -> bool {
    name.starts_with('.') && (name.ends_with(LOCK_SUFFIX) || name.ends_with(TMP_SUFFIX))
}

fn ensure_writable(directory: Directory) -> Result<()> {
    if !directory.is_writable() {
        anyhow::bail!("The {} directory is read-only", directory);
    }
    Ok(())
}

/// Folder operations need a real sub-folder, never the base directory itself.
fn ensure_named_folder(folder: &str) -> Result<()> {
    let names_something = Path::new(folder)
        .components()
        .any(|c| matches!(c, Component::Normal(_)));
    if !names_something {
        anyhow::bail!("'{}' does not name a folder", folder);
    }
    Ok(())
}

/// File manager scoped to the directories of one [`AppContext`].
pub struct FileStore<'a> {
    ctx: &'a dyn AppContext,
}

impl<'a> FileStore<'a> {
    pub fn new(ctx: &'a dyn AppContext) -> Self {
        Self { ctx }
    }

    // --- Paths ---

    /// `<directory>[/<folder>]`
    pub fn folder_path(&self, directory: Directory, folder: Option<&str>) -> Result<PathBuf> {
        let mut path = self.ctx.directory_path(directory)?;
        if let Some(folder) = folder.filter(|f| !f.is_empty()) {
            validate_relative(folder)?;
            path.push(folder);
        }
        Ok(path)
    }

    /// `<directory>[/<folder>]/<name>[.<extension>]`
    pub fn path_for_file(&self, loc: &FileLocation) -> Result<PathBuf> {
        validate_relative(&loc.name)?;
        Ok(self
            .folder_path(loc.directory, loc.folder.as_deref())?
            .join(loc.file_name()))
    }

    // --- Locking primitives ---

    /// Runs `f` while holding an exclusive lock on `file_path`'s sidecar.
    pub fn with_lock<F, T>(file_path: &Path, f: F) -> Result<T>
    where
        F: FnOnce() -> Result<T>,
    {
        let lock_path = sidecar_path(file_path, LOCK_SUFFIX);
        let file = fs::OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&lock_path)
            .with_context(|| format!("Failed to open lock file {:?}", lock_path))?;

        file.lock_exclusive()?;
        let result = f();
        file.unlock()?;
        result
    }

    /// Atomic write: write to a hidden `.tmp` sibling, then rename over the target.
    pub fn atomic_write<P: AsRef<Path>, C: AsRef<[u8]>>(path: P, contents: C) -> Result<()> {
        let path = path.as_ref();
        let tmp_path = sidecar_path(path, TMP_SUFFIX);
        fs::write(&tmp_path, contents)
            .with_context(|| format!("Failed to write {:?}", tmp_path))?;
        fs::rename(&tmp_path, path)
            .with_context(|| format!("Failed to move {:?} into place", tmp_path))?;
        Ok(())
    }

    // --- Writes ---

    fn write_contents(
        &self,
        contents: &[u8],
        loc: &FileLocation,
        replace_existing: bool,
    ) -> Result<PathBuf> {
        ensure_writable(loc.directory)?;
        let mut target = self.path_for_file(loc)?;
        if !replace_existing && target.exists() {
            target.set_file_name(loc.copy_file_name());
        }

        let parent_exists = target.parent().map(|p| p.is_dir()).unwrap_or(false);
        if !parent_exists {
            anyhow::bail!("Folder does not exist for {:?}", target);
        }

        Self::with_lock(&target, || Self::atomic_write(&target, contents))?;
        log::debug!("Wrote {} bytes to {:?}", contents.len(), target);
        Ok(target)
    }

    /// Writes UTF-8 text. Returns the path actually written, which is the
    /// `" copy"` variant when `replace_existing` is false and the file exists.
    pub fn write_string(
        &self,
        text: &str,
        loc: &FileLocation,
        replace_existing: bool,
    ) -> Result<PathBuf> {
        self.write_contents(text.as_bytes(), loc, replace_existing)
    }

    /// Serialises `value` as pretty-printed JSON and writes it.
    pub fn write_json<T: Serialize + ?Sized>(
        &self,
        value: &T,
        loc: &FileLocation,
        replace_existing: bool,
    ) -> Result<PathBuf> {
        let json = serde_json::to_string_pretty(value)?;
        self.write_string(&json, loc, replace_existing)
    }

    pub fn write_dictionary(
        &self,
        dictionary: &Map<String, Value>,
        loc: &FileLocation,
        replace_existing: bool,
    ) -> Result<PathBuf> {
        self.write_json(dictionary, loc, replace_existing)
    }

    pub fn write_array(
        &self,
        array: &[Value],
        loc: &FileLocation,
        replace_existing: bool,
    ) -> Result<PathBuf> {
        self.write_json(array, loc, replace_existing)
    }

    pub fn write_bytes(
        &self,
        bytes: &[u8],
        loc: &FileLocation,
        replace_existing: bool,
    ) -> Result<PathBuf> {
        self.write_contents(bytes, loc, replace_existing)
    }

    /// Writes an already-encoded image after checking its signature.
    pub fn write_image(
        &self,
        bytes: &[u8],
        format: ImageFormat,
        loc: &FileLocation,
        replace_existing: bool,
    ) -> Result<PathBuf> {
        match ImageFormat::detect(bytes) {
            Some(found) if found == format => self.write_contents(bytes, loc, replace_existing),
            Some(found) => anyhow::bail!("Expected {:?} image data, found {:?}", format, found),
            None => anyhow::bail!("Buffer is not a {:?} image", format),
        }
    }

    // --- Reads ---

    /// Reads raw bytes, `Ok(None)` when the file does not exist.
    pub fn read_bytes(&self, loc: &FileLocation) -> Result<Option<Vec<u8>>> {
        let path = self.path_for_file(loc)?;
        if !path.is_file() {
            return Ok(None);
        }
        // Writers replace the file by rename, so a plain read sees a whole version
        let bytes = fs::read(&path).with_context(|| format!("Failed to read {:?}", path))?;
        Ok(Some(bytes))
    }

    pub fn read_string(&self, loc: &FileLocation) -> Result<Option<String>> {
        match self.read_bytes(loc)? {
            Some(bytes) => {
                let text = String::from_utf8(bytes)
                    .with_context(|| format!("{} is not valid UTF-8", loc.file_name()))?;
                Ok(Some(text))
            }
            None => Ok(None),
        }
    }

    /// Any JSON document, including bare fragments such as `42` or `"text"`.
    pub fn read_json(&self, loc: &FileLocation) -> Result<Option<Value>> {
        match self.read_bytes(loc)? {
            Some(bytes) => {
                let value = serde_json::from_slice(&bytes)
                    .with_context(|| format!("{} is not valid JSON", loc.file_name()))?;
                Ok(Some(value))
            }
            None => Ok(None),
        }
    }

    pub fn read_dictionary(&self, loc: &FileLocation) -> Result<Option<Map<String, Value>>> {
        match self.read_json(loc)? {
            Some(Value::Object(map)) => Ok(Some(map)),
            Some(_) => anyhow::bail!("{} does not contain a JSON object", loc.file_name()),
            None => Ok(None),
        }
    }

    pub fn read_array(&self, loc: &FileLocation) -> Result<Option<Vec<Value>>> {
        match self.read_json(loc)? {
            Some(Value::Array(values)) => Ok(Some(values)),
            Some(_) => anyhow::bail!("{} does not contain a JSON array", loc.file_name()),
            None => Ok(None),
        }
    }

    /// Reads an encoded image and reports its detected format.
    pub fn read_image(&self, loc: &FileLocation) -> Result<Option<(ImageFormat, Vec<u8>)>> {
        match self.read_bytes(loc)? {
            Some(bytes) => {
                let format = ImageFormat::detect(&bytes)
                    .ok_or_else(|| anyhow::anyhow!("{} is not a PNG or JPG", loc.file_name()))?;
                Ok(Some((format, bytes)))
            }
            None => Ok(None),
        }
    }

    /// Every JSON object stored directly in a folder. Other files are skipped.
    pub fn read_all_dictionaries(
        &self,
        directory: Directory,
        folder: Option<&str>,
    ) -> Result<Vec<Map<String, Value>>> {
        let mut dictionaries = Vec::new();
        for name in self.list_files(directory, folder)? {
            let mut loc = FileLocation::new(directory, &name, "");
            loc.folder = folder.map(|f| f.to_string());
            match self.read_dictionary(&loc) {
                Ok(Some(dict)) => dictionaries.push(dict),
                Ok(None) => {}
                Err(e) => log::warn!("Skipping {}: {}", name, e),
            }
        }
        Ok(dictionaries)
    }

    // --- Folder management ---

    pub fn delete_file(&self, loc: &FileLocation) -> Result<()> {
        ensure_writable(loc.directory)?;
        let path = self.path_for_file(loc)?;
        fs::remove_file(&path).with_context(|| format!("Failed to delete {:?}", path))?;
        let _ = fs::remove_file(sidecar_path(&path, LOCK_SUFFIX));
        Ok(())
    }

    /// Removes a folder and everything inside it. Fails if it does not exist.
    pub fn delete_directory(&self, directory: Directory, folder: &str) -> Result<()> {
        ensure_writable(directory)?;
        ensure_named_folder(folder)?;
        let path = self.folder_path(directory, Some(folder))?;
        fs::remove_dir_all(&path).with_context(|| format!("Failed to delete {:?}", path))
    }

    /// Empties a folder by removing and recreating it. A missing folder is a no-op.
    pub fn delete_all_files_in_directory(&self, directory: Directory, folder: &str) -> Result<()> {
        ensure_writable(directory)?;
        ensure_named_folder(folder)?;
        let path = self.folder_path(directory, Some(folder))?;
        if path.exists() {
            fs::remove_dir_all(&path).with_context(|| format!("Failed to empty {:?}", path))?;
            return self.create_folder(directory, folder);
        }
        Ok(())
    }

    /// Creates a single folder. Fails if it already exists or its parent is missing.
    pub fn create_folder(&self, directory: Directory, folder: &str) -> Result<()> {
        ensure_writable(directory)?;
        ensure_named_folder(folder)?;
        let path = self.folder_path(directory, Some(folder))?;
        fs::create_dir(&path).with_context(|| format!("Failed to create folder {:?}", path))
    }

    /// Names of the entries in a folder, sorted. Empty when the folder is missing.
    pub fn list_files(&self, directory: Directory, folder: Option<&str>) -> Result<Vec<String>> {
        let path = self.folder_path(directory, folder)?;
        let entries = match fs::read_dir(&path) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(vec![]),
            Err(e) => return Err(e).with_context(|| format!("Failed to list {:?}", path)),
        };

        let mut names: Vec<String> = entries
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.file_name().to_string_lossy().to_string())
            .filter(|name| !is_sidecar(name))
            .collect();
        names.sort();
        Ok(names)
    }

    /// Moves a file between folders, creating the destination folder if needed.
    pub fn move_file(
        &self,
        from: &FileLocation,
        to_directory: Directory,
        to_folder: Option<&str>,
    ) -> Result<PathBuf> {
        ensure_writable(from.directory)?;
        ensure_writable(to_directory)?;
        let source = self.path_for_file(from)?;
        let dest_folder = self.folder_path(to_directory, to_folder)?;
        fs::create_dir_all(&dest_folder)
            .with_context(|| format!("Failed to create folder {:?}", dest_folder))?;

        let destination = dest_folder.join(from.file_name());
        fs::rename(&source, &destination).with_context(|| {
            format!("Could not move {:?} to {:?}", source, destination)
        })?;
        let _ = fs::remove_file(sidecar_path(&source, LOCK_SUFFIX));
        log::debug!("Moved {:?} to {:?}", source, destination);
        Ok(destination)
    }

    /// Birth time of the file when the platform records it, otherwise its
    /// last modification time. `Ok(None)` when the file does not exist.
    pub fn creation_date(&self, loc: &FileLocation) -> Result<Option<DateTime<Utc>>> {
        let path = self.path_for_file(loc)?;
        let metadata = match fs::metadata(&path) {
            Ok(m) => m,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e).with_context(|| format!("Could not load file {:?}", path)),
        };
        let time = metadata
            .created()
            .or_else(|_| metadata.modified())
            .with_context(|| format!("No timestamps available for {:?}", path))?;
        Ok(Some(DateTime::<Utc>::from(time)))
    }
}
