//! Filesystem-backed object store.
//!
//! Objects live under `root/<folder>/<uuid>-<sanitized name>` and are served
//! from `public_base_url/<key>`.

use super::{ImageUpload, MediaError, MediaResult, ObjectBody, ObjectStore, StoredObject};
use log::{info, warn};
use once_cell::sync::Lazy;
use regex::Regex;
use std::fs;
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};
use uuid::Uuid;

const MAX_FILE_STEM_CHARS: usize = 48;

static UNSAFE_NAME_CHARS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^a-z0-9.]+").expect("valid file name regex"));
static REPEATED_DASH_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"-+").expect("valid dash regex"));

/// Object store rooted at a local directory.
#[derive(Debug, Clone)]
pub struct FsObjectStore {
    root: PathBuf,
    public_base_url: String,
}

impl FsObjectStore {
    /// Creates the store, creating `root` if needed.
    pub fn open(root: impl Into<PathBuf>, public_base_url: impl Into<String>) -> MediaResult<Self> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        Ok(Self {
            root,
            public_base_url: public_base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Resolves a public URL back to the object key it was stored under.
    pub fn key_for_url(&self, url: &str) -> MediaResult<String> {
        let key = url
            .strip_prefix(&self.public_base_url)
            .and_then(|rest| rest.strip_prefix('/'))
            .filter(|key| !key.is_empty())
            .ok_or_else(|| MediaError::ForeignObject(url.to_string()))?;
        Ok(key.to_string())
    }

    fn path_for_key(&self, key: &str) -> MediaResult<PathBuf> {
        let relative = Path::new(key);
        let is_safe = relative
            .components()
            .all(|component| matches!(component, Component::Normal(_)));
        if !is_safe || key.is_empty() {
            return Err(MediaError::ForeignObject(key.to_string()));
        }
        Ok(self.root.join(relative))
    }
}

impl ObjectStore for FsObjectStore {
    fn put(&self, folder: &str, upload: &ImageUpload) -> MediaResult<StoredObject> {
        let key = format!(
            "{}/{}-{}",
            sanitize_segment(folder),
            Uuid::new_v4(),
            sanitize_file_name(&upload.file_name, &upload.content_type)
        );
        let path = self.path_for_key(&key)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, &upload.bytes)?;

        info!(
            "event=object_put module=media status=ok key={} bytes={}",
            key,
            upload.bytes.len()
        );
        Ok(StoredObject {
            url: format!("{}/{}", self.public_base_url, key),
            key,
        })
    }

    fn delete(&self, url: &str) -> MediaResult<()> {
        let key = self.key_for_url(url)?;
        let path = self.path_for_key(&key)?;
        match fs::remove_file(&path) {
            Ok(()) => {
                info!("event=object_delete module=media status=ok key={key}");
                Ok(())
            }
            Err(err) if err.kind() == ErrorKind::NotFound => {
                warn!("event=object_delete module=media status=missing key={key}");
                Err(MediaError::NotFound(key))
            }
            Err(err) => Err(err.into()),
        }
    }

    fn get(&self, key: &str) -> MediaResult<ObjectBody> {
        let path = self.path_for_key(key)?;
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                return Err(MediaError::NotFound(key.to_string()))
            }
            Err(err) => return Err(err.into()),
        };
        let content_type = mime_guess::from_path(&path)
            .first_or_octet_stream()
            .essence_str()
            .to_string();
        Ok(ObjectBody {
            content_type,
            bytes,
        })
    }
}

/// Lowercases a file name and replaces unsafe runs with `-`.
///
/// Falls back to an extension derived from the content type when the name
/// has none.
pub(crate) fn sanitize_file_name(file_name: &str, content_type: &str) -> String {
    let base = file_name.rsplit(&['/', '\\'][..]).next().unwrap_or_default();
    let lowered = base.trim().to_lowercase();
    let replaced = UNSAFE_NAME_CHARS_RE.replace_all(&lowered, "-");
    let collapsed = REPEATED_DASH_RE.replace_all(&replaced, "-");
    let cleaned = collapsed.trim_matches(|c| c == '-' || c == '.');

    let (stem, extension) = match cleaned.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() && !ext.is_empty() => (stem, ext.to_string()),
        _ => (cleaned, extension_for(content_type)),
    };
    let stem: String = stem
        .trim_matches('-')
        .chars()
        .take(MAX_FILE_STEM_CHARS)
        .collect();
    let stem = if stem.is_empty() { "image".to_string() } else { stem };

    format!("{stem}.{extension}")
}

fn sanitize_segment(segment: &str) -> String {
    let lowered = segment.trim().to_lowercase();
    let replaced = UNSAFE_NAME_CHARS_RE.replace_all(&lowered, "-");
    let cleaned = replaced.replace('.', "-");
    let cleaned = cleaned.trim_matches('-');
    if cleaned.is_empty() {
        "misc".to_string()
    } else {
        cleaned.to_string()
    }
}

fn extension_for(content_type: &str) -> String {
    mime_guess::get_mime_extensions_str(content_type)
        .and_then(|extensions| extensions.first())
        .map(|ext| (*ext).to_string())
        .unwrap_or_else(|| "bin".to_string())
}

#[cfg(test)]
mod tests {
    use super::{sanitize_file_name, sanitize_segment};

    #[test]
    fn sanitize_file_name_strips_paths_and_symbols() {
        assert_eq!(
            sanitize_file_name("../../Etc/My Photo (1).PNG", "image/png"),
            "my-photo-1.png"
        );
        assert_eq!(sanitize_file_name("C:\\tmp\\gift.jpeg", "image/jpeg"), "gift.jpeg");
    }

    #[test]
    fn sanitize_file_name_falls_back_to_content_type_extension() {
        let name = sanitize_file_name("???", "image/png");
        assert_eq!(name, "image.png");
    }

    #[test]
    fn sanitize_segment_never_returns_empty() {
        assert_eq!(sanitize_segment("../"), "misc");
        assert_eq!(sanitize_segment("Categories"), "categories");
    }
}
