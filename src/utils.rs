use crate::error::StoreError;
use serde::Serialize;
use serde_json::Value;
use serde_json::ser::PrettyFormatter;
use std::fs;
use std::path::{Path, PathBuf};

/// Convert a destination key to a safe file stem
pub fn sanitize_filename(key: &str) -> String {
    let name = key
        .trim()
        .replace(['/', '\\', ':', '?', '&', '=', '#', '%', '*', '"', '<', '>', '|'], "_");

    // Limit filename length
    name.chars().take(100).collect()
}

/// Path of the output file for `destination` under `dir`
pub fn destination_path(dir: &Path, destination: &str) -> PathBuf {
    dir.join(format!("{}.json", sanitize_filename(destination)))
}

/// Contents of a JSON array file as read at load time
#[derive(Debug, Default)]
pub struct LoadedArray {
    pub entries: Vec<Value>,

    /// False when the file was unusable and could not be moved aside.
    /// Writing to such a path would destroy the only copy of its data.
    pub writable: bool,
}

/// Reads a JSON array from `path`.
///
/// A missing file yields an empty array. An unreadable, non-UTF-8, invalid or
/// non-array file is moved aside to `<path>.corrupt` and also yields an empty
/// array. If it cannot be moved, the result is marked unwritable.
pub fn load_json_array(path: &Path) -> LoadedArray {
    let raw = match fs::read(path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            ::log::debug!("{} does not exist yet, starting empty", path.display());
            return LoadedArray {
                entries: Vec::new(),
                writable: true,
            };
        }
        Err(e) => {
            ::log::warn!("Cannot read {}: {}; treating it as empty", path.display(), e);
            return quarantined(path);
        }
    };

    match serde_json::from_slice::<Value>(&raw) {
        Ok(Value::Array(entries)) => LoadedArray {
            entries,
            writable: true,
        },
        Ok(_) => {
            ::log::warn!("{} is not a JSON array; treating it as empty", path.display());
            quarantined(path)
        }
        Err(e) => {
            ::log::warn!("{} is corrupt ({}); treating it as empty", path.display(), e);
            quarantined(path)
        }
    }
}

fn quarantined(path: &Path) -> LoadedArray {
    let mut aside = path.as_os_str().to_owned();
    aside.push(".corrupt");
    let writable = match fs::rename(path, &aside) {
        Ok(()) => {
            ::log::warn!("Moved {} to {}", path.display(), Path::new(&aside).display());
            true
        }
        Err(e) => {
            ::log::error!(
                "Failed to move corrupt {} aside: {}; refusing to write it",
                path.display(),
                e
            );
            false
        }
    };
    LoadedArray {
        entries: Vec::new(),
        writable,
    }
}

/// Writes `value` as JSON, replacing `path` atomically.
///
/// Pretty output uses four-space indentation and leaves non-ASCII text
/// unescaped.
pub fn write_json_atomic<T: Serialize + ?Sized>(
    path: &Path,
    value: &T,
    pretty: bool,
) -> Result<(), StoreError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let mut buf = Vec::new();
    if pretty {
        let formatter = PrettyFormatter::with_indent(b"    ");
        let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
        value.serialize(&mut ser)?;
    } else {
        serde_json::to_writer(&mut buf, value)?;
    }

    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    fs::write(&tmp, &buf)?;
    fs::rename(&tmp, path)?;
    Ok(())
}
