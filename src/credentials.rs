use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Annotation service account, read from a `key=value` file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub apikey: String,
}

impl Credentials {
    /// Reads `username` and `apikey` from `path`.
    ///
    /// Problems are logged, never returned: a missing file yields empty
    /// credentials and malformed lines are skipped.
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match fs::read_to_string(path) {
            Ok(contents) => Self::parse(&contents, path),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                ::log::error!("Account info file '{}' not found", path.display());
                Self::default()
            }
            Err(e) => {
                ::log::error!("Error reading account info {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    fn parse(contents: &str, path: &Path) -> Self {
        let mut values = HashMap::new();
        for (number, line) in contents.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            match line.split_once('=') {
                Some((name, value)) if !name.trim().is_empty() => {
                    values.insert(name.trim().to_string(), value.trim().to_string());
                }
                _ => {
                    ::log::error!(
                        "Malformed line {} in account info {}",
                        number + 1,
                        path.display()
                    );
                }
            }
        }

        let credentials = Self {
            username: values.remove("username").unwrap_or_default(),
            apikey: values.remove("apikey").unwrap_or_default(),
        };
        if !credentials.is_complete() {
            ::log::warn!("Account info {} lacks username or apikey", path.display());
        }
        credentials
    }

    pub fn is_complete(&self) -> bool {
        !self.username.is_empty() && !self.apikey.is_empty()
    }
}
