use std::ffi::OsString;
use std::path::{Component, Path, PathBuf};

pub trait PathExt {
    /// Renders the path for messages: canonical when it exists, otherwise
    /// made absolute against the current directory and lexically normalized.
    fn best_effort_display(&self) -> String;

    /// Appends `suffix` to the last component, `a/b.txt` -> `a/b.txt.bak`.
    fn with_appended_suffix(&self, suffix: &str) -> PathBuf;
}

impl PathExt for Path {
    fn best_effort_display(&self) -> String {
        if let Ok(canonical) = self.canonicalize() {
            return canonical.display().to_string();
        }

        let absolute = if self.is_absolute() {
            self.to_path_buf()
        } else {
            std::env::current_dir()
                .map(|cwd| cwd.join(self))
                .unwrap_or_else(|_| self.to_path_buf())
        };

        normalize(&absolute).display().to_string()
    }

    fn with_appended_suffix(&self, suffix: &str) -> PathBuf {
        let mut raw: OsString = self.as_os_str().to_owned();
        raw.push(suffix);
        PathBuf::from(raw)
    }
}

fn normalize(path: &Path) -> PathBuf {
    let mut kept: Vec<Component> = Vec::new();

    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if matches!(kept.last(), Some(Component::Normal(_))) {
                    kept.pop();
                }
            }
            other => kept.push(other),
        }
    }

    kept.iter().collect()
}
