use serde::{Deserialize, Serialize};
use smol_str::SmolStr;
use std::fmt;
use std::path::{Component, Path, PathBuf};

/// Where a declaration was found in the parsed headers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceLocation {
    #[serde(default)]
    pub file: SmolStr,
    #[serde(default)]
    pub line: u32,
}

impl SourceLocation {
    pub fn new(file: impl Into<SmolStr>, line: u32) -> Self {
        Self {
            file: file.into(),
            line,
        }
    }

    pub fn is_known(&self) -> bool {
        !self.file.is_empty()
    }

    /// Check whether this location lies in `header`, comparing normalized paths.
    pub fn is_in(&self, header: impl AsRef<Path>) -> bool {
        self.is_known() && normalize_path(Path::new(self.file.as_str())) == normalize_path(header.as_ref())
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_known() {
            write!(f, "{}:{}", self.file, self.line)
        } else {
            f.write_str("<unknown>")
        }
    }
}

/// Lexically normalize a path: drop `.` components and fold `..` where possible.
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(SourceLocation::new("a.h", 12).to_string(), "a.h:12");
        assert_eq!(SourceLocation::default().to_string(), "<unknown>");
    }

    #[test]
    fn test_is_in_normalizes() {
        let loc = SourceLocation::new("include/./geom/../geom/point.h", 3);
        assert!(loc.is_in("include/geom/point.h"));
        assert!(!loc.is_in("include/geom/line.h"));
        assert!(!SourceLocation::default().is_in(""));
    }
}
