//! Parsing of `git status --porcelain -z` (v1) output.
//!
//! With `-z` entries are NUL-terminated and paths are never quoted or
//! escaped, so non-ASCII names come through verbatim.

/// One line of porcelain status output
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusEntry {
    /// Index (staged) status code
    pub index: char,
    /// Working tree status code
    pub worktree: char,
    /// Path relative to the repository root (destination path for renames)
    pub path: String,
}

impl StatusEntry {
    /// Whether this entry is an unmerged path (both modified, both added, ...)
    pub fn is_unmerged(&self) -> bool {
        matches!(
            (self.index, self.worktree),
            ('D', 'D') | ('A', 'U') | ('U', 'D') | ('U', 'A') | ('D', 'U') | ('A', 'A') | ('U', 'U')
        )
    }

    /// Two-letter status code, e.g. `UU`
    pub fn code(&self) -> String {
        format!("{}{}", self.index, self.worktree)
    }
}

/// Parse NUL-separated porcelain v1 output into entries. Malformed
/// records are skipped.
pub fn parse_porcelain(output: &str) -> Vec<StatusEntry> {
    let mut entries = Vec::new();
    let mut records = output.split('\0');

    while let Some(record) = records.next() {
        let mut chars = record.chars();
        let (Some(index), Some(worktree)) = (chars.next(), chars.next()) else {
            continue;
        };
        // Renames and copies are followed by the source path as its own record
        if matches!(index, 'R' | 'C') || matches!(worktree, 'R' | 'C') {
            records.next();
        }
        let Some(path) = record.get(3..).filter(|p| !p.is_empty()) else {
            continue;
        };
        entries.push(StatusEntry {
            index,
            worktree,
            path: path.to_string(),
        });
    }
    entries
}

/// Paths of all unmerged entries, in output order
pub fn unmerged_paths(entries: &[StatusEntry]) -> Vec<String> {
    entries
        .iter()
        .filter(|e| e.is_unmerged())
        .map(|e| e.path.clone())
        .collect()
}
