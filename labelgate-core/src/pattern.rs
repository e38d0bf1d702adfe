//! Critical file patterns

use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use tracing::debug;

use crate::host::ChangedFile;
use crate::{Error, Result};

/// Compiled set of globs identifying critical files
///
/// Globs follow shell `fnmatch` rules: `*` also matches `/`, and `**` is
/// the same as `*`, so `**/main.*` needs at least one directory.
#[derive(Debug, Clone)]
pub struct CriticalPatterns {
    globs: Vec<String>,
    set: GlobSet,
}

impl CriticalPatterns {
    /// Compile the given globs, skipping blank entries
    pub fn new(globs: &[String]) -> Result<Self> {
        let mut builder = GlobSetBuilder::new();
        let mut kept = Vec::new();

        for glob in globs {
            let glob = glob.trim();
            if glob.is_empty() {
                continue;
            }

            let compiled = GlobBuilder::new(&collapse_stars(glob))
                .literal_separator(false)
                .build()
                .map_err(|source| Error::Glob {
                    glob: glob.to_string(),
                    source,
                })?;
            builder.add(compiled);
            kept.push(glob.to_string());
        }

        let set = builder.build().map_err(|source| Error::Glob {
            glob: kept.join(","),
            source,
        })?;

        debug!(globs = ?kept, "Compiled critical file patterns");

        Ok(Self { globs: kept, set })
    }

    /// The globs in this set
    pub fn globs(&self) -> &[String] {
        &self.globs
    }

    pub fn is_empty(&self) -> bool {
        self.globs.is_empty()
    }

    /// Whether `path` matches any critical glob
    pub fn matches(&self, path: &str) -> bool {
        self.set.is_match(path)
    }

    /// First changed file matching a critical glob
    pub fn first_match<'a>(&self, files: &'a [ChangedFile]) -> Option<&'a ChangedFile> {
        files.iter().find(|f| self.matches(&f.filename))
    }

    pub fn any_match(&self, files: &[ChangedFile]) -> bool {
        self.first_match(files).is_some()
    }
}

/// Collapse runs of `*` so globset never sees a recursive `**`
fn collapse_stars(glob: &str) -> String {
    let mut out = String::with_capacity(glob.len());
    for c in glob.chars() {
        if c == '*' && out.ends_with('*') {
            continue;
        }
        out.push(c);
    }
    out
}
