use std::{fmt, io};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// One of the three template source groups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Group {
    /// Shared fragments, concatenated into the `common` base.
    Common,
    /// Pages rendered inside the `common` layout.
    Views,
    /// Pages compiled on their own, without the `common` base.
    Standalone,
}

impl Group {
    /// The directory name of this group below a template root.
    pub fn dir_name(self) -> &'static str {
        match self {
            Group::Common => "common",
            Group::Views => "views",
            Group::Standalone => "standalone",
        }
    }
}

impl fmt::Display for Group {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.dir_name())
    }
}

/// Provides the raw sources of every template group.
///
/// Names returned by [`list()`](TemplateSource::list()) are file names
/// including their extension; they become the lookup keys of views and
/// standalone templates. The engine reads groups in the order `list()`
/// returns, which must be stable.
pub trait TemplateSource: Send + Sync + 'static {
    /// Lists the file names in `group`, in a stable order.
    fn list(&self, group: Group) -> io::Result<Vec<String>>;

    /// Reads the source of `name` in `group`.
    fn read(&self, group: Group, name: &str) -> io::Result<String>;
}

/// Reads templates from a directory containing one flat subdirectory per
/// [`Group`]: `common/`, `views/` and `standalone/`.
#[derive(Debug, Clone)]
pub struct DirSource {
    root: PathBuf,
}

impl DirSource {
    pub fn new<P: Into<PathBuf>>(root: P) -> DirSource {
        DirSource { root: root.into() }
    }
}

impl TemplateSource for DirSource {
    fn list(&self, group: Group) -> io::Result<Vec<String>> {
        fn is_hidden(entry: &walkdir::DirEntry) -> bool {
            entry.file_name().to_str().map_or(false, |s| s.starts_with('.'))
        }

        let walker = walkdir::WalkDir::new(self.root.join(group.dir_name()))
            .min_depth(1)
            .max_depth(1)
            .follow_links(true)
            .sort_by_file_name();

        let mut names = vec![];
        for entry in walker {
            let entry = entry?;
            if !entry.file_type().is_file() || is_hidden(&entry) {
                continue;
            }

            names.push(entry.file_name().to_string_lossy().into_owned());
        }

        Ok(names)
    }

    fn read(&self, group: Group, name: &str) -> io::Result<String> {
        std::fs::read_to_string(self.root.join(group.dir_name()).join(name))
    }
}

/// An in-memory template source. Names are listed in lexicographic order.
///
/// # Example
///
/// ```rust
/// use reader_templates::{Group, MemorySource};
///
/// let source = MemorySource::new()
///     .with(Group::Common, "layout.html", "{% block base %}{% endblock %}")
///     .with(Group::Standalone, "offline.html", "offline");
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    files: BTreeMap<(Group, String), String>,
}

impl MemorySource {
    pub fn new() -> MemorySource {
        MemorySource::default()
    }

    /// Adds (or replaces) `name` in `group`.
    pub fn with<N, S>(mut self, group: Group, name: N, source: S) -> MemorySource
        where N: Into<String>, S: Into<String>
    {
        self.files.insert((group, name.into()), source.into());
        self
    }
}

impl TemplateSource for MemorySource {
    fn list(&self, group: Group) -> io::Result<Vec<String>> {
        Ok(self.files.keys()
            .filter(|(g, _)| *g == group)
            .map(|(_, name)| name.clone())
            .collect())
    }

    fn read(&self, group: Group, name: &str) -> io::Result<String> {
        self.files.get(&(group, name.to_owned()))
            .cloned()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, format!("{}/{}", group, name)))
    }
}
