//! Asset path table.
//!
//! Maps every asset kind to its source globs, watch globs and destination
//! directory. The table is fixed at startup and validated once:
//!
//! | Kind    | Sources                        | Destination |
//! |---------|--------------------------------|-------------|
//! | scripts | `js/**/*.js`                   | `js/`       |
//! | styles  | `scss/style.scss`              | `css/`      |
//! | markup  | `*.html`                       | root        |
//! | files   | `files/**/*.*`                 | `files/`    |
//! | images  | `img/**/*.{jpg,png,jpeg,gif}`  | `img/`      |
//! | svg     | `img/**/*.svg` minus sprite    | `img/`      |
//! | sprite  | `img/sprite/*.svg`             | `img/`      |
//! | fonts   | `fonts/*.{woff,woff2}`         | `fonts/`    |

mod glob;

pub use glob::{Matcher, SourceFile, glob_base, scan};

use std::fmt;
use std::path::{Path, PathBuf};

use crate::config::{ConfigError, PipelineConfig};
use crate::utils::path::is_within;

/// File name of the combined sprite sheet.
pub const SPRITE_NAME: &str = "sprite.svg";

/// Output extension wildcard: the kind may write any extension.
const ANY_EXTENSION: &str = "*";

/// Category of source file with its own globs and destination rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AssetKind {
    Scripts,
    Styles,
    Markup,
    Files,
    Images,
    Svg,
    Sprite,
    Fonts,
}

impl AssetKind {
    pub const ALL: [Self; 8] = [
        Self::Scripts,
        Self::Styles,
        Self::Markup,
        Self::Files,
        Self::Images,
        Self::Svg,
        Self::Sprite,
        Self::Fonts,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            Self::Scripts => "scripts",
            Self::Styles => "styles",
            Self::Markup => "markup",
            Self::Files => "files",
            Self::Images => "images",
            Self::Svg => "svg",
            Self::Sprite => "sprite",
            Self::Fonts => "fonts",
        }
    }

    /// Order in which watch subscriptions are checked.
    pub const WATCH_ORDER: [Self; 8] = [
        Self::Files,
        Self::Markup,
        Self::Styles,
        Self::Scripts,
        Self::Images,
        Self::Sprite,
        Self::Svg,
        Self::Fonts,
    ];

    const fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for AssetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// How a source file's name maps to its output name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputRule {
    /// Keep the file name.
    Same,
    /// Insert `.min` before the extension (`app.js` -> `app.min.js`).
    MinSuffix,
    /// Replace the name's extension with `.min.<ext>` (`style.scss` -> `style.min.css`).
    MinRename(&'static str),
    /// All sources combine into one file with a fixed name.
    Combined(&'static str),
}

/// One row of the path table.
#[derive(Debug, Clone)]
pub struct PathEntry {
    pub kind: AssetKind,
    /// Globs selecting source files, relative to the source root.
    pub sources: Vec<String>,
    /// Globs removed from `sources` (and from `watch`).
    pub exclude: Vec<String>,
    /// Globs whose changes re-run the kind's task. Empty = not watched.
    pub watch: Vec<String>,
    /// Destination directory relative to the destination root.
    pub dest: PathBuf,
    pub output: OutputRule,
    /// Extensions this kind may write, used for collision checks.
    pub output_extensions: Vec<&'static str>,
}

impl PathEntry {
    fn new(kind: AssetKind, source: &str, dest: &str, output: OutputRule) -> Self {
        Self {
            kind,
            sources: vec![source.to_string()],
            exclude: Vec::new(),
            watch: vec![source.to_string()],
            dest: PathBuf::from(dest),
            output,
            output_extensions: Vec::new(),
        }
    }

    fn watch(mut self, globs: &[&str]) -> Self {
        self.watch = globs.iter().map(|g| g.to_string()).collect();
        self
    }

    fn exclude(mut self, globs: &[&str]) -> Self {
        self.exclude = globs.iter().map(|g| g.to_string()).collect();
        self
    }

    fn writes(mut self, extensions: &[&'static str]) -> Self {
        self.output_extensions = extensions.to_vec();
        self
    }

    /// Glob base shared by the entry's sources.
    pub fn base(&self) -> PathBuf {
        self.sources
            .first()
            .map(|s| glob_base(s))
            .unwrap_or_default()
    }

    /// Whether sources can come from nested directories.
    fn is_recursive(&self) -> bool {
        self.sources.iter().any(|s| s.contains("**"))
    }

    fn writes_extension_of(&self, other: &Self) -> bool {
        self.output_extensions.iter().any(|ext| {
            *ext == ANY_EXTENSION
                || other.output_extensions.contains(&ANY_EXTENSION)
                || other.output_extensions.contains(ext)
        })
    }

    /// Whether this entry's exclusions remove `other`'s sources.
    fn excludes_sources_of(&self, other: &Self) -> bool {
        other.sources.iter().all(|s| self.exclude.contains(s))
    }
}

/// The default layout of the pipeline.
pub fn default_entries() -> Vec<PathEntry> {
    use AssetKind::*;
    use OutputRule::*;

    vec![
        PathEntry::new(Scripts, "js/**/*.js", "js", MinSuffix).writes(&["js"]),
        PathEntry::new(Styles, "scss/style.scss", "css", MinRename("css"))
            .watch(&["scss/**/*.scss"])
            .writes(&["css"]),
        PathEntry::new(Markup, "*.html", "", Same)
            .watch(&["**/*.html"])
            .writes(&["html"]),
        PathEntry::new(Files, "files/**/*.*", "files", Same).writes(&[ANY_EXTENSION]),
        PathEntry::new(Images, "img/**/*.{jpg,png,jpeg,gif}", "img", Same)
            .watch(&["img/**/*.{jpg,png,jpeg,gif,webp}"])
            .writes(&["jpg", "png", "jpeg", "gif", "webp"]),
        PathEntry::new(Svg, "img/**/*.svg", "img", Same)
            .exclude(&["img/sprite/*.svg"])
            .writes(&["svg"]),
        PathEntry::new(Sprite, "img/sprite/*.svg", "img", Combined(SPRITE_NAME)).writes(&["svg"]),
        PathEntry::new(Fonts, "fonts/*.{woff,woff2}", "fonts", Same)
            .watch(&[])
            .writes(&["woff", "woff2"]),
    ]
}

/// A watched kind with its compiled watch globs.
#[derive(Clone)]
pub struct Subscription {
    pub kind: AssetKind,
    pub matcher: Matcher,
}

/// Validated mapping from asset kind to globs and destination.
#[derive(Debug, Clone)]
pub struct PathTable {
    source_root: PathBuf,
    dest_root: PathBuf,
    /// Indexed by `AssetKind::index`.
    entries: Vec<PathEntry>,
}

impl PathTable {
    /// Build and validate the default table for the configured directories.
    pub fn from_config(config: &PipelineConfig) -> Result<Self, ConfigError> {
        Self::new(
            config.dirs.source.clone(),
            config.dirs.destination.clone(),
            default_entries(),
        )
    }

    /// Build a table from explicit entries, enforcing the table invariants.
    pub fn new(
        source_root: PathBuf,
        dest_root: PathBuf,
        mut entries: Vec<PathEntry>,
    ) -> Result<Self, ConfigError> {
        entries.sort_by_key(|e| e.kind);
        validate(&source_root, &dest_root, &entries)?;
        Ok(Self {
            source_root,
            dest_root,
            entries,
        })
    }

    pub fn source_root(&self) -> &Path {
        &self.source_root
    }

    pub fn dest_root(&self) -> &Path {
        &self.dest_root
    }

    /// Entry for a kind. Validation guarantees exactly one per kind.
    pub fn entry(&self, kind: AssetKind) -> &PathEntry {
        &self.entries[kind.index()]
    }

    /// Absolute destination directory for a kind.
    pub fn dest_dir(&self, kind: AssetKind) -> PathBuf {
        self.dest_root.join(&self.entry(kind).dest)
    }

    /// Matcher over a kind's sources minus its exclusions.
    pub fn source_matcher(&self, kind: AssetKind) -> Result<Matcher, ConfigError> {
        let entry = self.entry(kind);
        Matcher::new(&self.source_root, &entry.sources, &entry.exclude)
    }

    /// Matcher over a kind's watch globs, `None` when the kind isn't watched.
    pub fn watch_matcher(&self, kind: AssetKind) -> Result<Option<Matcher>, ConfigError> {
        let entry = self.entry(kind);
        if entry.watch.is_empty() {
            return Ok(None);
        }
        Matcher::new(&self.source_root, &entry.watch, &entry.exclude).map(Some)
    }

    /// Watch subscriptions in [`AssetKind::WATCH_ORDER`]; unwatched kinds are left out.
    pub fn subscriptions(&self) -> Result<Vec<Subscription>, ConfigError> {
        let mut subscriptions = Vec::new();
        for kind in AssetKind::WATCH_ORDER {
            if let Some(matcher) = self.watch_matcher(kind)? {
                subscriptions.push(Subscription { kind, matcher });
            }
        }
        Ok(subscriptions)
    }

    /// All source files currently matching a kind.
    pub fn scan(&self, kind: AssetKind) -> Result<Vec<SourceFile>, ConfigError> {
        let matcher = self.source_matcher(kind)?;
        Ok(scan(&self.source_root, &matcher, &self.entry(kind).base()))
    }

    /// Output location for a source path relative to the kind's glob base.
    pub fn output_path(&self, kind: AssetKind, relative: &Path) -> PathBuf {
        let dest = self.dest_dir(kind);
        match self.entry(kind).output {
            OutputRule::Same => dest.join(relative),
            OutputRule::MinSuffix => dest.join(min_name(relative, None)),
            OutputRule::MinRename(ext) => dest.join(min_name(relative, Some(ext))),
            OutputRule::Combined(name) => dest.join(name),
        }
    }
}

/// `dir/name.ext` -> `dir/name.min.<ext or new_ext>`
fn min_name(relative: &Path, new_ext: Option<&str>) -> PathBuf {
    let stem = relative
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let ext = new_ext
        .map(str::to_string)
        .or_else(|| relative.extension().map(|e| e.to_string_lossy().into_owned()));

    let name = match ext {
        Some(ext) => format!("{stem}.min.{ext}"),
        None => format!("{stem}.min"),
    };
    relative.with_file_name(name)
}

/// Check the table invariants.
fn validate(source_root: &Path, dest_root: &Path, entries: &[PathEntry]) -> Result<(), ConfigError> {
    for (index, kind) in AssetKind::ALL.iter().enumerate() {
        let count = entries.iter().filter(|e| e.kind == *kind).count();
        if count != 1 {
            return Err(ConfigError::PathTable(format!(
                "asset kind `{kind}` must have exactly one entry, found {count}"
            )));
        }
        debug_assert_eq!(entries[index].kind, *kind);
    }

    if is_within(dest_root, source_root) || is_within(source_root, dest_root) {
        return Err(ConfigError::PathTable(format!(
            "source `{}` and destination `{}` must not contain each other",
            source_root.display(),
            dest_root.display()
        )));
    }

    for (i, a) in entries.iter().enumerate() {
        if a.sources.is_empty() {
            return Err(ConfigError::PathTable(format!("`{}` has no source globs", a.kind)));
        }

        for b in &entries[i + 1..] {
            check_pair(a, b)?;
            check_pair(b, a)?;
        }
    }

    Ok(())
}

/// Destination overlap rules between two kinds (checked in both orders).
fn check_pair(a: &PathEntry, b: &PathEntry) -> Result<(), ConfigError> {
    if a.dest == b.dest {
        let separated = a.excludes_sources_of(b) || b.excludes_sources_of(a);
        if a.writes_extension_of(b) && !separated {
            return Err(ConfigError::PathTable(format!(
                "`{}` and `{}` write the same file types into `{}`",
                a.kind,
                b.kind,
                a.dest.display()
            )));
        }
        return Ok(());
    }

    if b.dest.starts_with(&a.dest) && a.is_recursive() {
        return Err(ConfigError::PathTable(format!(
            "`{}` writes recursively into `{}`, which contains `{}`'s destination `{}`",
            a.kind,
            a.dest.display(),
            b.kind,
            b.dest.display()
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> PathTable {
        PathTable::new(
            PathBuf::from("/site/src"),
            PathBuf::from("/site/build"),
            default_entries(),
        )
        .unwrap()
    }

    #[test]
    fn test_default_table_is_valid() {
        let table = table();
        for kind in AssetKind::ALL {
            assert_eq!(table.entry(kind).kind, kind);
        }
    }

    #[test]
    fn test_dest_dirs() {
        let table = table();
        assert_eq!(table.dest_dir(AssetKind::Scripts), PathBuf::from("/site/build/js"));
        assert_eq!(table.dest_dir(AssetKind::Markup), PathBuf::from("/site/build"));
        assert_eq!(table.dest_dir(AssetKind::Sprite), PathBuf::from("/site/build/img"));
    }

    #[test]
    fn test_output_naming() {
        let table = table();
        assert_eq!(
            table.output_path(AssetKind::Scripts, Path::new("vendor/lib.js")),
            PathBuf::from("/site/build/js/vendor/lib.min.js")
        );
        assert_eq!(
            table.output_path(AssetKind::Styles, Path::new("style.scss")),
            PathBuf::from("/site/build/css/style.min.css")
        );
        assert_eq!(
            table.output_path(AssetKind::Sprite, Path::new("a.svg")),
            PathBuf::from("/site/build/img/sprite.svg")
        );
        assert_eq!(
            table.output_path(AssetKind::Images, Path::new("photos/x.png")),
            PathBuf::from("/site/build/img/photos/x.png")
        );
        assert_eq!(
            table.output_path(AssetKind::Markup, Path::new("index.html")),
            PathBuf::from("/site/build/index.html")
        );
    }

    #[test]
    fn test_fonts_not_watched() {
        let table = table();
        assert!(table.watch_matcher(AssetKind::Fonts).unwrap().is_none());
        assert!(table.watch_matcher(AssetKind::Styles).unwrap().is_some());
    }

    #[test]
    fn test_subscriptions() {
        let table = table();
        let subscriptions = table.subscriptions().unwrap();
        let kinds: Vec<_> = subscriptions.iter().map(|s| s.kind).collect();
        assert_eq!(
            kinds,
            vec![
                AssetKind::Files,
                AssetKind::Markup,
                AssetKind::Styles,
                AssetKind::Scripts,
                AssetKind::Images,
                AssetKind::Sprite,
                AssetKind::Svg,
            ]
        );

        let svg = &subscriptions[6];
        assert!(svg.matcher.is_match(Path::new("img/logo.svg")));
        assert!(!svg.matcher.is_match(Path::new("img/sprite/a.svg")));
    }

    #[test]
    fn test_reject_missing_kind() {
        let mut entries = default_entries();
        entries.retain(|e| e.kind != AssetKind::Fonts);
        let err = PathTable::new("/s".into(), "/d".into(), entries).unwrap_err();
        assert!(matches!(err, ConfigError::PathTable(_)));
    }

    #[test]
    fn test_reject_duplicate_kind() {
        let mut entries = default_entries();
        entries.push(entries[0].clone());
        assert!(PathTable::new("/s".into(), "/d".into(), entries).is_err());
    }

    #[test]
    fn test_reject_nested_roots() {
        let err = PathTable::new("/site".into(), "/site/build".into(), default_entries());
        assert!(err.is_err());
        let err = PathTable::new("/site/src/out".into(), "/site/src".into(), default_entries());
        assert!(err.is_err());
    }

    #[test]
    fn test_reject_same_dest_same_extension() {
        let mut entries = default_entries();
        // Without the exclusion, svg and sprite both write .svg into img/
        for entry in &mut entries {
            if entry.kind == AssetKind::Svg {
                entry.exclude.clear();
            }
        }
        let err = PathTable::new("/s".into(), "/d".into(), entries).unwrap_err();
        assert!(err.to_string().contains("img"));
    }

    #[test]
    fn test_reject_recursive_into_other_dest() {
        let mut entries = default_entries();
        for entry in &mut entries {
            if entry.kind == AssetKind::Files {
                entry.dest = PathBuf::new();
            }
        }
        assert!(PathTable::new("/s".into(), "/d".into(), entries).is_err());
    }

    #[test]
    fn test_min_name_without_extension() {
        assert_eq!(min_name(Path::new("LICENSE"), None), PathBuf::from("LICENSE.min"));
    }
}
