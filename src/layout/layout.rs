use std::borrow::Cow;
use std::fs;
use std::path::{Path, PathBuf};

use hashlink::LinkedHashMap;
use saphyr::{LoadableYamlNode, Scalar, Yaml};
use snafu::prelude::*;
use tracing::debug;

use crate::ext::PathExt;
use crate::filesystem::{
    Child, DirectoryTree, NodeId, StaticFile, TreeError, UnsupportedNodeTypeSnafu,
};

pub const DEFAULT_LAYOUT_FILE_NAME: &str = "layout.yaml";

const DEFAULT_ROOT: &str = ".";

/// One entry of a layout, named by its key in the parent mapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LayoutEntry {
    /// `name: ~`, an empty directory inheriting the parent's settings.
    Unset,
    Directory(Vec<(String, LayoutEntry)>),
    File(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    root: Option<PathBuf>,
    backup: bool,
    entries: Vec<(String, LayoutEntry)>,
}

impl Layout {
    pub fn read(path: &Path) -> Result<Self, LayoutError> {
        debug!("Reading layout file: {}", path.best_effort_display());
        let contents = fs::read_to_string(path).context(ReadSnafu {
            file_path: path.best_effort_display(),
        })?;
        debug!("Successfully read layout file: {} bytes", contents.len());
        contents.as_str().try_into()
    }

    pub fn root(&self) -> Option<&Path> {
        self.root.as_deref()
    }

    pub fn backup(&self) -> bool {
        self.backup
    }

    pub fn entries(&self) -> &[(String, LayoutEntry)] {
        &self.entries
    }

    /// Builds the tree under `root`, falling back to the layout's own `root`
    /// and then to the current directory. `force_backup` turns backups on
    /// even when the layout leaves them off.
    pub fn build(
        &self,
        root: Option<&Path>,
        force_backup: bool,
    ) -> Result<DirectoryTree, LayoutError> {
        let root = root
            .or(self.root.as_deref())
            .unwrap_or(Path::new(DEFAULT_ROOT));
        let backup = self.backup || force_backup;
        debug!(
            "Building tree at {} (backup: {})",
            root.best_effort_display(),
            backup
        );

        let name = root.to_str().context(NonUtf8RootSnafu { root })?;
        let mut tree = DirectoryTree::new(name, backup);
        let top = tree.top();
        Self::populate(&mut tree, top, &self.entries).context(BuildSnafu)?;
        Ok(tree)
    }

    fn populate(
        tree: &mut DirectoryTree,
        parent: NodeId,
        entries: &[(String, LayoutEntry)],
    ) -> Result<(), TreeError> {
        for (name, entry) in entries {
            match entry {
                LayoutEntry::Unset => {
                    tree.set_child(parent, name.as_str(), Child::Unset)?;
                }
                LayoutEntry::File(contents) => {
                    let handler = StaticFile::new(contents.as_bytes());
                    tree.set_child(parent, name.as_str(), Child::file(handler))?;
                }
                LayoutEntry::Directory(children) => {
                    let directory = tree.set_child(parent, name.as_str(), Child::Unset)?;
                    Self::populate(tree, directory, children)?;
                }
            }
        }
        Ok(())
    }

    fn parse_entries(
        path: &str,
        mapping: &LinkedHashMap<Yaml, Yaml>,
    ) -> Result<Vec<(String, LayoutEntry)>, LayoutError> {
        mapping
            .iter()
            .map(|(key, value)| -> Result<(String, LayoutEntry), LayoutError> {
                let name = key
                    .as_str()
                    .context(NonStringNameSnafu { path })?
                    .to_string();
                let entry_path = format!("{path}/{name}");
                let entry = Self::parse_entry(&entry_path, value)?;
                Ok((name, entry))
            })
            .collect()
    }

    fn parse_entry(path: &str, value: &Yaml) -> Result<LayoutEntry, LayoutError> {
        if let Some(mapping) = value.as_mapping() {
            return Ok(LayoutEntry::Directory(Self::parse_entries(path, mapping)?));
        }

        match value {
            Yaml::Value(Scalar::Null) => Ok(LayoutEntry::Unset),
            Yaml::Value(Scalar::String(contents)) => Ok(LayoutEntry::File(contents.to_string())),
            other => UnsupportedNodeTypeSnafu {
                path,
                found: describe(other),
            }
            .fail()
            .context(InvalidEntrySnafu),
        }
    }
}

fn describe(value: &Yaml) -> &'static str {
    match value {
        Yaml::Value(Scalar::Boolean(_)) => "boolean",
        Yaml::Value(Scalar::Integer(_)) => "integer",
        Yaml::Value(Scalar::FloatingPoint(_)) => "float",
        Yaml::Sequence(_) => "sequence",
        Yaml::Alias(_) => "alias",
        _ => "unrecognized value",
    }
}

fn key(name: &'static str) -> Yaml<'static> {
    Yaml::Value(Scalar::String(Cow::Borrowed(name)))
}

impl TryFrom<&str> for Layout {
    type Error = LayoutError;

    fn try_from(contents: &str) -> Result<Self, Self::Error> {
        let documents = Yaml::load_from_str(contents).context(ParseSnafu)?;
        let document = documents.first().context(MalformedLayoutSnafu)?;
        let top_level = document.as_mapping().context(TopLevelNotMapSnafu)?;

        let root = match top_level.get(&key("root")) {
            None | Some(Yaml::Value(Scalar::Null)) => None,
            Some(value) => Some(PathBuf::from(
                value.as_str().context(InvalidSettingSnafu { setting: "root" })?,
            )),
        };

        let backup = match top_level.get(&key("backup")) {
            None | Some(Yaml::Value(Scalar::Null)) => false,
            Some(Yaml::Value(Scalar::Boolean(backup))) => *backup,
            Some(_) => return InvalidSettingSnafu { setting: "backup" }.fail(),
        };

        let entries = match top_level.get(&key("tree")) {
            None | Some(Yaml::Value(Scalar::Null)) => Vec::new(),
            Some(tree) => {
                let mapping = tree.as_mapping().context(TreeNotMapSnafu)?;
                Self::parse_entries("", mapping)?
            }
        };

        Ok(Layout {
            root,
            backup,
            entries,
        })
    }
}

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum LayoutError {
    #[snafu(display("Failed to read the layout file: {}", file_path))]
    ReadError {
        file_path: String,
        source: std::io::Error,
    },
    #[snafu(display("Failed to parse the layout file"))]
    ParseError { source: saphyr::ScanError },
    #[snafu(display("Improperly formatted layout file"))]
    MalformedLayoutError,
    #[snafu(display("Top level of the layout should be a map"))]
    TopLevelNotMapError,
    #[snafu(display("The 'tree' section should be a map"))]
    TreeNotMapError,
    #[snafu(display("Setting '{}' has an unexpected value", setting))]
    InvalidSettingError { setting: String },
    #[snafu(display("Entry names under '{}' must be strings", path))]
    NonStringNameError { path: String },
    #[snafu(display("Invalid layout entry"))]
    InvalidEntryError { source: TreeError },
    #[snafu(display("Root {} is not valid UTF-8", root.best_effort_display()))]
    NonUtf8RootError { root: PathBuf },
    #[snafu(display("Failed to build the tree from the layout"))]
    BuildError { source: TreeError },
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use tempfile::TempDir;

    const SITE_LAYOUT: &str = r#"
root: out
backup: true
tree:
  README.md: "hello\n"
  src:
    main.rs: "fn main() {}\n"
    bin: {}
  cache: ~
"#;

    #[test]
    fn layout_returns_error_on_nonexistent_file() {
        let result = Layout::read(Path::new("nonexistent-layout.yaml"));
        assert!(matches!(result, Err(LayoutError::ReadError { .. })));
    }

    #[test]
    fn layout_returns_error_on_invalid_yaml() {
        let result: Result<Layout, _> = "invalid: yaml: content: [unclosed".try_into();
        assert!(matches!(result, Err(LayoutError::ParseError { .. })));
    }

    #[test]
    fn layout_returns_error_on_empty_file() {
        let result: Result<Layout, _> = "".try_into();
        assert!(matches!(result, Err(LayoutError::MalformedLayoutError)));
    }

    #[rstest]
    #[case::sequence("- item1\n- item2")]
    #[case::scalar("just a string")]
    fn layout_requires_a_top_level_map(#[case] contents: &str) {
        let result: Result<Layout, _> = contents.try_into();
        assert!(matches!(result, Err(LayoutError::TopLevelNotMapError)));
    }

    #[test]
    fn layout_requires_tree_to_be_a_map() {
        let result: Result<Layout, _> = "tree:\n  - a\n  - b".try_into();
        assert!(matches!(result, Err(LayoutError::TreeNotMapError)));
    }

    #[test]
    fn layout_without_tree_is_empty() {
        let layout: Layout = "backup: false".try_into().expect("Failed to parse");
        assert!(layout.entries().is_empty());
        assert!(!layout.backup());
        assert_eq!(layout.root(), None);
    }

    #[test]
    fn layout_parses_entries_in_order() {
        let layout: Layout = SITE_LAYOUT.try_into().expect("Failed to parse");

        assert_eq!(layout.root(), Some(Path::new("out")));
        assert!(layout.backup());
        assert_eq!(
            layout.entries(),
            &[
                (
                    "README.md".to_string(),
                    LayoutEntry::File("hello\n".to_string())
                ),
                (
                    "src".to_string(),
                    LayoutEntry::Directory(vec![
                        (
                            "main.rs".to_string(),
                            LayoutEntry::File("fn main() {}\n".to_string())
                        ),
                        ("bin".to_string(), LayoutEntry::Directory(Vec::new())),
                    ])
                ),
                ("cache".to_string(), LayoutEntry::Unset),
            ]
        );
    }

    #[rstest]
    #[case::sequence("tree:\n  src:\n    list: [1, 2]", "/src/list", "sequence")]
    #[case::integer("tree:\n  version: 3", "/version", "integer")]
    #[case::boolean("tree:\n  flag: true", "/flag", "boolean")]
    fn layout_rejects_unsupported_values(
        #[case] contents: &str,
        #[case] expected_path: &str,
        #[case] expected_found: &str,
    ) {
        let result: Result<Layout, _> = contents.try_into();

        match result {
            Err(LayoutError::InvalidEntryError {
                source: TreeError::UnsupportedNodeTypeError { path, found },
            }) => {
                assert_eq!(path, expected_path);
                assert_eq!(found, expected_found);
            }
            other => panic!("Expected UnsupportedNodeTypeError, got {other:?}"),
        }
    }

    #[test]
    fn layout_rejects_non_string_names() {
        let result: Result<Layout, _> = "tree:\n  123: \"numeric\"".try_into();
        assert!(matches!(result, Err(LayoutError::NonStringNameError { .. })));
    }

    #[rstest]
    #[case::backup("backup: yes please")]
    #[case::root("root: [a, b]")]
    fn layout_rejects_invalid_settings(#[case] contents: &str) {
        let result: Result<Layout, _> = contents.try_into();
        assert!(matches!(result, Err(LayoutError::InvalidSettingError { .. })));
    }

    #[test]
    fn build_uses_explicit_root_and_forced_backup() {
        let layout: Layout = "tree:\n  a:\n    b.txt: \"b\"".try_into().unwrap();

        let tree = layout
            .build(Some(Path::new("elsewhere")), true)
            .expect("Failed to build");

        let top = tree.top();
        assert_eq!(tree.abspath(top).unwrap(), PathBuf::from("elsewhere"));
        let a = tree.try_get(top, "a").unwrap().expect("Missing a");
        assert!(tree.directory(a).unwrap().backup());
        let b = tree.try_get(a, "b.txt").unwrap().expect("Missing b.txt");
        assert!(tree.node(b).unwrap().is_file());
    }

    #[rstest]
    #[case::parent("tree:\n  ../escaped.txt: \"x\"\n")]
    #[case::nested_parent("tree:\n  src:\n    ../../escaped.txt: \"x\"\n")]
    #[case::dot("tree:\n  .: ~\n")]
    fn layout_entries_cannot_leave_the_root(#[case] contents: &str) {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let root = temp_dir.path().join("out");
        let layout: Layout = contents.try_into().expect("Failed to parse");

        let result = layout.build(Some(&root), false);

        assert!(matches!(
            result,
            Err(LayoutError::BuildError {
                source: TreeError::InvalidNameError { .. }
            })
        ));
        assert!(!temp_dir.path().join("escaped.txt").exists());
        assert!(!root.exists());
    }

    #[cfg(unix)]
    #[test]
    fn build_rejects_non_utf8_root() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let layout: Layout = "tree:\n  a.txt: \"a\"".try_into().unwrap();
        let root = Path::new(OsStr::from_bytes(b"out\xff"));

        match layout.build(Some(root), false) {
            Err(LayoutError::NonUtf8RootError { root: reported }) => assert_eq!(reported, root),
            other => panic!("Expected NonUtf8RootError, got {other:?}"),
        }
    }

    #[test]
    fn built_layout_materializes() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let root = temp_dir.path().join("out");
        let layout: Layout = SITE_LAYOUT.try_into().unwrap();
        let mut tree = layout.build(Some(&root), false).unwrap();
        let top = tree.top();
        tree.mark_as_root(top).unwrap();

        tree.materialize(top).expect("Failed to materialize");

        assert_eq!(
            fs::read_to_string(root.join("README.md")).unwrap(),
            "hello\n"
        );
        assert_eq!(
            fs::read_to_string(root.join("src").join("main.rs")).unwrap(),
            "fn main() {}\n"
        );
        assert!(root.join("src").join("bin").is_dir());
        assert!(root.join("cache").is_dir());
    }
}
