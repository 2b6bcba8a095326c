use std::fmt;

use colored::Colorize;

use crate::filesystem::{DirectoryTree, NodeId, TreeError};

const INDENT: &str = "    ";
const FILE_BRANCH: &str = "|-- ";
const DIRECTORY_BRANCH: &str = "`-- ";

/// Human readable rendering of a tree, files before directories on every
/// level:
///
/// ```text
/// out
/// |-- x.txt
/// `-- subdir
///     |-- y.txt
/// ```
pub struct TreePrinter<'a> {
    tree: &'a DirectoryTree,
    colored: bool,
}

impl<'a> TreePrinter<'a> {
    pub fn new(tree: &'a DirectoryTree) -> Self {
        Self {
            tree,
            colored: false,
        }
    }

    /// Highlights directory names. The terminal still has the final say
    /// through `colored`'s own detection.
    pub fn with_color(mut self, colored: bool) -> Self {
        self.colored = colored;
        self
    }

    pub fn render(&self, id: NodeId) -> Result<String, TreeError> {
        let mut out = self.tree.abspath(id)?.display().to_string();
        out.push('\n');
        if self.tree.node(id)?.is_directory() {
            self.render_level(id, 0, &mut out)?;
        }
        Ok(out)
    }

    fn render_level(&self, id: NodeId, level: usize, out: &mut String) -> Result<(), TreeError> {
        let indent = INDENT.repeat(level);

        for (name, _) in self.tree.child_files(id)? {
            out.push_str(&format!("{indent}{FILE_BRANCH}{name}\n"));
        }

        for (name, child) in self.tree.child_directories(id)? {
            out.push_str(&format!(
                "{indent}{DIRECTORY_BRANCH}{}\n",
                self.directory_name(name)
            ));
            self.render_level(child, level + 1, out)?;
        }

        Ok(())
    }

    fn directory_name(&self, name: &str) -> String {
        if self.colored {
            name.blue().bold().to_string()
        } else {
            name.to_string()
        }
    }
}

impl fmt::Display for DirectoryTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered = TreePrinter::new(self)
            .render(self.top())
            .map_err(|_| fmt::Error)?;
        f.write_str(&rendered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filesystem::{Child, StaticFile};

    fn file() -> Child {
        Child::file(StaticFile::new(""))
    }

    #[test]
    fn files_come_before_directories_and_nest_one_level_deeper() {
        let mut tree = DirectoryTree::new("out", false);
        let top = tree.top();
        let subdir = tree.get_or_create(top, "subdir").unwrap();
        tree.set_child(subdir, "y.txt", file()).unwrap();
        tree.set_child(top, "x.txt", file()).unwrap();

        let rendered = TreePrinter::new(&tree).render(top).unwrap();

        assert_eq!(rendered, "out\n|-- x.txt\n`-- subdir\n    |-- y.txt\n");
    }

    #[test]
    fn insertion_order_is_kept_within_each_kind() {
        let mut tree = DirectoryTree::new("out", false);
        let top = tree.top();
        tree.get_or_create_path(top, ["b", "deep"]).unwrap();
        tree.set_child(top, "z.txt", file()).unwrap();
        tree.get_or_create(top, "a").unwrap();
        tree.set_child(top, "m.txt", file()).unwrap();

        let rendered = tree.to_string();

        let expected = "out\n\
                        |-- z.txt\n\
                        |-- m.txt\n\
                        `-- b\n    \
                        `-- deep\n\
                        `-- a\n";
        assert_eq!(rendered, expected);
    }

    #[test]
    fn rendering_a_subtree_starts_at_its_path() {
        let mut tree = DirectoryTree::new("out", false);
        let top = tree.top();
        let inner = tree.get_or_create_path(top, ["a", "b"]).unwrap();
        tree.set_child(inner, "leaf.txt", file()).unwrap();

        let rendered = TreePrinter::new(&tree).render(inner).unwrap();

        let header = std::path::Path::new("out").join("a").join("b");
        assert_eq!(rendered, format!("{}\n|-- leaf.txt\n", header.display()));
    }

    #[test]
    fn rendering_a_file_prints_only_its_path() {
        let mut tree = DirectoryTree::new("out", false);
        let top = tree.top();
        let leaf = tree.set_child(top, "leaf.txt", file()).unwrap();

        let rendered = TreePrinter::new(&tree).render(leaf).unwrap();

        assert!(rendered.ends_with("leaf.txt\n"));
        assert_eq!(rendered.lines().count(), 1);
    }
}
