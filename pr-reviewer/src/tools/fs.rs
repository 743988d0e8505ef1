//! Read-only filesystem tools over the checked-out workspace.
//!
//! Paths come from the model. They must be relative, must not contain `..`,
//! and must still be inside the workspace after symlinks are resolved.

use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use tracing::debug;
use walkdir::{DirEntry, WalkDir};

use super::{ParamSpec, ParamType, ToolArgs, ToolDescriptor, ToolError};

/// Directory names never listed (build output and version control).
pub const SKIPPED_DIRS: &[&str] = &[".git", "build", "gradle", ".gradle", "target", "node_modules"];

/// Upper bound for the `depth` argument of `list_files`.
pub const MAX_LIST_DEPTH: usize = 3;

pub const LIST_FILES: &str = "list_files";
pub const READ_FILE: &str = "read_file";

pub fn list_files_descriptor() -> ToolDescriptor {
    ToolDescriptor::new(
        LIST_FILES,
        "List files and directories in the repository to find related classes or configuration.",
        vec![
            ParamSpec::optional(
                "directory",
                ParamType::String,
                "Repository-relative directory to list. Defaults to the repository root.",
            ),
            ParamSpec::optional(
                "depth",
                ParamType::Integer,
                "How many levels to descend (1-3). Defaults to 1.",
            ),
        ],
    )
}

pub fn read_file_descriptor() -> ToolDescriptor {
    ToolDescriptor::new(
        READ_FILE,
        "Read the full content of a repository file to understand context or find exact line numbers.",
        vec![ParamSpec::required(
            "path",
            ParamType::String,
            "Repository-relative path of the file.",
        )],
    )
}

/// Canonical workspace root shared by the filesystem tools.
#[derive(Debug, Clone)]
pub struct Workspace {
    root: Arc<PathBuf>,
}

impl Workspace {
    /// Opens `root`, which must exist and be a directory.
    pub fn open(root: &Path) -> io::Result<Self> {
        let root = root.canonicalize()?;
        if !root.is_dir() {
            return Err(io::Error::new(
                io::ErrorKind::NotADirectory,
                format!("{} is not a directory", root.display()),
            ));
        }
        Ok(Self {
            root: Arc::new(root),
        })
    }

    /// Maps a model-supplied path onto an existing path inside the workspace.
    pub fn resolve(&self, raw: &str) -> Result<PathBuf, ToolError> {
        let trimmed = raw.trim();
        let rel = Path::new(trimmed);

        if rel.is_absolute() || trimmed.starts_with('/') || trimmed.starts_with('\\') {
            return Err(ToolError::PathRejected {
                path: raw.to_string(),
                reason: "absolute paths are not allowed",
            });
        }
        if rel
            .components()
            .any(|c| matches!(c, Component::ParentDir | Component::Prefix(_) | Component::RootDir))
        {
            return Err(ToolError::PathRejected {
                path: raw.to_string(),
                reason: "path escapes the workspace",
            });
        }

        let joined = self.root.join(rel);
        let resolved = joined.canonicalize().map_err(|source| ToolError::Io {
            path: raw.to_string(),
            source,
        })?;

        if !resolved.starts_with(self.root.as_path()) {
            return Err(ToolError::PathRejected {
                path: raw.to_string(),
                reason: "path resolves outside the workspace",
            });
        }
        Ok(resolved)
    }

    /// `list_files(directory = ".", depth = 1)`.
    ///
    /// One `[DIR] rel` / `[FILE] rel` line per entry, sorted, relative to
    /// the listed directory with `/` separators.
    pub fn list_files(&self, args: ToolArgs<'_>) -> Result<String, ToolError> {
        let directory = args
            .str("directory")
            .filter(|d| !d.trim().is_empty())
            .unwrap_or(".");
        let depth = args
            .integer("depth")
            .unwrap_or(1)
            .clamp(1, MAX_LIST_DEPTH as i64) as usize;

        let dir = self.resolve(directory)?;
        if !dir.is_dir() {
            return Err(ToolError::NotADirectory(directory.to_string()));
        }

        let walker = WalkDir::new(&dir)
            .min_depth(1)
            .max_depth(depth)
            .follow_links(false)
            .into_iter()
            .filter_entry(keep_entry);

        let mut lines = Vec::new();
        for entry in walker {
            let entry = entry.map_err(|e| ToolError::Io {
                path: directory.to_string(),
                source: e.into(),
            })?;
            let rel = entry
                .path()
                .strip_prefix(&dir)
                .unwrap_or(entry.path())
                .components()
                .map(|c| c.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/");
            let tag = if entry.file_type().is_dir() {
                "[DIR]"
            } else {
                "[FILE]"
            };
            lines.push(format!("{tag} {rel}"));
        }
        lines.sort();

        debug!(directory, depth, entries = lines.len(), "list_files");
        if lines.is_empty() {
            return Ok("(empty directory)".to_string());
        }
        Ok(lines.join("\n"))
    }

    /// `read_file(path)`: full UTF-8 text of a workspace file.
    pub fn read_file(&self, args: ToolArgs<'_>) -> Result<String, ToolError> {
        let raw = args.require_str("path")?;
        let path = self.resolve(raw)?;
        if !path.is_file() {
            return Err(ToolError::NotAFile(raw.to_string()));
        }
        let text = fs::read_to_string(&path).map_err(|source| ToolError::Io {
            path: raw.to_string(),
            source,
        })?;
        debug!(path = raw, bytes = text.len(), "read_file");
        Ok(text)
    }
}

/// Hidden entries and build/VCS directories are pruned from listings.
fn keep_entry(e: &DirEntry) -> bool {
    if e.depth() == 0 {
        return true;
    }
    let name = e.file_name().to_string_lossy();
    !(name.starts_with('.') || SKIPPED_DIRS.contains(&name.as_ref()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Map, Value, json};

    fn args(v: Value) -> Map<String, Value> {
        v.as_object().cloned().unwrap_or_default()
    }

    fn sample_repo() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("src/main/java")).unwrap();
        fs::create_dir_all(root.join("build/classes")).unwrap();
        fs::create_dir_all(root.join(".git")).unwrap();
        fs::create_dir_all(root.join("gradle")).unwrap();
        fs::write(root.join("A.java"), "class A {}\n").unwrap();
        fs::write(root.join(".env"), "SECRET=1\n").unwrap();
        fs::write(root.join("src/main/java/B.java"), "class B {}\n").unwrap();
        dir
    }

    #[test]
    fn lists_root_skipping_hidden_and_build_dirs() {
        let repo = sample_repo();
        let ws = Workspace::open(repo.path()).unwrap();
        let a = args(json!({"directory": "."}));
        let out = ws.list_files(ToolArgs::new(&a)).unwrap();
        assert_eq!(out, "[DIR] src\n[FILE] A.java");
    }

    #[test]
    fn lists_with_depth_and_default_directory() {
        let repo = sample_repo();
        let ws = Workspace::open(repo.path()).unwrap();
        let a = args(json!({"depth": 3}));
        let out = ws.list_files(ToolArgs::new(&a)).unwrap();
        let lines: Vec<_> = out.lines().collect();
        assert!(lines.contains(&"[DIR] src/main"));
        assert!(lines.contains(&"[DIR] src/main/java"));
        assert!(!out.contains("B.java"), "depth 3 stops at src/main/java: {out}");
        assert!(!out.contains("build"));

        let deep = args(json!({"directory": "src", "depth": 99}));
        let out = ws.list_files(ToolArgs::new(&deep)).unwrap();
        assert!(out.contains("[FILE] main/java/B.java"));
    }

    #[test]
    fn list_rejects_files_and_escapes() {
        let repo = sample_repo();
        let ws = Workspace::open(repo.path()).unwrap();

        let file = args(json!({"directory": "A.java"}));
        assert!(matches!(
            ws.list_files(ToolArgs::new(&file)),
            Err(ToolError::NotADirectory(_))
        ));

        let up = args(json!({"directory": "../"}));
        assert!(matches!(
            ws.list_files(ToolArgs::new(&up)),
            Err(ToolError::PathRejected { .. })
        ));
    }

    #[test]
    fn reads_file_text() {
        let repo = sample_repo();
        let ws = Workspace::open(repo.path()).unwrap();
        let a = args(json!({"path": "src/main/java/B.java"}));
        assert_eq!(ws.read_file(ToolArgs::new(&a)).unwrap(), "class B {}\n");
    }

    #[test]
    fn read_reports_missing_and_directories() {
        let repo = sample_repo();
        let ws = Workspace::open(repo.path()).unwrap();

        let missing = args(json!({"path": "Nope.java"}));
        let err = ws.read_file(ToolArgs::new(&missing)).unwrap_err();
        assert!(matches!(err, ToolError::Io { .. }));
        assert!(err.to_string().contains("Nope.java"));

        let dir = args(json!({"path": "src"}));
        assert!(matches!(
            ws.read_file(ToolArgs::new(&dir)),
            Err(ToolError::NotAFile(_))
        ));
    }

    #[test]
    fn rejects_absolute_and_parent_paths() {
        let repo = sample_repo();
        let ws = Workspace::open(repo.path()).unwrap();
        for bad in ["/etc/passwd", "../outside.txt", "src/../../x", "\\windows"] {
            let a = args(json!({"path": bad}));
            let err = ws.read_file(ToolArgs::new(&a)).unwrap_err();
            assert!(
                matches!(err, ToolError::PathRejected { .. }),
                "{bad} should be rejected, got {err}"
            );
        }
    }

    #[cfg(unix)]
    #[test]
    fn rejects_symlinks_leaving_the_workspace() {
        let repo = sample_repo();
        let outside = tempfile::tempdir().unwrap();
        fs::write(outside.path().join("secret.txt"), "top secret").unwrap();
        std::os::unix::fs::symlink(outside.path().join("secret.txt"), repo.path().join("link.txt"))
            .unwrap();

        let ws = Workspace::open(repo.path()).unwrap();
        let a = args(json!({"path": "link.txt"}));
        let err = ws.read_file(ToolArgs::new(&a)).unwrap_err();
        assert!(matches!(err, ToolError::PathRejected { .. }));
    }

    #[test]
    fn empty_directory_is_reported() {
        let repo = tempfile::tempdir().unwrap();
        let ws = Workspace::open(repo.path()).unwrap();
        let a = args(json!({}));
        assert_eq!(ws.list_files(ToolArgs::new(&a)).unwrap(), "(empty directory)");
    }
}
