//! Role directories and item path derivation.
//!
//! Every item lives in exactly one of four directories. The registry owns
//! those directories, creates them on startup, and translates an item's path
//! under the incoming directory into its sibling paths under the others.

use std::fmt;
use std::path::{Component, Path, PathBuf};

use crate::dispatch::DispatchError;

use super::WatchError;

/// Purpose of a role directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Incoming,
    Processing,
    Output,
    Failure,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Role::Incoming => "input",
            Role::Processing => "processing",
            Role::Output => "output",
            Role::Failure => "fail",
        };
        f.write_str(label)
    }
}

/// A normalized, existing directory with a fixed role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleDirectory {
    role: Role,
    path: PathBuf,
}

impl RoleDirectory {
    /// Normalize `path`, create it (with parents) if absent, and resolve it
    /// to its canonical form.
    ///
    /// Idempotent: an existing directory is accepted as is.
    pub fn ensure(role: Role, path: impl AsRef<Path>) -> Result<Self, WatchError> {
        let path = normalize(path.as_ref()).map_err(|source| WatchError::DirectoryCreate {
            role: role.to_string(),
            path: path.as_ref().to_path_buf(),
            source,
        })?;

        if !path.is_dir() {
            // Fails with AlreadyExists when a file sits at the path
            std::fs::create_dir_all(&path).map_err(|source| WatchError::DirectoryCreate {
                role: role.to_string(),
                path: path.clone(),
                source,
            })?;
            crate::log_event!("registry", "created", "{role} path {}", path.display());
        }

        // Native backends report resolved paths (e.g. /private/var on macOS)
        let path = path
            .canonicalize()
            .map_err(|source| WatchError::DirectoryCreate {
                role: role.to_string(),
                path: path.clone(),
                source,
            })?;

        Ok(Self { role, path })
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Strip trailing separators and `.` segments, and anchor relative paths
/// at the current directory.
fn normalize(path: &Path) -> std::io::Result<PathBuf> {
    let cleaned: PathBuf = path
        .components()
        .filter(|c| !matches!(c, Component::CurDir))
        .collect();
    let cleaned = if cleaned.as_os_str().is_empty() {
        PathBuf::from(".")
    } else {
        cleaned
    };
    if cleaned.is_absolute() {
        Ok(cleaned)
    } else {
        std::path::absolute(&cleaned)
    }
}

/// An item's location in each role directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemPaths {
    /// Path relative to the incoming directory; also the command argument.
    pub name: PathBuf,
    pub incoming: PathBuf,
    pub processing: PathBuf,
    pub output: PathBuf,
    pub failure: PathBuf,
}

/// The four role directories, fixed for the process lifetime.
#[derive(Debug, Clone)]
pub struct PathRegistry {
    incoming: RoleDirectory,
    processing: RoleDirectory,
    output: RoleDirectory,
    failure: RoleDirectory,
}

impl PathRegistry {
    /// Ensure all four directories exist.
    pub fn new(
        incoming: impl AsRef<Path>,
        processing: impl AsRef<Path>,
        output: impl AsRef<Path>,
        failure: impl AsRef<Path>,
    ) -> Result<Self, WatchError> {
        Ok(Self {
            incoming: RoleDirectory::ensure(Role::Incoming, incoming)?,
            processing: RoleDirectory::ensure(Role::Processing, processing)?,
            output: RoleDirectory::ensure(Role::Output, output)?,
            failure: RoleDirectory::ensure(Role::Failure, failure)?,
        })
    }

    pub fn incoming(&self) -> &Path {
        self.incoming.path()
    }

    pub fn processing(&self) -> &Path {
        self.processing.path()
    }

    pub fn output(&self) -> &Path {
        self.output.path()
    }

    pub fn failure(&self) -> &Path {
        self.failure.path()
    }

    pub fn directory(&self, role: Role) -> &RoleDirectory {
        match role {
            Role::Incoming => &self.incoming,
            Role::Processing => &self.processing,
            Role::Output => &self.output,
            Role::Failure => &self.failure,
        }
    }

    /// Derive an item's sibling paths from its path under the incoming directory.
    ///
    /// Paths reaching the incoming directory through a symlink are accepted;
    /// the item itself is never resolved, only its parent.
    pub fn locate(&self, item_path: &Path) -> Result<ItemPaths, DispatchError> {
        let name = self
            .relative_name(item_path)
            .or_else(|| {
                let parent = item_path.parent()?.canonicalize().ok()?;
                self.relative_name(&parent.join(item_path.file_name()?))
            })
            .ok_or_else(|| DispatchError::OutsideIncoming {
                path: item_path.to_path_buf(),
            })?;

        Ok(ItemPaths {
            incoming: self.incoming().join(&name),
            processing: self.processing().join(&name),
            output: self.output().join(&name),
            failure: self.failure().join(&name),
            name,
        })
    }

    fn relative_name(&self, path: &Path) -> Option<PathBuf> {
        path.strip_prefix(self.incoming())
            .ok()
            .filter(|rel| !rel.as_os_str().is_empty())
            .map(Path::to_path_buf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn registry(root: &Path) -> PathRegistry {
        PathRegistry::new(
            root.join("in"),
            root.join("proc"),
            root.join("out"),
            root.join("fail"),
        )
        .unwrap()
    }

    #[test]
    fn test_ensure_creates_missing_directories() {
        let temp = TempDir::new().unwrap();
        let target = temp.path().join("a").join("b").join("in");

        let dir = RoleDirectory::ensure(Role::Incoming, &target).unwrap();

        assert!(target.is_dir());
        assert_eq!(dir.path(), target.as_path());
        assert_eq!(dir.role(), Role::Incoming);
    }

    #[test]
    fn test_ensure_strips_trailing_separator() {
        let temp = TempDir::new().unwrap();
        let raw = format!("{}/out/", temp.path().display());

        let dir = RoleDirectory::ensure(Role::Output, &raw).unwrap();

        assert_eq!(dir.path(), temp.path().join("out").as_path());
        assert!(!dir.path().to_string_lossy().ends_with('/'));
    }

    #[test]
    fn test_ensure_is_idempotent() {
        let temp = TempDir::new().unwrap();
        let first = registry(temp.path());
        std::fs::write(temp.path().join("in").join("keep.txt"), b"x").unwrap();

        let second = registry(temp.path());

        assert_eq!(first.incoming(), second.incoming());
        assert!(temp.path().join("in").join("keep.txt").exists());
    }

    #[test]
    fn test_ensure_fails_when_blocked_by_file() {
        let temp = TempDir::new().unwrap();
        let blocker = temp.path().join("blocker");
        std::fs::write(&blocker, b"not a dir").unwrap();

        let err = RoleDirectory::ensure(Role::Failure, blocker.join("fail")).unwrap_err();
        assert!(matches!(err, WatchError::DirectoryCreate { .. }));
    }

    #[test]
    fn test_ensure_rejects_file_in_place_of_directory() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("out");
        std::fs::write(&file, b"x").unwrap();

        assert!(RoleDirectory::ensure(Role::Output, &file).is_err());
    }

    #[test]
    fn test_locate_substitutes_root() {
        let temp = TempDir::new().unwrap();
        let registry = registry(temp.path());

        let item = registry
            .locate(&temp.path().join("in").join("a.csv"))
            .unwrap();

        assert_eq!(item.name, PathBuf::from("a.csv"));
        assert_eq!(item.processing, temp.path().join("proc").join("a.csv"));
        assert_eq!(item.output, temp.path().join("out").join("a.csv"));
        assert_eq!(item.failure, temp.path().join("fail").join("a.csv"));
    }

    #[cfg(unix)]
    #[test]
    fn test_registry_resolves_symlinked_roots() {
        let temp = TempDir::new().unwrap();
        let real = temp.path().join("real");
        std::fs::create_dir(&real).unwrap();
        let alias = temp.path().join("alias");
        std::os::unix::fs::symlink(&real, &alias).unwrap();

        let registry = registry(&alias);
        assert_eq!(
            registry.incoming(),
            real.canonicalize().unwrap().join("in").as_path()
        );

        // Through the alias and through the resolved path alike
        let via_alias = registry.locate(&alias.join("in").join("a.csv")).unwrap();
        let via_real = registry.locate(&real.join("in").join("a.csv")).unwrap();
        assert_eq!(via_alias, via_real);
        assert_eq!(via_alias.name, PathBuf::from("a.csv"));
        assert!(via_alias.output.starts_with(real.canonicalize().unwrap()));
    }

    #[test]
    fn test_locate_rejects_foreign_paths() {
        let temp = TempDir::new().unwrap();
        let registry = registry(temp.path());

        assert!(registry.locate(&temp.path().join("out").join("a")).is_err());
        assert!(registry.locate(registry.incoming()).is_err());
    }
}
