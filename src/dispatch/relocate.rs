//! Moving items between role directories.

use std::fs;
use std::io;
use std::path::Path;

use walkdir::WalkDir;

/// Move a file or directory tree from `from` to `to`.
///
/// A rename is used whenever possible, so the item disappears from its
/// source in one step. When the two paths are on different filesystems the
/// item is copied and the source removed afterwards.
pub fn relocate(from: &Path, to: &Path) -> io::Result<()> {
    match fs::rename(from, to) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::CrossesDevices => {
            crate::debug_event!(
                "relocate",
                "copying across filesystems",
                "{} -> {}",
                from.display(),
                to.display()
            );
            copy_across(from, to)
        }
        Err(e) => Err(e),
    }
}

/// Copy-then-remove move. A failed copy leaves nothing at `to`, so the item
/// still lives only at `from`.
fn copy_across(from: &Path, to: &Path) -> io::Result<()> {
    if fs::read_dir(to).is_ok_and(|mut entries| entries.next().is_some()) {
        return Err(io::Error::new(
            io::ErrorKind::DirectoryNotEmpty,
            format!("destination {} is a non-empty directory", to.display()),
        ));
    }

    // Only a destination of the same kind gets written into by the copy
    let source_is_dir = fs::symlink_metadata(from)?.is_dir();
    let untouched = fs::symlink_metadata(to).is_ok_and(|m| m.is_dir() != source_is_dir);

    if let Err(e) = copy_tree(from, to) {
        if !untouched && is_present(to) {
            if let Err(cleanup) = remove(to) {
                tracing::warn!(
                    "[relocate] partial copy left at {}: {cleanup}",
                    to.display()
                );
            }
        }
        return Err(e);
    }
    remove(from)
}

/// Whether anything (including a dangling symlink) exists at `path`.
pub fn is_present(path: &Path) -> bool {
    fs::symlink_metadata(path).is_ok()
}

fn copy_tree(from: &Path, to: &Path) -> io::Result<()> {
    for entry in WalkDir::new(from).follow_links(false) {
        let entry = entry.map_err(io::Error::other)?;
        let relative = entry
            .path()
            .strip_prefix(from)
            .map_err(io::Error::other)?;
        // A plain file is its own root entry with an empty relative path
        let target = if relative.as_os_str().is_empty() {
            to.to_path_buf()
        } else {
            to.join(relative)
        };
        let file_type = entry.file_type();

        if file_type.is_dir() {
            fs::create_dir_all(&target)?;
        } else if file_type.is_symlink() {
            copy_link(entry.path(), &target)?;
        } else {
            fs::copy(entry.path(), &target)?;
        }
    }
    Ok(())
}

#[cfg(unix)]
fn copy_link(link: &Path, target: &Path) -> io::Result<()> {
    std::os::unix::fs::symlink(fs::read_link(link)?, target)
}

#[cfg(not(unix))]
fn copy_link(link: &Path, target: &Path) -> io::Result<()> {
    fs::copy(link, target).map(|_| ())
}

fn remove(path: &Path) -> io::Result<()> {
    if fs::symlink_metadata(path)?.is_dir() {
        fs::remove_dir_all(path)
    } else {
        fs::remove_file(path)
    }
}
