//! The single trust boundary between client-supplied paths and the filesystem.
//!
//! Every sub-path read and every upload name goes through here. Validation is
//! lexical first (component walk), then canonical (symlinks resolved) so an
//! escape through a link inside the shared root is also caught.

use std::fmt;
use std::path::{Component, Path, PathBuf};

#[derive(Debug, PartialEq, Eq)]
pub enum PathRejection {
    Empty,
    NullByte,
    Absolute,
    ParentTraversal,
    InvalidComponent,
    OutsideRoot,
}

impl fmt::Display for PathRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathRejection::Empty => write!(f, "path is empty"),
            PathRejection::NullByte => write!(f, "path contains null byte"),
            PathRejection::Absolute => write!(f, "path is absolute"),
            PathRejection::ParentTraversal => write!(f, "path contains parent directory (..)"),
            PathRejection::InvalidComponent => write!(f, "path contains invalid component"),
            PathRejection::OutsideRoot => write!(f, "path resolves outside the shared root"),
        }
    }
}

impl std::error::Error for PathRejection {}

/// Lexical validation of a client-supplied relative path.
/// Rejects empty paths, null bytes, absolute paths, `..` segments, and
/// Windows prefixes. `.` segments are redundant but harmless.
pub fn validate_relative(path_str: &str) -> Result<(), PathRejection> {
    if path_str.is_empty() {
        return Err(PathRejection::Empty);
    }

    // Null bytes can truncate the path at the libc layer
    if path_str.contains('\0') {
        return Err(PathRejection::NullByte);
    }

    let path = Path::new(path_str);
    if path.is_absolute() {
        return Err(PathRejection::Absolute);
    }

    for component in path.components() {
        match component {
            Component::Normal(_) | Component::CurDir => continue,
            Component::ParentDir => return Err(PathRejection::ParentTraversal),
            Component::RootDir => return Err(PathRejection::Absolute),
            Component::Prefix(_) => return Err(PathRejection::InvalidComponent),
        }
    }

    Ok(())
}

/// Resolve a client-supplied relative path against a canonical root for
/// reading. `Ok(None)` means nothing exists at the path (a plain 404 for the
/// caller); `Err` means the client tried to escape the root.
///
/// `root` must already be canonicalized (the portal does this at startup).
pub fn resolve_read_path(root: &Path, rel: &str) -> Result<Option<PathBuf>, PathRejection> {
    validate_relative(rel)?;

    let joined = root.join(rel);
    let resolved = match joined.canonicalize() {
        Ok(p) => p,
        Err(_) => return Ok(None),
    };

    // Canonicalization follows symlinks, so a link under the root pointing
    // elsewhere lands outside and is rejected here.
    if resolved.starts_with(root) {
        Ok(Some(resolved))
    } else {
        Err(PathRejection::OutsideRoot)
    }
}

/// Reduce a client-declared upload filename to a safe basename.
/// Browsers may submit a full client-side path; only the final segment is
/// kept, and it must be a single normal component.
pub fn sanitize_upload_name(declared: &str) -> Result<String, PathRejection> {
    if declared.is_empty() {
        return Err(PathRejection::Empty);
    }
    if declared.contains('\0') {
        return Err(PathRejection::NullByte);
    }

    let name = declared
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default()
        .trim();
    if name.is_empty() || name == "." {
        return Err(PathRejection::Empty);
    }
    if name == ".." {
        return Err(PathRejection::ParentTraversal);
    }

    let mut components = Path::new(name).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) => Ok(name.to_string()),
        _ => Err(PathRejection::InvalidComponent),
    }
}
