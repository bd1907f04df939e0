//! Helpers for image-side target paths.
//!
//! Target paths are virtual, absolute, `/`-separated strings. They name
//! locations inside the image being assembled and never touch the host
//! filesystem, so they are kept as plain strings rather than `PathBuf`s.

/// Join a directory target path and an entry name.
pub fn join_target(dir: &str, name: &str) -> String {
    if dir.ends_with('/') {
        format!("{}{}", dir, name)
    } else {
        format!("{}/{}", dir, name)
    }
}

/// Parent directory of a target path. The parent of `/` is `/`.
pub fn parent_target(path: &str) -> &str {
    match path.rfind('/') {
        Some(0) | None => "/",
        Some(idx) => &path[..idx],
    }
}

/// Depth of a target path, measured as the number of separators.
///
/// `/` and every direct child of it count 1, `/a/b` counts 2, and so on.
/// This is the secondary sort key for the command sequencer: shallower
/// paths always sort before strictly deeper ones within a category.
pub fn depth(path: &str) -> usize {
    path.matches('/').count()
}
