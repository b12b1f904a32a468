//! Path resolution for the directory endpoint
//!
//! All functions here are pure string manipulation. Nothing touches the
//! filesystem, so resolution edge cases can be tested without fixtures.
//!
//! Resolution does not collapse `..` segments: a request for
//! `../etc` against base `/srv` resolves to `/srv/../etc` and the OS decides
//! where that lands. [`is_contained`] is the opt-in check for deployments
//! that need the request confined to the base directory.

/// Join a base directory and a relative segment with exactly one separator.
///
/// - empty segment (or only separators): the base itself
/// - trailing separators on `base` and leading separators on `segment`
///   collapse into one `/`
/// - an empty base is treated as `/`
pub fn join_path(base: &str, segment: &str) -> String {
    let base = if base.is_empty() { "/" } else { base };
    let segment = segment.trim_start_matches('/');
    if segment.is_empty() {
        return base.to_string();
    }

    let head = base.trim_end_matches('/');
    let mut joined = String::with_capacity(head.len() + segment.len() + 1);
    joined.push_str(head);
    joined.push('/');
    joined.push_str(segment);
    joined
}

/// Resolve a requested sub-path against the base directory.
///
/// An empty request resolves to the base directory.
pub fn resolve(base_dir: &str, requested: &str) -> String {
    join_path(base_dir, requested)
}

/// Append a directory entry name to `dir` the way a link should point at it.
///
/// `.` leaves `dir` unchanged, `..` moves to the parent (never above `/`),
/// any other name is appended after a single separator.
pub fn append_file_name(dir: &str, name: &str) -> String {
    match name {
        "" | "." => dir.to_string(),
        ".." => parent_of(dir),
        _ => {
            let mut out = String::with_capacity(dir.len() + name.len() + 1);
            out.push_str(dir);
            if !out.is_empty() && !out.ends_with('/') {
                out.push('/');
            }
            out.push_str(name);
            out
        }
    }
}

/// Parent of `dir`, stepping over `.` components and paying one extra pop
/// for every `..` met on the way back.
fn parent_of(dir: &str) -> String {
    let mut parts: Vec<&str> = dir.split('/').filter(|p| !p.is_empty()).collect();
    let mut pending = 1usize;
    while pending > 0 {
        match parts.pop() {
            Some(".") => {}
            Some("..") => pending += 1,
            Some(_) => pending -= 1,
            None => break,
        }
    }

    let joined = parts.join("/");
    if dir.starts_with('/') {
        format!("/{joined}")
    } else {
        joined
    }
}

/// Lexically normalise an absolute path: drop `.` and empty segments, pop on `..`.
///
/// `..` at the root stays at the root.
pub fn normalize(path: &str) -> String {
    let mut parts: Vec<&str> = Vec::new();
    for part in path.split('/') {
        match part {
            "" | "." => {}
            ".." => {
                parts.pop();
            }
            other => parts.push(other),
        }
    }
    format!("/{}", parts.join("/"))
}

/// Whether `resolved` stays inside `base_dir` after lexical normalisation.
///
/// Compared component-wise, so `/srv-data` is not inside `/srv`.
pub fn is_contained(base_dir: &str, resolved: &str) -> bool {
    let base = normalize(base_dir);
    let target = normalize(resolved);
    base == "/"
        || target == base
        || target
            .strip_prefix(base.as_str())
            .is_some_and(|rest| rest.starts_with('/'))
}
