//! Directory listing: enumerate, sort, render
//!
//! Every emitted link re-enters the directory endpoint, so subdirectories
//! and files are browsed the same way. Entries are never filtered.

use std::ffi::OsString;

use super::error::DirError;
use super::fs::DirHandle;
use super::path::{append_file_name, join_path};
use super::render_mode::RenderMode;
use crate::logger;

const HTML_HEAD: &str = "<!DOCTYPE html><html><body><pre>";
const HTML_TAIL: &str = "</pre></body></html>";

/// Drain `dir` into a byte-wise sorted list of names and close it.
///
/// An enumeration error ends the listing early with what was read so far.
/// A failed close is an invariant violation and fails the request.
pub fn collect_entries<D: DirHandle>(mut dir: D, path: &str) -> Result<Vec<String>, DirError> {
    let mut names: Vec<OsString> = Vec::with_capacity(32);
    for entry in dir.entries() {
        match entry {
            Ok(name) => names.push(name),
            Err(e) => {
                logger::log_warning(&format!("Enumeration of '{path}' stopped early: {e}"));
                break;
            }
        }
    }

    dir.close().map_err(|source| DirError::EnumerationClose {
        path: path.to_string(),
        source,
    })?;

    // OsString orders by raw bytes; convert only once the order is fixed
    names.sort();
    Ok(names
        .into_iter()
        .map(|name| name.to_string_lossy().into_owned())
        .collect())
}

/// Link target for `name` listed under the requested sub-path.
///
/// `..` of the endpoint root points back at the root itself.
pub fn link_target(route_prefix: &str, requested: &str, name: &str) -> String {
    if requested.is_empty() && name == ".." {
        return route_prefix.to_string();
    }
    let current = join_path("/", requested);
    format!("{route_prefix}{}", escape_target(&append_file_name(&current, name)))
}

/// Render sorted entry names as an HTML page or a plain target/name list.
pub fn render_listing(
    names: &[String],
    requested: &str,
    route_prefix: &str,
    mode: RenderMode,
) -> String {
    let mut out = String::with_capacity(HTML_HEAD.len() + HTML_TAIL.len() + names.len() * 48);
    if mode == RenderMode::Html {
        out.push_str(HTML_HEAD);
    }

    for name in names {
        let target = link_target(route_prefix, requested, name);
        match mode {
            RenderMode::Html => {
                out.push_str("<a href=\"");
                out.push_str(&escape_html(&target));
                out.push_str("\">");
                out.push_str(&escape_html(name));
                out.push_str("</a>");
            }
            RenderMode::Plain => {
                out.push_str(&target);
                out.push('\t');
                out.push_str(name);
            }
        }
        out.push('\n');
    }

    if mode == RenderMode::Html {
        out.push_str(HTML_TAIL);
    }
    out
}

/// Percent-encode the characters that would end or split a URL path
fn escape_target(path: &str) -> String {
    let mut out = String::with_capacity(path.len());
    for c in path.chars() {
        if matches!(c, '%' | '?' | '#' | ' ' | '"') || c.is_ascii_control() {
            out.push_str(&format!("%{:02X}", u32::from(c)));
        } else {
            out.push(c);
        }
    }
    out
}

/// Escape text for an HTML attribute or element body
fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dir::fake::FakeDir;
    use std::io;

    fn sorted(names: &[&str]) -> Vec<String> {
        collect_entries(FakeDir::with_names(names), "/data").unwrap()
    }

    #[test]
    fn test_entries_sorted_bytewise_with_dots() {
        let names = sorted(&["b.txt", "..", "a.txt", ".hidden", "."]);
        assert_eq!(names, vec![".", "..", ".hidden", "a.txt", "b.txt"]);
    }

    #[test]
    fn test_sort_is_not_locale_aware() {
        let names = sorted(&["b", "B", "a", "_x", "Z"]);
        assert_eq!(names, vec!["B", "Z", "_x", "a", "b"]);
    }

    #[cfg(unix)]
    #[test]
    fn test_non_utf8_names_sort_by_raw_bytes() {
        use std::os::unix::ffi::OsStringExt;

        let dir = FakeDir {
            entries: vec![
                Ok(OsString::from_vec(vec![0xf8])),
                Ok("\u{ffff}".into()),
                Ok("a".into()),
            ],
            close_error: None,
        };
        // 0xF8 sorts after EF BF BF, though its replacement EF BF BD would not
        assert_eq!(
            collect_entries(dir, "/data").unwrap(),
            vec!["a", "\u{ffff}", "\u{fffd}"]
        );
    }

    #[test]
    fn test_enumeration_error_keeps_partial_listing() {
        let dir = FakeDir {
            entries: vec![
                Ok("b".into()),
                Ok("a".into()),
                Err(io::Error::from_raw_os_error(5)),
                Ok("never".into()),
            ],
            close_error: None,
        };
        assert_eq!(collect_entries(dir, "/data").unwrap(), vec!["a", "b"]);
    }

    #[test]
    fn test_close_failure_is_reported() {
        let dir = FakeDir {
            entries: vec![Ok(".".into())],
            close_error: Some(io::Error::from_raw_os_error(9)),
        };
        let err = collect_entries(dir, "/data").unwrap_err();
        assert!(err.is_fatal());
        assert_eq!(err.path(), "/data");
    }

    #[test]
    fn test_link_targets() {
        assert_eq!(link_target("/dir", "", ".."), "/dir");
        assert_eq!(link_target("/dir", "", "."), "/dir/");
        assert_eq!(link_target("/dir", "", "etc"), "/dir/etc");
        assert_eq!(link_target("/dir", "var/log", "app.log"), "/dir/var/log/app.log");
        assert_eq!(link_target("/dir", "var/log", ".."), "/dir/var");
        assert_eq!(link_target("/dir", "var", ".."), "/dir/");
        assert_eq!(link_target("/dir", "var/", "x"), "/dir/var/x");
    }

    #[test]
    fn test_dotdot_link_under_dotted_request() {
        assert_eq!(link_target("/dir", "a/..", ".."), "/dir/");
        assert_eq!(link_target("/dir", "a/.", ".."), "/dir/");
        assert_eq!(link_target("/dir", "a/b/../..", ".."), "/dir/");
        assert_eq!(link_target("/dir", "a/b/c/..", ".."), "/dir/a");
    }

    #[test]
    fn test_link_target_escapes_url_delimiters() {
        assert_eq!(link_target("/dir", "", "a b#1?.txt"), "/dir/a%20b%231%3F.txt");
        assert_eq!(link_target("/dir", "", "100%"), "/dir/100%25");
        assert_eq!(link_target("/dir", "", "日本"), "/dir/日本");
    }

    #[test]
    fn test_root_dotdot_points_at_endpoint_root() {
        let names = sorted(&[".", "..", "etc"]);
        let text = render_listing(&names, "", "/dir", RenderMode::Plain);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines, vec!["/dir/\t.", "/dir\t..", "/dir/etc\tetc"]);
    }

    #[test]
    fn test_html_listing() {
        let names = sorted(&[".", "..", "a.txt"]);
        let html = render_listing(&names, "srv", "/dir", RenderMode::Html);
        assert_eq!(
            html,
            "<!DOCTYPE html><html><body><pre>\
             <a href=\"/dir/srv\">.</a>\n\
             <a href=\"/dir/\">..</a>\n\
             <a href=\"/dir/srv/a.txt\">a.txt</a>\n\
             </pre></body></html>"
        );
    }

    #[test]
    fn test_modes_list_same_entries_in_same_order() {
        let names = sorted(&["b.txt", "a.txt", ".hidden", ".", ".."]);
        let html = render_listing(&names, "data", "/dir", RenderMode::Html);
        let plain = render_listing(&names, "data", "/dir", RenderMode::Plain);

        assert!(html.starts_with("<!DOCTYPE html>"));
        assert_eq!(html.matches("<a href=").count(), names.len());

        assert!(!plain.contains('<') && !plain.contains('>'));
        let plain_names: Vec<&str> = plain
            .lines()
            .map(|line| line.split('\t').nth(1).unwrap())
            .collect();
        assert_eq!(plain_names, names);

        let html_names: Vec<&str> = html
            .split("\">")
            .skip(1)
            .map(|rest| rest.split("</a>").next().unwrap())
            .collect();
        assert_eq!(html_names, names);
    }

    #[test]
    fn test_html_escapes_names() {
        let names = vec!["<b>&\"x\"".to_string()];
        let html = render_listing(&names, "", "/dir", RenderMode::Html);
        assert!(html.contains("&lt;b&gt;&amp;&quot;x&quot;</a>"));
        assert!(html.contains("href=\"/dir/&lt;b&gt;&amp;%22x%22\""));
    }
}
