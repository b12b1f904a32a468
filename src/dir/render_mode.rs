//! HTML vs plain-text selection for directory listings

/// Output format of a directory listing, fixed for the whole request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderMode {
    Html,
    Plain,
}

impl RenderMode {
    /// Pick the mode from the request's hints.
    ///
    /// An explicit `console=<n>` query value wins: `0` means a browser (HTML),
    /// anything else a terminal. Without it, requests with no `User-Agent` or
    /// a curl agent get plain text and everything else gets HTML.
    pub fn from_hints(console: Option<&str>, user_agent: Option<&str>) -> Self {
        if let Some(value) = console {
            return if parse_leading_int(value) == 0 {
                Self::Html
            } else {
                Self::Plain
            };
        }
        match user_agent {
            None => Self::Plain,
            Some(agent) if agent.trim_start().starts_with("curl/") => Self::Plain,
            Some(_) => Self::Html,
        }
    }

    pub const fn content_type(self) -> &'static str {
        match self {
            Self::Html => "text/html",
            Self::Plain => "text/plain",
        }
    }
}

/// Leading decimal integer of `value`, 0 when there is none.
///
/// Out-of-range values saturate, so a huge `console` value still counts as set.
fn parse_leading_int(value: &str) -> i64 {
    let value = value.trim_start();
    let (sign, digits) = match value.strip_prefix('-') {
        Some(rest) => (-1, rest),
        None => (1, value.strip_prefix('+').unwrap_or(value)),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    if end == 0 {
        return 0;
    }
    digits[..end]
        .parse::<i64>()
        .map_or(sign * i64::MAX, |n| sign * n)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_console_param_wins() {
        assert_eq!(RenderMode::from_hints(Some("1"), Some("Mozilla/5.0")), RenderMode::Plain);
        assert_eq!(RenderMode::from_hints(Some("0"), Some("curl/8.5.0")), RenderMode::Html);
        assert_eq!(RenderMode::from_hints(Some(""), None), RenderMode::Html);
        assert_eq!(RenderMode::from_hints(Some("yes"), None), RenderMode::Html);
        assert_eq!(RenderMode::from_hints(Some("2abc"), None), RenderMode::Plain);
    }

    #[test]
    fn test_user_agent_fallback() {
        assert_eq!(RenderMode::from_hints(None, None), RenderMode::Plain);
        assert_eq!(RenderMode::from_hints(None, Some("curl/7.81.0")), RenderMode::Plain);
        assert_eq!(
            RenderMode::from_hints(None, Some("Mozilla/5.0 (X11; Linux x86_64)")),
            RenderMode::Html
        );
    }

    #[test]
    fn test_content_types() {
        assert_eq!(RenderMode::Html.content_type(), "text/html");
        assert_eq!(RenderMode::Plain.content_type(), "text/plain");
    }

    #[test]
    fn test_parse_leading_int() {
        assert_eq!(parse_leading_int("42"), 42);
        assert_eq!(parse_leading_int(" -3x"), -3);
        assert_eq!(parse_leading_int("+7"), 7);
        assert_eq!(parse_leading_int("abc"), 0);
        assert_eq!(parse_leading_int("-"), 0);
    }

    #[test]
    fn test_overflowing_console_value_is_plain() {
        assert_eq!(parse_leading_int("99999999999999999999"), i64::MAX);
        assert_eq!(parse_leading_int("-99999999999999999999"), -i64::MAX);
        assert_eq!(
            RenderMode::from_hints(Some("99999999999999999999"), Some("Mozilla/5.0")),
            RenderMode::Plain
        );
    }
}
