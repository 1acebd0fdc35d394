//! Small helpers shared across the crate.

use std::sync::OnceLock;

use regex::Regex;

/// Escape mentions that could ping someone in a string.
///
/// Inserts a zero-width space after the `@` so clients render the text
/// without resolving the ping. Channel mentions are left alone; they don't
/// ping anybody.
pub fn escape_mentions(content: &str) -> String {
    static MENTION: OnceLock<Regex> = OnceLock::new();
    let mention = MENTION
        .get_or_init(|| Regex::new(r"@(everyone|here|[!&]?[0-9]{17,20})").expect("valid regex"));
    mention.replace_all(content, "@\u{200b}$1").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_everyone_and_here() {
        assert_eq!(escape_mentions("hi @everyone"), "hi @\u{200b}everyone");
        assert_eq!(escape_mentions("hi @here"), "hi @\u{200b}here");
    }

    #[test]
    fn escapes_user_and_role_mentions() {
        assert_eq!(
            escape_mentions("<@!80351110224678912>"),
            "<@\u{200b}!80351110224678912>"
        );
        assert_eq!(
            escape_mentions("<@&41771983423143936>"),
            "<@\u{200b}&41771983423143936>"
        );
    }

    #[test]
    fn leaves_plain_text_and_channels_alone() {
        assert_eq!(escape_mentions("no pings here"), "no pings here");
        assert_eq!(
            escape_mentions("see <#41771983423143937>"),
            "see <#41771983423143937>"
        );
    }
}
