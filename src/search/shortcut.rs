//! Inline engine shortcuts in the query text.
//!
//! A shortcut is `!` or `/` followed by a run of word characters
//! (`[A-Za-z0-9_]`), either at the start of the query and followed by
//! whitespace or the end of input:
//!
//! `!ddg rust lifetimes`
//!
//! or at the end of the query and preceded by whitespace or the start of input:
//!
//! `rust lifetimes /ddg`
//!
//! Only one shortcut is consumed per query, and the leading form is tried first.
//! Tokens that name no engine are left in the text untouched.

use super::EngineRegistry;

/// Where the shortcut token was found
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShortcutPosition {
    Leading,
    Trailing,
}

/// A recognized shortcut and the query left after removing it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Detection {
    pub engine_id: String,
    pub cleaned_query: String,
    pub position: ShortcutPosition,
}

fn is_marker(c: char) -> bool {
    c == '!' || c == '/'
}

fn is_word(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Split `"!tok rest"` into `("tok", "rest")`.
/// The token must be followed by whitespace or the end of input.
fn leading_token(text: &str) -> Option<(&str, &str)> {
    let body = text.strip_prefix(is_marker)?;
    let token_len = body.find(|c: char| !is_word(c)).unwrap_or(body.len());
    if token_len == 0 {
        return None;
    }

    let (token, rest) = body.split_at(token_len);
    match rest.chars().next() {
        None => Some((token, rest)),
        Some(c) if c.is_whitespace() => Some((token, rest)),
        Some(_) => None,
    }
}

/// Split `"head /tok"` into `("tok", "head ")`.
/// The marker must be preceded by whitespace or the start of input.
fn trailing_token(text: &str) -> Option<(&str, &str)> {
    let token_start = text
        .char_indices()
        .rev()
        .take_while(|&(_, c)| is_word(c))
        .last()
        .map(|(index, _)| index)?;

    let head = text[..token_start].strip_suffix(is_marker)?;
    match head.chars().next_back() {
        None => Some((&text[token_start..], head)),
        Some(c) if c.is_whitespace() => Some((&text[token_start..], head)),
        Some(_) => None,
    }
}

/// Look for a known shortcut at the start, then at the end, of the query
pub fn detect(raw: &str, registry: &EngineRegistry) -> Option<Detection> {
    let trimmed = raw.trim();

    if let Some((token, rest)) = leading_token(trimmed) {
        if let Some(engine) = registry.by_shortcut(token) {
            return Some(Detection {
                engine_id: engine.id.clone(),
                cleaned_query: rest.trim().to_string(),
                position: ShortcutPosition::Leading,
            });
        }
    }

    if let Some((token, head)) = trailing_token(trimmed) {
        if let Some(engine) = registry.by_shortcut(token) {
            return Some(Detection {
                engine_id: engine.id.clone(),
                cleaned_query: head.trim().to_string(),
                position: ShortcutPosition::Trailing,
            });
        }
    }

    None
}

/// The query with its shortcut removed, or the trimmed query if it has none
pub fn strip_shortcut(raw: &str, registry: &EngineRegistry) -> String {
    match detect(raw, registry) {
        Some(detection) => detection.cleaned_query,
        None => raw.trim().to_string(),
    }
}

/// Parse the first space-separated word as a command like `!g`.
///
/// Returns the engine id and the rest of the text. Used when Enter is pressed
/// in the open dropdown without a highlighted row.
pub fn parse_command(raw: &str, registry: &EngineRegistry) -> Option<(String, String)> {
    let trimmed = raw.trim();
    let (command, rest) = trimmed.split_once(' ').unwrap_or((trimmed, ""));
    let token = command.strip_prefix(is_marker)?;
    let engine = registry.by_shortcut(token)?;
    Some((engine.id.clone(), rest.trim().to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> EngineRegistry {
        EngineRegistry::builtin()
    }

    fn detected(raw: &str) -> Option<(String, String, ShortcutPosition)> {
        detect(raw, &registry()).map(|d| (d.engine_id, d.cleaned_query, d.position))
    }

    #[test]
    fn test_leading_shortcut() {
        assert_eq!(
            detected("!g rust borrow checker"),
            Some(("google".into(), "rust borrow checker".into(), ShortcutPosition::Leading))
        );
        assert_eq!(
            detected("/ddg   cats  "),
            Some(("duckduckgo".into(), "cats".into(), ShortcutPosition::Leading))
        );
    }

    #[test]
    fn test_trailing_shortcut() {
        assert_eq!(
            detected("rust borrow checker !bi"),
            Some(("bing".into(), "rust borrow checker".into(), ShortcutPosition::Trailing))
        );
        assert_eq!(
            detected("  weather tomorrow   /sp "),
            Some(("startpage".into(), "weather tomorrow".into(), ShortcutPosition::Trailing))
        );
    }

    #[test]
    fn test_every_engine_both_forms() {
        let registry = registry();
        for engine in registry.iter() {
            let leading = detect(&format!("!{} some query", engine.shortcut), &registry).unwrap();
            assert_eq!(leading.engine_id, engine.id);
            assert_eq!(leading.cleaned_query, "some query");

            let trailing = detect(&format!("some query /{}", engine.shortcut), &registry).unwrap();
            assert_eq!(trailing.engine_id, engine.id);
            assert_eq!(trailing.cleaned_query, "some query");
        }
    }

    #[test]
    fn test_plain_query_has_no_shortcut() {
        assert_eq!(detected("weather"), None);
        assert_eq!(detected("what is 3/4 of 12"), None);
        assert_eq!(detected(""), None);
    }

    #[test]
    fn test_leading_wins_and_only_one_is_consumed() {
        assert_eq!(
            detected("!g foo !x"),
            Some(("google".into(), "foo !x".into(), ShortcutPosition::Leading))
        );
        assert_eq!(
            detected("!g foo !ddg"),
            Some(("google".into(), "foo !ddg".into(), ShortcutPosition::Leading))
        );
    }

    #[test]
    fn test_unknown_leading_falls_through_to_trailing() {
        assert_eq!(
            detected("!x foo !g"),
            Some(("google".into(), "!x foo".into(), ShortcutPosition::Trailing))
        );
    }

    #[test]
    fn test_unknown_token_left_alone() {
        assert_eq!(detected("!zz cats"), None);
        assert_eq!(strip_shortcut("!zz cats", &registry()), "!zz cats");
    }

    #[test]
    fn test_bare_marker_does_not_match() {
        assert_eq!(detected("!"), None);
        assert_eq!(detected("/"), None);
        assert_eq!(detected("cats !"), None);
        assert_eq!(detected("! cats"), None);
    }

    #[test]
    fn test_token_must_be_delimited() {
        // Leading token glued to punctuation
        assert_eq!(detected("!g-foo"), None);
        // Trailing marker glued to a word
        assert_eq!(detected("foo!g"), None);
        // Shortcuts are case-sensitive
        assert_eq!(detected("!G cats"), None);
    }

    #[test]
    fn test_bare_shortcut_is_leading_with_empty_query() {
        assert_eq!(
            detected("!g"),
            Some(("google".into(), String::new(), ShortcutPosition::Leading))
        );
        assert_eq!(
            detected("  /ddg  "),
            Some(("duckduckgo".into(), String::new(), ShortcutPosition::Leading))
        );
    }

    #[test]
    fn test_whitespace_kinds() {
        assert_eq!(
            detected("!e\tcats"),
            Some(("ecosia".into(), "cats".into(), ShortcutPosition::Leading))
        );
        assert_eq!(
            detected("cats\u{00a0}!y"),
            Some(("yahoo".into(), "cats".into(), ShortcutPosition::Trailing))
        );
    }

    #[test]
    fn test_parse_command() {
        let registry = registry();
        assert_eq!(
            parse_command("!ddg  cute cats", &registry),
            Some(("duckduckgo".into(), "cute cats".into()))
        );
        assert_eq!(parse_command("/br", &registry), Some(("brave".into(), String::new())));
        assert_eq!(parse_command("!nope cats", &registry), None);
        assert_eq!(parse_command("cats !g", &registry), None);
    }
}
