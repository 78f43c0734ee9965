use super::{shortcut, EngineRegistry};
use url::Url;

/// Error type for search submission
#[derive(Debug)]
pub enum SearchError {
    UnknownEngine(String),
    InvalidUrl(url::ParseError),
}

impl std::fmt::Display for SearchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SearchError::UnknownEngine(id) => write!(f, "Unknown search engine: {}", id),
            SearchError::InvalidUrl(e) => write!(f, "Invalid search URL: {}", e),
        }
    }
}

impl std::error::Error for SearchError {}

impl From<url::ParseError> for SearchError {
    fn from(e: url::ParseError) -> Self {
        SearchError::InvalidUrl(e)
    }
}

/// What submitting the search box should do
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatch {
    /// Nothing to search for
    Ignored,
    /// A bare shortcut was submitted: switch engines, stay on the page
    EngineSwitched(String),
    /// Leave the page for the engine's result page
    Navigate { engine_id: String, url: Url },
}

/// Decide the engine and destination for a submitted query.
///
/// Rules:
/// 1. Blank input does nothing
/// 2. A recognized shortcut selects its engine and is removed from the query
/// 3. If nothing is left after removing the shortcut, only the engine changes
/// 4. Otherwise the query is percent-encoded onto the engine's URL template
pub fn submit(
    raw: &str,
    current_engine_id: &str,
    registry: &EngineRegistry,
) -> Result<Dispatch, SearchError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(Dispatch::Ignored);
    }

    let (engine_id, query) = match shortcut::detect(trimmed, registry) {
        Some(detection) => {
            if detection.cleaned_query.is_empty() {
                return Ok(Dispatch::EngineSwitched(detection.engine_id));
            }
            (detection.engine_id, detection.cleaned_query)
        }
        None => (current_engine_id.to_string(), trimmed.to_string()),
    };

    let engine = registry
        .get(&engine_id)
        .ok_or_else(|| SearchError::UnknownEngine(engine_id.clone()))?;
    let url = Url::parse(&engine.search_url(&query))?;

    Ok(Dispatch::Navigate { engine_id, url })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::Engine;

    fn navigate_url(raw: &str, current: &str) -> String {
        match submit(raw, current, &EngineRegistry::builtin()).unwrap() {
            Dispatch::Navigate { url, .. } => url.to_string(),
            other => panic!("Expected navigation, got {:?}", other),
        }
    }

    #[test]
    fn test_plain_query_uses_current_engine() {
        assert_eq!(
            navigate_url("weather", "google"),
            "https://www.google.com/search?q=weather"
        );
        assert_eq!(
            navigate_url("  hello world ", "yahoo"),
            "https://search.yahoo.com/search?p=hello%20world"
        );
    }

    #[test]
    fn test_shortcut_overrides_current_engine() {
        assert_eq!(navigate_url("!ddg cats", "google"), "https://duckduckgo.com/?q=cats");
        assert_eq!(
            navigate_url("cats /e", "google"),
            "https://www.ecosia.org/search?q=cats"
        );

        let dispatch = submit("!ddg cats", "google", &EngineRegistry::builtin()).unwrap();
        assert!(matches!(dispatch, Dispatch::Navigate { ref engine_id, .. } if engine_id == "duckduckgo"));
    }

    #[test]
    fn test_blank_input_is_ignored() {
        let registry = EngineRegistry::builtin();
        assert_eq!(submit("", "google", &registry).unwrap(), Dispatch::Ignored);
        assert_eq!(submit("   ", "google", &registry).unwrap(), Dispatch::Ignored);
    }

    #[test]
    fn test_bare_shortcut_only_switches_engine() {
        let registry = EngineRegistry::builtin();
        assert_eq!(
            submit("!bi", "google", &registry).unwrap(),
            Dispatch::EngineSwitched("bing".to_string())
        );
    }

    #[test]
    fn test_unknown_shortcut_searched_verbatim() {
        assert_eq!(
            navigate_url("!zz cats", "google"),
            "https://www.google.com/search?q=%21zz%20cats"
        );
    }

    #[test]
    fn test_unknown_current_engine() {
        let result = submit("cats", "altavista", &EngineRegistry::builtin());
        assert!(matches!(result, Err(SearchError::UnknownEngine(id)) if id == "altavista"));
    }

    #[test]
    fn test_invalid_template() {
        let registry = EngineRegistry::new(vec![Engine {
            id: "broken".to_string(),
            name: "Broken".to_string(),
            query_url_template: "not a url ".to_string(),
            icon_url: String::new(),
            shortcut: "b".to_string(),
        }]);
        assert!(matches!(
            submit("cats", "broken", &registry),
            Err(SearchError::InvalidUrl(_))
        ));
    }
}
