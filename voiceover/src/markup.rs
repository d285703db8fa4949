use once_cell::sync::Lazy;
use regex::Regex;

static BOOKMARK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"<bookmark\s+mark\s*=\s*['"][^'"]*['"]\s*/>"#).unwrap());
static CUE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[[^\[\]]*\]").unwrap());
static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Remove narration-control markup so only speakable text reaches the provider.
///
/// Both `<bookmark mark='x'/>` tags and bracketed cues such as `[pause]` are
/// dropped and the remaining whitespace is collapsed.
pub fn strip_markup(text: &str) -> String {
    let without_tags = BOOKMARK.replace_all(text, " ");
    let without_cues = CUE.replace_all(&without_tags, " ");
    WHITESPACE.replace_all(&without_cues, " ").trim().to_string()
}

/// Names of the bookmarks embedded in `text`, in order of appearance.
pub fn bookmarks(text: &str) -> Vec<String> {
    static MARK: Lazy<Regex> =
        Lazy::new(|| Regex::new(r#"<bookmark\s+mark\s*=\s*['"]([^'"]*)['"]\s*/>"#).unwrap());
    MARK.captures_iter(text)
        .map(|c| c[1].to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_bracketed_cues() {
        assert_eq!(strip_markup("Hello [pause] world"), "Hello world");
    }

    #[test]
    fn strips_bookmark_tags() {
        let text = "This circle <bookmark mark='A'/>is drawn as <bookmark mark=\"B\" />I speak.";
        assert_eq!(strip_markup(text), "This circle is drawn as I speak.");
        assert_eq!(bookmarks(text), vec!["A", "B"]);
    }

    #[test]
    fn plain_text_is_untouched() {
        assert_eq!(strip_markup("Thank you for watching."), "Thank you for watching.");
        assert!(bookmarks("no marks here").is_empty());
    }
}
