use std::collections::HashSet;

/// Reduce user-supplied text to plain text with ammonia.
///
/// Every tag is dropped, and `<script>`/`<style>` lose their content too.
/// The surviving text is stored as typed: ammonia re-encodes `&`, `<`, `>`
/// and no-break spaces on output, and those entities are decoded again here.
/// Clients must escape the text when rendering it as HTML.
pub fn clean_html(input: &str) -> String {
    let cleaned = ammonia::Builder::default()
        .tags(HashSet::new())
        .clean(input)
        .to_string();
    decode_text_entities(&cleaned)
}

/// Inverse of the html5ever text serializer. `&amp;` goes last so that an
/// escaped entity such as `&amp;lt;` decodes to `&lt;`, not `<`.
fn decode_text_entities(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&nbsp;", "\u{a0}")
        .replace("&amp;", "&")
}

#[cfg(test)]
mod tests {
    use super::clean_html;

    #[test]
    fn plain_text_is_untouched() {
        assert_eq!(clean_html("Happy Monday"), "Happy Monday");
        assert_eq!(clean_html("Tom & Jerry"), "Tom & Jerry");
        assert_eq!(clean_html("5 < 6 > 4"), "5 < 6 > 4");
        assert_eq!(clean_html("say \"hi\""), "say \"hi\"");
    }

    #[test]
    fn markup_is_removed() {
        assert_eq!(clean_html("<script>alert(1)</script>"), "");
        assert_eq!(clean_html("<b>hi</b> there"), "hi there");
        assert_eq!(clean_html("<img src=x onerror=alert(1)>"), "");
    }

    #[test]
    fn escaped_entities_stay_escaped_once() {
        assert_eq!(clean_html("&amp;lt;"), "&lt;");
    }
}
