// Just enough markup handling to pull fields out of listing cards

use regex::Regex;
use std::sync::OnceLock;

fn tag_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?is)<(/?)([a-z][a-z0-9]*)\b([^>]*)>").expect("tag pattern is valid")
    })
}

fn class_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r#"(?is)\bclass\s*=\s*(?:"([^"]*)"|'([^']*)')"#)
            .expect("class pattern is valid")
    })
}

fn href_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r#"(?is)\bhref\s*=\s*(?:"([^"]*)"|'([^']*)')"#).expect("href pattern is valid")
    })
}

/// One element located in a page, by byte offsets into the page markup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub tag: String,
    pub class: String,
    pub href: Option<String>,
    /// Start of the opening tag
    pub start: usize,
    /// Just past the opening tag's `>`
    pub inner_start: usize,
    /// Start of the closing tag
    pub inner_end: usize,
    /// Just past the closing tag's `>`
    pub end: usize,
}

impl Element {
    /// True if `other` sits strictly inside this element's content
    pub fn contains(&self, other: &Element) -> bool {
        other.start >= self.inner_start && other.end <= self.inner_end
    }

    pub fn inner<'a>(&self, page: &'a Page) -> &'a str {
        &page.html[self.inner_start..self.inner_end]
    }

    /// Visible text of the element, tags stripped and whitespace squashed
    pub fn text(&self, page: &Page) -> String {
        strip_tags(self.inner(page))
    }

    fn class_has_any(&self, needles: &[&str]) -> bool {
        let class = self.class.to_ascii_lowercase();
        needles.iter().any(|n| class.contains(n))
    }
}

/// A page of markup, scanned once into its closed elements
pub struct Page<'a> {
    html: &'a str,
    elements: Vec<Element>,
}

impl<'a> Page<'a> {
    pub fn new(html: &'a str) -> Self {
        Self {
            html,
            elements: scan(html),
        }
    }

    /// Every element of one of `tags` whose class attribute contains one of `needles`
    ///
    /// Elements come back in document order. Unclosed elements are skipped.
    pub fn classed_elements(&self, tags: &[&str], needles: &[&str]) -> Vec<Element> {
        self.elements(tags)
            .into_iter()
            .filter(|e| e.class_has_any(needles))
            .collect()
    }

    /// Every closed element of one of `tags`, in document order
    pub fn elements(&self, tags: &[&str]) -> Vec<Element> {
        self.elements
            .iter()
            .filter(|e| tags.contains(&e.tag.as_str()))
            .cloned()
            .collect()
    }
}

/// Pair open and close tags in a single pass
///
/// A close tag closes the nearest open element of the same name. Anything
/// opened above it and never closed (`<img>`, a stray `<p>`) is discarded.
/// A close tag with no open partner is ignored.
fn scan(html: &str) -> Vec<Element> {
    let mut open: Vec<Element> = Vec::new();
    let mut closed = Vec::new();

    for caps in tag_pattern().captures_iter(html) {
        let (Some(whole), Some(slash), Some(name), Some(attrs)) =
            (caps.get(0), caps.get(1), caps.get(2), caps.get(3))
        else {
            continue;
        };
        let tag = name.as_str().to_ascii_lowercase();

        if slash.as_str().is_empty() {
            if attrs.as_str().trim_end().ends_with('/') {
                continue;
            }
            open.push(Element {
                class: attribute(class_pattern(), attrs.as_str()).unwrap_or_default(),
                href: attribute(href_pattern(), attrs.as_str()),
                tag,
                start: whole.start(),
                inner_start: whole.end(),
                inner_end: whole.end(),
                end: whole.end(),
            });
            continue;
        }

        let Some(depth) = open.iter().rposition(|e| e.tag == tag) else {
            continue;
        };
        open.truncate(depth + 1);
        if let Some(mut element) = open.pop() {
            element.inner_end = whole.start();
            element.end = whole.end();
            closed.push(element);
        }
    }

    // Closing order is innermost-first; callers want document order
    closed.sort_by_key(|e| e.start);
    closed
}

fn attribute(pattern: &Regex, attrs: &str) -> Option<String> {
    let caps = pattern.captures(attrs)?;
    caps.get(1)
        .or_else(|| caps.get(2))
        .map(|m| decode_entities(m.as_str()))
}

pub fn strip_tags(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut in_tag = false;

    for ch in s.chars() {
        match ch {
            '<' => in_tag = true,
            // Tags stand in for whitespace so "a<br>b" doesn't glue together
            '>' if in_tag => {
                in_tag = false;
                out.push(' ');
            }
            _ if !in_tag => out.push(ch),
            _ => {}
        }
    }
    normalize_ws(&decode_entities(&out))
}

pub fn decode_entities(s: &str) -> String {
    s.replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&#x27;", "'")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}

pub fn normalize_ws(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_tags() {
        assert_eq!(
            strip_tags("<b>Farmer&#39;s</b>\n   <i>Delight</i>"),
            "Farmer's Delight"
        );
        assert_eq!(strip_tags("line<br>break"), "line break");
        assert_eq!(strip_tags("Tom &amp; Jerry&nbsp;mod"), "Tom & Jerry mod");
    }

    #[test]
    fn test_nested_elements_close_correctly() {
        let html = r#"<div class="outer"><div class="inner">x</div><p>y</p></div><div class="after">z</div>"#;
        let page = Page::new(html);
        let divs = page.elements(&["div"]);

        assert_eq!(divs.len(), 3);
        assert_eq!(divs[0].class, "outer");
        assert_eq!(divs[0].inner(&page), r#"<div class="inner">x</div><p>y</p>"#);
        assert!(divs[0].contains(&divs[1]));
        assert!(!divs[0].contains(&divs[2]));
        assert_eq!(divs[2].text(&page), "z");
    }

    #[test]
    fn test_tag_prefix_is_not_a_match() {
        let html = r#"<div class="a"><divider></divider>text</div>"#;
        let page = Page::new(html);
        let divs = page.elements(&["div"]);
        assert_eq!(divs.len(), 1);
        assert_eq!(divs[0].text(&page), "text");
    }

    #[test]
    fn test_uppercase_markup_and_single_quotes() {
        let html = r#"<LI CLASS='Project-Card'><A HREF='/minecraft/mc-mods/jei'>JEI</A></LI>"#;
        let page = Page::new(html);

        let cards = page.classed_elements(&["li"], &["project"]);
        assert_eq!(cards.len(), 1);

        let links = page.elements(&["a"]);
        assert_eq!(links[0].href.as_deref(), Some("/minecraft/mc-mods/jei"));
        assert_eq!(links[0].text(&page), "JEI");
    }

    #[test]
    fn test_void_and_stray_tags() {
        let html = r#"<div class="card"><img src="x.png"><br><p>open <a href="/x">X</a></span></div>"#;
        let page = Page::new(html);

        let divs = page.elements(&["div"]);
        assert_eq!(divs.len(), 1);
        assert_eq!(divs[0].text(&page), "open X");

        let links = page.elements(&["a"]);
        assert_eq!(links.len(), 1);
        assert!(divs[0].contains(&links[0]));
        assert!(page.elements(&["img", "p"]).is_empty());
    }

    #[test]
    fn test_unclosed_element_skipped() {
        let page = Page::new(r#"<div class="card">never closed"#);
        assert!(page.elements(&["div"]).is_empty());
    }
}
