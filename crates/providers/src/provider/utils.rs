use regex::Regex;
use scraper::{ElementRef, Selector};

#[inline]
pub fn capture_group_1<'a>(re: &Regex, input: &'a str) -> Option<&'a str> {
    re.captures(input)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Attribute value of an optional element; `None` when either is missing.
#[inline]
pub fn safe_attr(element: Option<ElementRef<'_>>, attr: &str) -> Option<String> {
    element
        .and_then(|el| el.value().attr(attr))
        .map(ToOwned::to_owned)
}

/// Whitespace-trimmed text content of an optional element. Missing elements
/// and elements without text yield `None`.
#[inline]
pub fn safe_text(element: Option<ElementRef<'_>>) -> Option<String> {
    element
        .map(|el| el.text().collect::<String>().trim().to_owned())
        .filter(|text| !text.is_empty())
}

#[inline]
pub fn select_first<'a>(element: ElementRef<'a>, selector: &Selector) -> Option<ElementRef<'a>> {
    element.select(selector).next()
}

/// Text of the element's first child node when that child is a text node.
pub fn leading_text(element: ElementRef<'_>) -> Option<String> {
    element
        .children()
        .next()
        .and_then(|node| node.value().as_text().map(|t| t.trim().to_owned()))
}
