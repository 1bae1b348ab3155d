use itertools::Itertools;
use scraper::{CaseSensitivity, ElementRef, Html};

/// Substring match on the raw `class` attribute, so `article__content` also
/// matches `article__content__view__field`.
pub fn has_class_containing(element: &ElementRef, marker: &str) -> bool {
    element
        .value()
        .attr("class")
        .is_some_and(|class| class.contains(marker))
}

/// Exact match against one whitespace separated class token.
pub fn has_class_named(element: &ElementRef, name: &str) -> bool {
    element
        .value()
        .has_class(name, CaseSensitivity::CaseSensitive)
}

pub fn all_elements(document: &Html) -> impl Iterator<Item = ElementRef<'_>> {
    document
        .root_element()
        .descendants()
        .filter_map(ElementRef::wrap)
}

/// First descendant (document order, excluding `element` itself) whose class
/// contains `marker`.
pub fn find_descendant<'a>(element: &ElementRef<'a>, marker: &str) -> Option<ElementRef<'a>> {
    element
        .descendants()
        .skip(1)
        .filter_map(ElementRef::wrap)
        .find(|candidate| has_class_containing(candidate, marker))
}

pub fn find_next_sibling<'a>(element: &ElementRef<'a>, marker: &str) -> Option<ElementRef<'a>> {
    element
        .next_siblings()
        .filter_map(ElementRef::wrap)
        .find(|candidate| has_class_containing(candidate, marker))
}

/// Text under these elements is never rendered as page copy.
const HIDDEN_TEXT_PARENTS: [&str; 3] = ["script", "style", "template"];

/// Text nodes below `element` in document order, leaving out script,
/// stylesheet and template contents.
pub fn visible_text<'a>(element: &ElementRef<'a>) -> impl Iterator<Item = &'a str> {
    element.descendants().filter_map(|node| {
        let text = node.value().as_text()?;
        let hidden = node
            .parent()
            .and_then(|parent| parent.value().as_element())
            .is_some_and(|parent| {
                HIDDEN_TEXT_PARENTS
                    .iter()
                    .any(|hidden| *hidden == parent.name())
            });
        (!hidden).then_some(&**text)
    })
}

/// Every visible text node trimmed, blanks dropped, joined with `separator`.
pub fn stripped_text(element: &ElementRef, separator: &str) -> String {
    visible_text(element)
        .map(str::trim)
        .filter(|piece| !piece.is_empty())
        .join(separator)
}

pub fn raw_text(element: &ElementRef) -> String {
    visible_text(element).collect()
}
