use scraper::{ElementRef, Html};

use crate::domain::{
    html_class::{
        all_elements, find_descendant, find_next_sibling, has_class_containing, has_class_named,
        raw_text, stripped_text,
    },
    ScrapedFields,
};

const FIELD_MARKER: &str = "article__content__view__field";
const LABEL_MARKER: &str = "field__label";
const VALUE_MARKER: &str = "field__value";

const HEADER_MARKER: &str = "article__header";
const CONTENT_MARKER: &str = "article__content";

const DESCRIPTION_CONTAINERS: [&str; 3] = [
    "jobDetailTableDescription",
    "jobDetail",
    "jobDetailDescription",
];

const DESCRIPTION_KEYWORDS: [&str; 5] = [
    "Description & Requirements",
    "Opportunity",
    "Job Overview",
    "Descriptions",
    "Your challenges and objectives:",
];

/// Pulls every labelled field and the description block out of a job page.
pub fn extract_metadata(html: &str) -> ScrapedFields {
    let document = Html::parse_document(html);
    let mut scraped = ScrapedFields::new();

    extract_dynamic_fields(&document, &mut scraped);

    if let Some(description) = find_description_element(&document) {
        scraped.set_description(stripped_text(&description, " "));
    }

    scraped
}

fn extract_dynamic_fields(document: &Html, scraped: &mut ScrapedFields) {
    for field in all_elements(document).filter(|e| has_class_containing(e, FIELD_MARKER)) {
        let label = find_descendant(&field, LABEL_MARKER);
        let value = find_descendant(&field, VALUE_MARKER);

        match (label, value) {
            (Some(label), Some(value)) => {
                scraped.insert_field(stripped_text(&label, ""), stripped_text(&value, " "));
            }
            (None, Some(value)) => {
                scraped.note_unlabelled(stripped_text(&value, ""));
            }
            _ => {}
        }
    }
}

fn find_description_element(document: &Html) -> Option<ElementRef<'_>> {
    let container = all_elements(document).find(|e| {
        DESCRIPTION_CONTAINERS
            .iter()
            .any(|name| has_class_named(e, name))
    });
    if container.is_some() {
        return container;
    }

    all_elements(document)
        .filter(|e| has_class_containing(e, HEADER_MARKER))
        .filter(|header| {
            let text = raw_text(header);
            DESCRIPTION_KEYWORDS.iter().any(|keyword| text.contains(keyword))
        })
        .find_map(|header| find_next_sibling(&header, CONTENT_MARKER))
}

#[cfg(test)]
mod tests {
    use serde_json::Value;

    use super::*;
    use crate::domain::{ADDITIONAL_NOTES_KEY, DESCRIPTION_KEY};

    fn page(body: &str) -> String {
        format!("<html><head><title>Job</title></head><body>{}</body></html>", body)
    }

    fn field(label: &str, value: &str) -> String {
        format!(
            r#"<div class="article__content__view__field">
                 <div class="article__content__view__field__label">{}</div>
                 <div class="article__content__view__field__value">{}</div>
               </div>"#,
            label, value
        )
    }

    #[test]
    fn labelled_field_becomes_key() {
        let scraped = extract_metadata(&page(&field("Travel", "25%")));

        assert_eq!(scraped.get("Travel"), Some(&Value::String("25%".into())));
        assert_eq!(scraped.get(DESCRIPTION_KEY), Some(&Value::Null));
    }

    #[test]
    fn field_values_collapse_inner_whitespace() {
        let scraped = extract_metadata(&page(&field(
            "  Location ",
            "<span>Houston,</span>\n\n   <span>Texas</span>   <br> United States",
        )));

        assert_eq!(
            scraped.get("Location"),
            Some(&Value::String("Houston, Texas United States".into()))
        );
    }

    #[test]
    fn later_duplicate_label_wins() {
        let html = page(&format!("{}{}", field("Shift", "Day"), field("Shift", "Night")));
        let scraped = extract_metadata(&html);

        assert_eq!(scraped.get("Shift"), Some(&Value::String("Night".into())));
    }

    #[test]
    fn unlabelled_value_is_not_stored_as_note() {
        let html = page(
            r#"<div class="article__content__view__field">
                 <div class="article__content__view__field__value">This role is remote based</div>
               </div>"#,
        );
        let scraped = extract_metadata(&html);

        assert!(!scraped.contains_key(ADDITIONAL_NOTES_KEY));
        assert_eq!(scraped.len(), 1);
    }

    #[test]
    fn field_with_label_only_is_ignored() {
        let html = page(
            r#"<div class="article__content__view__field">
                 <div class="article__content__view__field__label">Req #</div>
               </div>"#,
        );

        assert_eq!(extract_metadata(&html).len(), 1);
    }

    #[test]
    fn description_container_takes_priority() {
        let html = page(
            r#"<div class="article__header"><h2>Job Overview</h2></div>
               <div class="article__content">From the header</div>
               <div class="wrapper jobDetailDescription"><p>Lead the team.</p>
               <p>Ship often.</p></div>"#,
        );
        let scraped = extract_metadata(&html);

        assert_eq!(scraped.description(), Some("Lead the team. Ship often."));
    }

    #[test]
    fn header_keyword_selects_following_content_sibling() {
        let html = page(
            r#"<section>
                 <div class="article__header"><h3>Benefits</h3></div>
                 <div class="article__content">Free lunch</div>
                 <div class="article__header article__header--main"><h3>Job Overview</h3></div>
                 <div class="article__content">  Maintain   <b>turbines</b>
                   offshore. </div>
               </section>"#,
        );
        let scraped = extract_metadata(&html);

        assert_eq!(scraped.description(), Some("Maintain turbines offshore."));
    }

    #[test]
    fn keyword_match_is_case_sensitive() {
        let html = page(
            r#"<div class="article__header">job overview</div>
               <div class="article__content">Lowercase header</div>"#,
        );

        assert_eq!(extract_metadata(&html).description(), None);
    }

    #[test]
    fn header_without_content_sibling_falls_through_to_next_header() {
        let html = page(
            r#"<div><div class="article__header">Opportunity</div></div>
               <div class="article__header">Descriptions</div>
               <div class="article__content">Second header wins</div>"#,
        );

        assert_eq!(
            extract_metadata(&html).description(),
            Some("Second header wins")
        );
    }

    #[test]
    fn page_without_candidates_keeps_null_description() {
        let scraped = extract_metadata(&page("<p>Nothing to see</p>"));

        assert_eq!(scraped.get(DESCRIPTION_KEY), Some(&Value::Null));
        assert_eq!(scraped.len(), 1);
    }

    #[test]
    fn description_skips_inline_script_and_style() {
        let scraped = extract_metadata(
            r#"<div class="jobDetail"><p>Weld pipe.</p><script>var tracking = {id: 1};</script><style>.x{color:red}</style></div>"#,
        );

        assert_eq!(scraped.description(), Some("Weld pipe."));
    }

    #[test]
    fn keyword_inside_header_script_does_not_match() {
        let html = page(
            r#"<div class="article__header"><h2>Benefits</h2><script>track("Job Overview")</script></div>
               <div class="article__content">Dental plan</div>"#,
        );

        assert_eq!(extract_metadata(&html).description(), None);
    }

    #[test]
    fn malformed_markup_still_parses() {
        let scraped = extract_metadata("<div class=\"jobDetail\"><p>Unclosed <b>tags");

        assert_eq!(scraped.description(), Some("Unclosed tags"));
    }
}
