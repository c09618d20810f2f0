//! Properties of translation resolution and section aggregation.

use cms_content::content::{FieldMapping, FieldValue, aggregate, resolve};
use cms_content::models::{ContentElement, SubSection};
use cms_content::test_utils::{SubSectionBuilder, element};

fn title_mapping() -> FieldMapping {
    FieldMapping::new().field("title", "Title")
}

#[test]
fn test_untranslated_element_resolves_to_default_in_any_language() {
    let with_default = element("Title", "Welcome");
    let mut without_default = element("Title", "");
    without_default.default_content = None;

    for language in ["en", "ar", "fr", "zz", ""] {
        assert_eq!(resolve(Some(&with_default), language), "Welcome");
        assert_eq!(resolve(Some(&without_default), language), "");
    }
}

#[test]
fn test_exact_translation_beats_default() {
    let el = element("Title", "D").with_translation("en", "A").with_translation("ar", "B");

    assert_eq!(resolve(Some(&el), "ar"), "B");
    assert_eq!(resolve(Some(&el), "en"), "A");
    assert_eq!(resolve(Some(&el), "fr"), "D");
}

#[test]
fn test_empty_translation_is_returned_as_is() {
    let el = element("Title", "Default").with_translation("ar", "");
    assert_eq!(resolve(Some(&el), "ar"), "");
}

#[test]
fn test_first_duplicate_translation_wins() {
    let el = element("Title", "Default").with_translation("ar", "first").with_translation("ar", "second");
    assert_eq!(resolve(Some(&el), "ar"), "first");
}

#[test]
fn test_aggregate_is_deterministic() {
    let subsections = vec![
        SubSectionBuilder::new("b").order(2).translated("Title", "Two", &[("ar", "اثنان")]).build(),
        SubSectionBuilder::new("a").order(1).translated("Title", "One", &[("ar", "واحد")]).build(),
        SubSectionBuilder::new("c").text("Title", "Unordered").build(),
    ];
    let mapping = title_mapping().field("id", "_id");

    let first = aggregate(&subsections, &mapping, 1, None, "ar");
    let second = aggregate(&subsections, &mapping, 1, None, "ar");
    assert_eq!(first, second);
    assert_eq!(first.len(), 3);
}

#[test]
fn test_output_is_sorted_by_order_regardless_of_input_order() {
    let build = |id: &str, order: i64| SubSectionBuilder::new(id).order(order).text("Title", id).build();
    let permutations = [[3, 1, 2], [1, 2, 3], [2, 3, 1]];

    for orders in permutations {
        let subsections: Vec<SubSection> = orders.iter().map(|o| build(&format!("s{o}"), *o)).collect();
        let items = aggregate(&subsections, &title_mapping(), 1, None, "en");

        let orders: Vec<i64> = items.iter().map(|item| item.order).collect();
        assert_eq!(orders, vec![1, 2, 3]);
        assert_eq!(items[0].text("title"), "s1");
    }
}

#[test]
fn test_subsection_without_mapped_elements_contributes_nothing() {
    let subsections = vec![
        SubSectionBuilder::new("kept").order(1).text("Title", "Kept").build(),
        SubSectionBuilder::new("unrelated").order(2).text("Caption", "Ignored").text("Body", "Ignored").build(),
        SubSectionBuilder::new("blank").order(3).text("Title", "").build(),
    ];

    let items = aggregate(&subsections, &title_mapping(), 1, None, "en");
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].text("title"), "Kept");
}

#[test]
fn test_repetitions_expand_index_template() {
    let subsection = SubSectionBuilder::new("faq")
        .order(1)
        .text("Item 1 - Title", "First")
        .translated("Item 2 - Title", "Second", &[("ar", "الثاني")])
        .build();
    let mapping = FieldMapping::new().field("title", "Item {index} - Title");

    let items = aggregate(std::slice::from_ref(&subsection), &mapping, 2, None, "ar");
    assert_eq!(items.len(), 2);
    assert_eq!(items[0].text("title"), "First");
    assert_eq!(items[1].text("title"), "الثاني");
}

#[test]
fn test_repetitions_skip_missing_indices() {
    let subsection = SubSectionBuilder::new("faq")
        .order(1)
        .text("Item 1 - Title", "First")
        .text("Item 3 - Title", "Third")
        .build();
    let mapping = FieldMapping::new().field("title", "Item {index} - Title");

    let items = aggregate(std::slice::from_ref(&subsection), &mapping, 3, None, "en");
    let titles: Vec<&str> = items.iter().map(|item| item.text("title")).collect();
    assert_eq!(titles, vec!["First", "Third"]);
}

#[test]
fn test_scenario_arabic_and_french() {
    let subsections = vec![SubSection::new(
        "hero",
        1,
        vec![ContentElement::text("Title", "Hello").with_translation("ar", "مرحبا")],
    )];

    let ar = aggregate(&subsections, &title_mapping(), 1, None, "ar");
    assert_eq!(serde_json::to_value(&ar).unwrap(), serde_json::json!([{ "title": "مرحبا", "order": 1 }]));

    let fr = aggregate(&subsections, &title_mapping(), 1, None, "fr");
    assert_eq!(serde_json::to_value(&fr).unwrap(), serde_json::json!([{ "title": "Hello", "order": 1 }]));
}

#[test]
fn test_malformed_subsections_are_skipped() {
    let subsections = vec![
        SubSectionBuilder::new("no-elements").order(1).without_elements().build(),
        SubSectionBuilder::new("ok").order(2).text("Title", "Fine").build(),
        SubSectionBuilder::new("bad-derive").order(3).text("Title", "Never").build(),
    ];
    let mapping = title_mapping().derive("slug", |subsection: &SubSection, _| {
        if subsection.id == "bad-derive" {
            anyhow::bail!("cannot slugify");
        }
        Ok(FieldValue::Text(subsection.id.to_uppercase()))
    });

    let items = aggregate(&subsections, &mapping, 1, None, "en");
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].text("slug"), "OK");
}

#[test]
fn test_filter_and_mapped_order() {
    let subsections = vec![
        SubSectionBuilder::new("a").order(1).text("Title", "Alpha").text("Rank", "9").build(),
        SubSectionBuilder::new("b").order(2).text("Title", "Beta").text("Rank", "4").build(),
        SubSectionBuilder::new("c").order(3).text("Title", "Gamma").text("Rank", "1").build(),
    ];
    let mapping = title_mapping().field("order", "Rank");
    let not_gamma = |item: &cms_content::content::ViewModel| item.text("title") != "Gamma";

    let items = aggregate(&subsections, &mapping, 1, Some(&not_gamma), "en");
    let titles: Vec<&str> = items.iter().map(|item| item.text("title")).collect();
    assert_eq!(titles, vec!["Beta", "Alpha"]);
    assert_eq!(items[0].order, 4);
    assert!(items[0].get("order").is_none());
}

#[test]
fn test_id_and_created_at_sentinels() {
    let subsections = vec![
        SubSectionBuilder::new("dated").order(1).created_at("2024-03-01T10:00:00.000Z").build(),
        SubSectionBuilder::new("undated").order(2).created_at("yesterday").build(),
    ];
    let mapping = FieldMapping::new().field("id", "_id").field("created", "createdAt");

    let items = aggregate(&subsections, &mapping, 1, None, "en");
    assert_eq!(items.len(), 2);
    assert_eq!(items[0].text("id"), "dated");
    assert!(matches!(items[0].get("created"), Some(FieldValue::Date(_))));
    assert_eq!(items[1].text("created"), "");
}
