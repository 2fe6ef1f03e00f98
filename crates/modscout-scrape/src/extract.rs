//! Pull raw favorites records out of a listing page
//!
//! The site's class names drift, so matching is deliberately loose: any
//! `div`/`li` whose class mentions project, item or card is a candidate,
//! and the innermost candidates holding a link to a project page win.

use modscout_core::models::{resolve_link, RawRecord, DEFAULT_CONTENT_TYPE};
use tracing::debug;

use crate::html::{Element, Page};

const CARD_TAGS: &[&str] = &["div", "li"];
const CARD_CLASSES: &[&str] = &["project", "item", "card"];
const CHIP_TAGS: &[&str] = &["a", "span", "li"];
const NAME_TAGS: &[&str] = &["h1", "h2", "h3", "h4", "span", "div", "p", "a"];
const DESCRIPTION_CLASSES: &[&str] = &["description", "summary"];
const VERSION_CLASSES: &[&str] = &["version"];
const NAME_CLASSES: &[&str] = &["name", "title"];

/// Path fragment every project link carries
const PROJECT_PATH: &str = "/minecraft/";

/// Link path fragments that mean the entry is a resource pack
const ASSET_PATHS: &[&str] = &["/texture-packs/", "/resource-packs/"];

/// Content type given to entries found under `ASSET_PATHS`
pub const ASSET_CONTENT_TYPE: &str = "resourcepack";

/// Field elements, collected once per page and matched to cards by position
struct FieldElements {
    names: Vec<Element>,
    descriptions: Vec<Element>,
    versions: Vec<Element>,
    chips: Vec<Element>,
}

/// Extract every favorites card on the page
///
/// Never fails: a page with nothing recognizable gives an empty list, and
/// a card without a usable name still comes back (without one) so the
/// normalizer can count it as dropped.
pub fn extract_favorites(html: &str, base_url: &str) -> Vec<RawRecord> {
    let page = Page::new(html);

    // `li.tag-item` says "item" but it's a chip, not a card
    let shells: Vec<Element> = page
        .classed_elements(CARD_TAGS, CARD_CLASSES)
        .into_iter()
        .filter(|e| !(e.tag == "li" && is_tag_class(&e.class)))
        .collect();

    // Chips hold no cards, so a `category-results` wrapper is never one
    let chips: Vec<Element> = page
        .elements(CHIP_TAGS)
        .into_iter()
        .filter(|e| is_tag_class(&e.class))
        .filter(|chip| !shells.iter().any(|card| chip.contains(card)))
        .collect();

    // Category chips often link into /minecraft/ too - those aren't project links
    let project_links: Vec<Element> = page
        .elements(&["a"])
        .into_iter()
        .filter(|a| {
            a.href
                .as_deref()
                .is_some_and(|href| href.contains(PROJECT_PATH))
        })
        .filter(|a| !chips.iter().any(|t| t.start <= a.start && a.end <= t.end))
        .collect();

    let candidates: Vec<&Element> = shells
        .iter()
        .filter(|card| project_links.iter().any(|a| card.contains(a)))
        .collect();

    debug!("Found {} potential mod entries", candidates.len());

    let fields = FieldElements {
        names: page.classed_elements(NAME_TAGS, NAME_CLASSES),
        descriptions: page.classed_elements(&["p", "div"], DESCRIPTION_CLASSES),
        versions: page.classed_elements(&["span", "div"], VERSION_CLASSES),
        chips,
    };

    // Outer wrappers (lists, grids) also match - keep only the innermost cards
    let records: Vec<RawRecord> = candidates
        .iter()
        .filter(|card| !candidates.iter().any(|other| other != *card && card.contains(other)))
        .filter_map(|card| {
            let link = project_links.iter().find(|a| card.contains(a))?;
            Some(extract_card(&page, card, link, &fields, base_url))
        })
        .collect();

    debug!("Parsed {} mods", records.len());
    records
}

fn extract_card(
    page: &Page,
    card: &Element,
    link: &Element,
    fields: &FieldElements,
    base_url: &str,
) -> RawRecord {
    let href = link.href.clone().unwrap_or_default();
    let url = resolve_link(&href, base_url);

    let mut name = link.text(page);
    if name.is_empty() {
        // Image-only link: fall back to a name/title element
        name = first_text(page, card, &fields.names).unwrap_or_default();
    }

    let description = first_text(page, card, &fields.descriptions).unwrap_or_default();

    let game_versions = first_text(page, card, &fields.versions)
        .map(|text| {
            text.split(',')
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .collect()
        })
        .unwrap_or_default();

    // Innermost chips only, so a wrapper doesn't glue every tag into one
    let chips: Vec<&Element> = fields.chips.iter().filter(|t| card.contains(t)).collect();
    let categories = chips
        .iter()
        .filter(|t| !chips.iter().any(|other| t.contains(other)))
        .map(|t| t.text(page))
        .filter(|t| !t.is_empty())
        .collect();

    let mod_type = if ASSET_PATHS.iter().any(|p| url.contains(p)) {
        ASSET_CONTENT_TYPE
    } else {
        DEFAULT_CONTENT_TYPE
    };

    RawRecord {
        name: Some(name).filter(|n| !n.is_empty()),
        url: Some(url),
        description: Some(description),
        game_versions: Some(game_versions),
        mod_type: Some(mod_type.to_string()),
        categories: Some(categories),
    }
}

fn first_text(page: &Page, card: &Element, elements: &[Element]) -> Option<String> {
    elements
        .iter()
        .filter(|e| card.contains(e))
        .map(|e| e.text(page))
        .find(|t| !t.is_empty())
}

/// Whole class words only: `tag-item` and `category-chip` count, `main-stage` doesn't
fn is_tag_class(class: &str) -> bool {
    class
        .to_ascii_lowercase()
        .split(|c: char| !c.is_ascii_alphanumeric())
        .any(|word| matches!(word, "tag" | "tags") || word.starts_with("categor"))
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = "https://www.curseforge.com";

    #[test]
    fn test_single_card() {
        let html = r#"
            <div class="project-card">
              <a href="/minecraft/mc-mods/waystones">Waystones</a>
              <p class="description">Teleport back to activated waystones.</p>
              <span class="game-version">1.20.1, 1.19.2</span>
              <a class="category-chip" href="/minecraft/search?category=transportation">Transportation</a>
            </div>"#;

        let records = extract_favorites(html, BASE);
        assert_eq!(records.len(), 1);

        let record = &records[0];
        assert_eq!(record.name.as_deref(), Some("Waystones"));
        assert_eq!(
            record.url.as_deref(),
            Some("https://www.curseforge.com/minecraft/mc-mods/waystones")
        );
        assert_eq!(
            record.description.as_deref(),
            Some("Teleport back to activated waystones.")
        );
        assert_eq!(
            record.game_versions,
            Some(vec!["1.20.1".to_string(), "1.19.2".to_string()])
        );
        assert_eq!(record.categories, Some(vec!["Transportation".to_string()]));
        assert_eq!(record.mod_type.as_deref(), Some("mod"));
    }

    #[test]
    fn test_texture_pack_path_sets_type() {
        let html = r#"<li class="project-list-item"><a href="https://www.curseforge.com/minecraft/texture-packs/faithful-32x">Faithful 32x</a></li>"#;
        let records = extract_favorites(html, BASE);
        assert_eq!(records[0].mod_type.as_deref(), Some(ASSET_CONTENT_TYPE));
    }

    #[test]
    fn test_wrapper_does_not_swallow_cards() {
        let html = r#"
            <ul class="project-list">
              <li class="project-item"><a href="/minecraft/mc-mods/jei">JEI</a></li>
              <li class="project-item"><a href="/minecraft/mc-mods/jade">Jade</a></li>
            </ul>
            <div class="favorites-card-grid">
              <div class="card"><a href="/minecraft/mc-mods/create">Create</a></div>
            </div>"#;

        let names: Vec<_> = extract_favorites(html, BASE)
            .into_iter()
            .filter_map(|r| r.name)
            .collect();
        assert_eq!(names, vec!["JEI", "Jade", "Create"]);
    }

    #[test]
    fn test_category_links_are_not_cards() {
        let html = r#"
            <div class="project-card">
              <a href="/minecraft/mc-mods/farmers-delight">Farmer&#39;s Delight</a>
              <ul>
                <li class="tag-item"><a href="/minecraft/mc-mods/food">Food</a></li>
              </ul>
            </div>"#;

        let records = extract_favorites(html, BASE);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name.as_deref(), Some("Farmer's Delight"));
        assert_eq!(records[0].categories, Some(vec!["Food".to_string()]));
    }

    #[test]
    fn test_image_link_falls_back_to_title() {
        let html = r#"
            <div class="project-card">
              <a href="/minecraft/mc-mods/sodium"><img src="logo.png"></a>
              <h3 class="project-title">Sodium</h3>
            </div>"#;

        let records = extract_favorites(html, BASE);
        assert_eq!(records[0].name.as_deref(), Some("Sodium"));
    }

    #[test]
    fn test_nameless_card_still_reported() {
        let html = r#"<div class="card"><a href="/minecraft/mc-mods/mystery"><img src="x.png"></a></div>"#;
        let records = extract_favorites(html, BASE);
        assert_eq!(records.len(), 1);
        assert!(records[0].name.is_none());
    }

    #[test]
    fn test_wrapper_class_words_dont_hide_cards() {
        for wrapper in [
            r#"<div class="main-stage">"#,
            r#"<div class="category-results">"#,
            r#"<span class="tag-list">"#,
        ] {
            let close = if wrapper.starts_with("<span") { "</span>" } else { "</div>" };
            let html = format!(
                r#"{}<div class="project-card vintage"><a href="/minecraft/mc-mods/jei">JEI</a></div>{}"#,
                wrapper, close
            );
            let names: Vec<_> = extract_favorites(&html, BASE)
                .into_iter()
                .filter_map(|r| r.name)
                .collect();
            assert_eq!(names, vec!["JEI"], "wrapped in {}", wrapper);
        }
    }

    #[test]
    fn test_category_list_wrapping_cards() {
        let html = r#"
            <ul>
              <li class="category-results">
                <div class="project-card">
                  <a href="/minecraft/mc-mods/jade">Jade</a>
                  <span class="tag">Utility</span>
                </div>
              </li>
            </ul>"#;

        let records = extract_favorites(html, BASE);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name.as_deref(), Some("Jade"));
        assert_eq!(records[0].categories, Some(vec!["Utility".to_string()]));
    }

    #[test]
    fn test_many_nested_cards() {
        let mut html = String::new();
        for depth in 0..15 {
            html.push_str(&format!(r#"<div class="wrapper-{}">"#, depth));
        }
        for i in 0..300 {
            html.push_str(&format!(
                r#"<div class="project-card"><a href="/minecraft/mc-mods/m{i}">Mod {i}</a><p class="description">Entry {i}</p><span class="game-version">1.20.1</span></div>"#
            ));
        }
        html.push_str(&"</div>".repeat(15));

        let records = extract_favorites(&html, BASE);
        assert_eq!(records.len(), 300);
        assert_eq!(records[299].name.as_deref(), Some("Mod 299"));
        assert_eq!(records[299].description.as_deref(), Some("Entry 299"));
    }

    #[test]
    fn test_no_cards() {
        assert!(extract_favorites("<html><body><p>Nothing here</p></body></html>", BASE).is_empty());
        assert!(extract_favorites(
            r#"<div class="card"><a href="https://example.com/elsewhere">Elsewhere</a></div>"#,
            BASE
        )
        .is_empty());
    }
}
