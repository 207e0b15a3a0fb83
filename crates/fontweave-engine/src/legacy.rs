// this_file: crates/fontweave-engine/src/legacy.rs

//! Compatibility shim for configurations written before explicit parent
//! links and soft-link tags existed.
//!
//! Nothing on the primary resolution path depends on name matching; these
//! helpers only run for records that lack the explicit data.

use fontweave_core::{FallbackLink, FallbackOverride, Font, FontId, FontScope, Style};

/// Find the ancestor of a parentless clone by matching its identity
/// signature against the style's non-clone fonts.
pub fn ancestor_by_signature<'a>(style: &'a Style, font: &Font) -> Option<&'a Font> {
    style
        .fonts
        .iter()
        .filter(|candidate| !candidate.is_clone() && candidate.id != font.id)
        .find(|candidate| candidate.same_signature(font.signature()))
}

/// True for an old `original -> original` entry naming a global root font.
///
/// Such an entry means the same as a soft link whether or not
/// [`normalize_self_links`] has rewritten it yet.
pub fn is_self_link(style: &Style, key: &FontId, link: &FallbackLink) -> bool {
    matches!(link, FallbackLink::Font(target) if target == key)
        && style
            .font(key.as_str())
            .is_some_and(|font| !font.is_clone() && font.scope == FontScope::Global)
}

/// Rewrite old self-referencing entries (`original -> original`) that point
/// at a global root font into explicit soft links.
///
/// Self-references to language-specific uploads stay as mappings: those are
/// fonts the language uses directly. Returns the number of rewritten entries.
pub fn normalize_self_links(style: &mut Style) -> usize {
    let global_roots: Vec<_> = style
        .fonts
        .iter()
        .filter(|font| !font.is_clone() && font.scope == FontScope::Global)
        .map(|font| font.id.clone())
        .collect();

    let mut rewritten = 0;
    for fallback in style.fallback_font_overrides.values_mut() {
        let FallbackOverride::Map(links) = fallback else {
            continue;
        };
        for (key, link) in links.iter_mut() {
            let self_link = matches!(link, FallbackLink::Font(target) if target == key);
            if self_link && global_roots.contains(key) {
                *link = FallbackLink::Soft;
                rewritten += 1;
            }
        }
    }

    if rewritten > 0 {
        log::info!(
            target: "fontweave::legacy",
            "style {}: rewrote {rewritten} self-referencing fallback entries as soft links",
            style.name
        );
    }
    rewritten
}

#[cfg(test)]
mod tests {
    use super::*;
    use fontweave_core::{FontId, FontOrigin, LanguageId};
    use std::collections::BTreeMap;

    #[test]
    fn test_ancestor_by_signature() {
        let mut style = Style::new("body", Font::primary("P", "Inter"));
        style.insert_font(Font::root("F1", "Noto Sans").with_file_name("NotoSans.ttf"));
        let mut legacy = Font::root("F1-old-fr", "Noto Sans").with_file_name("NotoSans.ttf");
        legacy.origin = FontOrigin::Clone { parent: None };
        style.insert_font(legacy.clone());

        let ancestor = ancestor_by_signature(&style, &legacy).map(|font| font.id.as_str());
        assert_eq!(ancestor, Some("F1"));
    }

    #[test]
    fn test_normalize_self_links() {
        let mut style = Style::new("body", Font::primary("P", "Inter"));
        style.insert_font(Font::root("F1", "Noto Sans"));
        style.insert_font(
            Font::root("Fvi", "Be Vietnam").with_scope(FontScope::LanguageSpecific),
        );

        let mut links = BTreeMap::new();
        links.insert(FontId::new("F1"), FallbackLink::Font(FontId::new("F1")));
        links.insert(FontId::new("Fvi"), FallbackLink::Font(FontId::new("Fvi")));
        style
            .fallback_font_overrides
            .insert(LanguageId::new("vi"), FallbackOverride::Map(links));

        assert_eq!(normalize_self_links(&mut style), 1);
        assert_eq!(normalize_self_links(&mut style), 0);

        let Some(FallbackOverride::Map(links)) = style.fallback_font_overrides.get("vi") else {
            panic!("vi override missing");
        };
        assert_eq!(links.get("F1"), Some(&FallbackLink::Soft));
        assert_eq!(
            links.get("Fvi"),
            Some(&FallbackLink::Font(FontId::new("Fvi")))
        );
    }
}
