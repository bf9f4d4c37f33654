//! Media resolution engine properties exercised through the public API.

use std::collections::{BTreeMap, HashMap};
use vaultpub_core::media::{
    DEFAULT_PLACEHOLDER, FormatVariant, MediaCatalogEntry, MediaOptions, MediaResolver,
    PLACEHOLDER_HEIGHT, PLACEHOLDER_WIDTH, SourceMetadata,
};

fn catalog_entry(path: &str, size: &str, public_path: &str) -> MediaCatalogEntry {
    let mut size_variants = BTreeMap::new();
    size_variants.insert(
        size.to_string(),
        vec![FormatVariant {
            width: 320,
            height: 200,
            format: "webp".to_string(),
            public_path: public_path.to_string(),
            absolute_public_path: None,
            byte_size: 999,
        }],
    );
    MediaCatalogEntry {
        original_relative_path: path.to_string(),
        file_name: path.rsplit('/').next().unwrap().to_string(),
        file_extension: "png".to_string(),
        mime_type: "image/png".to_string(),
        size_variants,
        source_metadata: SourceMetadata::default(),
    }
}

#[test]
fn never_fails_for_arbitrary_embed_strings() {
    let entries = Vec::new();
    let path_map = HashMap::new();
    let resolver = MediaResolver::new(&entries, &path_map, MediaOptions::default());

    let hostile = [
        "",
        "missing.png",
        "../../../etc/shadow",
        "..\\..\\windows\\system32",
        "name with spaces.png",
        "ünïcödé.png",
        "trailing/slash/",
        "////",
        "a]b[c.png",
    ];
    for raw in hostile {
        let resolved = resolver.resolve(raw);
        assert!(!resolved.url.is_empty(), "no renderable node for {raw:?}");
        assert!(!resolved.found);
    }
}

#[test]
fn empty_run_resolves_to_configured_placeholder() {
    let entries = Vec::new();
    let path_map = HashMap::new();
    let resolver = MediaResolver::new(&entries, &path_map, MediaOptions::default());

    let resolved = resolver.resolve("missing.png");
    assert_eq!(resolved.url, DEFAULT_PLACEHOLDER);
    assert_eq!(resolved.alt, "missing.png");
    assert_eq!(resolved.width, Some(PLACEHOLDER_WIDTH));
    assert_eq!(resolved.height, Some(PLACEHOLDER_HEIGHT));
}

#[test]
fn custom_placeholder_is_respected() {
    let entries = Vec::new();
    let path_map = HashMap::new();
    let options = MediaOptions {
        placeholder: "/static/missing.svg".to_string(),
        ..MediaOptions::default()
    };
    let resolver = MediaResolver::new(&entries, &path_map, options);
    assert_eq!(resolver.resolve("gone.png").url, "/static/missing.svg");
}

#[test]
fn path_map_beats_conflicting_catalog_entry() {
    let entries = vec![catalog_entry("img/pic.png", "md", "/from-catalog/pic-md.webp")];
    let mut path_map = HashMap::new();
    path_map.insert("img/pic.png".to_string(), "/from-map/pic.webp".to_string());

    let resolver = MediaResolver::new(&entries, &path_map, MediaOptions::default());
    assert_eq!(resolver.resolve("img/pic.png").url, "/from-map/pic.webp");
}

#[test]
fn catalog_serves_misses_of_the_path_map() {
    let entries = vec![catalog_entry("img/pic.png", "md", "/from-catalog/pic-md.webp")];
    let path_map = HashMap::new();

    let resolver = MediaResolver::new(&entries, &path_map, MediaOptions::default());
    // by basename, case-insensitively
    let resolved = resolver.resolve("PIC.png");
    assert_eq!(resolved.url, "/from-catalog/pic-md.webp");
    assert_eq!(resolved.width, Some(320));
    assert_eq!(resolved.height, Some(200));
}

#[test]
fn probe_order_is_documented_and_stable() {
    let variants = MediaResolver::path_variants("Media\\Img.PNG");
    assert_eq!(
        variants,
        vec![
            "/Media\\Img.PNG".to_string(),
            "Media\\Img.PNG".to_string(),
            "Media/Img.PNG".to_string(),
            "media\\img.png".to_string(),
            "Img.PNG".to_string(),
        ]
    );
}

#[test]
fn resolving_twice_is_idempotent() {
    let entries = vec![catalog_entry("img/pic.png", "sm", "/m/pic-sm.webp")];
    let path_map = HashMap::new();
    let resolver = MediaResolver::new(&entries, &path_map, MediaOptions::default());

    assert_eq!(resolver.resolve("pic.png"), resolver.resolve("pic.png"));
}
