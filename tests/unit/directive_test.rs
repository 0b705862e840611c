//! Unit tests for instruction composition

use headshot_studio::generation::directive::{compose, IDENTITY_DIRECTIVE};
use headshot_studio::styles::StyleCatalog;

#[test]
fn test_every_style_prompt_carries_directive() {
    for style in StyleCatalog::builtin().all() {
        let composed = compose(style.prompt);
        assert!(composed.contains(style.prompt), "{} prompt missing", style.id);
        assert!(composed.contains(IDENTITY_DIRECTIVE), "{} directive missing", style.id);
    }
}

#[test]
fn test_free_text_edit_carries_directive() {
    let composed = compose("make the tie blue");
    assert!(composed.contains("make the tie blue"));
    assert!(composed.contains(IDENTITY_DIRECTIVE));
}

#[test]
fn test_directive_covers_identity_rules() {
    for needle in ["exact same person", "bone structure", "skin tone", "eye color", "background", "photorealistic"] {
        assert!(IDENTITY_DIRECTIVE.contains(needle), "missing {needle}");
    }
}
