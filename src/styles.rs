//! Built-in catalog of headshot styles

use serde::Serialize;

/// Bumped whenever a style is added, removed, or reworded.
pub const CATALOG_VERSION: u32 = 1;

/// A predefined transformation preset offered to the user
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StyleDescriptor {
    pub id: &'static str,
    pub name: &'static str,
    /// Natural-language instruction sent to the generation service
    pub prompt: &'static str,
    pub preview_url: &'static str,
}

const BUILTIN_STYLES: &[StyleDescriptor] = &[
    StyleDescriptor {
        id: "corporate-black",
        name: "Corporate Black",
        prompt: "Generate a professional corporate headshot of this person with a clean, sharp focus and a solid black backdrop. The person should be wearing business attire. The lighting should be soft and even, creating a classic, professional look.",
        preview_url: "https://picsum.photos/seed/black/300/200",
    },
    StyleDescriptor {
        id: "tech-office",
        name: "Modern Tech Office",
        prompt: "Generate a professional headshot of this person in a modern tech office setting. The background should be slightly blurred (bokeh effect) showing a bright, contemporary office with glass walls and some greenery. The person should have a friendly but confident expression.",
        preview_url: "https://picsum.photos/seed/tech/300/200",
    },
    StyleDescriptor {
        id: "outdoor-natural",
        name: "Outdoor Natural",
        prompt: "Generate a professional headshot of this person outdoors with natural lighting. The background should be a pleasant, out-of-focus park or urban green space. The lighting should look like it's from a slightly overcast day to avoid harsh shadows.",
        preview_url: "https://picsum.photos/seed/outdoor/300/200",
    },
    StyleDescriptor {
        id: "studio-bw",
        name: "Studio Black & White",
        prompt: "Generate a dramatic and professional black and white studio headshot of this person. Use strong, high-contrast lighting (like Rembrandt lighting) against a dark, solid backdrop. The final image should be monochrome.",
        preview_url: "https://picsum.photos/seed/bw/300/200",
    },
];

/// Read-only style table
#[derive(Debug, Clone)]
pub struct StyleCatalog {
    styles: &'static [StyleDescriptor],
}

impl StyleCatalog {
    pub fn builtin() -> Self {
        Self {
            styles: BUILTIN_STYLES,
        }
    }

    pub fn version(&self) -> u32 {
        CATALOG_VERSION
    }

    pub fn all(&self) -> &[StyleDescriptor] {
        self.styles
    }

    pub fn find(&self, id: &str) -> Option<&StyleDescriptor> {
        self.styles.iter().find(|style| style.id == id)
    }
}
