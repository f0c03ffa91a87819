//! Operator-facing help and page introduction text.

use serde::Serialize;

/// Introduction shown above the settings form.
pub const SETTINGS_INTRO: &[&str] = &[
    "Use this form to define your Representative h-card. This information is used to \
     identify you across the IndieWeb, providing a machine-readable \"business card\" for \
     services like Bridgy, IndieAuth, and Webmentions.",
    "By providing your site URL and social profile links (with rel=\"me\"), you establish \
     sovereign identity, proving that you are the same person across different platforms.",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HelpSection {
    pub heading: &'static str,
    pub paragraphs: Vec<String>,
    pub items: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HelpPage {
    pub title: &'static str,
    pub summary: &'static str,
    pub sections: Vec<HelpSection>,
}

/// Build the help page, linking to where the settings form and the block
/// layout live on this deployment.
pub fn help_page(settings_path: &str, block_layout_path: &str) -> HelpPage {
    HelpPage {
        title: "IndieWeb Identity Help",
        summary: "This module provides a centralized way to manage your Representative \
                  h-card, the machine-readable identity that tells the IndieWeb who you are.",
        sections: vec![
            HelpSection {
                heading: "Configuration",
                paragraphs: Vec::new(),
                items: vec![
                    format!(
                        "Set your name, bio, and social links at the Identity Settings page \
                         ({settings_path})."
                    ),
                    "Upload an avatar to be used as your u-photo.".to_string(),
                    "Provide URLs to your other profiles (Bluesky, GitHub, etc.) to establish \
                     rel=\"me\" verification."
                        .to_string(),
                ],
            },
            HelpSection {
                heading: "Usage",
                paragraphs: vec![format!(
                    "Once configured, you must place the IndieWeb H-Card block on your \
                     homepage using the Block Layout ({block_layout_path}). The h-card is \
                     hidden from humans by default but remains visible to parsers and \
                     validators."
                )],
                items: Vec::new(),
            },
        ],
    }
}
