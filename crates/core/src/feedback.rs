//! Operator feedback shown after a successful save.

use serde::Serialize;

/// Public h-card validator the follow-up message links to.
pub const DEFAULT_VALIDATOR_BASE: &str = "https://indiewebify.me/validate-h-card/";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageLevel {
    Status,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Link {
    pub label: String,
    pub href: String,
    /// Whether the link should open outside the admin page.
    pub external: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OperatorMessage {
    pub level: MessageLevel,
    pub text: String,
    /// `link.label` appears verbatim inside `text`.
    pub link: Link,
}

/// Acknowledgement of a persisted profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Ack {
    pub messages: Vec<OperatorMessage>,
}

/// `<base>?url=<encoded origin>`, appending with `&` when the base already
/// carries a query.
pub fn validator_url(base: &str, site_origin: &str) -> String {
    let separator = if base.contains('?') { '&' } else { '?' };
    format!("{base}{separator}url={}", urlencoding::encode(site_origin))
}

/// The two status messages emitted after every successful save.
pub fn build_ack(site_origin: &str, validator_base: &str) -> Ack {
    Ack {
        messages: vec![
            OperatorMessage {
                level: MessageLevel::Status,
                text: "Next Step: Ensure the \"IndieWeb H-Card\" block is placed in a region \
                       on your home page."
                    .to_string(),
                link: Link {
                    label: "home page".to_string(),
                    href: site_origin.to_string(),
                    external: false,
                },
            },
            OperatorMessage {
                level: MessageLevel::Status,
                text: "Once the block is visible, you can run the IndieWebify Validator."
                    .to_string(),
                link: Link {
                    label: "run the IndieWebify Validator".to_string(),
                    href: validator_url(validator_base, site_origin),
                    external: true,
                },
            },
        ],
    }
}
