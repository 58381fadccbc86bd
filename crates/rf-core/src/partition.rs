//! Wheel partitions
//!
//! A partition is one labeled wedge of the wheel. Partitions occupy the wheel
//! in list order and all carry the same (implicit) weight.

use serde::{Deserialize, Serialize};

/// Minimum number of partitions the editor keeps on a wheel
pub const MIN_PARTITIONS: usize = 5;

/// Color token used to paint a partition (CSS-style hex string)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ColorToken(pub String);

impl ColorToken {
    pub const RED: &'static str = "#FF5555";
    pub const BLUE: &'static str = "#5555FF";
    pub const GREEN: &'static str = "#55AA55";
    pub const YELLOW: &'static str = "#FFAA00";
    pub const BLACK: &'static str = "#000000";

    /// Default palette, in cycling order
    pub const PALETTE: [&'static str; 5] =
        [Self::RED, Self::BLUE, Self::GREEN, Self::YELLOW, Self::BLACK];

    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Palette color for the n-th partition (wraps around)
    pub fn cycled(index: usize) -> Self {
        Self::new(Self::PALETTE[index % Self::PALETTE.len()])
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for ColorToken {
    fn default() -> Self {
        Self::new(Self::RED)
    }
}

/// One labeled wedge of the wheel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Partition {
    /// Unique id
    pub id: String,
    /// Label drawn on the wedge
    #[serde(alias = "text")]
    pub label: String,
    /// Optional icon (emoji) shown with the result
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    /// Rule text shown when this partition wins
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Fill color
    #[serde(default)]
    pub color: ColorToken,
    /// Label color override
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_color: Option<String>,
}

impl Partition {
    pub fn new(id: impl Into<String>, label: impl Into<String>, color: ColorToken) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            icon: None,
            description: None,
            color,
            text_color: None,
        }
    }

    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Partition weight. Every partition gets an equal share of the wheel.
    #[inline]
    pub fn weight(&self) -> f64 {
        1.0
    }
}

/// Stock partition set used when nothing has been saved yet
pub fn default_partitions() -> Vec<Partition> {
    vec![
        Partition::new("1", "+2 Cards", ColorToken::new(ColorToken::RED))
            .with_icon("✌️")
            .with_description("The next player draws 2 cards and loses their turn."),
        Partition::new("2", "Skip", ColorToken::new(ColorToken::BLUE))
            .with_icon("🚫")
            .with_description("The next player loses their turn."),
        Partition::new("3", "Reverse", ColorToken::new(ColorToken::GREEN))
            .with_icon("🔄")
            .with_description("Play order is reversed."),
        Partition::new("4", "Wild", ColorToken::new(ColorToken::BLACK))
            .with_icon("🎨")
            .with_description("Choose the next color in play."),
        Partition::new("5", "+4 Cards", ColorToken::new(ColorToken::YELLOW))
            .with_icon("🍀")
            .with_description(
                "The next player draws 4 cards, loses their turn, and you choose the color.",
            ),
        Partition::new("6", "Swap Color", ColorToken::new(ColorToken::BLACK))
            .with_icon("🃏")
            .with_description("Discard a card of any color."),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_partitions_meet_minimum() {
        let partitions = default_partitions();
        assert!(partitions.len() >= MIN_PARTITIONS);

        let ids: std::collections::HashSet<_> = partitions.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids.len(), partitions.len());
    }

    #[test]
    fn test_color_cycling() {
        assert_eq!(ColorToken::cycled(0).as_str(), ColorToken::RED);
        assert_eq!(ColorToken::cycled(5).as_str(), ColorToken::RED);
        assert_eq!(ColorToken::cycled(6).as_str(), ColorToken::BLUE);
    }

    #[test]
    fn test_legacy_text_field() {
        let json = r##"{"id":"9","text":"Draw","description":"Draw one","color":"#55AA55"}"##;
        let partition: Partition = serde_json::from_str(json).unwrap();
        assert_eq!(partition.label, "Draw");
        assert_eq!(partition.color.as_str(), ColorToken::GREEN);
        assert_eq!(partition.description.as_deref(), Some("Draw one"));
        assert!(partition.icon.is_none());
    }

    #[test]
    fn test_serialization_skips_empty_options() {
        let partition = Partition::new("a", "A", ColorToken::default());
        let json = serde_json::to_string(&partition).unwrap();
        assert!(!json.contains("icon"));
        assert!(json.contains("\"label\":\"A\""));
    }
}
