//! Theme combinations and preview routes.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::catalog::SectionId;

/// A registered theme variant.
///
/// # Examples
///
/// ```
/// use gc_core::ThemeVariant;
///
/// assert_eq!(ThemeVariant::parse("aurora"), Some(ThemeVariant::Aurora));
/// assert_eq!(ThemeVariant::Lg.as_str(), "lg");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeVariant {
    /// Default theme.
    Lg,
    /// Aurora.
    Aurora,
    /// Kitten.
    Kitten,
    /// Ocean.
    Ocean,
    /// Citrus.
    Citrus,
    /// Noir.
    Noir,
    /// Hardstuck.
    Hardstuck,
}

impl ThemeVariant {
    /// Every registered variant, in registry order.
    pub const ALL: [Self; 7] = [
        Self::Lg,
        Self::Aurora,
        Self::Kitten,
        Self::Ocean,
        Self::Citrus,
        Self::Noir,
        Self::Hardstuck,
    ];

    /// The wire form of the variant.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Lg => "lg",
            Self::Aurora => "aurora",
            Self::Kitten => "kitten",
            Self::Ocean => "ocean",
            Self::Citrus => "citrus",
            Self::Noir => "noir",
            Self::Hardstuck => "hardstuck",
        }
    }

    /// Parses the wire form of a variant.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|variant| variant.as_str() == value)
    }
}

impl fmt::Display for ThemeVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Index into the theme background class table.
///
/// Index 0 is the implicit default background.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct ThemeBackground(u8);

impl ThemeBackground {
    /// Background utility classes, indexed by background.
    pub const CLASSES: [&'static str; 5] = ["", "bg-alt1", "bg-alt2", "bg-vhs", "bg-streak"];

    /// The implicit default background.
    pub const DEFAULT: Self = Self(0);

    /// Creates a background index, rejecting indices outside the class table.
    #[must_use]
    pub fn new(index: u8) -> Option<Self> {
        (usize::from(index) < Self::CLASSES.len()).then_some(Self(index))
    }

    /// Every background in index order.
    pub fn all() -> impl Iterator<Item = Self> {
        (0..Self::CLASSES.len()).filter_map(|index| u8::try_from(index).ok().map(Self))
    }

    /// The numeric index.
    #[inline]
    #[must_use]
    pub const fn index(self) -> u8 {
        self.0
    }

    /// Returns `true` for the implicit default (index 0).
    #[inline]
    #[must_use]
    pub const fn is_default(self) -> bool {
        self.0 == 0
    }

    /// The utility class for this background (empty for the default).
    #[must_use]
    pub fn class_name(self) -> &'static str {
        Self::CLASSES
            .get(usize::from(self.0))
            .copied()
            .unwrap_or_default()
    }
}

impl TryFrom<u8> for ThemeBackground {
    type Error = String;

    fn try_from(index: u8) -> Result<Self, Self::Error> {
        Self::new(index).ok_or_else(|| format!("invalid background index {index}"))
    }
}

impl From<ThemeBackground> for u8 {
    fn from(background: ThemeBackground) -> Self {
        background.0
    }
}

/// One (variant, background) pair a preview is rendered under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ThemeCombo {
    /// Theme variant.
    pub variant: ThemeVariant,
    /// Background index.
    pub background: ThemeBackground,
}

impl ThemeCombo {
    /// Cartesian product of variants and backgrounds, variant-major.
    ///
    /// # Examples
    ///
    /// ```
    /// use gc_core::{ThemeBackground, ThemeCombo, ThemeVariant};
    ///
    /// let backgrounds: Vec<_> = [0, 1].into_iter().filter_map(ThemeBackground::new).collect();
    /// let combos = ThemeCombo::product(&[ThemeVariant::Lg, ThemeVariant::Aurora], &backgrounds);
    /// assert_eq!(combos.len(), 4);
    /// assert_eq!(combos[1].variant, ThemeVariant::Lg);
    /// assert_eq!(combos[1].background.index(), 1);
    /// ```
    #[must_use]
    pub fn product(variants: &[ThemeVariant], backgrounds: &[ThemeBackground]) -> Vec<Self> {
        variants
            .iter()
            .flat_map(|variant| {
                backgrounds.iter().map(|background| Self {
                    variant: *variant,
                    background: *background,
                })
            })
            .collect()
    }
}

/// An addressable preview of an entry or state under one theme combination.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviewRoute {
    /// Globally unique slug.
    pub slug: String,
    /// Preview rendered by this route.
    pub preview_id: String,
    /// Owning entry id.
    pub entry_id: String,
    /// Owning entry display name.
    pub entry_name: String,
    /// Owning section.
    pub section_id: SectionId,
    /// State id, `null` for the entry's default preview.
    pub state_id: Option<String>,
    /// State display name, `null` for the entry's default preview.
    pub state_name: Option<String>,
    /// Theme variant.
    pub theme_variant: ThemeVariant,
    /// Theme background index.
    pub theme_background: ThemeBackground,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_background_bounds() {
        assert!(ThemeBackground::new(0).is_some());
        assert!(ThemeBackground::new(4).is_some());
        assert!(ThemeBackground::new(5).is_none());
        assert_eq!(ThemeBackground::all().count(), 5);
    }

    #[test]
    fn test_background_class_names() {
        assert_eq!(ThemeBackground::DEFAULT.class_name(), "");
        assert!(ThemeBackground::DEFAULT.is_default());
        let vhs = ThemeBackground::new(3).expect("in range");
        assert_eq!(vhs.class_name(), "bg-vhs");
    }

    #[test]
    fn test_background_deserialize_rejects_out_of_range() {
        let ok: ThemeBackground = serde_json::from_str("2").expect("in range");
        assert_eq!(ok.index(), 2);
        assert!(serde_json::from_str::<ThemeBackground>("9").is_err());
    }

    #[test]
    fn test_route_serializes_null_state() {
        let route = PreviewRoute {
            slug: "section-buttons--entry-button--preview-default--theme-lg".to_owned(),
            preview_id: "default".to_owned(),
            entry_id: "button".to_owned(),
            entry_name: "Button".to_owned(),
            section_id: SectionId::Buttons,
            state_id: None,
            state_name: None,
            theme_variant: ThemeVariant::Lg,
            theme_background: ThemeBackground::DEFAULT,
        };
        let json = serde_json::to_value(&route).expect("serialize");
        assert!(json["stateId"].is_null());
        assert_eq!(json["themeVariant"], "lg");
        assert_eq!(json["themeBackground"], 0);
        assert_eq!(json["sectionId"], "buttons");
    }

    #[test]
    fn test_variant_parse_rejects_unknown() {
        assert_eq!(ThemeVariant::parse("sepia"), None);
        assert_eq!(ThemeVariant::parse("noir"), Some(ThemeVariant::Noir));
    }
}
