use serde::{Deserialize, Serialize};

/// 12 caractères — palette par défaut, du plus sombre au plus clair.
pub const CHARSET_BASIC: &str = " .,:;+*?%S#@";

/// 92 caractères — rampe étendue.
pub const CHARSET_EXTENDED: &str = " `.-':_,^=;><+!rc*/z?sLTv)J7(|Fi{C}fI31tlu[neoZ5Yxjya]2ESwqkP6h9d4VpOGbUAKXHm8RD#$Bg0MNWQ%&@";

/// Blocs Unicode — pseudo-pixels.
pub const CHARSET_BLOCKS: &str = " ░▒▓█";

/// Basic ramp reversed, for light backgrounds.
pub const CHARSET_INVERTED: &str = "@#S%?*+;:,. ";

/// Built-in character set selector.
///
/// # Example
/// ```
/// use px_core::charset::CharSet;
/// let set = CharSet::default();
/// assert_eq!(set, CharSet::Basic);
/// assert_eq!(set.palette("").len(), 12);
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CharSet {
    /// `" .,:;+*?%S#@"`.
    #[default]
    Basic,
    /// 92-character ramp.
    Extended,
    /// Unicode shade blocks.
    Blocks,
    /// Basic, reversed.
    Inverted,
    /// User-supplied string (persisted in settings).
    Custom,
}

impl CharSet {
    /// All selectable sets, in menu order.
    pub const ALL: [Self; 5] = [
        Self::Basic,
        Self::Extended,
        Self::Blocks,
        Self::Inverted,
        Self::Custom,
    ];

    /// Nom lisible.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Basic => "basic",
            Self::Extended => "extended",
            Self::Blocks => "blocks",
            Self::Inverted => "inverted",
            Self::Custom => "custom",
        }
    }

    /// Parse a set name, case-insensitive.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|s| s.name().eq_ignore_ascii_case(name.trim()))
    }

    /// Resolve to a usable palette. `custom` is only read for `Custom`.
    #[must_use]
    pub fn palette(self, custom: &str) -> Palette {
        match self {
            Self::Basic => Palette::new(CHARSET_BASIC),
            Self::Extended => Palette::new(CHARSET_EXTENDED),
            Self::Blocks => Palette::new(CHARSET_BLOCKS),
            Self::Inverted => Palette::new(CHARSET_INVERTED),
            Self::Custom => Palette::new(custom),
        }
    }
}

/// Rampe de caractères ordonnée, avec lookup table luminance [0..255] → index.
///
/// Pre-computed at construction for O(1) per-sample cost. Never empty: an
/// empty string falls back to [`CHARSET_BASIC`].
///
/// # Example
/// ```
/// use px_core::charset::Palette;
/// let p = Palette::new(" .:#@");
/// assert_eq!(p.glyph(0), ' ');
/// assert_eq!(p.glyph(255), '@');
/// assert_eq!(p.glyph(128), ':');
/// ```
#[derive(Clone, Debug)]
pub struct Palette {
    chars: Vec<char>,
    lut: [u16; 256],
}

impl Palette {
    /// Build a palette from a ramp ordered darkest→brightest.
    #[must_use]
    pub fn new(ramp: &str) -> Self {
        let chars: Vec<char> = ramp.chars().collect();
        if chars.is_empty() {
            log::debug!("Palette vide, repli sur la palette basic");
            return Self::new(CHARSET_BASIC);
        }
        let len = chars.len();
        let mut lut = [0u16; 256];
        for (l, slot) in lut.iter_mut().enumerate() {
            *slot = index_for(l as u8, len) as u16;
        }
        Self { chars, lut }
    }

    /// Number of glyphs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.chars.len()
    }

    /// Always false; kept for API symmetry with `len`.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    /// The ramp as a string.
    #[must_use]
    pub fn as_string(&self) -> String {
        self.chars.iter().collect()
    }

    /// Palette index for a luminance value.
    #[inline(always)]
    #[must_use]
    pub fn index(&self, luminance: u8) -> usize {
        usize::from(self.lut[usize::from(luminance)])
    }

    /// Map a luminance value [0..255] to a character.
    #[inline(always)]
    #[must_use]
    pub fn glyph(&self, luminance: u8) -> char {
        self.chars[self.index(luminance)]
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self::new(CHARSET_BASIC)
    }
}

/// `min(floor(L * (len-1) / 255), len-1)`; `len` must be non-zero.
///
/// # Example
/// ```
/// use px_core::charset::index_for;
/// assert_eq!(index_for(255, 12), 11);
/// assert_eq!(index_for(0, 12), 0);
/// assert_eq!(index_for(200, 1), 0);
/// ```
#[inline(always)]
#[must_use]
pub fn index_for(luminance: u8, len: usize) -> usize {
    debug_assert!(len > 0);
    let last = len.saturating_sub(1);
    (usize::from(luminance) * last / 255).min(last)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_always_in_range() {
        for len in 1..=100usize {
            let ramp: String = (0..len)
                .map(|i| char::from_u32(0x21 + i as u32).unwrap())
                .collect();
            let p = Palette::new(&ramp);
            assert_eq!(p.len(), len);
            for l in 0..=255u8 {
                assert!(p.index(l) < len, "len={len} l={l}");
            }
        }
    }

    #[test]
    fn index_is_monotonic() {
        let p = Palette::new(CHARSET_EXTENDED);
        let mut prev = 0;
        for l in 0..=255u8 {
            let idx = p.index(l);
            assert!(idx >= prev, "non monotone à luminance {l}");
            prev = idx;
        }
        assert_eq!(p.index(255), p.len() - 1);
    }

    #[test]
    fn empty_palette_falls_back_to_basic() {
        let p = Palette::new("");
        assert_eq!(p.as_string(), CHARSET_BASIC);
        assert!(!p.is_empty());
        assert_eq!(CharSet::Custom.palette("").as_string(), CHARSET_BASIC);
    }

    #[test]
    fn custom_palette_is_used_when_present() {
        let p = CharSet::Custom.palette("ab");
        assert_eq!(p.glyph(0), 'a');
        assert_eq!(p.glyph(255), 'b');
    }

    #[test]
    fn multibyte_chars_count_as_single_glyphs() {
        let p = CharSet::Blocks.palette("");
        assert_eq!(p.len(), 5);
        assert_eq!(p.glyph(255), '█');
    }

    #[test]
    fn charset_names_roundtrip() {
        for set in CharSet::ALL {
            assert_eq!(CharSet::from_name(set.name()), Some(set));
        }
        assert_eq!(CharSet::from_name(" Blocks "), Some(CharSet::Blocks));
        assert_eq!(CharSet::from_name("nope"), None);
    }
}
