// this_file: backends/fontweave-core/src/types.rs

//! Core types used throughout the fontweave engine.

use crate::traits::GlyphCoverage;
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::Arc;

/// Opaque font identifier, unique within a style.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FontId(String);

impl FontId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FontId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for FontId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for FontId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for FontId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Written-language identifier (BCP-47 tag or any caller-chosen key).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LanguageId(String);

impl LanguageId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LanguageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for LanguageId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for LanguageId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for LanguageId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Where a font record came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FontOrigin {
    /// Independently sourced: the style's primary font, an upload or a system font.
    Root,
    /// Forked from another font. Records written before parent links existed
    /// carry no parent and are matched by signature instead.
    Clone {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        parent: Option<FontId>,
    },
}

/// Role a font plays in the style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FontRole {
    Primary,
    Fallback,
}

/// Visibility of a font across languages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FontScope {
    Global,
    LanguageSpecific,
}

/// Per-font settings. `None` means "inherit".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FontSettings {
    /// Scale in percent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scale: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line_height: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub letter_spacing: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight_override: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_size_adjust: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ascent_override: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub descent_override: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line_gap_override: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hidden: Option<bool>,
}

impl FontSettings {
    /// Settings with every field inherited except the one being set.
    pub fn only(setting: Setting) -> Self {
        let mut settings = Self::default();
        settings.apply(setting);
        settings
    }

    pub fn apply(&mut self, setting: Setting) {
        match setting {
            Setting::Scale(v) => self.scale = v,
            Setting::LineHeight(v) => self.line_height = v,
            Setting::LetterSpacing(v) => self.letter_spacing = v,
            Setting::WeightOverride(v) => self.weight_override = v,
            Setting::FontSizeAdjust(v) => self.font_size_adjust = v,
            Setting::AscentOverride(v) => self.ascent_override = v,
            Setting::DescentOverride(v) => self.descent_override = v,
            Setting::LineGapOverride(v) => self.line_gap_override = v,
            Setting::Color(v) => self.color = v,
            Setting::Hidden(v) => self.hidden = v,
        }
    }

    /// Fill every unset field from `base`.
    pub fn or(&self, base: &FontSettings) -> FontSettings {
        FontSettings {
            scale: self.scale.or(base.scale),
            line_height: self.line_height.or(base.line_height),
            letter_spacing: self.letter_spacing.or(base.letter_spacing),
            weight_override: self.weight_override.or(base.weight_override),
            font_size_adjust: self.font_size_adjust.or(base.font_size_adjust),
            ascent_override: self.ascent_override.or(base.ascent_override),
            descent_override: self.descent_override.or(base.descent_override),
            line_gap_override: self.line_gap_override.or(base.line_gap_override),
            color: self.color.clone().or_else(|| base.color.clone()),
            hidden: self.hidden.or(base.hidden),
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// A single-property settings update. `None` resets the property to "inherit".
#[derive(Debug, Clone, PartialEq)]
pub enum Setting {
    Scale(Option<f32>),
    LineHeight(Option<f32>),
    LetterSpacing(Option<f32>),
    WeightOverride(Option<u16>),
    FontSizeAdjust(Option<f32>),
    AscentOverride(Option<f32>),
    DescentOverride(Option<f32>),
    LineGapOverride(Option<f32>),
    Color(Option<String>),
    Hidden(Option<bool>),
}

impl Setting {
    pub fn property(&self) -> FontProperty {
        match self {
            Setting::Scale(_) => FontProperty::Scale,
            Setting::LineHeight(_) => FontProperty::LineHeight,
            Setting::LetterSpacing(_) => FontProperty::LetterSpacing,
            Setting::WeightOverride(_) => FontProperty::WeightOverride,
            Setting::FontSizeAdjust(_) => FontProperty::FontSizeAdjust,
            Setting::AscentOverride(_) => FontProperty::AscentOverride,
            Setting::DescentOverride(_) => FontProperty::DescentOverride,
            Setting::LineGapOverride(_) => FontProperty::LineGapOverride,
            Setting::Color(_) => FontProperty::Color,
            Setting::Hidden(_) => FontProperty::Hidden,
        }
    }
}

/// Name of a settable font property
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FontProperty {
    Scale,
    LineHeight,
    LetterSpacing,
    WeightOverride,
    FontSizeAdjust,
    AscentOverride,
    DescentOverride,
    LineGapOverride,
    Color,
    Hidden,
}

impl FontProperty {
    pub fn as_str(&self) -> &'static str {
        match self {
            FontProperty::Scale => "scale",
            FontProperty::LineHeight => "line_height",
            FontProperty::LetterSpacing => "letter_spacing",
            FontProperty::WeightOverride => "weight_override",
            FontProperty::FontSizeAdjust => "font_size_adjust",
            FontProperty::AscentOverride => "ascent_override",
            FontProperty::DescentOverride => "descent_override",
            FontProperty::LineGapOverride => "line_gap_override",
            FontProperty::Color => "color",
            FontProperty::Hidden => "hidden",
        }
    }
}

impl fmt::Display for FontProperty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Metadata reported by the font-loading collaborator
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FontMetadata {
    pub is_variable: bool,
    /// (min, max) of the `wght` axis for variable fonts
    pub weight_axis_range: Option<(f32, f32)>,
    pub static_weight: Option<u16>,
}

/// Glyph-coverage capability attached to a font.
///
/// Equality only compares presence: two fonts are structurally equal when
/// both or neither carry a loaded glyph table.
#[derive(Clone, Default)]
pub struct GlyphHandle(Option<Arc<dyn GlyphCoverage>>);

impl GlyphHandle {
    pub fn new(glyphs: Arc<dyn GlyphCoverage>) -> Self {
        Self(Some(glyphs))
    }

    pub fn none() -> Self {
        Self(None)
    }

    pub fn get(&self) -> Option<&Arc<dyn GlyphCoverage>> {
        self.0.as_ref()
    }

    pub fn is_loaded(&self) -> bool {
        self.0.is_some()
    }

    /// Fonts without a glyph table are trusted to cover any character.
    pub fn covers(&self, ch: char) -> bool {
        self.0.as_ref().map_or(true, |glyphs| glyphs.has_glyph(ch))
    }
}

impl fmt::Debug for GlyphHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(_) => f.write_str("GlyphHandle(loaded)"),
            None => f.write_str("GlyphHandle(none)"),
        }
    }
}

impl PartialEq for GlyphHandle {
    fn eq(&self, other: &Self) -> bool {
        self.is_loaded() == other.is_loaded()
    }
}

/// Load state of a font's binary resource
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum LoadStatus {
    /// No file attached (system font)
    #[default]
    System,
    Loaded,
    /// The loader failed; the font stays in the style and covers everything
    Degraded(String),
}

/// A unit of typographic identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Font {
    pub id: FontId,
    /// Family or display name
    pub name: String,
    /// File the font was uploaded from, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
    pub origin: FontOrigin,
    pub role: FontRole,
    /// Fallback-role clone standing in for the primary font of one language
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub primary_override: bool,
    pub scope: FontScope,
    #[serde(default, skip_serializing_if = "FontSettings::is_empty")]
    pub settings: FontSettings,
    #[serde(skip)]
    pub glyphs: GlyphHandle,
    #[serde(skip)]
    pub status: LoadStatus,
    #[serde(skip)]
    pub metadata: Option<FontMetadata>,
}

impl Font {
    /// A global, independently sourced fallback font.
    pub fn root(id: impl Into<FontId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            file_name: None,
            origin: FontOrigin::Root,
            role: FontRole::Fallback,
            primary_override: false,
            scope: FontScope::Global,
            settings: FontSettings::default(),
            glyphs: GlyphHandle::none(),
            status: LoadStatus::System,
            metadata: None,
        }
    }

    /// The style's global primary font.
    pub fn primary(id: impl Into<FontId>, name: impl Into<String>) -> Self {
        Self {
            role: FontRole::Primary,
            ..Self::root(id, name)
        }
    }

    pub fn with_file_name(mut self, file_name: impl Into<String>) -> Self {
        self.file_name = Some(file_name.into());
        self
    }

    pub fn with_scope(mut self, scope: FontScope) -> Self {
        self.scope = scope;
        self
    }

    pub fn with_settings(mut self, settings: FontSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn with_glyphs(mut self, glyphs: Arc<dyn GlyphCoverage>) -> Self {
        self.glyphs = GlyphHandle::new(glyphs);
        self.status = LoadStatus::Loaded;
        self
    }

    /// Identity signature used for duplicate detection: file name, else name.
    pub fn signature(&self) -> &str {
        self.file_name.as_deref().unwrap_or(&self.name)
    }

    pub fn same_signature(&self, other: &str) -> bool {
        crate::utils::signatures_match(self.signature(), other)
    }

    pub fn is_clone(&self) -> bool {
        matches!(self.origin, FontOrigin::Clone { .. })
    }

    pub fn parent(&self) -> Option<&FontId> {
        match &self.origin {
            FontOrigin::Clone { parent } => parent.as_ref(),
            FontOrigin::Root => None,
        }
    }

    pub fn is_global_primary(&self) -> bool {
        self.role == FontRole::Primary && self.origin == FontOrigin::Root
    }

    pub fn is_hidden(&self) -> bool {
        self.settings.hidden.unwrap_or(false)
    }
}

/// Scale defaults in percent
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FontScales {
    pub active: f32,
    pub fallback: f32,
}

impl Default for FontScales {
    fn default() -> Self {
        Self {
            active: 100.0,
            fallback: 100.0,
        }
    }
}

/// Defaults borrowed by plain fallback fonts. Unset fields use the style globals.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FallbackDefaults {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line_height: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub letter_spacing: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight: Option<u16>,
}

/// Style-level typographic defaults
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StyleDefaults {
    /// Base font size in pixels
    pub base_font_size: f32,
    /// Font weight (100-900)
    pub weight: u16,
    pub line_height: f32,
    pub letter_spacing: f32,
    pub font_scales: FontScales,
    /// Generic family of the system sentinel (sans-serif, serif, ...)
    pub fallback_family: String,
    pub fallback: FallbackDefaults,
}

impl Default for StyleDefaults {
    fn default() -> Self {
        Self {
            base_font_size: 16.0,
            weight: 400,
            line_height: 1.2,
            letter_spacing: 0.0,
            font_scales: FontScales::default(),
            fallback_family: "sans-serif".to_string(),
            fallback: FallbackDefaults::default(),
        }
    }
}

/// One entry of a nested fallback override.
///
/// On the wire a soft link is `null` and a mapping is the target id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Option<FontId>", into = "Option<FontId>")]
pub enum FallbackLink {
    /// Explicitly linked but not specialised: the original font is used as-is
    Soft,
    /// The language uses this font in place of the original
    Font(FontId),
}

impl From<Option<FontId>> for FallbackLink {
    fn from(value: Option<FontId>) -> Self {
        match value {
            Some(id) => FallbackLink::Font(id),
            None => FallbackLink::Soft,
        }
    }
}

impl From<FallbackLink> for Option<FontId> {
    fn from(link: FallbackLink) -> Self {
        match link {
            FallbackLink::Soft => None,
            FallbackLink::Font(id) => Some(id),
        }
    }
}

/// A language's fallback override.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FallbackOverride {
    /// Legacy flat form: one font replaces the whole fallback list
    Single(FontId),
    /// Per-original-font links; unlisted originals are inherited
    Map(BTreeMap<FontId, FallbackLink>),
}

impl FallbackOverride {
    /// Every font id this override points at (soft links excluded).
    pub fn targets(&self) -> Vec<&FontId> {
        match self {
            FallbackOverride::Single(id) => vec![id],
            FallbackOverride::Map(links) => links
                .values()
                .filter_map(|link| match link {
                    FallbackLink::Font(id) => Some(id),
                    FallbackLink::Soft => None,
                })
                .collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, FallbackOverride::Map(links) if links.is_empty())
    }
}

/// Per-language patch of the system sentinel
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SystemFallbackOverride {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub family: Option<String>,
    #[serde(skip_serializing_if = "FontSettings::is_empty")]
    pub settings: FontSettings,
}

/// A named bundle of fonts, global defaults and per-language override maps.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Style {
    pub name: String,
    pub fonts: Vec<Font>,
    #[serde(default)]
    pub defaults: StyleDefaults,
    /// Configured languages
    #[serde(default)]
    pub languages: BTreeSet<LanguageId>,
    #[serde(default)]
    pub primary_font_overrides: BTreeMap<LanguageId, FontId>,
    #[serde(default)]
    pub fallback_font_overrides: BTreeMap<LanguageId, FallbackOverride>,
    #[serde(default)]
    pub system_fallback_overrides: BTreeMap<LanguageId, SystemFallbackOverride>,
    /// Bumped by the store on every replacement; not part of the data
    #[serde(skip)]
    pub revision: u64,
}

impl PartialEq for Style {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.fonts == other.fonts
            && self.defaults == other.defaults
            && self.languages == other.languages
            && self.primary_font_overrides == other.primary_font_overrides
            && self.fallback_font_overrides == other.fallback_font_overrides
            && self.system_fallback_overrides == other.system_fallback_overrides
    }
}

impl Style {
    /// Create a style around its global primary font.
    pub fn new(name: impl Into<String>, mut primary: Font) -> Self {
        primary.role = FontRole::Primary;
        primary.origin = FontOrigin::Root;
        primary.scope = FontScope::Global;
        primary.primary_override = false;
        Self {
            name: name.into(),
            fonts: vec![primary],
            defaults: StyleDefaults::default(),
            languages: BTreeSet::new(),
            primary_font_overrides: BTreeMap::new(),
            fallback_font_overrides: BTreeMap::new(),
            system_fallback_overrides: BTreeMap::new(),
            revision: 0,
        }
    }

    pub fn with_defaults(mut self, defaults: StyleDefaults) -> Self {
        self.defaults = defaults;
        self
    }

    pub fn font(&self, id: &str) -> Option<&Font> {
        self.fonts.iter().find(|font| font.id.as_str() == id)
    }

    pub fn font_mut(&mut self, id: &str) -> Option<&mut Font> {
        self.fonts.iter_mut().find(|font| font.id.as_str() == id)
    }

    pub fn font_index(&self, id: &str) -> Option<usize> {
        self.fonts.iter().position(|font| font.id.as_str() == id)
    }

    pub fn contains_font(&self, id: &str) -> bool {
        self.font_index(id).is_some()
    }

    /// The global primary font (`Root` origin, `Primary` role).
    pub fn primary_font(&self) -> Option<&Font> {
        self.fonts.iter().find(|font| font.is_global_primary())
    }

    /// Fallback-role fonts in global order.
    pub fn fallback_fonts(&self) -> impl Iterator<Item = &Font> {
        self.fonts
            .iter()
            .filter(|font| font.role == FontRole::Fallback)
    }

    pub fn insert_font(&mut self, font: Font) {
        self.fonts.push(font);
    }

    /// Remove a font record. The global primary is never removed.
    pub fn take_font(&mut self, id: &str) -> Option<Font> {
        let index = self.font_index(id)?;
        if self.fonts[index].is_global_primary() {
            return None;
        }
        Some(self.fonts.remove(index))
    }

    /// A font id derived from `base` that is not yet used in this style.
    pub fn unique_font_id(&self, base: &str) -> FontId {
        if !self.contains_font(base) {
            return FontId::new(base);
        }
        let mut counter = 2u32;
        loop {
            let candidate = format!("{base}#{counter}");
            if !self.contains_font(&candidate) {
                return FontId::new(candidate);
            }
            counter += 1;
        }
    }
}

/// Fully resolved settings for one font.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedSettings {
    /// Scale in percent
    pub scale: f32,
    pub line_height: f32,
    pub letter_spacing: f32,
    pub weight: u16,
    /// `None` leaves the renderer default in place
    pub font_size_adjust: Option<f32>,
    pub ascent_override: Option<f32>,
    pub descent_override: Option<f32>,
    pub line_gap_override: Option<f32>,
    pub color: Option<String>,
    pub hidden: bool,
}

/// One entry of a language's fallback stack.
#[derive(Debug, Clone, PartialEq)]
pub struct StackEntry {
    /// `None` marks the system sentinel
    pub font: Option<FontId>,
    /// Family name the renderer registers the font under
    pub family_alias: String,
    pub glyphs: GlyphHandle,
    pub settings: ResolvedSettings,
}

impl StackEntry {
    pub fn is_system(&self) -> bool {
        self.font.is_none()
    }
}
