//! WCAG contrast checks for theme payloads.
//!
//! A theme declares `light` and/or `dark` palettes mapping semantic color
//! names to CSS colors. Every foreground/background pair below whose two
//! colors are both declared is checked against the configured AA/AAA
//! thresholds for its usage class.

use serde_json::{json, Map, Value};

use crate::config::ContrastRules;
use crate::model::{ValidationEntry, ValidationReport};
use crate::validators::{object_payload, Validator, ValidatorError};

/// Palettes a theme may declare.
pub const PALETTES: &[&str] = &["light", "dark"];

/// Usage class of a foreground color; decides the threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextUsage {
    /// Body-size text.
    Normal,
    /// Large text, headings and icons.
    Large,
}

/// A foreground drawn over a background.
#[derive(Debug, Clone, Copy)]
pub struct ContrastPair {
    pub foreground: &'static str,
    pub background: &'static str,
    pub usage: TextUsage,
}

const fn pair(foreground: &'static str, background: &'static str, usage: TextUsage) -> ContrastPair {
    ContrastPair {
        foreground,
        background,
        usage,
    }
}

pub const THEME_PAIRS: &[ContrastPair] = &[
    pair("button_text", "button_bg", TextUsage::Normal),
    pair("text", "background", TextUsage::Normal),
    pair("muted_text", "background", TextUsage::Normal),
    pair("link", "background", TextUsage::Normal),
    pair("heading", "background", TextUsage::Large),
    pair("icon", "background", TextUsage::Large),
    pair("nav_text", "nav_bg", TextUsage::Normal),
    pair("footer_text", "footer_bg", TextUsage::Normal),
    pair("badge_text", "badge_bg", TextUsage::Normal),
];

const MAX_COLOR_LEN: usize = 32;

/// An sRGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    /// Parse `#RGB`, `#RRGGBB` or `rgb(r, g, b)`.
    pub fn parse(input: &str) -> Option<Self> {
        let s = input.trim();
        if s.len() > MAX_COLOR_LEN {
            return None;
        }
        if let Some(hex) = s.strip_prefix('#') {
            return Self::parse_hex(hex);
        }
        let lower = s.to_ascii_lowercase();
        let inner = lower.strip_prefix("rgb(")?.strip_suffix(')')?;
        let mut channels = inner.split(',').map(|c| c.trim().parse::<u8>());
        let (r, g, b) = (channels.next()?.ok()?, channels.next()?.ok()?, channels.next()?.ok()?);
        if channels.next().is_some() {
            return None;
        }
        Some(Self { r, g, b })
    }

    fn parse_hex(hex: &str) -> Option<Self> {
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }
        match hex.len() {
            3 => {
                let digit = |i: usize| u8::from_str_radix(&hex[i..i + 1], 16).ok().map(|d| d * 17);
                Some(Self {
                    r: digit(0)?,
                    g: digit(1)?,
                    b: digit(2)?,
                })
            }
            6 => {
                let byte = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
                Some(Self {
                    r: byte(0)?,
                    g: byte(2)?,
                    b: byte(4)?,
                })
            }
            _ => None,
        }
    }

    /// WCAG 2.x relative luminance in `[0, 1]`.
    pub fn relative_luminance(&self) -> f64 {
        fn linear(channel: u8) -> f64 {
            let c = f64::from(channel) / 255.0;
            if c <= 0.04045 {
                c / 12.92
            } else {
                ((c + 0.055) / 1.055).powf(2.4)
            }
        }
        0.2126 * linear(self.r) + 0.7152 * linear(self.g) + 0.0722 * linear(self.b)
    }
}

/// Contrast ratio between two colors, in `[1, 21]`.
pub fn contrast_ratio(a: Rgb, b: Rgb) -> f64 {
    let (la, lb) = (a.relative_luminance(), b.relative_luminance());
    let (lighter, darker) = if la >= lb { (la, lb) } else { (lb, la) };
    (lighter + 0.05) / (darker + 0.05)
}

/// Checks every declared palette pair against WCAG thresholds.
#[derive(Debug, Clone)]
pub struct ThemeContrastValidator {
    rules: ContrastRules,
}

impl ThemeContrastValidator {
    pub fn new(rules: ContrastRules) -> Self {
        Self { rules }
    }

    fn thresholds(&self, usage: TextUsage) -> (f64, f64) {
        match usage {
            TextUsage::Normal => (self.rules.aa_normal, self.rules.aaa_normal),
            TextUsage::Large => (self.rules.aa_large, self.rules.aaa_large),
        }
    }

    fn check_palette(&self, palette: &str, colors: &Map<String, Value>, entries: &mut Vec<ValidationEntry>) {
        // Parse each referenced field once so a bad color is reported once.
        let mut parsed: Vec<(&'static str, Rgb)> = Vec::new();
        let mut seen: Vec<&'static str> = Vec::new();
        for field in THEME_PAIRS.iter().flat_map(|p| [p.foreground, p.background]) {
            if seen.contains(&field) {
                continue;
            }
            seen.push(field);
            let Some(raw) = colors.get(field) else {
                continue;
            };
            match raw.as_str().and_then(Rgb::parse) {
                Some(rgb) => parsed.push((field, rgb)),
                None => entries.push(ValidationEntry::error(
                    "invalid_color",
                    format!("{palette}.{field} is not a color (expected #RGB, #RRGGBB or rgb(r, g, b))"),
                    json!({ "palette": palette, "field": field, "value": raw }),
                )),
            }
        }

        let lookup = |field: &str| parsed.iter().find(|(f, _)| *f == field).map(|(_, rgb)| *rgb);

        for pair in THEME_PAIRS {
            let (Some(fg), Some(bg)) = (lookup(pair.foreground), lookup(pair.background)) else {
                continue;
            };
            let ratio = contrast_ratio(fg, bg);
            let (aa, aaa) = self.thresholds(pair.usage);
            // Displayed ratio is truncated, never rounded up.
            let shown = (ratio * 100.0).floor() / 100.0;
            let usage = match pair.usage {
                TextUsage::Normal => "normal_text",
                TextUsage::Large => "large_text",
            };
            let context = json!({
                "palette": palette,
                "foreground": pair.foreground,
                "background": pair.background,
                "ratio": shown,
                "usage": usage,
            });

            if ratio < aa {
                entries.push(ValidationEntry::error(
                    "contrast_below_aa",
                    format!(
                        "{palette}.{} over {palette}.{}: contrast {shown:.2} < {aa}",
                        pair.foreground, pair.background
                    ),
                    with_required(context, aa),
                ));
            } else if ratio < aaa {
                entries.push(ValidationEntry::warning(
                    "contrast_below_aaa",
                    format!(
                        "{palette}.{} over {palette}.{}: contrast {shown:.2} < {aaa} (AAA)",
                        pair.foreground, pair.background
                    ),
                    with_required(context, aaa),
                ));
            }
        }
    }
}

fn with_required(mut context: Value, required: f64) -> Value {
    if let Some(map) = context.as_object_mut() {
        map.insert("required".to_string(), json!(required));
    }
    context
}

impl Validator for ThemeContrastValidator {
    fn name(&self) -> &'static str {
        "theme_contrast"
    }

    fn validate(&self, payload: &Value) -> Result<ValidationReport, ValidatorError> {
        let mut entries = Vec::new();
        let Some(root) = object_payload("theme", payload, &mut entries) else {
            return Ok(ValidationReport::from_entries(entries));
        };

        let mut palettes_seen = 0;
        for &palette in PALETTES {
            let Some(value) = root.get(palette) else {
                continue;
            };
            palettes_seen += 1;
            match value.as_object() {
                Some(colors) => self.check_palette(palette, colors, &mut entries),
                None => entries.push(ValidationEntry::error(
                    "invalid_shape",
                    format!("palette `{palette}` must be an object of colors"),
                    json!({ "field": palette }),
                )),
            }
        }

        if palettes_seen == 0 {
            entries.push(ValidationEntry::error(
                "missing_palette",
                "theme must declare a `light` or `dark` palette",
                json!({ "field": "$" }),
            ));
        }

        Ok(ValidationReport::from_entries(entries))
    }
}
