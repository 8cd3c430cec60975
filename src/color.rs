//! Color types used by material factors.
//!
//! Components are f32 in the range [0.0, 1.0]. The base color factor carries
//! an alpha channel; the emissive factor does not.

pub use rgb::{Rgb, Rgba};

/// RGBA color with f32 components in [0.0, 1.0].
pub type Color = Rgba<f32>;

/// RGB color with f32 components in [0.0, 1.0].
pub type ColorRgb = Rgb<f32>;

/// Opaque white (the glTF default base color factor).
pub const WHITE: Color = Color::new(1.0, 1.0, 1.0, 1.0);

/// Opaque black.
pub const BLACK: Color = Color::new(0.0, 0.0, 0.0, 1.0);

/// Black emissive (the glTF default emissive factor).
pub const EMISSIVE_NONE: ColorRgb = ColorRgb::new(0.0, 0.0, 0.0);
