//! Color data types. This module is private but reexported by its parent.

use core::fmt;
use core::iter::Sum;
use core::ops::{Add, AddAssign, Div, Mul, MulAssign};

use euclid::{Vector3D, vec3};

/// Acts as polyfill for float methods
#[cfg(not(feature = "std"))]
#[allow(unused_imports)]
use num_traits::float::Float as _;

/// Unit-of-measure type for vectors that contain color channels.
#[expect(clippy::exhaustive_enums)]
#[derive(Debug, Eq, PartialEq)]
pub enum Intensity {}

/// A floating-point RGB color value.
///
/// * Each component is considered to have a nominal range of 0 to 1, but larger values
///   are permitted; they represent radiance brighter than a white surface.
/// * The RGB components are in linear scale (proportional to luminance), not sRGB.
///
/// Unlike a reflectance color, an [`Rgb`] used as accumulated radiance is never clamped
/// until it is converted for display.
#[derive(Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Rgb(Vector3D<f32, Intensity>);

/// A floating-point RGBA color value.
///
/// The alpha component is coverage: 0 is fully transparent and 1 fully opaque.
/// Alpha is never premultiplied.
#[derive(Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Rgba {
    rgb: Rgb,
    alpha: f32,
}

impl Rgb {
    /// Black.
    pub const ZERO: Rgb = Rgb(vec3(0.0, 0.0, 0.0));
    /// White.
    pub const ONE: Rgb = Rgb(vec3(1.0, 1.0, 1.0));

    /// Constructs a color from components.
    #[inline]
    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self(vec3(r, g, b))
    }

    /// Constructs a grey color with all components equal.
    #[inline]
    pub const fn splat(value: f32) -> Self {
        Self(vec3(value, value, value))
    }

    /// Adds an alpha component to produce an [`Rgba`] color.
    #[inline]
    pub const fn with_alpha(self, alpha: f32) -> Rgba {
        Rgba { rgb: self, alpha }
    }

    /// Returns the red color component.
    #[inline]
    pub const fn red(self) -> f32 {
        self.0.x
    }
    /// Returns the green color component.
    #[inline]
    pub const fn green(self) -> f32 {
        self.0.y
    }
    /// Returns the blue color component.
    #[inline]
    pub const fn blue(self) -> f32 {
        self.0.z
    }

    /// Returns the components as an array.
    #[inline]
    pub const fn to_array(self) -> [f32; 3] {
        [self.0.x, self.0.y, self.0.z]
    }

    /// The largest of the three components.
    #[inline]
    pub fn max_component(self) -> f32 {
        self.red().max(self.green()).max(self.blue())
    }

    /// The arithmetic mean of the three components.
    #[inline]
    pub fn mean(self) -> f32 {
        (self.red() + self.green() + self.blue()) / 3.0
    }

    /// Combines the red, green, and blue components to obtain a relative luminance
    /// (“grayscale”) value, per Rec. ITU-R BT.709.
    #[inline]
    pub fn luminance(self) -> f32 {
        self.green() * 0.7152 + (self.red() * 0.2126 + self.blue() * 0.0722)
    }

    /// Returns whether every component is exactly zero.
    #[inline]
    pub fn is_zero(self) -> bool {
        self == Self::ZERO
    }

    /// Applies `f` to each component.
    #[inline]
    #[must_use]
    pub fn map(self, f: impl FnMut(f32) -> f32) -> Self {
        Self(self.0.map(f))
    }

    /// Componentwise minimum with `cap`.
    #[inline]
    #[must_use]
    pub fn min(self, cap: f32) -> Self {
        self.map(|c| c.min(cap))
    }

    /// Clamp each component to lie within the range 0 to `maximum`, inclusive.
    /// NaN components become zero.
    #[inline]
    #[must_use]
    pub fn clamp(self, maximum: f32) -> Self {
        self.map(|c| if c > 0.0 { c.min(maximum) } else { 0.0 })
    }

    /// Converts sRGB 8-bits-per-component color to the corresponding linear [`Rgb`] value.
    #[inline]
    pub fn from_srgb8(rgb: [u8; 3]) -> Self {
        Self::new(
            component_from_srgb8(rgb[0]),
            component_from_srgb8(rgb[1]),
            component_from_srgb8(rgb[2]),
        )
    }

    /// Converts this color to sRGB 8 bits per component, clamping out-of-range values.
    #[inline]
    pub fn to_srgb8(self) -> [u8; 3] {
        [
            component_to_srgb8(self.red()),
            component_to_srgb8(self.green()),
            component_to_srgb8(self.blue()),
        ]
    }
}

impl Rgba {
    /// Transparent black (all components zero).
    pub const TRANSPARENT: Rgba = Rgb::ZERO.with_alpha(0.0);
    /// Opaque white.
    pub const WHITE: Rgba = Rgb::ONE.with_alpha(1.0);

    /// Constructs a color from components.
    #[inline]
    pub const fn new(r: f32, g: f32, b: f32, alpha: f32) -> Self {
        Rgb::new(r, g, b).with_alpha(alpha)
    }

    /// Returns the color components without alpha.
    #[inline]
    pub const fn to_rgb(self) -> Rgb {
        self.rgb
    }

    /// Returns the alpha component.
    #[inline]
    pub const fn alpha(self) -> f32 {
        self.alpha
    }

    /// Returns whether this color is fully transparent (alpha is zero or less).
    #[inline]
    pub fn fully_transparent(self) -> bool {
        self.alpha <= 0.0
    }

    /// Returns whether this color is fully opaque.
    #[inline]
    pub fn fully_opaque(self) -> bool {
        self.alpha >= 1.0
    }

    /// Converts sRGB 8-bits-per-component color to the corresponding linear [`Rgba`] value.
    /// Alpha is linear in both representations.
    #[inline]
    pub fn from_srgb8(rgba: [u8; 4]) -> Self {
        Rgb::from_srgb8([rgba[0], rgba[1], rgba[2]]).with_alpha(f32::from(rgba[3]) / 255.0)
    }

    /// Converts this color to sRGB 8 bits per component.
    #[inline]
    pub fn to_srgb8(self) -> [u8; 4] {
        let [r, g, b] = self.rgb.to_srgb8();
        #[expect(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let a = (self.alpha.clamp(0.0, 1.0) * 255.0).round() as u8;
        [r, g, b, a]
    }
}

impl From<[f32; 3]> for Rgb {
    #[inline]
    fn from(value: [f32; 3]) -> Self {
        Self(value.into())
    }
}

impl Add<Rgb> for Rgb {
    type Output = Self;
    #[inline]
    fn add(self, other: Self) -> Self {
        Self(self.0 + other.0)
    }
}
impl AddAssign<Rgb> for Rgb {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}
/// Multiplies two color values componentwise.
impl Mul<Rgb> for Rgb {
    type Output = Self;
    #[inline]
    fn mul(self, other: Rgb) -> Self {
        Self(self.0.component_mul(other.0))
    }
}
impl MulAssign<Rgb> for Rgb {
    #[inline]
    fn mul_assign(&mut self, other: Rgb) {
        self.0 = self.0.component_mul(other.0);
    }
}
/// Multiplies this color value by a scalar.
impl Mul<f32> for Rgb {
    type Output = Self;
    #[inline]
    fn mul(self, scalar: f32) -> Self {
        Self(self.0 * scalar)
    }
}
impl MulAssign<f32> for Rgb {
    #[inline]
    fn mul_assign(&mut self, scalar: f32) {
        self.0 *= scalar;
    }
}
/// Divides this color value by a scalar.
impl Div<f32> for Rgb {
    type Output = Self;
    #[inline]
    fn div(self, scalar: f32) -> Self {
        Self(self.0 / scalar)
    }
}

/// There is no corresponding `impl Sum for Rgba` because the alpha would
/// not have a universally reasonable interpretation.
impl Sum for Rgb {
    #[allow(clippy::missing_inline_in_public_items)]
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Rgb::ZERO, |accum, rgb| accum + rgb)
    }
}

impl fmt::Debug for Rgb {
    #[allow(clippy::missing_inline_in_public_items)]
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            fmt,
            "Rgb({:?}, {:?}, {:?})",
            self.red(),
            self.green(),
            self.blue()
        )
    }
}
impl fmt::Debug for Rgba {
    #[allow(clippy::missing_inline_in_public_items)]
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            fmt,
            "Rgba({:?}, {:?}, {:?}, {:?})",
            self.rgb.red(),
            self.rgb.green(),
            self.rgb.blue(),
            self.alpha
        )
    }
}

#[inline]
fn component_to_srgb(c: f32) -> f32 {
    // Source: <https://en.wikipedia.org/w/index.php?title=SRGB&oldid=1002296118#The_forward_transformation_(CIE_XYZ_to_sRGB)>
    if c <= 0.0031308 {
        c * (323. / 25.)
    } else {
        (211. * c.powf(5. / 12.) - 11.) / 200.
    }
}

#[inline]
fn component_to_srgb8(c: f32) -> u8 {
    // out of range and NaN values will be clamped by `as u8`
    #[expect(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let value = (component_to_srgb(c) * 255.).round() as u8;
    value
}

#[inline]
fn component_from_srgb8(c: u8) -> f32 {
    // Source: <https://en.wikipedia.org/w/index.php?title=SRGB&oldid=1002296118#The_reverse_transformation>
    let c = f32::from(c) / 255.0;
    if c <= 0.04045 {
        c * (25. / 323.)
    } else {
        ((200. * c + 11.) / 211.).powf(12. / 5.)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn srgb_round_trip_every_byte() {
        for byte in 0..=u8::MAX {
            assert_eq!(Rgb::from_srgb8([byte, byte, byte]).to_srgb8(), [byte; 3]);
        }
    }

    #[test]
    fn srgb_endpoints() {
        assert_eq!(Rgba::from_srgb8([0, 0, 0, 0]), Rgba::TRANSPARENT);
        assert_eq!(Rgba::from_srgb8([255, 255, 255, 255]), Rgba::WHITE);
    }

    #[test]
    fn clamp_handles_nan_and_overrange() {
        assert_eq!(
            Rgb::new(f32::NAN, 2.0, -1.0).clamp(1.0),
            Rgb::new(0.0, 1.0, 0.0)
        );
    }

    #[test]
    fn arithmetic() {
        let a = Rgb::new(1.0, 2.0, 3.0);
        assert_eq!(a * Rgb::new(0.5, 0.5, 2.0), Rgb::new(0.5, 1.0, 6.0));
        assert_eq!(a * 2.0, Rgb::new(2.0, 4.0, 6.0));
        assert_eq!(a.mean(), 2.0);
        assert_eq!(a.max_component(), 3.0);
        assert_eq!([a, a].into_iter().sum::<Rgb>(), a * 2.0);
    }
}
