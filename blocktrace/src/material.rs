//! Surface materials: optical properties, textures, and tints.

use std::fmt;

use crate::math::{Rgb, Rgba, TexPoint};

pub mod scatter;

// -------------------------------------------------------------------------------------------------

/// Index of refraction of air, which is also the medium of a ray not inside anything.
pub const AIR_IOR: f32 = 1.000293;

/// Identifies an entry in a [`MaterialPalette`].
///
/// The id 0 is always [`MaterialId::AIR`].
#[derive(Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
#[expect(clippy::exhaustive_structs)]
pub struct MaterialId(pub u32);

impl MaterialId {
    /// The material of empty space.
    pub const AIR: Self = Self(0);

    /// Returns whether this is [`MaterialId::AIR`].
    pub fn is_air(self) -> bool {
        self == Self::AIR
    }
}

impl fmt::Display for MaterialId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "material #{}", self.0)
    }
}

/// Properties of a material which are constant across its surface and govern
/// how rays pass between media.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Material {
    ior: f32,
    refractive: bool,
    opaque: bool,
}

impl Material {
    /// The material of empty space: not opaque, not refractive, [`AIR_IOR`].
    pub const AIR: Self = Self {
        ior: AIR_IOR,
        refractive: false,
        opaque: false,
    };

    /// Constructs a [`Material`].
    ///
    /// A material which is not opaque and whose index of refraction differs noticeably
    /// from air's is treated as refractive even if `refractive` is false, since otherwise
    /// it would bend light only at its texels rather than as a medium.
    pub fn new(ior: f32, refractive: bool, opaque: bool) -> Self {
        let refractive = refractive || (!opaque && (ior - AIR_IOR).abs() > 1e-4);
        Self {
            ior,
            refractive,
            opaque,
        }
    }

    /// Index of refraction.
    pub fn ior(&self) -> f32 {
        self.ior
    }

    /// Whether rays change direction when crossing into or out of this material.
    pub fn is_refractive(&self) -> bool {
        self.refractive
    }

    /// Whether this material blocks all light, regardless of texel alpha.
    pub fn is_opaque(&self) -> bool {
        self.opaque
    }
}

impl Default for Material {
    fn default() -> Self {
        Self::AIR
    }
}

/// Surface properties of a material at one point, as sampled from its texture.
#[derive(Clone, Copy, Debug, PartialEq)]
#[non_exhaustive]
pub struct MaterialSample {
    /// Reflectance color; alpha is the probability of interacting with the surface
    /// rather than passing through it.
    pub color: Rgba,
    /// Probability of a specular (mirror-like) reflection.
    pub specular: f32,
    /// Probability of a metallic reflection, which is tinted by `color`.
    pub metalness: f32,
    /// Blend from mirror reflection (0) toward diffuse reflection (1) for specular bounces.
    pub roughness: f32,
    /// Light emitted, as a multiple of `color`.
    pub emittance: f32,
}

impl MaterialSample {
    /// A sample which is completely transparent and has no other effect.
    pub const TRANSPARENT: Self = Self {
        color: Rgba::TRANSPARENT,
        specular: 0.0,
        metalness: 0.0,
        roughness: 0.0,
        emittance: 0.0,
    };

    /// Constructs a sample with the given color and no specular, metallic, or emissive
    /// component.
    pub fn new(color: Rgba) -> Self {
        Self {
            color,
            ..Self::TRANSPARENT
        }
    }

    /// Returns this sample with `color` replaced.
    #[must_use]
    pub fn with_color(self, color: Rgba) -> Self {
        Self { color, ..self }
    }
}

/// How [`MaterialPalette::sample()`] treats transparent texels.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[expect(clippy::exhaustive_enums)]
pub enum SampleMode {
    /// Every texel is a surface, however transparent. Used for full cubes, whose
    /// transparent texels may still be the boundary of a refractive medium.
    AllowAlpha,
    /// Texels with alpha at or below [`EPSILON`](crate::EPSILON) are holes; sampling them
    /// fails so that the ray continues to whatever is behind.
    Cutout,
}

// -------------------------------------------------------------------------------------------------

/// Color multiplier applied to a material's texture.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[non_exhaustive]
pub enum Tint {
    /// No tint.
    #[default]
    None,
    /// Multiply by a fixed color.
    Constant(Rgb),
    /// Multiply by the palette's [`BiomeColors::foliage`].
    Foliage,
    /// Multiply by the palette's [`BiomeColors::grass`].
    Grass,
    /// Multiply by the palette's [`BiomeColors::water`].
    Water,
}

/// Scene-wide colors used by biome [`Tint`]s.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[expect(clippy::exhaustive_structs)]
pub struct BiomeColors {
    #[allow(missing_docs)]
    pub foliage: Rgb,
    #[allow(missing_docs)]
    pub grass: Rgb,
    #[allow(missing_docs)]
    pub water: Rgb,
}

impl Default for BiomeColors {
    fn default() -> Self {
        Self {
            foliage: Rgb::from_srgb8([0x71, 0xA7, 0x4D]),
            grass: Rgb::from_srgb8([0x8E, 0xB9, 0x71]),
            water: Rgb::from_srgb8([0x3F, 0x76, 0xE4]),
        }
    }
}

/// Identifies a [`Texture`] within a [`MaterialPalette`]'s atlas.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
#[expect(clippy::exhaustive_structs)]
pub struct TextureId(pub u32);

/// Where a material's color comes from.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[expect(clippy::exhaustive_enums)]
pub enum ColorSource {
    /// The same color everywhere on the surface.
    Flat(Rgba),
    /// A texture from the atlas.
    Texture(TextureId),
}

/// An image in linear color, sampled with nearest-neighbor filtering.
#[derive(Clone, PartialEq)]
pub struct Texture {
    width: usize,
    height: usize,
    texels: Box<[Rgba]>,
}

impl Texture {
    /// Constructs a texture from sRGB 8-bit RGBA pixels in row-major order, top row first.
    ///
    /// Returns [`None`] if the dimensions are zero or do not match the number of pixels.
    pub fn from_srgba8(width: usize, height: usize, pixels: &[[u8; 4]]) -> Option<Self> {
        if width == 0 || height == 0 || width.checked_mul(height)? != pixels.len() {
            return None;
        }
        Some(Self {
            width,
            height,
            texels: pixels.iter().copied().map(Rgba::from_srgb8).collect(),
        })
    }

    /// A 1×1 texture.
    pub fn solid(color: Rgba) -> Self {
        Self {
            width: 1,
            height: 1,
            texels: Box::new([color]),
        }
    }

    #[allow(missing_docs)]
    pub fn width(&self) -> usize {
        self.width
    }
    #[allow(missing_docs)]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Returns the texel at `uv`, where `(0, 0)` is the bottom left corner and coordinates
    /// outside the unit square wrap around.
    pub fn sample(&self, uv: TexPoint) -> Rgba {
        let u = uv.x - uv.x.floor();
        let v = uv.y - uv.y.floor();
        let x = ((u * self.width as f64) as usize).min(self.width - 1);
        let y = (((1.0 - v) * self.height as f64) as usize).min(self.height - 1);
        self.texels[y * self.width + x]
    }
}

impl fmt::Debug for Texture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Texture")
            .field("width", &self.width)
            .field("height", &self.height)
            .finish_non_exhaustive()
    }
}

/// Everything a [`MaterialPalette`] knows about one material.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[expect(clippy::exhaustive_structs)]
pub struct MaterialEntry {
    #[allow(missing_docs)]
    pub material: Material,
    #[allow(missing_docs)]
    pub color: ColorSource,
    #[allow(missing_docs)]
    pub tint: Tint,
    /// Copied to [`MaterialSample::emittance`].
    pub emittance: f32,
    /// Copied to [`MaterialSample::specular`].
    pub specular: f32,
    /// Copied to [`MaterialSample::metalness`].
    pub metalness: f32,
    /// Copied to [`MaterialSample::roughness`].
    pub roughness: f32,
}

impl MaterialEntry {
    /// The entry for [`MaterialId::AIR`].
    pub const AIR: Self = Self {
        material: Material::AIR,
        color: ColorSource::Flat(Rgba::TRANSPARENT),
        tint: Tint::None,
        emittance: 0.0,
        specular: 0.0,
        metalness: 0.0,
        roughness: 0.0,
    };

    /// An opaque, non-reflective, flat-colored material.
    pub fn opaque(color: Rgb) -> Self {
        Self {
            material: Material::new(AIR_IOR, false, true),
            color: ColorSource::Flat(color.with_alpha(1.0)),
            ..Self::AIR
        }
    }

    /// Returns this entry with its emittance replaced.
    #[must_use]
    pub fn with_emittance(self, emittance: f32) -> Self {
        Self { emittance, ..self }
    }
}

impl Default for MaterialEntry {
    fn default() -> Self {
        Self::AIR
    }
}

// -------------------------------------------------------------------------------------------------

/// All the materials of a scene and the textures they use.
#[derive(Clone, Debug, PartialEq)]
pub struct MaterialPalette {
    entries: Vec<MaterialEntry>,
    textures: Vec<Texture>,
    biome: BiomeColors,
}

impl MaterialPalette {
    /// Constructs a palette containing only air.
    pub fn new() -> Self {
        Self {
            entries: vec![MaterialEntry::AIR],
            textures: Vec::new(),
            biome: BiomeColors::default(),
        }
    }

    /// Sets the colors used by biome tints.
    #[must_use]
    pub fn with_biome_colors(mut self, biome: BiomeColors) -> Self {
        self.biome = biome;
        self
    }

    /// Adds a texture to the atlas.
    pub fn add_texture(&mut self, texture: Texture) -> TextureId {
        let id = TextureId(self.textures.len() as u32);
        self.textures.push(texture);
        id
    }

    /// Adds a material.
    ///
    /// Panics if the entry refers to a texture not in this palette.
    #[track_caller]
    pub fn add(&mut self, entry: MaterialEntry) -> MaterialId {
        if let ColorSource::Texture(TextureId(t)) = entry.color {
            assert!(
                (t as usize) < self.textures.len(),
                "material refers to nonexistent texture {t}"
            );
        }
        let id = MaterialId(self.entries.len() as u32);
        self.entries.push(entry);
        id
    }

    /// Number of materials, including air.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Always false, since air is always present.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Returns whether `id` refers to an entry of this palette.
    pub fn contains(&self, id: MaterialId) -> bool {
        (id.0 as usize) < self.entries.len()
    }

    /// Returns the full entry for `id`, if it exists.
    pub fn entry(&self, id: MaterialId) -> Option<&MaterialEntry> {
        self.entries.get(id.0 as usize)
    }

    /// Returns the [`Material`] for `id`. Unknown ids are treated as air.
    pub fn get(&self, id: MaterialId) -> Material {
        self.entry(id).map_or(Material::AIR, |entry| entry.material)
    }

    /// Samples the surface of material `id` at texture coordinate `uv`.
    ///
    /// Returns [`None`] for unknown ids, and for holes when `mode` is [`SampleMode::Cutout`].
    pub fn sample(&self, id: MaterialId, uv: TexPoint, mode: SampleMode) -> Option<MaterialSample> {
        let entry = self.entry(id)?;
        let color = match entry.color {
            ColorSource::Flat(color) => color,
            ColorSource::Texture(TextureId(t)) => self.textures.get(t as usize)?.sample(uv),
        };
        if mode == SampleMode::Cutout && color.alpha() <= crate::EPSILON {
            return None;
        }
        let tint = match entry.tint {
            Tint::None => Rgb::ONE,
            Tint::Constant(rgb) => rgb,
            Tint::Foliage => self.biome.foliage,
            Tint::Grass => self.biome.grass,
            Tint::Water => self.biome.water,
        };
        Some(MaterialSample {
            color: (color.to_rgb() * tint).with_alpha(color.alpha()),
            specular: entry.specular,
            metalness: entry.metalness,
            roughness: entry.roughness,
            emittance: entry.emittance,
        })
    }

    pub(crate) fn from_parts(
        entries: Vec<MaterialEntry>,
        textures: Vec<Texture>,
        biome: BiomeColors,
    ) -> Self {
        Self {
            entries,
            textures,
            biome,
        }
    }
}

impl Default for MaterialPalette {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use euclid::point2;
    use pretty_assertions::assert_eq;

    fn checker() -> Texture {
        // top row: red, green; bottom row: blue, transparent
        Texture::from_srgba8(
            2,
            2,
            &[
                [255, 0, 0, 255],
                [0, 255, 0, 255],
                [0, 0, 255, 255],
                [0, 0, 0, 0],
            ],
        )
        .unwrap()
    }

    #[test]
    fn texture_orientation_and_wrap() {
        let t = checker();
        assert_eq!(t.sample(point2(0.25, 0.75)), Rgba::new(1.0, 0.0, 0.0, 1.0));
        assert_eq!(t.sample(point2(0.75, 0.75)), Rgba::new(0.0, 1.0, 0.0, 1.0));
        assert_eq!(t.sample(point2(0.25, 0.25)), Rgba::new(0.0, 0.0, 1.0, 1.0));
        assert_eq!(t.sample(point2(1.25, -0.75)), t.sample(point2(0.25, 0.25)));
        // exact upper edge must not index out of bounds
        assert_eq!(t.sample(point2(0.0, 0.0)), Rgba::new(0.0, 0.0, 1.0, 1.0));
    }

    #[test]
    fn texture_dimension_mismatch() {
        assert!(Texture::from_srgba8(3, 1, &[[0; 4]; 2]).is_none());
        assert!(Texture::from_srgba8(0, 0, &[]).is_none());
    }

    #[test]
    fn cutout_mode() {
        let mut palette = MaterialPalette::new();
        let tex = palette.add_texture(checker());
        let id = palette.add(MaterialEntry {
            color: ColorSource::Texture(tex),
            ..MaterialEntry::AIR
        });
        let hole = point2(0.75, 0.25);
        assert_eq!(palette.sample(id, hole, SampleMode::Cutout), None);
        assert_eq!(
            palette
                .sample(id, hole, SampleMode::AllowAlpha)
                .map(|s| s.color),
            Some(Rgba::TRANSPARENT)
        );
    }

    #[test]
    fn tint_applies_to_rgb_only() {
        let mut palette = MaterialPalette::new().with_biome_colors(BiomeColors {
            foliage: Rgb::new(0.5, 0.5, 0.5),
            grass: Rgb::ONE,
            water: Rgb::ONE,
        });
        let id = palette.add(MaterialEntry {
            color: ColorSource::Flat(Rgba::new(1.0, 0.5, 1.0, 0.25)),
            tint: Tint::Foliage,
            ..MaterialEntry::AIR
        });
        assert_eq!(
            palette
                .sample(id, point2(0.0, 0.0), SampleMode::AllowAlpha)
                .unwrap()
                .color,
            Rgba::new(0.5, 0.25, 0.5, 0.25)
        );
    }

    #[test]
    fn effectively_refractive() {
        assert!(!Material::AIR.is_refractive());
        assert!(Material::new(1.5, false, false).is_refractive());
        assert!(!Material::new(1.5, false, true).is_refractive());
        assert!(!Material::new(AIR_IOR + 5e-5, false, false).is_refractive());
    }

    #[test]
    fn unknown_id_is_air() {
        let palette = MaterialPalette::new();
        assert_eq!(palette.get(MaterialId(17)), Material::AIR);
        assert_eq!(
            palette.sample(MaterialId(17), point2(0.0, 0.0), SampleMode::AllowAlpha),
            None
        );
    }
}
