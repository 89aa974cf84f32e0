//! JSON scene description files.
//!
//! A scene file lists textures, materials, and block shapes, then places blocks by id in
//! the solid and liquid voxel grids. Material ids and block ids are 1-based positions in
//! their lists; id 0 is air or empty. Colors are linear RGB(A) floats, except texture
//! pixels which are 8-bit sRGB.
//!
//! Every emissive block placed in the solid grid is registered as a light source.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use anyhow::{Context as _, bail};

use blocktrace::block::{BlockId, BlockPalette, Shape};
use blocktrace::camera::{Camera, CanvasConfig};
use blocktrace::emitter_grid::{Emitter, EmitterGrid};
use blocktrace::environment::{Sky, Sun};
use blocktrace::material::{
    AIR_IOR, BiomeColors, ColorSource, Material, MaterialEntry, MaterialPalette, Texture,
    TextureId, Tint,
};
use blocktrace::math::{GridAab, GridCoordinate, GridPoint, Rgba};
use blocktrace::scene::Scene;
use blocktrace::triangles::{Triangle, TriangleList};
use blocktrace::voxels::BlockGrid;

// -------------------------------------------------------------------------------------------------

/// Contents of a scene file.
#[derive(Clone, Debug, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(default, deny_unknown_fields)]
#[allow(missing_docs)]
pub struct SceneFile {
    pub textures: Vec<TextureDescription>,
    pub materials: Vec<MaterialDescription>,
    pub biome_colors: BiomeColors,
    pub blocks: Vec<Shape>,
    /// Solid blocks, applied in order so that later placements overwrite earlier ones.
    pub placements: Vec<Placement>,
    /// Liquid blocks.
    pub liquid: Vec<Placement>,
    pub world_triangles: Vec<Triangle>,
    pub actor_triangles: Vec<Triangle>,
    pub sky: Sky,
    pub sun: Sun,
    pub camera: CameraDescription,
    /// Image width and height in pixels.
    pub canvas: [usize; 2],
    pub emitter_grid: EmitterGridDescription,
}

impl Default for SceneFile {
    fn default() -> Self {
        Self {
            textures: Vec::new(),
            materials: Vec::new(),
            biome_colors: BiomeColors::default(),
            blocks: Vec::new(),
            placements: Vec::new(),
            liquid: Vec::new(),
            world_triangles: Vec::new(),
            actor_triangles: Vec::new(),
            sky: Sky::default(),
            sun: Sun::default(),
            camera: CameraDescription::default(),
            canvas: [320, 240],
            emitter_grid: EmitterGridDescription::default(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(deny_unknown_fields)]
#[allow(missing_docs)]
pub struct TextureDescription {
    pub width: usize,
    pub height: usize,
    /// sRGB RGBA, rows from top to bottom.
    pub pixels: Vec<[u8; 4]>,
}

#[derive(Clone, Debug, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(default, deny_unknown_fields)]
#[allow(missing_docs)]
pub struct MaterialDescription {
    /// Linear RGBA; ignored if `texture` is set.
    pub color: [f32; 4],
    /// 0-based index into [`SceneFile::textures`].
    pub texture: Option<u32>,
    pub tint: Tint,
    pub ior: f32,
    pub refractive: bool,
    pub opaque: bool,
    pub emittance: f32,
    pub specular: f32,
    pub metalness: f32,
    pub roughness: f32,
}

impl Default for MaterialDescription {
    fn default() -> Self {
        Self {
            color: [1.0; 4],
            texture: None,
            tint: Tint::None,
            ior: AIR_IOR,
            refractive: false,
            opaque: true,
            emittance: 0.0,
            specular: 0.0,
            metalness: 0.0,
            roughness: 0.0,
        }
    }
}

/// Places `block` in a [`Region`].
#[derive(Clone, Copy, Debug, PartialEq, serde::Deserialize, serde::Serialize)]
#[allow(missing_docs)]
pub struct Placement {
    /// 1-based index into [`SceneFile::blocks`], or 0 to clear.
    pub block: u32,
    #[serde(flatten)]
    pub region: Region,
}

#[derive(Clone, Copy, Debug, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "snake_case")]
#[allow(missing_docs)]
pub enum Region {
    /// A single cube.
    Cube([GridCoordinate; 3]),
    /// Every cube `c` with `lower <= c < upper`.
    Box {
        lower: [GridCoordinate; 3],
        upper: [GridCoordinate; 3],
    },
}

#[derive(Clone, Debug, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(default, deny_unknown_fields)]
#[allow(missing_docs)]
pub struct CameraDescription {
    pub position: [f64; 3],
    pub target: [f64; 3],
    pub fov_y_degrees: f64,
}

impl Default for CameraDescription {
    fn default() -> Self {
        Self {
            position: [0.0, 2.0, 8.0],
            target: [0.0, 0.0, 0.0],
            fov_y_degrees: 60.0,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(default, deny_unknown_fields)]
#[allow(missing_docs)]
pub struct EmitterGridDescription {
    /// Side length of a cell in cubes. Zero or less disables emitter sampling.
    pub cell_size: GridCoordinate,
    /// How many cells away from its own an emitter is still listed.
    pub reach: u32,
}

impl Default for EmitterGridDescription {
    fn default() -> Self {
        Self {
            cell_size: 16,
            reach: 1,
        }
    }
}

/// Result of [`SceneFile::build()`].
#[derive(Debug)]
#[non_exhaustive]
#[allow(missing_docs)]
pub struct LoadedScene {
    pub scene: Scene,
    pub camera: Camera,
    pub canvas: CanvasConfig,
}

// -------------------------------------------------------------------------------------------------

impl SceneFile {
    /// Reads and parses a scene file.
    pub fn read(path: &Path) -> Result<Self, anyhow::Error> {
        let file = File::open(path)
            .with_context(|| format!("failed to open scene file {}", path.display()))?;
        serde_json::from_reader(BufReader::new(file))
            .with_context(|| format!("failed to parse scene file {}", path.display()))
    }

    /// Checks the references between parts of the file and assembles the [`Scene`].
    pub fn build(self) -> Result<LoadedScene, anyhow::Error> {
        let Self {
            textures,
            materials: material_descriptions,
            biome_colors,
            blocks: shapes,
            placements,
            liquid,
            world_triangles,
            actor_triangles,
            sky,
            sun,
            camera,
            canvas: [canvas_width, canvas_height],
            emitter_grid,
        } = self;

        let mut materials = MaterialPalette::new().with_biome_colors(biome_colors);
        for (index, TextureDescription { width, height, pixels }) in textures.iter().enumerate() {
            let texture = Texture::from_srgba8(*width, *height, pixels).with_context(|| {
                format!(
                    "texture {index} is {width}×{height} but has {len} pixels",
                    len = pixels.len()
                )
            })?;
            materials.add_texture(texture);
        }
        for (index, description) in material_descriptions.iter().enumerate() {
            if let Some(t) = description.texture
                && t as usize >= textures.len()
            {
                bail!(
                    "material {id} refers to texture {t}, but there are only {count}",
                    id = index + 1,
                    count = textures.len()
                );
            }
            materials.add(description.to_entry());
        }

        let mut blocks = BlockPalette::new();
        for shape in shapes {
            blocks.push(shape);
        }

        let block_grid = fill_grid(&placements, &blocks).context("invalid block placement")?;
        let liquid_grid = fill_grid(&liquid, &blocks).context("invalid liquid placement")?;

        let emitters: Vec<Emitter> = block_grid
            .iter_defined()
            .filter(|&(_, block)| {
                materials
                    .entry(blocks.primary_material(block))
                    .is_some_and(|entry| entry.emittance > 0.0)
            })
            .map(|(position, block)| Emitter { position, block })
            .collect();
        log::debug!(
            "scene file: {materials} materials, {blocks} blocks, {volume} cubes, {emitters} emitters",
            materials = materials.len() - 1,
            blocks = blocks.len() - 1,
            volume = block_grid.bounds().volume(),
            emitters = emitters.len(),
        );
        let emitters = EmitterGrid::build(emitter_grid.cell_size, emitters, emitter_grid.reach);

        let scene = Scene::new(blocks, materials)
            .with_block_index(block_grid)
            .with_liquid_index(liquid_grid)
            .with_world_triangles(world_triangles.into_iter().collect::<TriangleList>())
            .with_actor_triangles(actor_triangles.into_iter().collect::<TriangleList>())
            .with_emitters(emitters)
            .with_sky(sky)
            .with_sun(sun);

        Ok(LoadedScene {
            scene,
            camera: Camera::look_at(camera.position, camera.target, camera.fov_y_degrees),
            canvas: CanvasConfig::new(canvas_width, canvas_height),
        })
    }
}

impl MaterialDescription {
    fn to_entry(&self) -> MaterialEntry {
        let [r, g, b, a] = self.color;
        MaterialEntry {
            material: Material::new(self.ior, self.refractive, self.opaque),
            color: match self.texture {
                Some(t) => ColorSource::Texture(TextureId(t)),
                None => ColorSource::Flat(Rgba::new(r, g, b, a)),
            },
            tint: self.tint,
            emittance: self.emittance,
            specular: self.specular,
            metalness: self.metalness,
            roughness: self.roughness,
        }
    }
}

impl Region {
    fn to_grid_aab(self) -> Result<GridAab, anyhow::Error> {
        let (lower, upper) = match self {
            Region::Cube(cube) => {
                let upper = cube.map(|c| c.checked_add(1));
                let [Some(x), Some(y), Some(z)] = upper else {
                    bail!("cube {cube:?} is out of range");
                };
                (cube, [x, y, z])
            }
            Region::Box { lower, upper } => (lower, upper),
        };
        if lower.iter().zip(&upper).any(|(l, u)| l > u) {
            bail!("box lower corner {lower:?} is above upper corner {upper:?}");
        }
        let size: [GridCoordinate; 3] = [0, 1, 2].map(|i| upper[i].wrapping_sub(lower[i]));
        if size.iter().any(|&s| s < 0) {
            bail!("box from {lower:?} to {upper:?} is too large");
        }
        Ok(GridAab::from_lower_size(lower, size))
    }
}

/// Builds a grid just large enough for all `placements`.
fn fill_grid(placements: &[Placement], blocks: &BlockPalette) -> Result<BlockGrid, anyhow::Error> {
    let regions = placements
        .iter()
        .map(|placement| {
            if placement.block as usize >= blocks.len() {
                bail!(
                    "block {block} is not defined; there are {count} blocks",
                    block = placement.block,
                    count = blocks.len() - 1
                );
            }
            Ok((BlockId::from_raw(placement.block), placement.region.to_grid_aab()?))
        })
        .collect::<Result<Vec<_>, _>>()?;

    let bounds = regions
        .iter()
        .map(|&(_, region)| region)
        .filter(|region| region.volume() > 0)
        .reduce(|a, b| {
            let lower = a.lower_bounds().min(b.lower_bounds());
            let upper = a.upper_bounds().max(b.upper_bounds());
            GridAab::from_lower_size(lower, upper - lower)
        })
        .unwrap_or(GridAab::ORIGIN_EMPTY);

    let mut grid = BlockGrid::new(bounds);
    for (block, region) in regions {
        grid.fill(region, block);
    }
    Ok(grid)
}

// -------------------------------------------------------------------------------------------------
