//! Decoding scenes from the flat integer tables produced by an external scene packer.
//!
//! Every table is a slice of 32-bit words. Floating-point values are stored as their bit
//! patterns, and references between tables are word offsets. Decoding checks all offsets
//! once, so that the resulting [`BlockPalette`], [`MaterialPalette`], and [`EmitterGrid`]
//! can be queried without further validation.
//!
//! # Block tables
//!
//! * Palette: two-word records, each identified by its word offset, so the record at offset
//!   `2k` describes block id `2k` and the record at offset 0 is never read. A record is the
//!   [`ModelType`] tag, then a pointer whose meaning depends on the type. For full cubes and hidden emitters it is the
//!   material id; for the others, an offset into the table for that type.
//! * Boxes: at the pointer, a count, then 13 words per box: `xmin xmax ymin ymax zmin zmax`,
//!   a flags word with 4 bits per face where bit 3 means the face is culled, then the six
//!   face materials. Faces are in [`Face6::BLOCK_ORDER`] in both places.
//! * Quads: at the pointer, a count, then 10 words per quad: origin, x edge, y edge, material.
//! * Water: at the pointer, the material and the data word for [`WaterModel::from_packed()`].
//!
//! # Material table
//!
//! Seven words per material; see [`MaterialPalette::from_packed()`].
//!
//! # Emitter grid tables
//!
//! See [`EmitterGrid::from_packed()`].

use std::fmt;

use crate::block::{BlockId, BlockPalette, BoxFace, ModelType, Quad, Shape, TexturedBox, WaterModel};
use crate::emitter_grid::{Emitter, EmitterGrid};
use crate::material::{
    BiomeColors, ColorSource, Material, MaterialEntry, MaterialId, MaterialPalette, Texture,
    TextureId, Tint,
};
use crate::math::{Aab, Face6, FaceMap, GridAab, GridPoint, GridVector, InvalidAab, Rgb, Rgba};

/// Words per record in the palette table.
const PALETTE_STRIDE: usize = 2;
/// Words per box record, not counting the list's leading count.
const BOX_STRIDE: usize = 13;
/// Words per quad record, not counting the list's leading count.
const QUAD_STRIDE: usize = 10;
/// Words per water record.
const WATER_STRIDE: usize = 2;
/// Words per material.
pub const MATERIAL_STRIDE: usize = 7;
/// Words of emitter grid metadata.
const EMITTER_META_LEN: usize = 7;
/// Words per emitter.
const EMITTER_STRIDE: usize = 4;

const FLAG_COLOR_TEXTURE: u32 = 1;
const FLAG_NORMAL_EMITTANCE_TEXTURE: u32 = 2;
const FLAG_SMR_TEXTURE: u32 = 4;
const FLAG_REFRACTIVE: u32 = 8;
const FLAG_OPAQUE: u32 = 16;

/// Bit of each 4-bit face field of a box's flags meaning the face is culled.
const BOX_FACE_CULLED: u32 = 0b1000;

/// Identifies one of the packed tables, for error reporting.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[expect(clippy::exhaustive_enums)]
pub enum Table {
    #[allow(missing_docs)]
    BlockPalette,
    #[allow(missing_docs)]
    Boxes,
    #[allow(missing_docs)]
    Quads,
    #[allow(missing_docs)]
    Water,
    #[allow(missing_docs)]
    Materials,
    #[allow(missing_docs)]
    EmitterMeta,
    #[allow(missing_docs)]
    EmitterCells,
    #[allow(missing_docs)]
    EmitterIndices,
    #[allow(missing_docs)]
    Emitters,
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Table::BlockPalette => "block palette",
            Table::Boxes => "box model",
            Table::Quads => "quad model",
            Table::Water => "water model",
            Table::Materials => "material",
            Table::EmitterMeta => "emitter grid metadata",
            Table::EmitterCells => "emitter grid cell",
            Table::EmitterIndices => "emitter grid index",
            Table::Emitters => "emitter",
        })
    }
}

/// Error from decoding packed scene tables.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
#[non_exhaustive]
pub enum PackedSceneError {
    /// A table ended in the middle of a record.
    #[error("{table} table truncated: need {needed} words at offset {offset}, but it has {len}")]
    Truncated {
        #[allow(missing_docs)]
        table: Table,
        /// Offset of the record.
        offset: usize,
        /// Words the record occupies.
        needed: usize,
        /// Length of the table.
        len: usize,
    },

    /// A block's model type tag is not one of the known [`ModelType`]s.
    #[error("block {block} has unknown model type {tag}")]
    UnknownModelType {
        #[allow(missing_docs)]
        block: u32,
        #[allow(missing_docs)]
        tag: u32,
    },

    /// A block's model pointer refers to a record which does not fit in its table.
    #[error("block {block} refers to {table} record at {pointer}, which is out of range")]
    BlockOutOfRange {
        #[allow(missing_docs)]
        block: u32,
        #[allow(missing_docs)]
        table: Table,
        #[allow(missing_docs)]
        pointer: usize,
    },

    /// A box has misordered or NaN bounds.
    #[error("block {block} has an invalid box")]
    InvalidBox {
        #[allow(missing_docs)]
        block: u32,
        #[source]
        #[allow(missing_docs)]
        error: InvalidAab,
    },

    /// A material refers to a texture not in the atlas.
    #[error("material {material} refers to texture {texture}, but there are only {count}")]
    UnknownTexture {
        #[allow(missing_docs)]
        material: u32,
        #[allow(missing_docs)]
        texture: u32,
        /// Number of textures in the atlas.
        count: usize,
    },

    /// The emitter grid has fewer cells than its extent declares.
    #[error("emitter grid declares {expected} cells but the cell table holds {actual}")]
    ShortEmitterCells {
        /// Cells in the declared extent.
        expected: usize,
        /// Complete cells in the table.
        actual: usize,
    },
}

/// The block model tables, as produced by the scene packer.
#[derive(Clone, Copy, Debug, Default)]
#[expect(clippy::exhaustive_structs)]
pub struct PackedBlockTables<'a> {
    /// Two words per block, addressed by block id.
    pub palette: &'a [u32],
    #[allow(missing_docs)]
    pub boxes: &'a [u32],
    #[allow(missing_docs)]
    pub quads: &'a [u32],
    #[allow(missing_docs)]
    pub water: &'a [u32],
}

/// The emitter grid tables, as produced by the scene packer.
#[derive(Clone, Copy, Debug, Default)]
#[expect(clippy::exhaustive_structs)]
pub struct PackedEmitterTables<'a> {
    /// Cell size, then lower bound and size of the extent for each of x, y, z in turn.
    pub meta: &'a [i32],
    /// Start and count in `indices` for each cell of the extent.
    pub cells: &'a [i32],
    /// Indices into `emitters`.
    pub indices: &'a [i32],
    /// x, y, z, and block id of each emitter.
    pub emitters: &'a [i32],
}

// -------------------------------------------------------------------------------------------------

/// Returns `table[offset..offset + len]`, or a [`PackedSceneError::Truncated`].
fn record<T>(table: &[T], which: Table, offset: usize, len: usize) -> Result<&[T], PackedSceneError> {
    offset
        .checked_add(len)
        .and_then(|end| table.get(offset..end))
        .ok_or(PackedSceneError::Truncated {
            table: which,
            offset,
            needed: len,
            len: table.len(),
        })
}

/// Like [`record()`] but reports the failure as belonging to `block`.
fn model_record(
    table: &[u32],
    which: Table,
    block: u32,
    pointer: usize,
    len: usize,
) -> Result<&[u32], PackedSceneError> {
    record(table, which, pointer, len).map_err(|_| PackedSceneError::BlockOutOfRange {
        block,
        table: which,
        pointer,
    })
}

fn float(word: u32) -> f64 {
    f64::from(f32::from_bits(word))
}

fn vector(words: &[u32]) -> [f64; 3] {
    [float(words[0]), float(words[1]), float(words[2])]
}

/// Reads a list of fixed-size records preceded by its count.
fn counted_records(
    table: &[u32],
    which: Table,
    block: u32,
    pointer: usize,
    stride: usize,
) -> Result<impl Iterator<Item = &[u32]>, PackedSceneError> {
    let count = model_record(table, which, block, pointer, 1)?[0] as usize;
    let words = count
        .checked_mul(stride)
        .ok_or(PackedSceneError::BlockOutOfRange {
            block,
            table: which,
            pointer,
        })?;
    Ok(model_record(table, which, block, pointer + 1, words)?.chunks_exact(stride))
}

/// Unpacks a linear `0xAARRGGBB` color.
fn argb(word: u32) -> Rgba {
    let [a, r, g, b] = word.to_be_bytes().map(|c| f32::from(c) / 255.0);
    Rgba::new(r, g, b, a)
}

/// Unpacks a linear `0x__RRGGBB` color.
fn rgb(word: u32) -> Rgb {
    argb(word).to_rgb()
}

fn unit_byte(word: u32, shift: u32) -> f32 {
    ((word >> shift) & 0xFF) as f32 / 255.0
}

// -------------------------------------------------------------------------------------------------

impl BlockPalette {
    /// Decodes the block model tables.
    ///
    /// The id of each block is the offset of its record in the palette table. Block id 0 is
    /// always [`Shape::Empty`], whatever the palette says about it, and odd ids are empty.
    pub fn from_packed(tables: PackedBlockTables<'_>) -> Result<Self, PackedSceneError> {
        let palette = tables.palette;
        if palette.len() % PALETTE_STRIDE != 0 {
            return Err(PackedSceneError::Truncated {
                table: Table::BlockPalette,
                offset: palette.len() - palette.len() % PALETTE_STRIDE,
                needed: PALETTE_STRIDE,
                len: palette.len(),
            });
        }

        let mut shapes = vec![Shape::Empty; palette.len().max(1)];
        for (offset, entry) in palette
            .chunks_exact(PALETTE_STRIDE)
            .enumerate()
            .skip(1)
            .map(|(i, entry)| (i * PALETTE_STRIDE, entry))
        {
            let block = offset as u32;
            if block == BlockId::WILDCARD_RAW {
                continue;
            }
            let (tag, pointer) = (entry[0], entry[1]);
            let model_type = ModelType::from_tag(tag)
                .ok_or(PackedSceneError::UnknownModelType { block, tag })?;
            shapes[offset] = decode_shape(&tables, block, model_type, pointer)?;
        }

        log::debug!(
            "decoded {} block models ({} box words, {} quad words, {} water words)",
            (palette.len() / PALETTE_STRIDE).saturating_sub(1),
            tables.boxes.len(),
            tables.quads.len(),
            tables.water.len(),
        );
        Ok(Self::from_shapes(shapes))
    }
}

fn decode_shape(
    tables: &PackedBlockTables<'_>,
    block: u32,
    model_type: ModelType,
    pointer: u32,
) -> Result<Shape, PackedSceneError> {
    let offset = pointer as usize;
    Ok(match model_type {
        ModelType::Empty => Shape::Empty,
        ModelType::FullCube => Shape::FullCube {
            material: MaterialId(pointer),
        },
        ModelType::HiddenEmitter => Shape::HiddenEmitter {
            material: MaterialId(pointer),
        },
        ModelType::BoxSet => Shape::BoxSet {
            boxes: counted_records(tables.boxes, Table::Boxes, block, offset, BOX_STRIDE)?
                .map(|words| decode_box(block, words))
                .collect::<Result<_, _>>()?,
        },
        ModelType::QuadMesh => Shape::QuadMesh {
            quads: counted_records(tables.quads, Table::Quads, block, offset, QUAD_STRIDE)?
                .map(|words| {
                    Quad::new(
                        vector(&words[0..3]),
                        vector(&words[3..6]),
                        vector(&words[6..9]),
                        MaterialId(words[9]),
                    )
                })
                .collect(),
        },
        ModelType::Water => {
            let words = model_record(tables.water, Table::Water, block, offset, WATER_STRIDE)?;
            Shape::Water(WaterModel::from_packed(MaterialId(words[0]), words[1]))
        }
    })
}

fn decode_box(block: u32, words: &[u32]) -> Result<TexturedBox, PackedSceneError> {
    let [xmin, xmax, ymin, ymax, zmin, zmax] = [0, 1, 2, 3, 4, 5].map(|i| float(words[i]));
    let bounds = Aab::try_from_lower_upper([xmin, ymin, zmin].into(), [xmax, ymax, zmax].into())
        .map_err(|error| PackedSceneError::InvalidBox { block, error })?;
    let flags = words[6];
    let mut faces = FaceMap::splat(BoxFace::CULLED);
    for (i, face) in Face6::BLOCK_ORDER.into_iter().enumerate() {
        if (flags >> (4 * i)) & BOX_FACE_CULLED == 0 {
            faces[face] = BoxFace::new(MaterialId(words[7 + i]));
        }
    }
    Ok(TexturedBox { bounds, faces })
}

// -------------------------------------------------------------------------------------------------

impl MaterialPalette {
    /// Decodes the material table, whose materials refer to `textures` by index.
    ///
    /// Each material is seven words:
    ///
    /// 0. Flags: 1 = textured color, 2 = textured normal and emittance, 4 = textured
    ///    specular, metalness, and roughness, 8 = refractive, 16 = opaque. Flags 2 and 4
    ///    are not supported and are ignored.
    /// 1. Tint: if the top byte is `0xFF`, a constant color in the low 24 bits; otherwise
    ///    1, 2, or 3 in the top byte for the foliage, grass, or water color, or 0 for none.
    /// 2. Unused high word of the color reference.
    /// 3. If textured, the texture index; otherwise the `0xAARRGGBB` color.
    /// 4. Emittance in the low 8 bits, as a fraction of 255.
    /// 5. Specular, metalness, and roughness in successive bytes, as fractions of 255.
    /// 6. Index of refraction as [`f32`] bits.
    ///
    /// Packed colors are linear, not sRGB.
    pub fn from_packed(
        table: &[u32],
        textures: Vec<Texture>,
        biome: BiomeColors,
    ) -> Result<Self, PackedSceneError> {
        if table.len() % MATERIAL_STRIDE != 0 {
            return Err(PackedSceneError::Truncated {
                table: Table::Materials,
                offset: table.len() - table.len() % MATERIAL_STRIDE,
                needed: MATERIAL_STRIDE,
                len: table.len(),
            });
        }
        let entries = table
            .chunks_exact(MATERIAL_STRIDE)
            .enumerate()
            .map(|(i, words)| decode_material(i as u32, words, textures.len()))
            .collect::<Result<Vec<_>, _>>()?;
        if entries.is_empty() {
            return Ok(Self::new().with_biome_colors(biome));
        }
        log::debug!(
            "decoded {} materials and {} textures",
            entries.len(),
            textures.len()
        );
        Ok(Self::from_parts(entries, textures, biome))
    }
}

fn decode_material(
    id: u32,
    words: &[u32],
    texture_count: usize,
) -> Result<MaterialEntry, PackedSceneError> {
    let flags = words[0];
    if flags & (FLAG_NORMAL_EMITTANCE_TEXTURE | FLAG_SMR_TEXTURE) != 0 {
        log::warn!("material {id}: ignoring unsupported texture flags {flags:#x}");
    }

    let tint = match words[1] >> 24 {
        0xFF => Tint::Constant(rgb(words[1])),
        0 => Tint::None,
        1 => Tint::Foliage,
        2 => Tint::Grass,
        3 => Tint::Water,
        other => {
            log::warn!("material {id}: ignoring unknown tint type {other}");
            Tint::None
        }
    };

    let color = if flags & FLAG_COLOR_TEXTURE != 0 {
        let texture = words[3];
        if texture as usize >= texture_count {
            return Err(PackedSceneError::UnknownTexture {
                material: id,
                texture,
                count: texture_count,
            });
        }
        ColorSource::Texture(TextureId(texture))
    } else {
        ColorSource::Flat(argb(words[3]))
    };

    Ok(MaterialEntry {
        material: Material::new(
            f32::from_bits(words[6]),
            flags & FLAG_REFRACTIVE != 0,
            flags & FLAG_OPAQUE != 0,
        ),
        color,
        tint,
        emittance: unit_byte(words[4], 0),
        specular: unit_byte(words[5], 0),
        metalness: unit_byte(words[5], 8),
        roughness: unit_byte(words[5], 16),
    })
}

// -------------------------------------------------------------------------------------------------

impl EmitterGrid {
    /// Decodes the emitter grid tables.
    ///
    /// The metadata is seven words: the cell size, then for each of x, y, and z the lower
    /// bound and size of the extent in cells. A cell size of zero or less means there is
    /// no grid, and the other tables are ignored. Cells are ordered as by
    /// [`GridAab::index()`], two words each.
    pub fn from_packed(tables: PackedEmitterTables<'_>) -> Result<Self, PackedSceneError> {
        let meta = record(tables.meta, Table::EmitterMeta, 0, EMITTER_META_LEN)?;
        let cell_size = meta[0];
        if cell_size <= 0 {
            log::debug!("no emitter grid");
            return Ok(Self::empty());
        }
        let extent = GridAab::from_lower_size(
            GridPoint::new(meta[1], meta[3], meta[5]),
            GridVector::new(meta[2], meta[4], meta[6]).max(GridVector::zero()),
        );

        let actual = tables.cells.len() / 2;
        if actual < extent.volume() {
            return Err(PackedSceneError::ShortEmitterCells {
                expected: extent.volume(),
                actual,
            });
        }
        let cells: Vec<(u32, u32)> = tables
            .cells
            .chunks_exact(2)
            .take(extent.volume())
            .map(|cell| {
                let start = u32::try_from(cell[0]).unwrap_or(0);
                let count = u32::try_from(cell[1]).unwrap_or(0);
                (start, count)
            })
            .collect();
        for (i, &(start, count)) in cells.iter().enumerate() {
            record(
                tables.indices,
                Table::EmitterIndices,
                start as usize,
                count as usize,
            )
            .map_err(|_| PackedSceneError::Truncated {
                table: Table::EmitterIndices,
                offset: i * 2,
                needed: start as usize + count as usize,
                len: tables.indices.len(),
            })?;
        }

        if tables.emitters.len() % EMITTER_STRIDE != 0 {
            return Err(PackedSceneError::Truncated {
                table: Table::Emitters,
                offset: tables.emitters.len() - tables.emitters.len() % EMITTER_STRIDE,
                needed: EMITTER_STRIDE,
                len: tables.emitters.len(),
            });
        }
        let emitters: Vec<Emitter> = tables
            .emitters
            .chunks_exact(EMITTER_STRIDE)
            .map(|e| Emitter {
                position: GridPoint::new(e[0], e[1], e[2]),
                block: BlockId::from_raw(e[3].cast_unsigned()),
            })
            .collect();

        let mut indices = Vec::with_capacity(tables.indices.len());
        for (offset, &index) in tables.indices.iter().enumerate() {
            match usize::try_from(index) {
                Ok(i) if i < emitters.len() => indices.push(index.cast_unsigned()),
                _ => {
                    return Err(PackedSceneError::Truncated {
                        table: Table::Emitters,
                        offset,
                        needed: EMITTER_STRIDE,
                        len: tables.emitters.len(),
                    });
                }
            }
        }

        log::debug!(
            "decoded emitter grid: {} emitters, {} cells of size {cell_size}, {} entries",
            emitters.len(),
            cells.len(),
            indices.len()
        );
        Ok(Self::from_tables(cell_size, extent, cells, indices, emitters))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::WaterShape;
    use crate::material::AIR_IOR;
    use pretty_assertions::assert_eq;

    fn f(value: f32) -> u32 {
        value.to_bits()
    }

    #[test]
    #[rustfmt::skip]
    fn block_palette() {
        let palette = [
            0, 0, // offset 0, ignored
            1, 7, // block 2: full cube of material 7
            2, 0, // block 4: boxes at 0
            3, 0, // block 6: quads at 0
            5, 0, // block 8: water at 0
            4, 9, // block 10: hidden emitter of material 9
        ];
        let boxes = [
            1,
            f(0.0), f(1.0), f(0.0), f(0.5), f(0.0), f(1.0),
            // only the top (index 4) visible
            0x80_8888,
            10, 11, 12, 13, 14, 15,
        ];
        let quads = [
            1,
            f(0.0), f(0.0), f(0.0),
            f(1.0), f(0.0), f(0.0),
            f(0.0), f(1.0), f(0.0),
            3,
        ];
        let water = [4, 1 << 16];
        let blocks = BlockPalette::from_packed(PackedBlockTables {
            palette: &palette,
            boxes: &boxes,
            quads: &quads,
            water: &water,
        })
        .unwrap();

        assert_eq!(blocks.len(), 12);
        let id = BlockId::from_raw;
        assert_eq!(blocks.get(id(2)), &Shape::FullCube { material: MaterialId(7) });
        let Shape::BoxSet { boxes } = blocks.get(id(4)) else {
            panic!("{:?}", blocks.get(id(4)));
        };
        assert_eq!(boxes[0].bounds, Aab::new(0.0, 1.0, 0.0, 0.5, 0.0, 1.0));
        assert_eq!(boxes[0].visible_faces().collect::<Vec<_>>(), vec![Face6::PY]);
        assert_eq!(boxes[0].faces[Face6::PY].material, MaterialId(14));
        assert_eq!(blocks.primary_material(id(6)), MaterialId(3));
        assert_eq!(
            blocks.get(id(8)),
            &Shape::Water(WaterModel {
                material: MaterialId(4),
                shape: WaterShape::Flat
            })
        );
        assert_eq!(blocks.model_type(id(10)), ModelType::HiddenEmitter);
        assert_eq!(
            blocks.iter().map(|(id, _)| id.to_raw()).collect::<Vec<_>>(),
            vec![2, 4, 6, 8, 10]
        );
    }

    #[test]
    fn block_id_is_record_offset() {
        let blocks = BlockPalette::from_packed(PackedBlockTables {
            palette: &[0, 0, 1, 7],
            ..Default::default()
        })
        .unwrap();
        assert_eq!(
            blocks.get(BlockId::from_raw(2)),
            &Shape::FullCube { material: MaterialId(7) }
        );
        assert_eq!(blocks.get(BlockId::from_raw(1)), &Shape::Empty);
        assert_eq!(blocks.get(BlockId::from_raw(3)), &Shape::Empty);
    }

    #[test]
    fn emitter_block_resolves_in_palette() {
        let blocks = BlockPalette::from_packed(PackedBlockTables {
            palette: &[0, 0, 2, 0, 1, 5],
            boxes: &[0],
            ..Default::default()
        })
        .unwrap();
        let grid = EmitterGrid::from_packed(PackedEmitterTables {
            meta: &[4, 0, 1, 0, 1, 0, 1],
            cells: &[0, 1],
            indices: &[0],
            emitters: &[1, 2, 3, 4],
        })
        .unwrap();

        let emitter = grid.emitter(0).unwrap();
        assert_eq!(emitter.block, BlockId::from_raw(4));
        assert_eq!(
            blocks.get(emitter.block),
            &Shape::FullCube { material: MaterialId(5) }
        );
        assert_eq!(blocks.emitter_face_count(emitter.block), 6);
    }

    #[test]
    fn unknown_model_type() {
        let result = BlockPalette::from_packed(PackedBlockTables {
            palette: &[0, 0, 9, 0],
            ..Default::default()
        });
        assert_eq!(result, Err(PackedSceneError::UnknownModelType { block: 2, tag: 9 }));
    }

    #[test]
    fn box_record_out_of_range() {
        let result = BlockPalette::from_packed(PackedBlockTables {
            palette: &[0, 0, 1, 3, 2, 0],
            boxes: &[2, 0, 0, 0],
            ..Default::default()
        });
        assert_eq!(
            result,
            Err(PackedSceneError::BlockOutOfRange {
                block: 4,
                table: Table::Boxes,
                pointer: 1,
            })
        );
    }

    #[test]
    fn truncated_palette() {
        let result = BlockPalette::from_packed(PackedBlockTables {
            palette: &[0, 0, 1],
            ..Default::default()
        });
        assert!(
            matches!(result, Err(PackedSceneError::Truncated { table: Table::BlockPalette, .. })),
            "{result:?}"
        );
    }

    #[test]
    fn materials() {
        let glass = [
            FLAG_COLOR_TEXTURE | FLAG_REFRACTIVE,
            0xFF_FF0000,
            0,
            0,
            0,
            0x00_80_00_FF,
            f(1.5),
        ];
        let lamp = [FLAG_OPAQUE, 1 << 24, 0, 0xFF_00FF00, 255, 0, f(AIR_IOR)];
        let table: Vec<u32> = [[0; 7], glass, lamp].concat();
        let palette = MaterialPalette::from_packed(
            &table,
            vec![Texture::solid(Rgba::new(1.0, 1.0, 1.0, 0.5))],
            BiomeColors::default(),
        )
        .unwrap();

        let glass = palette.entry(MaterialId(1)).unwrap();
        assert_eq!(glass.color, ColorSource::Texture(TextureId(0)));
        assert_eq!(glass.tint, Tint::Constant(Rgb::new(1.0, 0.0, 0.0)));
        assert!(glass.material.is_refractive());
        assert_eq!(glass.material.ior(), 1.5);
        assert_eq!((glass.specular, glass.metalness), (1.0, 0.0));
        assert!((glass.roughness - 128.0 / 255.0).abs() < 1e-6);

        let lamp = palette.entry(MaterialId(2)).unwrap();
        assert_eq!(lamp.color, ColorSource::Flat(Rgba::new(0.0, 1.0, 0.0, 1.0)));
        assert_eq!(lamp.tint, Tint::Foliage);
        assert_eq!(lamp.emittance, 1.0);
        assert!(lamp.material.is_opaque());
    }

    #[test]
    fn material_missing_texture() {
        let table = [FLAG_COLOR_TEXTURE, 0, 0, 2, 0, 0, f(1.0)];
        assert_eq!(
            MaterialPalette::from_packed(&table, vec![], BiomeColors::default()),
            Err(PackedSceneError::UnknownTexture {
                material: 0,
                texture: 2,
                count: 0
            })
        );
    }

    #[test]
    fn emitter_grid_matches_build() {
        let emitter = Emitter {
            position: GridPoint::new(5, -3, 0),
            block: BlockId::from_raw(2),
        };
        let built = EmitterGrid::build(4, vec![emitter], 0);
        // cell of (5, -3, 0) with truncating division is (1, 0, 0)
        let packed = EmitterGrid::from_packed(PackedEmitterTables {
            meta: &[4, 1, 1, 0, 1, 0, 1],
            cells: &[0, 1],
            indices: &[0],
            emitters: &[5, -3, 0, 2],
        })
        .unwrap();
        assert_eq!(packed, built);
        assert_eq!(packed.cell_range(GridPoint::new(6, 2, 3)), 0..1);
        assert_eq!(packed.emitter(0), Some(emitter));
    }

    #[test]
    fn emitter_grid_without_data() {
        let grid = EmitterGrid::from_packed(PackedEmitterTables {
            meta: &[0; 7],
            cells: &[0, 0],
            indices: &[0],
            emitters: &[0; 4],
        })
        .unwrap();
        assert!(!grid.has_data());
    }

    #[test]
    fn short_emitter_cells() {
        let result = EmitterGrid::from_packed(PackedEmitterTables {
            meta: &[4, 0, 2, 0, 2, 0, 2],
            cells: &[0, 0, 0, 0],
            indices: &[],
            emitters: &[],
        });
        assert_eq!(
            result,
            Err(PackedSceneError::ShortEmitterCells {
                expected: 8,
                actual: 2
            })
        );
    }
}
