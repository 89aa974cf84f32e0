//! Writing rendered images as PNG files.

use std::fs::File;
use std::io::{self, BufWriter};
use std::path::Path;

use imgref::ImgRef;
use png::{Encoder, chunk::ChunkType};

/// Writes an 8-bit sRGB RGBA image to a new file at `path`, replacing any existing file.
pub fn write_png(path: &Path, image: ImgRef<'_, [u8; 4]>) -> Result<(), io::Error> {
    let file = File::create(path)?;
    let mut buf_writer = BufWriter::new(file);
    write_png_to(&mut buf_writer, image)?;
    let file = buf_writer.into_inner().map_err(io::IntoInnerError::into_error)?;
    file.sync_all()?;
    Ok(())
}

/// Writes an 8-bit sRGB RGBA image in PNG format to `writer`.
pub fn write_png_to<W: io::Write>(writer: W, image: ImgRef<'_, [u8; 4]>) -> Result<(), io::Error> {
    let dimension =
        |d: usize| u32::try_from(d).map_err(|_| io::Error::other("image too large for PNG"));

    let mut png_encoder = Encoder::new(writer, dimension(image.width())?, dimension(image.height())?);
    png_encoder.set_color(png::ColorType::Rgba);
    png_encoder.set_depth(png::BitDepth::Eight);
    png_encoder.set_compression(png::Compression::Best);
    let mut png_writer = png_encoder.write_header()?;
    write_color_metadata(&mut png_writer)?;

    let data: Vec<u8> = image.pixels().flatten().collect();
    png_writer.write_image_data(&data)?;
    png_writer.finish()?;
    Ok(())
}

fn write_color_metadata<W: io::Write>(png_writer: &mut png::Writer<W>) -> Result<(), io::Error> {
    // sRGB, with gAMA and cHRM for decoders which do not understand it
    // (values from the PNG specification's sRGB chunk section).
    png_writer.write_chunk(ChunkType(*b"sRGB"), &[0])?;
    png_writer.write_chunk(ChunkType(*b"gAMA"), &45455_u32.to_be_bytes())?;
    png_writer.write_chunk(
        ChunkType(*b"cHRM"),
        &[
            31270, // White Point x
            32900, // White Point y
            64000, // Red x
            33000, // Red y
            30000, // Green x
            60000, // Green y
            15000, // Blue x
            6000,  // Blue y
        ]
        .into_iter()
        .flat_map(u32::to_be_bytes)
        .collect::<Box<[u8]>>(),
    )?;
    Ok(())
}
