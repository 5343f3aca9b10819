//! Splitting a page into fixed-size tiles.

use crate::image_pipeline::common::error::Result;
use crate::image_pipeline::source::SourcePage;
use crate::image_pipeline::tiff::codec::TileCodec;

/// Number of tiles needed to cover `extent` pixels.
pub fn tiles_across(extent: u32, tile_size: u32) -> u32 {
    extent.div_ceil(tile_size)
}

/// Copies tile `(tx, ty)` of the page into `buf` as little-endian samples.
/// Whatever overhangs the right or bottom edge is zero-padded, so `buf` always
/// ends up holding a full `tile_size` square.
pub fn cut_tile(page: &SourcePage, tile_size: u32, tx: u32, ty: u32, buf: &mut Vec<u8>) {
    let sample = page.pixel_type().bytes_per_sample();
    let tile = tile_size as usize;
    let width = page.width as usize;
    let x0 = tx as usize * tile;
    let y0 = ty as usize * tile;
    let copy_width = width.saturating_sub(x0).min(tile);
    let rows = (page.height as usize).saturating_sub(y0).min(tile);

    buf.clear();
    for r in 0..rows {
        let start = (y0 + r) * width + x0;
        page.pixels.extend_le_bytes(start..start + copy_width, buf);
        buf.resize((r + 1) * tile * sample, 0);
    }
    buf.resize(tile * tile * sample, 0);
}

/// Cuts the page into tiles in row-major tile order and runs each through
/// `codec` as soon as it is cut. Only the encoded tiles are kept.
pub fn encode_tiles(page: &SourcePage, tile_size: u32, codec: &dyn TileCodec) -> Result<Vec<Vec<u8>>> {
    let across = tiles_across(page.width, tile_size);
    let down = tiles_across(page.height, tile_size);
    let tile_bytes = (tile_size as usize).pow(2) * page.pixel_type().bytes_per_sample();

    let mut buf = Vec::with_capacity(tile_bytes);
    let mut tiles = Vec::with_capacity(across as usize * down as usize);
    for ty in 0..down {
        for tx in 0..across {
            cut_tile(page, tile_size, tx, ty, &mut buf);
            tiles.push(codec.encode(&buf)?);
        }
    }
    Ok(tiles)
}
