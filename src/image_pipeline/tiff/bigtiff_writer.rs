//! Little-endian BigTIFF container writer.
//!
//! Pages are appended in call order. Tile data is written first, then any
//! tag values too large for an entry, then the IFD itself. Full-resolution
//! pages form the top-level IFD chain; each reserves SubIFD slots that the
//! following reduced pages fill in order.

use std::collections::VecDeque;
use std::fs::File;
use std::io::{self, BufWriter, Seek, SeekFrom, Write};
use std::path::Path;

use byteorder::{LittleEndian, WriteBytesExt};
use tracing::{debug, trace};

use crate::image_pipeline::common::error::{ConversionError, Result};
use crate::image_pipeline::ome::escape_non_ascii;
use crate::image_pipeline::tiff::tags::{self, FieldType};
use crate::image_pipeline::tiff::tiling::tiles_across;
use crate::image_pipeline::tiff::writer::{PageKind, PageRequest, PageWriter};

struct Entry {
    tag: u16,
    field_type: FieldType,
    count: u64,
    data: Vec<u8>,
}

impl Entry {
    fn short(tag: u16, value: u16) -> Self {
        Self {
            tag,
            field_type: FieldType::Short,
            count: 1,
            data: value.to_le_bytes().to_vec(),
        }
    }

    fn long(tag: u16, value: u32) -> Self {
        Self {
            tag,
            field_type: FieldType::Long,
            count: 1,
            data: value.to_le_bytes().to_vec(),
        }
    }

    fn eight_byte(tag: u16, field_type: FieldType, values: &[u64]) -> Self {
        Self {
            tag,
            field_type,
            count: values.len() as u64,
            data: values.iter().flat_map(|v| v.to_le_bytes()).collect(),
        }
    }

    fn ascii(tag: u16, value: &str) -> Self {
        let mut data = value.as_bytes().to_vec();
        data.push(0);
        Self {
            tag,
            field_type: FieldType::Ascii,
            count: data.len() as u64,
            data,
        }
    }

    fn is_inline(&self) -> bool {
        self.data.len() <= tags::BIGTIFF_INLINE_LEN
    }
}

pub struct BigTiffWriter<W: Write + Seek> {
    out: W,
    /// File offset of the pointer that receives the next top-level IFD offset
    next_ifd_pointer: u64,
    /// Unfilled SubIFD slots of the most recent full-resolution page
    pending_slots: VecDeque<u64>,
    /// Current end of the written data
    pos: u64,
    pages_written: usize,
}

impl BigTiffWriter<BufWriter<File>> {
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::create(path).map_err(|e| {
            ConversionError::WriteError(format!("{}: {}", path.display(), e))
        })?;
        Self::new(BufWriter::new(file))
    }
}

impl<W: Write + Seek> BigTiffWriter<W> {
    pub fn new(mut out: W) -> Result<Self> {
        write_header(&mut out).map_err(write_error)?;
        Ok(Self {
            out,
            next_ifd_pointer: tags::FIRST_IFD_POINTER,
            pending_slots: VecDeque::new(),
            pos: tags::BIGTIFF_HEADER_LEN,
            pages_written: 0,
        })
    }

    pub fn pages_written(&self) -> usize {
        self.pages_written
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn check_request(&self, request: &PageRequest) -> Result<()> {
        match &request.kind {
            PageKind::Base { .. } if !self.pending_slots.is_empty() => {
                return Err(ConversionError::WriteError(format!(
                    "page {} starts a new channel while {} reduced page(s) of the previous channel are missing",
                    request.position.ordinal,
                    self.pending_slots.len()
                )));
            }
            PageKind::Reduced if self.pending_slots.is_empty() => {
                return Err(ConversionError::WriteError(format!(
                    "reduced page {} has no SubIFD slot to link into",
                    request.position.ordinal
                )));
            }
            _ => {}
        }

        let expected = tiles_across(request.width, request.tile_size) as usize
            * tiles_across(request.height, request.tile_size) as usize;
        if request.tiles.len() != expected {
            return Err(ConversionError::WriteError(format!(
                "page {} has {} tiles, expected {}",
                request.position.ordinal,
                request.tiles.len(),
                expected
            )));
        }
        Ok(())
    }

    fn append_page(&mut self, request: &PageRequest) -> io::Result<()> {
        let mut offsets = Vec::with_capacity(request.tiles.len());
        let mut byte_counts = Vec::with_capacity(request.tiles.len());
        for tile in &request.tiles {
            offsets.push(self.pos);
            byte_counts.push(tile.len() as u64);
            self.put(tile)?;
        }

        let mut entries = Vec::with_capacity(16);
        if matches!(request.kind, PageKind::Reduced) {
            entries.push(Entry::long(tags::NEW_SUBFILE_TYPE, tags::SUBFILE_REDUCED_IMAGE));
        }
        entries.push(Entry::long(tags::IMAGE_WIDTH, request.width));
        entries.push(Entry::long(tags::IMAGE_LENGTH, request.height));
        entries.push(Entry::short(tags::BITS_PER_SAMPLE, request.pixel_type.bits_per_sample()));
        entries.push(Entry::short(tags::COMPRESSION, request.compression));
        entries.push(Entry::short(
            tags::PHOTOMETRIC_INTERPRETATION,
            tags::PHOTOMETRIC_MIN_IS_BLACK,
        ));
        entries.push(Entry::short(tags::SAMPLES_PER_PIXEL, 1));
        entries.push(Entry::short(tags::PLANAR_CONFIGURATION, tags::PLANAR_CONTIGUOUS));
        entries.push(Entry::long(tags::TILE_WIDTH, request.tile_size));
        entries.push(Entry::long(tags::TILE_LENGTH, request.tile_size));
        entries.push(Entry::eight_byte(tags::TILE_OFFSETS, FieldType::Long8, &offsets));
        entries.push(Entry::eight_byte(tags::TILE_BYTE_COUNTS, FieldType::Long8, &byte_counts));
        entries.push(Entry::short(tags::SAMPLE_FORMAT, request.pixel_type.sample_format()));

        if let PageKind::Base {
            channel_name,
            description,
            sub_pages,
        } = &request.kind
        {
            entries.push(Entry::ascii(tags::PAGE_NAME, &escape_non_ascii(channel_name)));
            if let Some(description) = description {
                entries.push(Entry::ascii(tags::IMAGE_DESCRIPTION, description));
            }
            if *sub_pages > 0 {
                let placeholders = vec![0u64; *sub_pages as usize];
                entries.push(Entry::eight_byte(tags::SUB_IFDS, FieldType::Ifd8, &placeholders));
            }
        }

        entries.sort_by_key(|e| e.tag);

        // Out-of-line values, word aligned.
        let mut value_offsets = Vec::with_capacity(entries.len());
        for entry in &entries {
            if entry.is_inline() {
                value_offsets.push(None);
            } else {
                self.align()?;
                value_offsets.push(Some(self.pos));
                self.put(&entry.data)?;
            }
        }

        self.align()?;
        let ifd_offset = self.pos;
        let mut ifd = Vec::with_capacity(16 + entries.len() * tags::BIGTIFF_ENTRY_LEN as usize);
        ifd.write_u64::<LittleEndian>(entries.len() as u64)?;

        let mut slots = VecDeque::new();
        for (index, (entry, value_offset)) in entries.iter().zip(&value_offsets).enumerate() {
            ifd.write_u16::<LittleEndian>(entry.tag)?;
            ifd.write_u16::<LittleEndian>(entry.field_type as u16)?;
            ifd.write_u64::<LittleEndian>(entry.count)?;
            match value_offset {
                Some(offset) => ifd.write_u64::<LittleEndian>(*offset)?,
                None => {
                    let mut inline = [0u8; tags::BIGTIFF_INLINE_LEN];
                    inline[..entry.data.len()].copy_from_slice(&entry.data);
                    ifd.write_all(&inline)?;
                }
            }

            if entry.tag == tags::SUB_IFDS {
                let first = match value_offset {
                    Some(offset) => *offset,
                    None => ifd_offset + 8 + index as u64 * tags::BIGTIFF_ENTRY_LEN + 12,
                };
                slots.extend((0..entry.count).map(|i| first + i * 8));
            }
        }
        let next_pointer = ifd_offset + ifd.len() as u64;
        ifd.write_u64::<LittleEndian>(0)?;
        self.put(&ifd)?;

        match request.kind {
            PageKind::Base { .. } => {
                self.patch(self.next_ifd_pointer, ifd_offset)?;
                self.next_ifd_pointer = next_pointer;
                self.pending_slots = slots;
            }
            PageKind::Reduced => {
                if let Some(slot) = self.pending_slots.pop_front() {
                    self.patch(slot, ifd_offset)?;
                }
            }
        }

        trace!(
            ordinal = request.position.ordinal,
            ifd_offset,
            entries = entries.len(),
            "Wrote IFD"
        );
        Ok(())
    }

    fn put(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.out.write_all(bytes)?;
        self.pos += bytes.len() as u64;
        Ok(())
    }

    fn align(&mut self) -> io::Result<()> {
        if self.pos % 2 == 1 {
            self.put(&[0])?;
        }
        Ok(())
    }

    fn patch(&mut self, at: u64, value: u64) -> io::Result<()> {
        self.out.seek(SeekFrom::Start(at))?;
        self.out.write_u64::<LittleEndian>(value)?;
        self.out.seek(SeekFrom::Start(self.pos))?;
        Ok(())
    }
}

impl<W: Write + Seek> PageWriter for BigTiffWriter<W> {
    fn write_page(&mut self, request: PageRequest) -> Result<()> {
        self.check_request(&request)?;
        self.append_page(&request).map_err(write_error)?;
        self.pages_written += 1;
        debug!(
            ordinal = request.position.ordinal,
            channel = request.position.channel_index,
            level = request.position.level,
            tiles = request.tiles.len(),
            "Wrote page"
        );
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        if !self.pending_slots.is_empty() {
            return Err(ConversionError::WriteError(format!(
                "{} reserved SubIFD slot(s) were never filled",
                self.pending_slots.len()
            )));
        }
        self.out.flush().map_err(write_error)
    }
}

fn write_header<W: Write>(out: &mut W) -> io::Result<()> {
    out.write_all(b"II")?;
    out.write_u16::<LittleEndian>(tags::BIGTIFF_MAGIC)?;
    out.write_u16::<LittleEndian>(tags::BIGTIFF_OFFSET_SIZE)?;
    out.write_u16::<LittleEndian>(0)?;
    // First IFD offset, patched when the first page is written.
    out.write_u64::<LittleEndian>(0)?;
    Ok(())
}

fn write_error(e: io::Error) -> ConversionError {
    ConversionError::WriteError(e.to_string())
}
