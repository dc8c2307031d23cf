// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF image locator — walk pages in order and hand out every image XObject
// they reference, using the `lopdf` crate.

use std::collections::HashSet;
use std::path::Path;

use bildwerk_core::ContainerKind;
use bildwerk_core::error::{BildwerkError, Result};
use image::{DynamicImage, GrayImage, RgbImage};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};
use tracing::{debug, info, instrument};

use crate::item::{ImageLocator, ItemFailure, ItemSink, Payload, WorkItem};

/// Guard against malformed page trees whose /Parent chain loops.
const MAX_PARENT_DEPTH: usize = 32;

/// Yields one work item per image reference, page by page.
///
/// Within a page, images follow the declaration order of the page's
/// `/XObject` resource dictionary; form XObjects are searched in place.
#[derive(Debug, Default, Clone, Copy)]
pub struct PdfImageLocator;

impl PdfImageLocator {
    pub fn new() -> Self {
        Self
    }
}

impl ImageLocator for PdfImageLocator {
    fn kind(&self) -> ContainerKind {
        ContainerKind::Pdf
    }

    #[instrument(skip_all, fields(path = %source.display()))]
    fn produce_items(&self, source: &Path, sink: &mut dyn ItemSink) -> Result<()> {
        let document = Document::load(source).map_err(|err| {
            BildwerkError::PdfError(format!("failed to open {}: {}", source.display(), err))
        })?;

        let pages = document.get_pages();
        info!(pages = pages.len(), "PDF loaded");
        sink.announce(&format!("Processing {} pages...", pages.len()));

        let mut ordinal = 0;
        for (&page_number, &page_id) in pages.iter() {
            let images = page_image_ids(&document, page_id);
            debug!(page_number, images = images.len(), "Page scanned");

            for image_id in images {
                let label = format!("image on page {page_number}");
                let outcome = match image_payload(&document, image_id) {
                    Ok(payload) => Ok(WorkItem {
                        ordinal,
                        label,
                        page: Some(page_number),
                        payload,
                    }),
                    Err(error) => Err(ItemFailure {
                        label,
                        page: Some(page_number),
                        error,
                    }),
                };
                ordinal += 1;
                sink.accept(outcome);
            }
        }

        Ok(())
    }
}

// -- Page walking -------------------------------------------------------------

/// Image object ids referenced by a page, in declaration order, each at most
/// once.
fn page_image_ids(document: &Document, page_id: ObjectId) -> Vec<ObjectId> {
    let mut images = Vec::new();
    let mut seen = HashSet::new();

    let Some(resources) = page_resources(document, page_id) else {
        return images;
    };
    for child in xobject_ids(document, resources) {
        collect_images(document, child, &mut images, &mut seen);
    }
    images
}

/// The page's `/Resources`, inherited from ancestors in the page tree when
/// the page itself has none.
fn page_resources(document: &Document, page_id: ObjectId) -> Option<&Dictionary> {
    let mut node = dictionary_of(document, page_id)?;
    for _ in 0..MAX_PARENT_DEPTH {
        if let Ok(resources) = node.get(b"Resources") {
            return resolve_dictionary(document, resources);
        }
        let parent = match node.get(b"Parent") {
            Ok(Object::Reference(id)) => *id,
            _ => return None,
        };
        node = dictionary_of(document, parent)?;
    }
    None
}

/// References listed in a resource dictionary's `/XObject` entry.
fn xobject_ids(document: &Document, resources: &Dictionary) -> Vec<ObjectId> {
    let Some(xobjects) = resources
        .get(b"XObject")
        .ok()
        .and_then(|obj| resolve_dictionary(document, obj))
    else {
        return Vec::new();
    };

    xobjects
        .iter()
        .filter_map(|(_, value)| match value {
            Object::Reference(id) => Some(*id),
            _ => None,
        })
        .collect()
}

fn collect_images(
    document: &Document,
    id: ObjectId,
    images: &mut Vec<ObjectId>,
    seen: &mut HashSet<ObjectId>,
) {
    if !seen.insert(id) {
        return;
    }
    let Ok(Object::Stream(stream)) = document.get_object(id) else {
        return;
    };

    match name_entry(&stream.dict, b"Subtype").as_deref() {
        Some("Image") => images.push(id),
        Some("Form") => {
            let Some(resources) = stream
                .dict
                .get(b"Resources")
                .ok()
                .and_then(|obj| resolve_dictionary(document, obj))
            else {
                return;
            };
            for child in xobject_ids(document, resources) {
                collect_images(document, child, images, seen);
            }
        }
        _ => {}
    }
}

// -- Image payloads -----------------------------------------------------------

/// Read one image XObject: encoded bytes for JPEG/JPEG 2000 streams, pixels
/// for everything else.
fn image_payload(document: &Document, id: ObjectId) -> Result<Payload> {
    let stream = match document.get_object(id) {
        Ok(Object::Stream(stream)) => stream,
        _ => {
            return Err(BildwerkError::PdfError(format!(
                "object {} {} is not an image stream",
                id.0, id.1
            )));
        }
    };

    let filters = stream_filters(&stream.dict);
    match filters.as_slice() {
        [only] if only == "DCTDecode" || only == "JPXDecode" => {
            return Ok(Payload::Encoded(stream.content.clone()));
        }
        _ => {}
    }
    if let Some(unsupported) = filters
        .iter()
        .find(|f| matches!(f.as_str(), "DCTDecode" | "JPXDecode" | "CCITTFaxDecode" | "JBIG2Decode"))
    {
        return Err(BildwerkError::PdfError(format!(
            "unsupported image filter chain ending in {}",
            unsupported
        )));
    }

    let data = stream_data(stream, &filters)?;
    decode_raw_image(document, &stream.dict, &data).map(Payload::Pixels)
}

fn stream_data(stream: &Stream, filters: &[String]) -> Result<Vec<u8>> {
    if filters.is_empty() {
        return Ok(stream.content.clone());
    }
    stream
        .decompressed_content()
        .map_err(|err| BildwerkError::PdfError(format!("cannot decompress image stream: {}", err)))
}

/// Colour spaces a raw image stream can be rebuilt from.
#[derive(Debug, Clone, PartialEq)]
enum ColorSpace {
    Gray,
    Rgb,
    Cmyk,
    Indexed { base: Box<ColorSpace>, palette: Vec<u8> },
}

impl ColorSpace {
    fn components(&self) -> usize {
        match self {
            ColorSpace::Gray | ColorSpace::Indexed { .. } => 1,
            ColorSpace::Rgb => 3,
            ColorSpace::Cmyk => 4,
        }
    }
}

fn decode_raw_image(document: &Document, dict: &Dictionary, data: &[u8]) -> Result<DynamicImage> {
    let width = positive_int(dict, b"Width")?;
    let height = positive_int(dict, b"Height")?;

    let is_mask = matches!(dict.get(b"ImageMask"), Ok(Object::Boolean(true)));
    let (space, bits) = if is_mask {
        (ColorSpace::Gray, 1)
    } else {
        let space = match dict.get(b"ColorSpace") {
            Ok(obj) => parse_color_space(document, obj, 0)?,
            Err(_) => {
                return Err(BildwerkError::PdfError("image has no /ColorSpace".into()));
            }
        };
        let bits = dict
            .get(b"BitsPerComponent")
            .ok()
            .and_then(|obj| obj.as_i64().ok())
            .unwrap_or(8);
        (space, bits)
    };

    if !matches!(bits, 1 | 2 | 4 | 8 | 16) {
        return Err(BildwerkError::PdfError(format!(
            "unsupported bits per component: {}",
            bits
        )));
    }
    let bits = bits as u32;

    let samples = unpack_samples(data, width, height, space.components(), bits)?;
    let inverted = decode_inverted(dict);
    let max = if bits == 16 { 255 } else { (1u32 << bits) - 1 };
    let scale = |value: u8| -> u8 {
        let scaled = (u32::from(value) * 255 / max) as u8;
        if inverted { 255 - scaled } else { scaled }
    };

    let image = match &space {
        ColorSpace::Gray => {
            let pixels = samples.into_iter().map(scale).collect();
            GrayImage::from_raw(width, height, pixels).map(DynamicImage::ImageLuma8)
        }
        ColorSpace::Rgb => {
            let pixels = samples.into_iter().map(scale).collect();
            RgbImage::from_raw(width, height, pixels).map(DynamicImage::ImageRgb8)
        }
        ColorSpace::Cmyk => {
            let scaled: Vec<u8> = samples.into_iter().map(scale).collect();
            RgbImage::from_raw(width, height, cmyk_to_rgb(&scaled)).map(DynamicImage::ImageRgb8)
        }
        ColorSpace::Indexed { base, palette } => {
            let rgb = expand_palette(&samples, base, palette)?;
            RgbImage::from_raw(width, height, rgb).map(DynamicImage::ImageRgb8)
        }
    };

    image.ok_or_else(|| BildwerkError::PdfError("image buffer size mismatch".into()))
}

/// One byte per sample, rows re-aligned. Sub-byte samples keep their raw
/// value (0..2^bits); 16-bit samples keep their high byte.
fn unpack_samples(data: &[u8], width: u32, height: u32, components: usize, bits: u32) -> Result<Vec<u8>> {
    let overflow = || BildwerkError::PdfError("image dimensions overflow".into());
    let per_row = (width as usize).checked_mul(components).ok_or_else(overflow)?;
    let stride = per_row
        .checked_mul(bits as usize)
        .map(|row_bits| row_bits.div_ceil(8))
        .ok_or_else(overflow)?;
    let needed = stride.checked_mul(height as usize).ok_or_else(overflow)?;
    // Everything allocated below is bounded by the data actually present.
    if data.len() < needed {
        return Err(BildwerkError::PdfError(format!(
            "image data too short: {} bytes, expected {}",
            data.len(),
            needed
        )));
    }

    if bits == 8 {
        return Ok(data[..needed].to_vec());
    }

    let mut samples = Vec::with_capacity(per_row.saturating_mul(height as usize));
    for row in data[..needed].chunks(stride) {
        for index in 0..per_row {
            let value = match bits {
                16 => row[index * 2],
                _ => {
                    let bit_offset = index * bits as usize;
                    let byte = row[bit_offset / 8];
                    let shift = 8 - bits as usize - (bit_offset % 8);
                    (byte >> shift) & ((1u8 << bits) - 1)
                }
            };
            samples.push(value);
        }
    }
    Ok(samples)
}

fn cmyk_to_rgb(cmyk: &[u8]) -> Vec<u8> {
    let mut rgb = Vec::with_capacity(cmyk.len() / 4 * 3);
    for chunk in cmyk.chunks_exact(4) {
        let k = 255 - u32::from(chunk[3]);
        for &channel in &chunk[..3] {
            rgb.push(((255 - u32::from(channel)) * k / 255) as u8);
        }
    }
    rgb
}

fn expand_palette(indices: &[u8], base: &ColorSpace, palette: &[u8]) -> Result<Vec<u8>> {
    let entry_size = base.components();
    let mut rgb = Vec::with_capacity(indices.len() * 3);
    for &index in indices {
        let start = usize::from(index) * entry_size;
        let entry = palette.get(start..start + entry_size).unwrap_or(&[]);
        match (base, entry) {
            (_, []) => rgb.extend_from_slice(&[0, 0, 0]),
            (ColorSpace::Gray, [g]) => rgb.extend_from_slice(&[*g, *g, *g]),
            (ColorSpace::Rgb, [r, g, b]) => rgb.extend_from_slice(&[*r, *g, *b]),
            (ColorSpace::Cmyk, cmyk) => rgb.extend(cmyk_to_rgb(cmyk)),
            _ => {
                return Err(BildwerkError::PdfError(
                    "unsupported base colour space for /Indexed".into(),
                ));
            }
        }
    }
    Ok(rgb)
}

fn parse_color_space(document: &Document, obj: &Object, depth: usize) -> Result<ColorSpace> {
    if depth > 4 {
        return Err(BildwerkError::PdfError("colour space nesting too deep".into()));
    }
    let unsupported = |name: &str| {
        BildwerkError::PdfError(format!("unsupported colour space: {}", name))
    };

    match obj {
        Object::Reference(id) => {
            let target = document
                .get_object(*id)
                .map_err(|err| BildwerkError::PdfError(format!("broken colour space: {}", err)))?;
            parse_color_space(document, target, depth + 1)
        }
        Object::Name(name) => match name.as_slice() {
            b"DeviceGray" | b"CalGray" | b"G" => Ok(ColorSpace::Gray),
            b"DeviceRGB" | b"CalRGB" | b"RGB" => Ok(ColorSpace::Rgb),
            b"DeviceCMYK" | b"CMYK" => Ok(ColorSpace::Cmyk),
            other => Err(unsupported(&String::from_utf8_lossy(other))),
        },
        Object::Array(items) => {
            let family = match items.first() {
                Some(Object::Name(name)) => String::from_utf8_lossy(name).into_owned(),
                _ => return Err(BildwerkError::PdfError("malformed colour space array".into())),
            };
            match family.as_str() {
                "CalGray" => Ok(ColorSpace::Gray),
                "CalRGB" | "Lab" => Ok(ColorSpace::Rgb),
                "ICCBased" => {
                    let components = items
                        .get(1)
                        .and_then(|obj| resolve_stream(document, obj))
                        .and_then(|stream| stream.dict.get(b"N").ok())
                        .and_then(|n| n.as_i64().ok());
                    match components {
                        Some(1) => Ok(ColorSpace::Gray),
                        Some(3) => Ok(ColorSpace::Rgb),
                        Some(4) => Ok(ColorSpace::Cmyk),
                        _ => Err(unsupported("ICCBased with unknown component count")),
                    }
                }
                "Indexed" | "I" => {
                    let base = items
                        .get(1)
                        .ok_or_else(|| unsupported("Indexed without base"))?;
                    let base = parse_color_space(document, base, depth + 1)?;
                    let palette = match items.get(3) {
                        Some(Object::String(bytes, _)) => bytes.clone(),
                        Some(other) => match resolve_stream(document, other) {
                            Some(stream) => {
                                let filters = stream_filters(&stream.dict);
                                stream_data(stream, &filters)?
                            }
                            None => return Err(unsupported("Indexed without lookup table")),
                        },
                        None => return Err(unsupported("Indexed without lookup table")),
                    };
                    Ok(ColorSpace::Indexed {
                        base: Box::new(base),
                        palette,
                    })
                }
                other => Err(unsupported(other)),
            }
        }
        _ => Err(BildwerkError::PdfError("malformed colour space".into())),
    }
}

// -- Dictionary helpers -------------------------------------------------------

fn dictionary_of(document: &Document, id: ObjectId) -> Option<&Dictionary> {
    match document.get_object(id) {
        Ok(Object::Dictionary(dict)) => Some(dict),
        _ => None,
    }
}

fn resolve_dictionary<'a>(document: &'a Document, obj: &'a Object) -> Option<&'a Dictionary> {
    match obj {
        Object::Dictionary(dict) => Some(dict),
        Object::Reference(id) => dictionary_of(document, *id),
        _ => None,
    }
}

fn resolve_stream<'a>(document: &'a Document, obj: &'a Object) -> Option<&'a Stream> {
    match obj {
        Object::Stream(stream) => Some(stream),
        Object::Reference(id) => match document.get_object(*id) {
            Ok(Object::Stream(stream)) => Some(stream),
            _ => None,
        },
        _ => None,
    }
}

fn name_entry(dict: &Dictionary, key: &[u8]) -> Option<String> {
    match dict.get(key) {
        Ok(Object::Name(name)) => Some(String::from_utf8_lossy(name).into_owned()),
        _ => None,
    }
}

/// `/Filter` as a list, whether given as a single name or an array.
fn stream_filters(dict: &Dictionary) -> Vec<String> {
    match dict.get(b"Filter") {
        Ok(Object::Name(name)) => vec![String::from_utf8_lossy(name).into_owned()],
        Ok(Object::Array(items)) => items
            .iter()
            .filter_map(|item| match item {
                Object::Name(name) => Some(String::from_utf8_lossy(name).into_owned()),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    }
}

fn positive_int(dict: &Dictionary, key: &[u8]) -> Result<u32> {
    dict.get(key)
        .ok()
        .and_then(|obj| obj.as_i64().ok())
        .filter(|value| *value > 0 && *value <= i64::from(u32::MAX))
        .map(|value| value as u32)
        .ok_or_else(|| {
            BildwerkError::PdfError(format!(
                "image has no valid /{}",
                String::from_utf8_lossy(key)
            ))
        })
}

/// A `/Decode [1 0 …]` array flips sample values.
fn decode_inverted(dict: &Dictionary) -> bool {
    match dict.get(b"Decode") {
        Ok(Object::Array(items)) => {
            let first = items.first().and_then(|obj| obj.as_float().ok());
            let second = items.get(1).and_then(|obj| obj.as_float().ok());
            matches!((first, second), (Some(a), Some(b)) if a > b)
        }
        _ => false,
    }
}
