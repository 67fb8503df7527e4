// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF reader — open input PDFs, count pages, read page geometry, and pull the
// raster images a page draws, using the `lopdf` crate.

use image::{DynamicImage, GrayImage, ImageFormat, RgbImage};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};
use scanlook_core::error::ScanlookError;
use tracing::{debug, instrument, warn};

/// Depth limit when walking `/Parent` links for inherited page attributes.
const MAX_PAGE_TREE_DEPTH: usize = 32;

/// Reads existing PDF files.
///
/// Wraps `lopdf::Document` and answers the questions the page pipeline asks:
/// how many pages, how large is a page, and which images does it draw.
pub struct PdfReader {
    /// The underlying lopdf document.
    document: Document,
}

impl PdfReader {
    // -- Construction ---------------------------------------------------------

    /// Create a reader from raw PDF bytes already in memory.
    #[instrument(skip_all, fields(bytes_len = data.len()))]
    pub fn from_bytes(data: &[u8]) -> Result<Self, ScanlookError> {
        let document = Document::load_mem(data).map_err(|err| {
            ScanlookError::InvalidDocument(format!("failed to load PDF from memory: {}", err))
        })?;

        debug!(pages = document.get_pages().len(), "PDF loaded from bytes");

        Ok(Self { document })
    }

    // -- Inspection -----------------------------------------------------------

    /// Number of pages in the document.
    pub fn page_count(&self) -> usize {
        self.document.get_pages().len()
    }

    /// Page size in PDF points (width, height) from the page's `/MediaBox`,
    /// following inheritance up the page tree. `None` when no usable box exists.
    pub fn page_size_pt(&self, page_number: u32) -> Result<Option<(f32, f32)>, ScanlookError> {
        let page = self.page_dictionary(page_number)?;
        let media_box = match self.inherited(page, b"MediaBox") {
            Some(Object::Array(values)) if values.len() == 4 => values,
            _ => return Ok(None),
        };

        let coords: Vec<f32> = media_box
            .iter()
            .filter_map(|value| number(self.resolve(value)?))
            .collect();
        if coords.len() != 4 {
            return Ok(None);
        }

        let width = (coords[2] - coords[0]).abs();
        let height = (coords[3] - coords[1]).abs();
        if width <= 0.0 || height <= 0.0 {
            return Ok(None);
        }
        Ok(Some((width, height)))
    }

    // -- Extraction -----------------------------------------------------------

    /// Decode the largest image XObject drawn by a page (1-indexed).
    ///
    /// Supports JPEG (`/DCTDecode`) streams and 8-bit gray or RGB samples that
    /// are uncompressed or `/FlateDecode`d. Returns `Ok(None)` when the page has
    /// no image resources at all.
    #[instrument(skip(self), fields(page_number))]
    pub fn largest_image(&self, page_number: u32) -> Result<Option<DynamicImage>, ScanlookError> {
        let page = self.page_dictionary(page_number)?;

        let xobjects = self
            .inherited(page, b"Resources")
            .and_then(|resources| as_dictionary(resources))
            .and_then(|resources| resources.get(b"XObject").ok())
            .and_then(|xobjects| self.resolve(xobjects))
            .and_then(as_dictionary);

        let Some(xobjects) = xobjects else {
            return Ok(None);
        };

        let largest = xobjects
            .iter()
            .filter_map(|(_, value)| match self.resolve(value)? {
                Object::Stream(stream) if is_image(stream) => Some(stream),
                _ => None,
            })
            .max_by_key(|stream| {
                let width = dimension(stream, b"Width").unwrap_or(0) as u64;
                let height = dimension(stream, b"Height").unwrap_or(0) as u64;
                width * height
            });

        match largest {
            Some(stream) => self.decode_image(stream, page_number).map(Some),
            None => Ok(None),
        }
    }

    // -- Helpers --------------------------------------------------------------

    fn page_id(&self, page_number: u32) -> Result<ObjectId, ScanlookError> {
        let pages = self.document.get_pages();
        // lopdf pages are keyed by 1-indexed page number.
        pages.get(&page_number).copied().ok_or_else(|| ScanlookError::PageRender {
            page: page_number,
            reason: format!("page out of range (document has {} pages)", pages.len()),
        })
    }

    fn page_dictionary(&self, page_number: u32) -> Result<&Dictionary, ScanlookError> {
        let page_id = self.page_id(page_number)?;
        match self.document.get_object(page_id) {
            Ok(Object::Dictionary(dict)) => Ok(dict),
            Ok(_) => Err(ScanlookError::PageRender {
                page: page_number,
                reason: "page object is not a dictionary".into(),
            }),
            Err(err) => Err(ScanlookError::PageRender {
                page: page_number,
                reason: format!("cannot read page object {:?}: {}", page_id, err),
            }),
        }
    }

    /// Follow a reference to its object; direct objects are returned as-is.
    fn resolve<'a>(&'a self, object: &'a Object) -> Option<&'a Object> {
        match object {
            Object::Reference(id) => match self.document.get_object(*id) {
                Ok(target) => Some(target),
                Err(err) => {
                    warn!(?id, %err, "Cannot resolve reference");
                    None
                }
            },
            other => Some(other),
        }
    }

    /// Look up an inheritable page attribute, walking `/Parent` links.
    fn inherited<'a>(&'a self, page: &'a Dictionary, key: &[u8]) -> Option<&'a Object> {
        let mut node = page;
        for _ in 0..MAX_PAGE_TREE_DEPTH {
            if let Ok(value) = node.get(key) {
                return self.resolve(value);
            }
            node = match node.get(b"Parent").ok().and_then(|parent| self.resolve(parent)) {
                Some(Object::Dictionary(parent)) => parent,
                _ => return None,
            };
        }
        None
    }

    fn decode_image(&self, stream: &Stream, page_number: u32) -> Result<DynamicImage, ScanlookError> {
        let fail = |reason: String| ScanlookError::PageRender {
            page: page_number,
            reason,
        };

        let filters = self.filters(stream);
        let width = dimension(stream, b"Width").ok_or_else(|| fail("image has no /Width".into()))?;
        let height =
            dimension(stream, b"Height").ok_or_else(|| fail("image has no /Height".into()))?;

        match filters.as_slice() {
            [filter] if filter == b"DCTDecode" => {
                image::load_from_memory_with_format(&stream.content, ImageFormat::Jpeg)
                    .map_err(|err| fail(format!("embedded JPEG is unreadable: {}", err)))
            }
            [] | [_] => {
                let samples = match filters.first() {
                    None => stream.content.clone(),
                    Some(filter) if filter == b"FlateDecode" => {
                        stream.decompressed_content().map_err(|err| {
                            fail(format!("cannot inflate image stream: {}", err))
                        })?
                    }
                    Some(other) => {
                        return Err(fail(format!(
                            "unsupported image filter /{}",
                            String::from_utf8_lossy(other)
                        )));
                    }
                };

                let bits = dimension(stream, b"BitsPerComponent").unwrap_or(8);
                if bits != 8 {
                    return Err(fail(format!("unsupported bits per component: {}", bits)));
                }
                self.raw_samples_to_image(stream, samples, width, height)
                    .ok_or_else(|| fail("image samples do not match colour space".into()))
            }
            _ => Err(fail("chained image filters are not supported".into())),
        }
    }

    fn raw_samples_to_image(
        &self,
        stream: &Stream,
        mut samples: Vec<u8>,
        width: u32,
        height: u32,
    ) -> Option<DynamicImage> {
        let components = self.colour_components(stream)?;
        let expected = width as usize * height as usize * components;
        if samples.len() < expected {
            return None;
        }
        samples.truncate(expected);

        match components {
            1 => GrayImage::from_raw(width, height, samples).map(DynamicImage::ImageLuma8),
            3 => RgbImage::from_raw(width, height, samples).map(DynamicImage::ImageRgb8),
            _ => None,
        }
    }

    /// Component count for `/DeviceGray`, `/DeviceRGB`, or `[/ICCBased <</N n>>]`.
    fn colour_components(&self, stream: &Stream) -> Option<usize> {
        match self.resolve(stream.dict.get(b"ColorSpace").ok()?)? {
            Object::Name(name) if name == b"DeviceGray" => Some(1),
            Object::Name(name) if name == b"DeviceRGB" => Some(3),
            Object::Array(items) => match (items.first(), items.get(1)) {
                (Some(Object::Name(kind)), Some(profile)) if kind == b"ICCBased" => {
                    match self.resolve(profile)? {
                        Object::Stream(icc) => icc
                            .dict
                            .get(b"N")
                            .ok()
                            .and_then(number)
                            .map(|n| n as usize),
                        _ => None,
                    }
                }
                _ => None,
            },
            _ => None,
        }
    }

    fn filters(&self, stream: &Stream) -> Vec<Vec<u8>> {
        match stream.dict.get(b"Filter").ok().and_then(|f| self.resolve(f)) {
            Some(Object::Name(name)) => vec![name.clone()],
            Some(Object::Array(items)) => items
                .iter()
                .filter_map(|item| match item {
                    Object::Name(name) => Some(name.clone()),
                    _ => None,
                })
                .collect(),
            _ => Vec::new(),
        }
    }
}

fn as_dictionary(object: &Object) -> Option<&Dictionary> {
    match object {
        Object::Dictionary(dict) => Some(dict),
        _ => None,
    }
}

fn is_image(stream: &Stream) -> bool {
    matches!(stream.dict.get(b"Subtype"), Ok(Object::Name(name)) if name == b"Image")
}

fn number(object: &Object) -> Option<f32> {
    match object {
        Object::Integer(value) => Some(*value as f32),
        Object::Real(value) => Some(*value as f32),
        _ => None,
    }
}

fn dimension(stream: &Stream, key: &[u8]) -> Option<u32> {
    match stream.dict.get(key) {
        Ok(Object::Integer(value)) if *value > 0 => u32::try_from(*value).ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{FixturePage, image_pdf};

    #[test]
    fn counts_pages() {
        let pdf = image_pdf(&[FixturePage::gray(10, 10, 100.0, 100.0); 3]);
        let reader = PdfReader::from_bytes(&pdf).unwrap();
        assert_eq!(reader.page_count(), 3);
    }

    #[test]
    fn garbage_is_an_invalid_document() {
        let err = PdfReader::from_bytes(b"definitely not a pdf").err().unwrap();
        assert!(matches!(err, ScanlookError::InvalidDocument(_)));
    }

    #[test]
    fn reads_media_box() {
        let pdf = image_pdf(&[FixturePage::rgb(8, 4, 200.0, 100.0)]);
        let reader = PdfReader::from_bytes(&pdf).unwrap();
        assert_eq!(reader.page_size_pt(1).unwrap(), Some((200.0, 100.0)));
    }

    #[test]
    fn extracts_raw_rgb_image() {
        let pdf = image_pdf(&[FixturePage::rgb(8, 4, 200.0, 100.0)]);
        let reader = PdfReader::from_bytes(&pdf).unwrap();
        let image = reader.largest_image(1).unwrap().expect("page draws an image");
        assert_eq!((image.width(), image.height()), (8, 4));
        assert!(matches!(image, DynamicImage::ImageRgb8(_)));
    }

    #[test]
    fn page_without_images_yields_none() {
        let pdf = image_pdf(&[FixturePage::blank(100.0, 100.0)]);
        let reader = PdfReader::from_bytes(&pdf).unwrap();
        assert!(reader.largest_image(1).unwrap().is_none());
    }

    #[test]
    fn out_of_range_page_is_a_render_error() {
        let pdf = image_pdf(&[FixturePage::gray(4, 4, 50.0, 50.0)]);
        let reader = PdfReader::from_bytes(&pdf).unwrap();
        let err = reader.largest_image(2).err().unwrap();
        assert!(matches!(err, ScanlookError::PageRender { page: 2, .. }));
    }
}
