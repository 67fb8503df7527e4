// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Small in-memory PDFs for tests: each page optionally draws one uncompressed
// raster image stretched over its media box.

use lopdf::{Dictionary, Document, Object, Stream};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Samples {
    Gray,
    Rgb,
}

/// One page of a fixture PDF.
#[derive(Debug, Clone, Copy)]
pub struct FixturePage {
    image: Option<(u32, u32, Samples)>,
    media_pt: (u32, u32),
}

impl FixturePage {
    /// Page of `media_w` x `media_h` points drawing a `width` x `height` RGB image.
    pub fn rgb(width: u32, height: u32, media_w: f32, media_h: f32) -> Self {
        Self::with_image(width, height, Samples::Rgb, media_w, media_h)
    }

    /// Page drawing a `/DeviceGray` image.
    pub fn gray(width: u32, height: u32, media_w: f32, media_h: f32) -> Self {
        Self::with_image(width, height, Samples::Gray, media_w, media_h)
    }

    /// Page with no image resources.
    pub fn blank(media_w: f32, media_h: f32) -> Self {
        Self {
            image: None,
            media_pt: (media_w.round() as u32, media_h.round() as u32),
        }
    }

    fn with_image(width: u32, height: u32, samples: Samples, media_w: f32, media_h: f32) -> Self {
        Self {
            image: Some((width, height, samples)),
            media_pt: (media_w.round() as u32, media_h.round() as u32),
        }
    }
}

/// Build a PDF with one page per entry, in order.
pub fn image_pdf(pages: &[FixturePage]) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let mut kids = Vec::with_capacity(pages.len());

    for page in pages {
        let (media_w, media_h) = page.media_pt;
        let mut resources = Dictionary::new();
        let mut content = Vec::new();

        if let Some((width, height, samples)) = page.image {
            let mut dict = Dictionary::new();
            dict.set("Type", Object::Name(b"XObject".to_vec()));
            dict.set("Subtype", Object::Name(b"Image".to_vec()));
            dict.set("Width", Object::Integer(width as i64));
            dict.set("Height", Object::Integer(height as i64));
            dict.set("BitsPerComponent", Object::Integer(8));
            let colour_space: &[u8] = match samples {
                Samples::Gray => b"DeviceGray",
                Samples::Rgb => b"DeviceRGB",
            };
            dict.set("ColorSpace", Object::Name(colour_space.to_vec()));

            let image_id = doc.add_object(Stream::new(dict, gradient(width, height, samples)));
            let mut xobjects = Dictionary::new();
            xobjects.set("Im0", Object::Reference(image_id));
            resources.set("XObject", Object::Dictionary(xobjects));

            content = format!("q {} 0 0 {} 0 0 cm /Im0 Do Q", media_w, media_h).into_bytes();
        }

        let content_id = doc.add_object(Stream::new(Dictionary::new(), content));

        let mut page_dict = Dictionary::new();
        page_dict.set("Type", Object::Name(b"Page".to_vec()));
        page_dict.set("Parent", Object::Reference(pages_id));
        page_dict.set(
            "MediaBox",
            Object::Array(vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::Integer(media_w as i64),
                Object::Integer(media_h as i64),
            ]),
        );
        page_dict.set("Resources", Object::Dictionary(resources));
        page_dict.set("Contents", Object::Reference(content_id));
        kids.push(Object::Reference(doc.add_object(page_dict)));
    }

    let mut pages_dict = Dictionary::new();
    pages_dict.set("Type", Object::Name(b"Pages".to_vec()));
    pages_dict.set("Count", Object::Integer(kids.len() as i64));
    pages_dict.set("Kids", Object::Array(kids));
    doc.objects.insert(pages_id, Object::Dictionary(pages_dict));

    let mut catalog = Dictionary::new();
    catalog.set("Type", Object::Name(b"Catalog".to_vec()));
    catalog.set("Pages", Object::Reference(pages_id));
    let catalog_id = doc.add_object(catalog);
    doc.trailer.set("Root", Object::Reference(catalog_id));

    let mut out = Vec::new();
    doc.save_to(&mut out).expect("fixture PDF serialises");
    out
}

/// Diagonal gradient so every page has some structure for the effect to act on.
fn gradient(width: u32, height: u32, samples: Samples) -> Vec<u8> {
    let mut data = Vec::new();
    for y in 0..height {
        for x in 0..width {
            let r = (x * 255 / width.max(1)) as u8;
            let g = (y * 255 / height.max(1)) as u8;
            match samples {
                Samples::Gray => data.push(r / 2 + g / 2),
                Samples::Rgb => data.extend_from_slice(&[r, g, 128]),
            }
        }
    }
    data
}
