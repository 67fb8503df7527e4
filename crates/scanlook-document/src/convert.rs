// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Word document conversion.
//
// Word files have no pages of their own. They are converted to one A4 page
// image, which then goes through the normal page pipeline.

use std::io::{Cursor, Read};

use image::RgbImage;
use quick_xml::Reader;
use quick_xml::events::Event;
use scanlook_core::error::{Result, ScanlookError};
use tracing::{debug, instrument, warn};

use crate::image::typeset::PageTypesetter;

/// Main body part of a WordprocessingML package.
const DOCUMENT_PART: &str = "word/document.xml";

/// Renders a Word document as a single A4 page image.
pub trait DocxConverter: Send + Sync {
    fn to_page_image(&self, docx: &[u8]) -> Result<RgbImage>;
}

/// Extracts the paragraph text of a `.docx` package and typesets it onto one
/// A4 page at 96 dpi. Formatting, tables, and images are dropped, and so is
/// text that runs past the end of the page.
#[derive(Debug, Default, Clone, Copy)]
pub struct TextFlowConverter {
    typesetter: PageTypesetter,
}

impl TextFlowConverter {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DocxConverter for TextFlowConverter {
    #[instrument(skip_all, fields(docx_len = docx.len()))]
    fn to_page_image(&self, docx: &[u8]) -> Result<RgbImage> {
        let xml = read_document_part(docx)?;
        let text = extract_paragraphs(&xml)?.join("\n");
        debug!(chars = text.len(), "Extracted Word document text");

        let (page, overflow) = self.typesetter.render(&text);
        if overflow > 0 {
            warn!(lines = overflow, "Word text does not fit on one page; truncated");
        }
        Ok(page)
    }
}

fn read_document_part(docx: &[u8]) -> Result<String> {
    let mut archive = zip::ZipArchive::new(Cursor::new(docx)).map_err(|err| {
        ScanlookError::InvalidDocument(format!("not a Word package: {}", err))
    })?;

    let mut part = archive.by_name(DOCUMENT_PART).map_err(|err| {
        ScanlookError::InvalidDocument(format!("missing {}: {}", DOCUMENT_PART, err))
    })?;

    let mut xml = String::new();
    part.read_to_string(&mut xml)?;
    Ok(xml)
}

/// Text of each `<w:p>` paragraph, in document order. Runs are concatenated;
/// `<w:tab/>` and `<w:br/>` become a tab and a line break.
fn extract_paragraphs(xml: &str) -> Result<Vec<String>> {
    let mut reader = Reader::from_str(xml);

    let mut paragraphs = Vec::new();
    let mut current = String::new();
    let mut in_paragraph = false;
    let mut in_text = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => match e.local_name().as_ref() {
                b"p" => {
                    in_paragraph = true;
                    current.clear();
                }
                b"t" => in_text = true,
                _ => {}
            },
            Ok(Event::Empty(e)) => match e.local_name().as_ref() {
                b"tab" if in_paragraph => current.push('\t'),
                b"br" if in_paragraph => current.push('\n'),
                b"p" => paragraphs.push(String::new()),
                _ => {}
            },
            Ok(Event::Text(e)) => {
                if in_text {
                    let text = e.unescape().map_err(|err| {
                        ScanlookError::InvalidDocument(format!("bad text in {}: {}", DOCUMENT_PART, err))
                    })?;
                    current.push_str(&text);
                }
            }
            Ok(Event::End(e)) => match e.local_name().as_ref() {
                b"t" => in_text = false,
                b"p" => {
                    in_paragraph = false;
                    paragraphs.push(std::mem::take(&mut current));
                }
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(err) => {
                return Err(ScanlookError::InvalidDocument(format!(
                    "malformed {} at byte {}: {}",
                    DOCUMENT_PART,
                    reader.buffer_position(),
                    err
                )));
            }
            _ => {}
        }
    }

    Ok(paragraphs)
}

/// Builds minimal `.docx` packages for tests.
#[cfg(any(test, feature = "fixtures"))]
pub fn docx_package(paragraphs: &[&str]) -> Vec<u8> {
    use std::io::Write;
    use zip::write::SimpleFileOptions;

    let body: String = paragraphs
        .iter()
        .map(|p| format!("<w:p><w:r><w:t>{}</w:t></w:r></w:p>", p))
        .collect();
    let xml = format!(
        concat!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
            r#"<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">"#,
            "<w:body>{}</w:body></w:document>"
        ),
        body
    );

    let mut buffer = Cursor::new(Vec::new());
    let mut writer = zip::ZipWriter::new(&mut buffer);
    writer
        .start_file(DOCUMENT_PART, SimpleFileOptions::default())
        .expect("start docx part");
    writer.write_all(xml.as_bytes()).expect("write docx part");
    writer.finish().expect("finish docx package");
    buffer.into_inner()
}
