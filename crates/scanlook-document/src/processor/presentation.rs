// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PowerPoint handler. Claims presentation types so they are not reported as
// unknown, but cannot render them yet.

use scanlook_core::error::{Result, ScanlookError};
use scanlook_core::types::{InputDocument, RenderedPage, mime};

use super::DocumentProcessor;

#[derive(Debug, Default, Clone, Copy)]
pub struct PresentationProcessor;

impl DocumentProcessor for PresentationProcessor {
    fn name(&self) -> &'static str {
        "presentation"
    }

    fn can_handle(&self, document: &InputDocument) -> bool {
        document.mime_type == mime::PPTX || document.mime_type == mime::PPT
    }

    fn page_count(&self, _document: &InputDocument) -> Result<u32> {
        Ok(1)
    }

    fn render_page(&self, document: &InputDocument, _page: u32, _scale: f32) -> Result<RenderedPage> {
        Err(ScanlookError::NotImplemented(format!(
            "presentation rendering ({})",
            document.name
        )))
    }
}
