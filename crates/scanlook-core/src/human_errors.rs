// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Human-readable error messages.
//
// Every technical error is mapped to plain English with a clear suggestion,
// so a front end can explain why a document is missing from the output.

use crate::error::ScanlookError;

/// Who can fix the problem.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// The file itself needs to change (convert it, re-export it).
    FileProblem,
    /// The feature is not there yet; nothing the user can do.
    Unsupported,
    /// Settings or environment need attention.
    SetupProblem,
}

impl Severity {
    /// Short label for console output.
    pub fn label(&self) -> &'static str {
        match self {
            Severity::FileProblem => "file problem",
            Severity::Unsupported => "unsupported",
            Severity::SetupProblem => "setup problem",
        }
    }
}

/// A human-readable error with plain English message and actionable suggestion.
#[derive(Debug, Clone)]
pub struct HumanError {
    /// Plain English summary (shown as a heading).
    pub message: String,
    /// What the user should try (shown as body text).
    pub suggestion: String,
    pub severity: Severity,
}

/// Convert a `ScanlookError` into a `HumanError`.
pub fn humanize_error(err: &ScanlookError) -> HumanError {
    match err {
        ScanlookError::UnsupportedFormat { mime_type, .. } => HumanError {
            message: "This type of document isn't supported.".into(),
            suggestion: format!(
                "Save or export it as a PDF or Word (.docx) document and try again. (File type: {mime_type})"
            ),
            severity: Severity::Unsupported,
        },

        ScanlookError::NotImplemented(_) => HumanError {
            message: "This document type can't be scanned yet.".into(),
            suggestion: "Export the presentation to PDF first, then scan the PDF.".into(),
            severity: Severity::Unsupported,
        },

        ScanlookError::InvalidDocument(_) => HumanError {
            message: "This document couldn't be opened.".into(),
            suggestion: "The file may be damaged or password protected. Open it on a computer and save a fresh copy.".into(),
            severity: Severity::FileProblem,
        },

        ScanlookError::PageRender { page, .. } => HumanError {
            message: format!("Page {page} of this document couldn't be read."),
            suggestion: "Only PDF pages that carry a page image (scans, photos) can be drawn. Print the document to an image PDF, or save it as a Word document, and try again.".into(),
            severity: Severity::FileProblem,
        },

        ScanlookError::EffectComputation(_) => HumanError {
            message: "The scan effect couldn't be applied.".into(),
            suggestion: "Try lowering the resolution or blur settings and run the batch again.".into(),
            severity: Severity::SetupProblem,
        },

        ScanlookError::ImageDecode { page, .. } => HumanError {
            message: format!("The scanned image for page {page} was unreadable."),
            suggestion: "Run the batch again; if it keeps happening, switch to the fast effect engine.".into(),
            severity: Severity::SetupProblem,
        },

        ScanlookError::Assembly(_) => HumanError {
            message: "The output PDF couldn't be built.".into(),
            suggestion: "Check that the document has at least one page.".into(),
            severity: Severity::FileProblem,
        },

        ScanlookError::InvalidConfig(detail) => HumanError {
            message: "Some settings are out of range.".into(),
            suggestion: format!("Fix the settings and try again. ({detail})"),
            severity: Severity::SetupProblem,
        },

        ScanlookError::Io(_) => HumanError {
            message: "A file couldn't be read or written.".into(),
            suggestion: "Check the file still exists and that the output folder is writable.".into(),
            severity: Severity::SetupProblem,
        },

        ScanlookError::Serialization(_) => HumanError {
            message: "The settings file couldn't be read.".into(),
            suggestion: "Check the settings file is valid JSON.".into(),
            severity: Severity::SetupProblem,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_implemented_is_unsupported() {
        let human = humanize_error(&ScanlookError::NotImplemented("pptx".into()));
        assert_eq!(human.severity, Severity::Unsupported);
    }

    #[test]
    fn unsupported_format_names_the_file_type() {
        let human = humanize_error(&ScanlookError::UnsupportedFormat {
            name: "notes.txt".into(),
            mime_type: "text/plain".into(),
        });
        assert!(human.suggestion.contains("text/plain"));
        assert!(human.suggestion.contains("Word (.docx)"));
        assert_eq!(human.severity.label(), "unsupported");
    }

    #[test]
    fn page_render_mentions_page() {
        let human = humanize_error(&ScanlookError::PageRender {
            page: 4,
            reason: "bad stream".into(),
        });
        assert!(human.message.contains('4'));
        assert!(human.suggestion.contains("image PDF"));
        assert_eq!(human.severity, Severity::FileProblem);
    }
}
