// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Human-readable error messages for authors preparing a manuscript.
//
// Every technical error is mapped to plain English with a clear suggestion.
// Severity drives how the caller presents it.

use crate::error::TrimpressError;

/// Severity of an error from the author's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Retrying with the same input may work (e.g. after freeing memory).
    Transient,
    /// The author must change something: the file, the size, or the layout.
    ActionRequired,
    /// A defect in the calling code; retrying will not help.
    Permanent,
}

/// A human-readable error with plain English message and actionable suggestion.
#[derive(Debug, Clone)]
pub struct HumanError {
    /// Plain English summary (shown as a heading).
    pub message: String,
    /// What the author should try (shown as body text).
    pub suggestion: String,
    /// Whether trying again with a new or smaller source makes sense.
    pub retriable: bool,
    pub severity: Severity,
}

/// Convert a `TrimpressError` into a `HumanError`.
pub fn humanize_error(err: &TrimpressError) -> HumanError {
    match err {
        TrimpressError::InvalidGeometry(detail) => HumanError {
            message: "That page size can't be printed.".into(),
            suggestion: format!(
                "Pick one of the standard trim sizes, or a size larger than 1.5 x 1.5 inches. ({detail})"
            ),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        TrimpressError::UnsupportedSource(detail) => HumanError {
            message: "This file type isn't supported.".into(),
            suggestion: format!("Upload a PDF, a Word (.docx) file, a plain text file, or an image. ({detail})"),
            retriable: true,
            severity: Severity::ActionRequired,
        },

        TrimpressError::PdfError(_) => HumanError {
            message: "There's a problem with this PDF file.".into(),
            suggestion: "The file may be damaged. Try exporting it again from the program that made it.".into(),
            retriable: true,
            severity: Severity::ActionRequired,
        },

        TrimpressError::ImageError(_) => HumanError {
            message: "There's a problem with one of the pictures.".into(),
            suggestion: "The picture may be damaged or in an unusual format. Try saving it as a PNG or JPEG.".into(),
            retriable: true,
            severity: Severity::ActionRequired,
        },

        TrimpressError::AlreadyPopulated(_) => HumanError {
            message: "This manuscript is already loaded.".into(),
            suggestion: "Start a new upload to replace it instead of loading it twice.".into(),
            retriable: false,
            severity: Severity::Permanent,
        },

        TrimpressError::IndexOutOfRange { .. } | TrimpressError::NotEditable(_) => HumanError {
            message: "That page can't be changed.".into(),
            suggestion: "Refresh the page list and try the edit again.".into(),
            retriable: false,
            severity: Severity::Permanent,
        },

        TrimpressError::EmptyDocument => HumanError {
            message: "There are no pages to export.".into(),
            suggestion: "Upload a file that contains pictures or text, or undo the deletions.".into(),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        TrimpressError::ResourceExhausted(_) => HumanError {
            message: "This file is too large to process.".into(),
            suggestion: "Try a smaller file, fewer pages at a time, or lower-resolution pictures.".into(),
            retriable: true,
            severity: Severity::Transient,
        },

        TrimpressError::Config(detail) => HumanError {
            message: "The export settings don't make sense.".into(),
            suggestion: format!("Check the settings and try again. ({detail})"),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        TrimpressError::Io(io_err) => match io_err.kind() {
            std::io::ErrorKind::NotFound => HumanError {
                message: "The file couldn't be found.".into(),
                suggestion: "It may have been moved or deleted. Try choosing the file again.".into(),
                retriable: false,
                severity: Severity::ActionRequired,
            },
            std::io::ErrorKind::PermissionDenied => HumanError {
                message: "Trimpress doesn't have permission to use that file.".into(),
                suggestion: "Check the file permissions, or copy the file somewhere else first.".into(),
                retriable: false,
                severity: Severity::ActionRequired,
            },
            _ => HumanError {
                message: "There was a problem reading or writing a file.".into(),
                suggestion: "Try again. If this keeps happening, your disk may be full.".into(),
                retriable: true,
                severity: Severity::Transient,
            },
        },

        TrimpressError::Serialization(_) => HumanError {
            message: "The settings file couldn't be read.".into(),
            suggestion: "Check that the settings file is valid JSON.".into(),
            retriable: false,
            severity: Severity::ActionRequired,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resource_exhaustion_is_transient() {
        let human = humanize_error(&TrimpressError::ResourceExhausted("page 3".into()));
        assert_eq!(human.severity, Severity::Transient);
        assert!(human.retriable);
    }

    #[test]
    fn empty_document_needs_action() {
        let human = humanize_error(&TrimpressError::EmptyDocument);
        assert_eq!(human.severity, Severity::ActionRequired);
        assert!(!human.retriable);
    }

    #[test]
    fn layout_misuse_is_permanent() {
        let human = humanize_error(&TrimpressError::IndexOutOfRange { index: 9, len: 2 });
        assert_eq!(human.severity, Severity::Permanent);
        let human = humanize_error(&TrimpressError::AlreadyPopulated(4));
        assert_eq!(human.severity, Severity::Permanent);
    }

    #[test]
    fn missing_file_needs_action() {
        let err = TrimpressError::Io(std::io::Error::from(std::io::ErrorKind::NotFound));
        let human = humanize_error(&err);
        assert_eq!(human.severity, Severity::ActionRequired);
        assert!(human.message.contains("couldn't be found"));
    }
}
