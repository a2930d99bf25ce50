//! Loading and saving documents in the formats the terminal host opens.
//!
//! HTML is the editor's own format and passes through untouched. FTML and
//! Markdown go through `tdoc` and come out as HTML fragments.

use std::fmt;
use std::io::Cursor;
use std::path::Path;

use tdoc::markdown;
use tdoc::writer::Writer;
use thiserror::Error;

use crate::html;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DocumentFormat {
    Html,
    Ftml,
    Markdown,
}

impl DocumentFormat {
    pub fn from_path(path: &Path) -> Self {
        let ext = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase());
        match ext.as_deref() {
            Some("md") | Some("markdown") | Some("mkd") | Some("mdown") | Some("mdtxt") => {
                DocumentFormat::Markdown
            }
            Some("ftml") => DocumentFormat::Ftml,
            _ => DocumentFormat::Html,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            DocumentFormat::Html => "HTML",
            DocumentFormat::Ftml => "FTML",
            DocumentFormat::Markdown => "Markdown",
        }
    }
}

impl fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("failed to parse {format}: {message}")]
    Parse {
        format: DocumentFormat,
        message: String,
    },
    #[error("failed to render {format}: {message}")]
    Render {
        format: DocumentFormat,
        message: String,
    },
}

fn parse_error(format: DocumentFormat, err: impl ToString) -> ImportError {
    ImportError::Parse {
        format,
        message: err.to_string(),
    }
}

fn render_error(format: DocumentFormat, err: impl ToString) -> ImportError {
    ImportError::Render {
        format,
        message: err.to_string(),
    }
}

/// Drops any `<html>`/`<body>` scaffolding so only the fragment remains.
fn fragment(document: &str) -> String {
    html::serialize(&html::extract_body(html::parse(document)))
}

fn to_html(document: &tdoc::Document, format: DocumentFormat) -> Result<String, ImportError> {
    let rendered = Writer::new()
        .write_to_string(document)
        .map_err(|err| render_error(format, err))?;
    Ok(fragment(&rendered))
}

/// Converts file `content` in `format` into the HTML the editor works on.
pub fn import(content: &str, format: DocumentFormat) -> Result<String, ImportError> {
    match format {
        DocumentFormat::Html => Ok(content.to_string()),
        DocumentFormat::Ftml => {
            let document = tdoc::parse(Cursor::new(content.to_string()))
                .map_err(|err| parse_error(format, err))?;
            to_html(&document, format)
        }
        DocumentFormat::Markdown => {
            let document = markdown::parse(Cursor::new(content.to_string()))
                .map_err(|err| parse_error(format, err))?;
            to_html(&document, format)
        }
    }
}

/// Converts editor HTML back into `format` for saving.
pub fn export(content: &str, format: DocumentFormat) -> Result<String, ImportError> {
    if format == DocumentFormat::Html {
        return Ok(content.to_string());
    }
    let document = tdoc::parse(Cursor::new(content.to_string()))
        .map_err(|err| parse_error(DocumentFormat::Html, err))?;
    match format {
        DocumentFormat::Markdown => {
            let mut out = Vec::new();
            markdown::write(&mut out, &document).map_err(|err| render_error(format, err))?;
            String::from_utf8(out).map_err(|err| render_error(format, err))
        }
        _ => Writer::new()
            .write_to_string(&document)
            .map_err(|err| render_error(format, err)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sync::strip_tags;

    #[test]
    fn formats_follow_the_extension() {
        assert_eq!(DocumentFormat::from_path(Path::new("a.MD")), DocumentFormat::Markdown);
        assert_eq!(DocumentFormat::from_path(Path::new("a.ftml")), DocumentFormat::Ftml);
        assert_eq!(DocumentFormat::from_path(Path::new("a.html")), DocumentFormat::Html);
        assert_eq!(DocumentFormat::from_path(Path::new("page")), DocumentFormat::Html);
    }

    #[test]
    fn html_passes_through_untouched() {
        let content = "<p>Hello <b>World</b>";
        assert_eq!(import(content, DocumentFormat::Html).expect("import"), content);
        assert_eq!(export(content, DocumentFormat::Html).expect("export"), content);
    }

    #[test]
    fn markdown_imports_as_html() {
        let imported = import("# Title\n\nSome text.\n", DocumentFormat::Markdown).expect("import");
        let text = strip_tags(&imported);
        assert!(text.contains("Title"), "{imported}");
        assert!(text.contains("Some text."), "{imported}");
        assert!(!imported.contains("<body"));
    }

    #[test]
    fn html_exports_to_markdown() {
        let exported = export("<h1>Title</h1><p>Body</p>", DocumentFormat::Markdown).expect("export");
        assert!(exported.contains("Title"));
        assert!(exported.contains("Body"));
    }

    #[test]
    fn errors_name_the_format() {
        let err = parse_error(DocumentFormat::Markdown, "bad input");
        assert_eq!(err.to_string(), "failed to parse Markdown: bad input");
    }
}
