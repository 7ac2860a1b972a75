//! PDF publication summary.
//!
//! A4 pages with the built-in Helvetica faces: a bold heading, the wrapped
//! description and one line per date and status.

use printpdf::{
    BuiltinFont, IndirectFontRef, Mm, PdfDocument, PdfDocumentReference, PdfLayerReference,
};

use crate::artifacts::{Artifact, ArtifactExporter, file_stem};
use crate::error::{AppError, Result};
use crate::pipeline::IndexedPublication;

const PAGE_WIDTH: f32 = 210.0;
const PAGE_HEIGHT: f32 = 297.0;
const MARGIN: f32 = 10.0;
const LINE_HEIGHT: f32 = 10.0;
const HEADING_SIZE: f32 = 16.0;
const BODY_SIZE: f32 = 12.0;

/// Characters per line at body size across the printable width.
const WRAP_COLUMNS: usize = 85;

const LAYER: &str = "Capa 1";

/// Builds `Publicacion_<id>.pdf`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SummaryExporter;

impl ArtifactExporter for SummaryExporter {
    fn export(&self, entry: &IndexedPublication) -> Result<Artifact> {
        let record = &entry.record;
        let mut pdf = PdfWriter::new(&format!("Publicación #{}", record.id))?;

        pdf.line(&format!("Publicación #{}", record.id), true);
        pdf.line("Descripción:", false);
        for line in wrap(&record.description, WRAP_COLUMNS) {
            pdf.line(&line, false);
        }
        pdf.gap(LINE_HEIGHT / 2.0);
        pdf.line(&format!("Publicado: {}", record.published_at), false);
        pdf.line(&format!("Vence: {}", record.expires_at), false);
        pdf.line(&format!("Estado: {}", record.status), false);

        Ok(Artifact {
            filename: format!("Publicacion_{}.pdf", file_stem(entry.id())),
            content_type: "application/pdf",
            bytes: pdf.finish()?,
        })
    }
}

/// Top-to-bottom line writer that starts a new page when it runs out of room.
struct PdfWriter {
    doc: PdfDocumentReference,
    layer: PdfLayerReference,
    regular: IndirectFontRef,
    bold: IndirectFontRef,
    y: f32,
}

impl PdfWriter {
    fn new(title: &str) -> Result<Self> {
        let (doc, page, layer) = PdfDocument::new(title, Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), LAYER);
        let regular = doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(pdf_error)?;
        let bold = doc
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(pdf_error)?;
        let layer = doc.get_page(page).get_layer(layer);

        Ok(Self {
            doc,
            layer,
            regular,
            bold,
            y: PAGE_HEIGHT - MARGIN - LINE_HEIGHT,
        })
    }

    fn line(&mut self, text: &str, heading: bool) {
        if self.y < MARGIN {
            let (page, layer) = self.doc.add_page(Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), LAYER);
            self.layer = self.doc.get_page(page).get_layer(layer);
            self.y = PAGE_HEIGHT - MARGIN - LINE_HEIGHT;
        }

        let (font, size) = if heading {
            (&self.bold, HEADING_SIZE)
        } else {
            (&self.regular, BODY_SIZE)
        };
        self.layer.use_text(text, size, Mm(MARGIN), Mm(self.y), font);
        self.y -= LINE_HEIGHT;
    }

    fn gap(&mut self, height: f32) {
        self.y -= height;
    }

    fn finish(self) -> Result<Vec<u8>> {
        self.doc.save_to_bytes().map_err(pdf_error)
    }
}

fn pdf_error(e: impl std::fmt::Debug) -> AppError {
    AppError::Pdf(format!("{e:?}"))
}

/// Greedy word wrap on character count. Words longer than a line are split.
fn wrap(text: &str, columns: usize) -> Vec<String> {
    let mut lines = Vec::new();

    for paragraph in text.lines() {
        let mut current = String::new();
        let mut width = 0;

        for word in paragraph.split_whitespace() {
            let mut word: Vec<char> = word.chars().collect();
            while word.len() > columns {
                if width > 0 {
                    lines.push(std::mem::take(&mut current));
                    width = 0;
                }
                lines.push(word.drain(..columns).collect());
            }

            let len = word.len();
            if len == 0 {
                continue;
            }
            if width > 0 && width + 1 + len > columns {
                lines.push(std::mem::take(&mut current));
                width = 0;
            }
            if width > 0 {
                current.push(' ');
                width += 1;
            }
            current.extend(word);
            width += len;
        }

        lines.push(current);
    }

    lines
}
