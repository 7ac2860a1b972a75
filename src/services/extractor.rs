// src/services/extractor.rs

//! Listing table extraction.
//!
//! Turns the publications table of the listing page into typed records.
//! Column layout is fixed:
//!
//! | # | content                       |
//! |---|-------------------------------|
//! | 0 | id                            |
//! | 1 | description                   |
//! | 2 | cell with the document anchor |
//! | 3 | published date                |
//! | 4 | expiry date                   |
//! | 5 | status                        |

use scraper::{ElementRef, Html, Selector};
use url::Url;

use crate::error::{AppError, Result};
use crate::models::{DocumentLink, PublicationRecord, SourceConfig};
use crate::utils::resolve_url;

/// Minimum number of cells for a row to be considered a publication.
pub const MIN_COLUMNS: usize = 6;

/// Extracts publication records from the listing page.
pub struct TableExtractor {
    table_sel: Selector,
    anchor_sel: Selector,
    table_id: String,
    base_url: Url,
}

impl TableExtractor {
    /// Build an extractor for the configured source.
    pub fn new(source: &SourceConfig) -> Result<Self> {
        let table_selector = format!(r#"table[id="{}"]"#, source.table_id);
        Ok(Self {
            table_sel: parse_selector(&table_selector)?,
            anchor_sel: parse_selector("a[href]")?,
            table_id: source.table_id.clone(),
            base_url: Url::parse(&source.url)?,
        })
    }

    /// Extract all well-formed rows in page order.
    ///
    /// Rows with fewer than [`MIN_COLUMNS`] cells are skipped. A missing table
    /// or table body is an [`AppError::Extraction`], distinct from a table
    /// that is present but empty. The HTML parser wraps bare `<tr>` rows in
    /// an implied `<tbody>`, so such rows are read as body rows.
    pub fn extract(&self, html: &str) -> Result<Vec<PublicationRecord>> {
        let document = Html::parse_document(html);

        let table = document.select(&self.table_sel).next().ok_or_else(|| {
            AppError::extraction(format!("table '{}' not found", self.table_id))
        })?;

        let tbody = child_elements(table, "tbody").next().ok_or_else(|| {
            AppError::extraction(format!("table '{}' has no body", self.table_id))
        })?;

        let mut records = Vec::new();
        for (position, row) in child_elements(tbody, "tr").enumerate() {
            match self.parse_row(row) {
                Some(record) => records.push(record),
                None => log::debug!("Skipping malformed row {position}"),
            }
        }
        Ok(records)
    }

    fn parse_row(&self, row: ElementRef<'_>) -> Option<PublicationRecord> {
        let cells: Vec<ElementRef<'_>> = child_elements(row, "td").collect();
        if cells.len() < MIN_COLUMNS {
            return None;
        }

        Some(PublicationRecord {
            id: cell_text(cells[0]),
            description: cell_text(cells[1]),
            document_url: self.document_link(cells[2]),
            published_at: cell_text(cells[3]),
            expires_at: cell_text(cells[4]),
            status: cell_text(cells[5]),
        })
    }

    fn document_link(&self, cell: ElementRef<'_>) -> DocumentLink {
        let href = cell
            .select(&self.anchor_sel)
            .next()
            .and_then(|a| a.value().attr("href"))
            .map(str::trim);

        match href {
            Some(href) if href.starts_with("http") => DocumentLink::Available(href.to_string()),
            Some(href) => DocumentLink::Available(resolve_url(&self.base_url, href)),
            None => DocumentLink::Unavailable,
        }
    }
}

fn child_elements<'a>(
    parent: ElementRef<'a>,
    name: &'static str,
) -> impl Iterator<Item = ElementRef<'a>> + 'a {
    parent
        .children()
        .filter_map(ElementRef::wrap)
        .filter(move |el| el.value().name() == name)
}

fn cell_text(cell: ElementRef<'_>) -> String {
    cell.text().collect::<String>().trim().to_string()
}

fn parse_selector(s: &str) -> Result<Selector> {
    Selector::parse(s).map_err(|e| AppError::selector(s, format!("{e:?}")))
}
