//! PDF rendering of a laid-out document.
//!
//! Text is set in the builtin Helvetica faces, which printpdf encodes as
//! WinAnsi. Characters outside that code page (CJK, emoji, most symbols) are
//! dropped or replaced in the output. `render_pdf` logs a warning when a
//! document contains any.

use printpdf::{
    BuiltinFont, Color, IndirectFontRef, Line, Mm, PdfDocument, PdfLayerReference, Point, Rgb,
};

use crate::error::ExportError;
use crate::export::layout::{Document, Element, FontWeight, Page, PageGeometry};

struct Fonts {
    regular: IndirectFontRef,
    bold: IndirectFontRef,
}

fn render_err(e: impl std::fmt::Display) -> ExportError {
    ExportError::Render(e.to_string())
}

fn rgb((r, g, b): (u8, u8, u8)) -> Color {
    Color::Rgb(Rgb::new(r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0, None))
}

/// Whether `c` has a slot in the WinAnsi (Windows-1252) code page.
fn is_winansi(c: char) -> bool {
    matches!(c,
        '\n' | '\t' | ' '..='~' | '\u{a0}'..='\u{ff}'
        | '€' | '‚' | 'ƒ' | '„' | '…' | '†' | '‡' | 'ˆ' | '‰' | 'Š' | '‹' | 'Œ' | 'Ž'
        | '‘' | '’' | '“' | '”' | '•' | '–' | '—' | '˜' | '™' | 'š' | '›' | 'œ' | 'ž' | 'Ÿ')
}

/// Distinct characters in `doc` that the builtin fonts cannot encode.
fn unsupported_chars(doc: &Document) -> Vec<char> {
    let mut found: Vec<char> = doc
        .pages
        .iter()
        .flat_map(|page| &page.elements)
        .filter_map(|element| match element {
            Element::Text { text, .. } => Some(text.chars()),
            Element::Rule { .. } => None,
        })
        .flatten()
        .filter(|c| !is_winansi(*c))
        .collect();
    found.sort_unstable();
    found.dedup();
    found
}

/// Render every page of `doc` into PDF bytes.
pub fn render_pdf(doc: &Document, title: &str) -> Result<Vec<u8>, ExportError> {
    let g = doc.geometry;
    let mut pages = doc.pages.iter();
    let first = pages.next().ok_or(ExportError::EmptyDocument)?;

    let unsupported = unsupported_chars(doc);
    if !unsupported.is_empty() {
        let chars: String = unsupported.iter().collect();
        tracing::warn!(count = unsupported.len(), %chars, "text outside WinAnsi will not render correctly");
    }

    let (pdf, page, layer) = PdfDocument::new(title, Mm(g.width), Mm(g.height), "planner");
    let fonts = Fonts {
        regular: pdf.add_builtin_font(BuiltinFont::Helvetica).map_err(render_err)?,
        bold: pdf.add_builtin_font(BuiltinFont::HelveticaBold).map_err(render_err)?,
    };

    draw_page(&pdf.get_page(page).get_layer(layer), first, &g, &fonts);
    for next in pages {
        let (page, layer) = pdf.add_page(Mm(g.width), Mm(g.height), "planner");
        draw_page(&pdf.get_page(page).get_layer(layer), next, &g, &fonts);
    }

    pdf.save_to_bytes().map_err(render_err)
}

fn draw_page(layer: &PdfLayerReference, page: &Page, g: &PageGeometry, fonts: &Fonts) {
    // Layout measures from the top edge, PDF from the bottom.
    let flip = |y: f32| Mm(g.height - y);

    for element in &page.elements {
        match element {
            Element::Text { x, y, text, style } => {
                let font = match style.weight {
                    FontWeight::Regular => &fonts.regular,
                    FontWeight::Bold => &fonts.bold,
                };
                layer.set_fill_color(rgb(style.color));
                layer.use_text(text.as_str(), style.size, Mm(*x), flip(*y), font);
            }
            Element::Rule { x1, x2, y } => {
                layer.set_outline_color(rgb((0, 0, 0)));
                layer.set_outline_thickness(0.5);
                layer.add_line(Line {
                    points: vec![
                        (Point::new(Mm(*x1), flip(*y)), false),
                        (Point::new(Mm(*x2), flip(*y)), false),
                    ],
                    is_closed: false,
                });
            }
        }
    }
}
