//! PDF rendering for shipment detail export.

use printpdf::{BuiltinFont, Mm, PdfDocument};

use crate::error::{AppError, AppResult};
use crate::models::Shipment;

const PAGE_WIDTH_MM: f32 = 210.0;
const PAGE_HEIGHT_MM: f32 = 297.0;
const MARGIN_MM: f32 = 20.0;
const LINE_HEIGHT_MM: f32 = 9.0;

/// Render an A4 summary of one shipment.
pub fn render_shipment(shipment: &Shipment) -> AppResult<Vec<u8>> {
    let (doc, page, layer) = PdfDocument::new(
        "Shipment Details",
        Mm(PAGE_WIDTH_MM),
        Mm(PAGE_HEIGHT_MM),
        "Layer 1",
    );
    let font = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(|e| AppError::Internal(format!("pdf font: {e}")))?;
    let bold = doc
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(|e| AppError::Internal(format!("pdf font: {e}")))?;

    let layer = doc.get_page(page).get_layer(layer);
    let mut y = PAGE_HEIGHT_MM - MARGIN_MM;

    layer.use_text("Shipment Details", 18.0, Mm(MARGIN_MM), Mm(y), &bold);
    y -= 2.0 * LINE_HEIGHT_MM;

    let lines = [
        format!("Tracking number: {}", shipment.tracking_number),
        format!("Status: {}", shipment.status),
        format!("Item: {}", shipment.name),
        format!("Price: {:.2}", shipment.price),
        format!("Sender: {}", shipment.sender),
        format!("Receiver: {}", shipment.receiver),
        format!("From: {}", shipment.from_location),
        format!("To: {}", shipment.to_location),
        format!("Priority: {}", shipment.priority),
        format!("Created: {}", shipment.created_at.format("%Y-%m-%d %H:%M UTC")),
        format!("Updated: {}", shipment.updated_at.format("%Y-%m-%d %H:%M UTC")),
    ];
    for line in &lines {
        layer.use_text(line.as_str(), 12.0, Mm(MARGIN_MM), Mm(y), &font);
        y -= LINE_HEIGHT_MM;
    }

    if let Some(description) = &shipment.description {
        y -= LINE_HEIGHT_MM;
        layer.use_text(
            format!("Description: {description}"),
            12.0,
            Mm(MARGIN_MM),
            Mm(y),
            &font,
        );
    }

    doc.save_to_bytes()
        .map_err(|e| AppError::Internal(format!("pdf render: {e}")))
}
