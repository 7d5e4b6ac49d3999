//! Scannable payload rendering: the quote summary as a QR code, emitted as
//! an inline SVG data URI so the document stays a single self-contained file.

use qrcode::render::svg;
use qrcode::{EcLevel, QrCode};
use thiserror::Error;

use crate::util::assets::encode_base64;

#[derive(Debug, Error)]
pub enum QrError {
    #[error("payload does not fit in a QR code: {0}")]
    Encode(#[from] qrcode::types::QrError),
}

pub fn svg_data_uri(payload: &str) -> Result<String, QrError> {
    let code = QrCode::with_error_correction_level(payload.as_bytes(), EcLevel::L)?;
    let image = code
        .render::<svg::Color<'_>>()
        .min_dimensions(150, 150)
        .quiet_zone(true)
        .build();
    Ok(format!(
        "data:image/svg+xml;base64,{}",
        encode_base64(image.as_bytes())
    ))
}
