//! The customer-facing HTML quote document.

use crate::domain::quote::Quote;
use crate::util::{assets, format_money};

use super::qr::{self, QrError};

/// Renders the quote sheet with the scannable payload inline. The output is
/// the document artifact: previewed, persisted to the companion collection,
/// and uploaded to object storage as-is.
pub fn render_quote_html(quote: &Quote) -> Result<String, QrError> {
    let qr_uri = qr::svg_data_uri(&quote.scan_payload())?;
    let yes_no = |flag: bool| if flag { "Si" } else { "No" };

    Ok(format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
    <style>
{css}
    </style>
</head>
<body>
    <div class="container">
        <div class="header">
            <h1>Cotizacion Automatizada</h1>
            <h2>Transporte Rio Lavayen</h2>
        </div>
        <div class="details">
            <p><strong>Fecha:</strong> {date}</p>
            <p><strong>Deposito de Origen:</strong> {warehouse}</p>
            <p><strong>Destino:</strong> {locality} (Zona {zone})</p>
            <p><strong>Distancia Aproximada:</strong> {distance} km</p>
            <p><strong>Tipo de Carga:</strong> {cargo_class}</p>
            <p><strong>Cantidad:</strong> {quantity}</p>
            <p><strong>Valor Declarado:</strong> {declared}</p>
            <p><strong>Incluir IVA:</strong> {tax}</p>
            <p><strong>Solicitar Seguro de Carga:</strong> {insurance}</p>
            <p><strong>Cotizacion Estimada:</strong> {cost}</p>
        </div>
        <div class="qr-code">
            <img src="{qr_uri}" alt="QR Code">
            <p><strong>ID Cotizacion:</strong> {id}</p>
        </div>
    </div>
</body>
</html>
"#,
        css = assets::document_css(),
        date = quote.created_label(),
        warehouse = quote.warehouse.name,
        locality = quote.locality,
        zone = quote.zone_id,
        distance = quote.distance_km,
        cargo_class = quote.cargo_class,
        quantity = quote.quantity,
        declared = format_money(quote.declared_value),
        tax = yes_no(quote.tax_included),
        insurance = yes_no(quote.insurance_requested),
        cost = format_money(quote.final_cost),
        qr_uri = qr_uri,
        id = quote.id,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{QuoteDraft, Warehouse};
    use crate::domain::pricing::compute_final_cost;
    use crate::infra::reference::ReferenceData;

    fn sample_quote() -> Quote {
        let reference = ReferenceData::load(None).expect("embedded reference data");
        let draft = QuoteDraft {
            warehouse: Some("Deposito Salta".to_string()),
            zone_id: Some(3),
            locality: Some("Cerrillos".to_string()),
            cargo_class: Some("DE 21 KG A 100 KG".to_string()),
            distance_km: Some(15.2),
            quantity: 40,
            tax_included: true,
            insurance_requested: false,
            declared_value: 0.0,
        };
        let warehouse: &Warehouse = reference.warehouse("Deposito Salta").expect("exists");
        let breakdown = compute_final_cost(&draft, &reference).expect("prices");
        Quote::assemble(&draft, warehouse, &breakdown, &reference).expect("assembles")
    }

    #[test]
    fn document_carries_the_quote_fields() {
        let quote = sample_quote();
        let html = render_quote_html(&quote).expect("renders");

        assert!(html.contains(&quote.id));
        assert!(html.contains("Cerrillos (Zona 3)"));
        assert!(html.contains("15.2 km"));
        assert!(html.contains(&format_money(quote.final_cost)));
        assert!(html.contains("data:image/svg+xml;base64,"));
        assert!(html.contains("<strong>Incluir IVA:</strong> Si"));
    }

    #[test]
    fn stylesheet_is_inlined() {
        let html = render_quote_html(&sample_quote()).expect("renders");
        assert!(html.contains(".qr-code img"));
    }
}
