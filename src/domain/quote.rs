//! Quote assembly: identifier, timestamp, persistence record, and the
//! customer-facing summary texts.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use time::format_description::FormatItem;
use time::macros::format_description;
use time::OffsetDateTime;
use url::Url;
use uuid::Uuid;

use crate::infra::reference::ReferenceData;
use crate::util::format_money;

use super::entities::{QuoteDraft, Warehouse};
use super::pricing::PriceBreakdown;

const TIMESTAMP_FORMAT: &[FormatItem<'static>] =
    format_description!("[year]-[month]-[day] [hour]:[minute]");

/// A finalized quote. Created once per submission, immutable thereafter.
#[derive(Clone, Debug)]
pub struct Quote {
    pub id: String,
    pub created_at: OffsetDateTime,
    pub warehouse: Warehouse,
    pub zone_id: u32,
    pub zone_name: String,
    pub locality: String,
    pub cargo_class: String,
    pub cargo_code: f64,
    pub quantity: u32,
    pub distance_km: f64,
    pub declared_value: f64,
    pub tax_included: bool,
    pub insurance_requested: bool,
    pub insurance_cost: f64,
    pub final_cost: f64,
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum AssembleError {
    #[error("quote draft is missing required selections")]
    IncompleteDraft,
    #[error("no tariff configured for zone {zone_id} and class {cargo_class:?}")]
    MissingTariff { zone_id: u32, cargo_class: String },
    #[error("tariff code {code:?} for zone {zone_id} and class {cargo_class:?} is not numeric")]
    BadTariffCode {
        zone_id: u32,
        cargo_class: String,
        code: String,
    },
}

impl Quote {
    /// Builds the immutable quote from a fully priced draft: fresh id, current
    /// timestamp, resolved zone name and numeric tariff code. Tariff problems
    /// are configuration errors and fail assembly before anything is written.
    pub fn assemble(
        draft: &QuoteDraft,
        warehouse: &Warehouse,
        breakdown: &PriceBreakdown,
        reference: &ReferenceData,
    ) -> Result<Self, AssembleError> {
        let zone_id = draft.zone_id.ok_or(AssembleError::IncompleteDraft)?;
        let locality = draft
            .locality
            .clone()
            .ok_or(AssembleError::IncompleteDraft)?;
        let cargo_class = draft
            .cargo_class
            .clone()
            .ok_or(AssembleError::IncompleteDraft)?;
        let distance_km = draft.distance_km.ok_or(AssembleError::IncompleteDraft)?;

        let tariff = reference.tariff(zone_id, &cargo_class).ok_or_else(|| {
            AssembleError::MissingTariff {
                zone_id,
                cargo_class: cargo_class.clone(),
            }
        })?;
        let cargo_code =
            tariff
                .code
                .trim()
                .parse::<f64>()
                .map_err(|_| AssembleError::BadTariffCode {
                    zone_id,
                    cargo_class: cargo_class.clone(),
                    code: tariff.code.clone(),
                })?;

        let zone_name = reference
            .zone_name(zone_id)
            .map(str::to_string)
            .unwrap_or_else(|| format!("Zona {zone_id}"));

        Ok(Self {
            id: Uuid::new_v4().to_string(),
            created_at: OffsetDateTime::now_utc(),
            warehouse: warehouse.clone(),
            zone_id,
            zone_name,
            locality,
            cargo_class,
            cargo_code,
            quantity: draft.quantity,
            distance_km,
            declared_value: draft.declared_value,
            tax_included: draft.tax_included,
            insurance_requested: draft.insurance_requested,
            insurance_cost: breakdown.insurance_cost,
            final_cost: breakdown.total,
        })
    }

    /// `YYYY-MM-DD HH:MM` label used on the document and in messages.
    pub fn created_label(&self) -> String {
        self.created_at
            .format(&TIMESTAMP_FORMAT)
            .unwrap_or_else(|_| self.created_at.to_string())
    }

    /// The structured row persisted to the quotes collection.
    pub fn record(&self) -> QuoteRecord {
        QuoteRecord {
            id: self.id.clone(),
            warehouse: self.warehouse.name.clone(),
            zone: self.zone_name.clone(),
            locality: self.locality.clone(),
            cargo_code: self.cargo_code,
            distance_km: self.distance_km,
            final_cost: self.final_cost,
            insurance_cost: self.insurance_cost,
            tax_included: self.tax_included,
            insurance_requested: self.insurance_requested,
            quantity: self.quantity,
            declared_value: self.declared_value,
        }
    }

    /// Text encoded into the scannable payload on the printed document.
    pub fn scan_payload(&self) -> String {
        format!(
            "ID Cotización: {id}\n\
             Fecha: {date}\n\
             Monto: {amount}\n\
             Destino: {locality} (Zona {zone})\n\
             Depósito: {warehouse}\n\
             Cantidad: {quantity}\n\
             Valor Declarado: {declared}",
            id = self.id,
            date = self.created_label(),
            amount = format_money(self.final_cost),
            locality = self.locality,
            zone = self.zone_id,
            warehouse = self.warehouse.name,
            quantity = self.quantity,
            declared = format_money(self.declared_value),
        )
    }

    /// The message body behind the delivery deep link.
    pub fn whatsapp_message(&self) -> String {
        let yes_no = |flag: bool| if flag { "Sí" } else { "No" };
        format!(
            "*Hola Transporte Rio Lavayen* 👋 Realice una cotizacion online con los siguientes datos:\n\n\
             🆔- ID Cotización: *{id}*\n\
             📅- Fecha: *{date}*\n\
             🏢- Depósito de Origen: *{warehouse}*\n\
             📍- Destino: *{locality} (Zona {zone})*\n\
             🔎- Distancia Aproximada: *{distance} km*\n\
             📦- Tipo de Carga: *{cargo_class}*\n\
             🔢- Cantidad: *{quantity}*\n\
             💰- Valor Declarado: *{declared}*\n\
             🛡️- Seguro de Carga: *{insurance}*\n\
             🧾- Solicitar Factura: *{tax}*\n\
             💲- Costo Final: *{cost}*\n\n\
             Espero su pronta respuesta. ¡Muchas Gracias! 👌",
            id = self.id,
            date = self.created_label(),
            warehouse = self.warehouse.name,
            locality = self.locality,
            zone = self.zone_id,
            distance = self.distance_km,
            cargo_class = self.cargo_class,
            quantity = self.quantity,
            declared = format_money(self.declared_value),
            insurance = yes_no(self.insurance_requested),
            tax = yes_no(self.tax_included),
            cost = format_money(self.final_cost),
        )
    }

    /// Deep link that opens a chat with the origin warehouse, message
    /// prefilled. Opened client-side, never sent programmatically.
    pub fn whatsapp_link(&self) -> String {
        let base = format!("https://wa.me/{}", self.warehouse.whatsapp);
        match Url::parse_with_params(&base, [("text", self.whatsapp_message())]) {
            Ok(url) => url.into(),
            Err(_) => base,
        }
    }
}

/// Row shape for the backend quotes collection.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct QuoteRecord {
    pub id: String,
    pub warehouse: String,
    pub zone: String,
    pub locality: String,
    pub cargo_code: f64,
    pub distance_km: f64,
    pub final_cost: f64,
    pub insurance_cost: f64,
    pub tax_included: bool,
    pub insurance_requested: bool,
    pub quantity: u32,
    pub declared_value: f64,
}
