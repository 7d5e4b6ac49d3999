use serde::Deserialize;

/// One tariff row: the base rate for a cargo class within a destination zone.
/// `(zone_id, cargo_class)` is unique across the table; `code` is the numeric
/// tariff identifier the backend stores with each quote.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct TariffEntry {
    pub zone_id: u32,
    pub cargo_class: String,
    pub base_rate: f64,
    pub code: String,
}

/// A destination locality, grouped into a zone, with its delivery surcharge
/// and coordinates for distance lookups.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct LocalityEntry {
    pub zone_id: u32,
    pub zone_name: String,
    pub locality: String,
    pub surcharge: f64,
    pub latitude: f64,
    pub longitude: f64,
}

/// Global pricing parameters. Fuel and per-km figures are carried in the
/// reference data but the current tariff formula does not apply them.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct PricingParameters {
    pub fuel_consumption_per_km: f64,
    pub fuel_price: f64,
    pub cost_per_km: f64,
    pub profit_margin: f64,
}

/// An origin warehouse with its contact number for the delivery deep link.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct Warehouse {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub whatsapp: String,
}

impl Warehouse {
    pub fn coordinates(&self) -> Coordinates {
        Coordinates {
            latitude: self.latitude,
            longitude: self.longitude,
        }
    }
}

impl LocalityEntry {
    pub fn coordinates(&self) -> Coordinates {
        Coordinates {
            latitude: self.latitude,
            longitude: self.longitude,
        }
    }
}

/// Coordinate pair in (latitude, longitude) order.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

/// Valid quantity bounds for a cargo class; `max` of `None` is unbounded.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct QuantityRange {
    pub min: u32,
    pub max: Option<u32>,
}

/// The flat-rate class: quantity never multiplies its cost.
pub const MINIMUM_PACKAGE_CLASS: &str = "BULTO MINIMO (MAXIMO 20 KG)";

const CARGO_CLASS_RANGES: &[(&str, QuantityRange)] = &[
    ("BULTO MINIMO (MAXIMO 20 KG)", QuantityRange { min: 1, max: Some(20) }),
    ("DE 21 KG A 100 KG", QuantityRange { min: 21, max: Some(100) }),
    ("DE 101 KG A 300 KG", QuantityRange { min: 101, max: Some(300) }),
    ("DE 301 KG A 500 KG", QuantityRange { min: 301, max: Some(500) }),
    ("DE 501 KG A 1000 KG", QuantityRange { min: 501, max: Some(1000) }),
    ("DE 1001 KG A 1500 KG", QuantityRange { min: 1001, max: Some(1500) }),
    ("DE 1501 KG A 2000 KG", QuantityRange { min: 1501, max: Some(2000) }),
    ("DE 2001 KG A 2500 KG", QuantityRange { min: 2001, max: Some(2500) }),
    ("DE 2501 KG A 3000 KG", QuantityRange { min: 2501, max: Some(3000) }),
    ("DE 3001 KG EN ADELANTE", QuantityRange { min: 3001, max: None }),
    ("METROS CUBICOS", QuantityRange { min: 1, max: Some(20) }),
    ("METROS CUBICOS MUDANZA", QuantityRange { min: 1, max: Some(20) }),
];

/// Quantity bounds for a cargo class label. Matching is trimmed and
/// case-insensitive; unknown labels fall back to `1..` unbounded.
pub fn quantity_range(cargo_class: &str) -> QuantityRange {
    let normalized = cargo_class.trim();
    CARGO_CLASS_RANGES
        .iter()
        .find(|(label, _)| label.eq_ignore_ascii_case(normalized))
        .map(|(_, range)| *range)
        .unwrap_or(QuantityRange { min: 1, max: None })
}

pub fn is_minimum_package(cargo_class: &str) -> bool {
    cargo_class.trim().eq_ignore_ascii_case(MINIMUM_PACKAGE_CLASS)
}

/// Request-scoped selection state for one quoting session. Mirrors the form:
/// fields stay `None` until the operator picks them, and pricing treats any
/// missing field as "form incomplete" rather than an error.
#[derive(Clone, Debug, Default)]
pub struct QuoteDraft {
    pub warehouse: Option<String>,
    pub zone_id: Option<u32>,
    pub locality: Option<String>,
    pub cargo_class: Option<String>,
    pub distance_km: Option<f64>,
    pub quantity: u32,
    pub tax_included: bool,
    pub insurance_requested: bool,
    pub declared_value: f64,
}
