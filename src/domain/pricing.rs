//! Tariff pricing for a single quote request.

use thiserror::Error;

use crate::infra::reference::ReferenceData;

use super::entities::{is_minimum_package, quantity_range, QuoteDraft};

/// Statutory VAT factor applied when the customer asks for an invoice.
pub const VAT_FACTOR: f64 = 1.21;

/// Cargo insurance premium as a fraction of the declared value.
pub const INSURANCE_RATE: f64 = 0.008;

#[derive(Clone, Debug, PartialEq)]
pub struct PriceBreakdown {
    pub base_rate: f64,
    /// Locality surcharge, quoted for reference; not part of the total.
    pub surcharge: f64,
    pub insurance_cost: f64,
    pub total: f64,
}

/// Computes the final quoted price for the draft, or `None` while the
/// selection is incomplete (missing cargo class, distance, or locality, or no
/// tariff configured for the zone/class pair).
///
/// Fuel consumption, per-km cost, and the locality surcharge are looked up
/// but not applied; the tariff base rate carries the whole freight cost
/// today, so distance never enters the arithmetic.
pub fn compute_final_cost(draft: &QuoteDraft, reference: &ReferenceData) -> Option<PriceBreakdown> {
    let cargo_class = draft.cargo_class.as_deref()?;
    let locality = draft.locality.as_deref()?;
    let zone_id = draft.zone_id?;
    draft.distance_km?;

    let tariff = reference.tariff(zone_id, cargo_class)?;
    let surcharge = reference.surcharge(locality);

    let mut total = tariff.base_rate * (1.0 + reference.parameters().profit_margin);

    if draft.tax_included {
        total *= VAT_FACTOR;
    }

    if !is_minimum_package(cargo_class) {
        total *= f64::from(draft.quantity);
    }

    let insurance_cost = if draft.declared_value > 0.0 {
        draft.declared_value * INSURANCE_RATE
    } else {
        0.0
    };
    total += insurance_cost;

    Some(PriceBreakdown {
        base_rate: tariff.base_rate,
        surcharge,
        insurance_cost,
        total,
    })
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum QuantityError {
    #[error("quantity {quantity} is below the minimum of {min} for {cargo_class}")]
    BelowMinimum {
        cargo_class: String,
        quantity: u32,
        min: u32,
    },
    #[error("quantity {quantity} is above the maximum of {max} for {cargo_class}")]
    AboveMaximum {
        cargo_class: String,
        quantity: u32,
        max: u32,
    },
}

/// Enforces the cargo class quantity bounds. The flow calls this before the
/// pricing engine; the engine itself does not re-validate.
pub fn validate_quantity(cargo_class: &str, quantity: u32) -> Result<(), QuantityError> {
    let range = quantity_range(cargo_class);
    if quantity < range.min {
        return Err(QuantityError::BelowMinimum {
            cargo_class: cargo_class.trim().to_string(),
            quantity,
            min: range.min,
        });
    }
    if let Some(max) = range.max {
        if quantity > max {
            return Err(QuantityError::AboveMaximum {
                cargo_class: cargo_class.trim().to_string(),
                quantity,
                max,
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::reference::ReferenceData;

    fn reference() -> ReferenceData {
        ReferenceData::load(None).expect("embedded reference data")
    }

    fn draft(cargo_class: &str, quantity: u32) -> QuoteDraft {
        QuoteDraft {
            warehouse: Some("Casa Central San Salvador de Jujuy".to_string()),
            zone_id: Some(1),
            locality: Some("Palpalá".to_string()),
            cargo_class: Some(cargo_class.to_string()),
            distance_km: Some(12.34),
            quantity,
            ..QuoteDraft::default()
        }
    }

    #[test]
    fn incomplete_drafts_price_to_none() {
        let reference = reference();

        let mut missing_class = draft("DE 21 KG A 100 KG", 30);
        missing_class.cargo_class = None;
        assert!(compute_final_cost(&missing_class, &reference).is_none());

        let mut missing_distance = draft("DE 21 KG A 100 KG", 30);
        missing_distance.distance_km = None;
        assert!(compute_final_cost(&missing_distance, &reference).is_none());

        let mut missing_locality = draft("DE 21 KG A 100 KG", 30);
        missing_locality.locality = None;
        assert!(compute_final_cost(&missing_locality, &reference).is_none());
    }

    #[test]
    fn unknown_tariff_pair_prices_to_none() {
        let reference = reference();
        let unknown = draft("CARGA REFRIGERADA", 30);
        assert!(compute_final_cost(&unknown, &reference).is_none());
    }

    #[test]
    fn margin_and_quantity_multiply_the_base_rate() {
        // zone 1, DE 21 KG A 100 KG: base 9000, margin 0.2.
        let reference = reference();
        let mut quote = draft("DE 21 KG A 100 KG", 30);
        quote.tax_included = false;

        let breakdown = compute_final_cost(&quote, &reference).expect("complete draft");
        assert!((breakdown.total - 9000.0 * 1.2 * 30.0).abs() < 1e-9);
        assert_eq!(breakdown.insurance_cost, 0.0);
    }

    #[test]
    fn tax_applies_the_fixed_vat_factor() {
        let reference = reference();
        let mut untaxed = draft("DE 21 KG A 100 KG", 30);
        untaxed.tax_included = false;
        let mut taxed = untaxed.clone();
        taxed.tax_included = true;

        let plain = compute_final_cost(&untaxed, &reference).expect("complete");
        let with_tax = compute_final_cost(&taxed, &reference).expect("complete");
        assert!((with_tax.total - plain.total * VAT_FACTOR).abs() < 1e-9);
    }

    #[test]
    fn cost_is_linear_in_quantity_except_insurance() {
        let reference = reference();
        let mut single = draft("DE 101 KG A 300 KG", 101);
        single.quantity = 101;
        let mut triple = single.clone();
        triple.quantity = 303;

        let one = compute_final_cost(&single, &reference).expect("complete");
        let three = compute_final_cost(&triple, &reference).expect("complete");
        assert!((three.total - one.total * 3.0).abs() < 1e-6);
    }

    #[test]
    fn insurance_is_added_once_independent_of_quantity() {
        let reference = reference();
        let mut quote = draft("DE 21 KG A 100 KG", 30);
        quote.declared_value = 10_000.0;

        let breakdown = compute_final_cost(&quote, &reference).expect("complete");
        assert!((breakdown.insurance_cost - 80.0).abs() < 1e-9);
        assert!((breakdown.total - (9000.0 * 1.2 * 30.0 + 80.0)).abs() < 1e-9);
    }

    #[test]
    fn minimum_package_ignores_quantity() {
        // zone 1, BULTO MINIMO: base 6000, margin 0.2.
        let reference = reference();
        let mut quote = draft("BULTO MINIMO (MAXIMO 20 KG)", 5);
        quote.declared_value = 10_000.0;

        let breakdown = compute_final_cost(&quote, &reference).expect("complete");
        assert!((breakdown.total - (6000.0 * 1.2 + 80.0)).abs() < 1e-9);

        quote.quantity = 18;
        let same = compute_final_cost(&quote, &reference).expect("complete");
        assert_eq!(breakdown.total, same.total);
    }

    #[test]
    fn unknown_locality_defaults_surcharge_to_zero() {
        let reference = reference();
        let mut quote = draft("DE 21 KG A 100 KG", 30);
        quote.locality = Some("Villa Inexistente".to_string());

        let breakdown = compute_final_cost(&quote, &reference).expect("still prices");
        assert_eq!(breakdown.surcharge, 0.0);
    }

    #[test]
    fn surcharge_is_reported_but_never_added() {
        // San Antonio carries a 500 surcharge in zone 1.
        let reference = reference();
        let mut quote = draft("DE 21 KG A 100 KG", 30);
        quote.locality = Some("San Antonio".to_string());

        let breakdown = compute_final_cost(&quote, &reference).expect("complete");
        assert_eq!(breakdown.surcharge, 500.0);
        assert!((breakdown.total - 9000.0 * 1.2 * 30.0).abs() < 1e-9);
    }

    #[test]
    fn worked_examples_from_the_rate_sheet() {
        // A reduced tariff table with round numbers, loaded like any other
        // data directory override.
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(
            dir.path().join("tariffs.json"),
            r#"[
                { "zone_id": 1, "cargo_class": "DE 21 KG A 100 KG", "base_rate": 1000.0, "code": "102" },
                { "zone_id": 1, "cargo_class": "BULTO MINIMO (MAXIMO 20 KG)", "base_rate": 500.0, "code": "101" }
            ]"#,
        )
        .expect("write tariffs");
        std::fs::write(
            dir.path().join("zones.json"),
            r#"[
                { "zone_id": 1, "zone_name": "Valles", "locality": "Palpalá", "surcharge": 0.0,
                  "latitude": -24.2566, "longitude": -65.2117 }
            ]"#,
        )
        .expect("write zones");
        std::fs::write(
            dir.path().join("parameters.json"),
            r#"[ { "fuel_consumption_per_km": 0.35, "fuel_price": 1180.0, "cost_per_km": 260.0,
                   "profit_margin": 0.2 } ]"#,
        )
        .expect("write parameters");
        std::fs::write(
            dir.path().join("warehouses.json"),
            r#"{ "warehouses": [ { "name": "Casa Central", "latitude": -24.1858,
                 "longitude": -65.2995, "whatsapp": "5493884123456" } ] }"#,
        )
        .expect("write warehouses");
        let reference = ReferenceData::load(Some(dir.path())).expect("loads");

        // 1000 * 1.20 * 3 = 3600 without tax.
        let mut quote = draft("DE 21 KG A 100 KG", 3);
        let plain = compute_final_cost(&quote, &reference).expect("prices");
        assert!((plain.total - 3600.0).abs() < 1e-9);

        // 1000 * 1.20 * 1.21 * 3 = 4356 with tax.
        quote.tax_included = true;
        let taxed = compute_final_cost(&quote, &reference).expect("prices");
        assert!((taxed.total - 4356.0).abs() < 1e-9);

        // 500 * 1.20 + 10000 * 0.008 = 680; quantity ignored for the flat class.
        let minimum = QuoteDraft {
            cargo_class: Some("BULTO MINIMO (MAXIMO 20 KG)".to_string()),
            quantity: 5,
            declared_value: 10_000.0,
            ..draft("BULTO MINIMO (MAXIMO 20 KG)", 5)
        };
        let flat = compute_final_cost(&minimum, &reference).expect("prices");
        assert!((flat.total - 680.0).abs() < 1e-9);
    }

    #[test]
    fn quantity_bounds_are_inclusive() {
        assert!(validate_quantity("DE 21 KG A 100 KG", 21).is_ok());
        assert!(validate_quantity("DE 21 KG A 100 KG", 100).is_ok());
        assert!(matches!(
            validate_quantity("DE 21 KG A 100 KG", 20),
            Err(QuantityError::BelowMinimum { min: 21, .. })
        ));
        assert!(matches!(
            validate_quantity("DE 21 KG A 100 KG", 101),
            Err(QuantityError::AboveMaximum { max: 100, .. })
        ));
    }

    #[test]
    fn open_ended_classes_have_no_upper_bound() {
        assert!(validate_quantity("DE 3001 KG EN ADELANTE", 50_000).is_ok());
    }
}
