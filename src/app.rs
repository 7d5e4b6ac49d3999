//! Quote flow orchestration: selection validation, price estimation, and the
//! full generate-and-deliver submission.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{info, warn};

use crate::domain::entities::{QuoteDraft, Warehouse};
use crate::domain::pricing::{compute_final_cost, validate_quantity, PriceBreakdown, QuantityError};
use crate::domain::quote::{AssembleError, Quote};
use crate::infra::backend::{BackendClient, BackendError};
use crate::infra::cache::DistanceCache;
use crate::infra::reference::ReferenceData;
use crate::infra::routing::{RoutingClient, RoutingError};
use crate::report::{render_quote_html, QrError};
use crate::util::settings::Settings;

/// Everything a submission needs that outlives it: the loaded reference
/// tables, operator settings, and the optional data directory override.
/// Per-submission state lives in [`QuoteDraft`].
pub struct QuoteContext {
    pub reference: ReferenceData,
    pub settings: Settings,
    pub data_dir: Option<PathBuf>,
}

impl QuoteContext {
    fn distance_cache(&self) -> DistanceCache {
        match &self.data_dir {
            Some(dir) => DistanceCache::at_path(dir.join("distance_cache.json")),
            None => DistanceCache::open_default(),
        }
    }

    fn routing_client(&self) -> Result<RoutingClient, FlowError> {
        Ok(RoutingClient::with_base_url(
            &self.settings.routing.base_url,
            self.settings.routing.api_key.clone(),
            self.distance_cache(),
        )?)
    }

    fn backend_client(&self) -> Result<BackendClient, FlowError> {
        let base_url = self
            .settings
            .backend
            .base_url
            .as_deref()
            .ok_or(FlowError::BackendNotConfigured)?;
        let api_key = self
            .settings
            .backend
            .api_key
            .as_deref()
            .ok_or(FlowError::BackendNotConfigured)?;
        Ok(BackendClient::new(
            base_url,
            api_key,
            self.settings.backend.bucket.clone(),
        )?)
    }
}

/// The operator's selections for one submission, as handed in by the CLI.
#[derive(Clone, Debug)]
pub struct Selection {
    pub warehouse: String,
    pub zone_id: u32,
    pub locality: String,
    pub cargo_class: String,
    pub quantity: u32,
    pub tax_included: bool,
    pub insurance_requested: bool,
    pub declared_value: f64,
}

#[derive(Debug, Error)]
pub enum FlowError {
    #[error("unknown warehouse {0:?}; see `list warehouses`")]
    UnknownWarehouse(String),
    #[error("unknown zone {0}; see `list zones`")]
    UnknownZone(u32),
    #[error("locality {locality:?} is not served in zone {zone_id}; see `list localities`")]
    UnknownLocality { zone_id: u32, locality: String },
    #[error("cargo class {cargo_class:?} is not priced for zone {zone_id}; see `list classes`")]
    UnknownCargoClass { zone_id: u32, cargo_class: String },
    #[error(transparent)]
    Quantity(#[from] QuantityError),
    #[error("distance unavailable: {0}")]
    Routing(#[from] RoutingError),
    #[error("backend is not configured: set backend.base_url and backend.api_key")]
    BackendNotConfigured,
    #[error(transparent)]
    Assemble(#[from] AssembleError),
    #[error(transparent)]
    Backend(#[from] BackendError),
    #[error("failed to render the quote document: {0}")]
    Render(#[from] QrError),
    #[error("failed to write the quote document: {0}")]
    DocumentIo(#[from] std::io::Error),
    #[error("quote selections are incomplete")]
    Incomplete,
}

/// A priced draft, ready to display or to turn into a quote.
#[derive(Debug)]
pub struct Estimate {
    pub draft: QuoteDraft,
    pub warehouse: Warehouse,
    pub distance_km: f64,
    pub breakdown: PriceBreakdown,
}

/// Outcome of a full submission.
#[derive(Debug)]
pub struct Delivery {
    pub quote: Quote,
    pub html: String,
    pub public_url: Option<String>,
    pub document_path: Option<PathBuf>,
    pub whatsapp_link: String,
}

/// Validate the selection against the reference tables, resolve the driving
/// distance, and price the draft. Quantity bounds are checked here, before
/// the pricing engine ever runs.
pub async fn estimate(ctx: &QuoteContext, selection: &Selection) -> Result<Estimate, FlowError> {
    let warehouse = ctx
        .reference
        .warehouse(&selection.warehouse)
        .ok_or_else(|| FlowError::UnknownWarehouse(selection.warehouse.clone()))?
        .clone();

    ctx.reference
        .zone_name(selection.zone_id)
        .ok_or(FlowError::UnknownZone(selection.zone_id))?;

    let locality = ctx
        .reference
        .locality(&selection.locality)
        .filter(|entry| entry.zone_id == selection.zone_id)
        .ok_or_else(|| FlowError::UnknownLocality {
            zone_id: selection.zone_id,
            locality: selection.locality.clone(),
        })?
        .clone();

    ctx.reference
        .tariff(selection.zone_id, &selection.cargo_class)
        .ok_or_else(|| FlowError::UnknownCargoClass {
            zone_id: selection.zone_id,
            cargo_class: selection.cargo_class.clone(),
        })?;

    validate_quantity(&selection.cargo_class, selection.quantity)?;

    let routing = ctx.routing_client()?;
    let distance_km = routing
        .route_distance_km(warehouse.coordinates(), locality.coordinates())
        .await?;

    let draft = QuoteDraft {
        warehouse: Some(warehouse.name.clone()),
        zone_id: Some(selection.zone_id),
        locality: Some(locality.locality.clone()),
        cargo_class: Some(selection.cargo_class.clone()),
        distance_km: Some(distance_km),
        quantity: selection.quantity,
        tax_included: selection.tax_included,
        insurance_requested: selection.insurance_requested,
        declared_value: selection.declared_value,
    };

    let breakdown = compute_final_cost(&draft, &ctx.reference).ok_or(FlowError::Incomplete)?;

    Ok(Estimate {
        draft,
        warehouse,
        distance_km,
        breakdown,
    })
}

/// The full submission: estimate, assemble, render, persist both rows,
/// upload the document, and build the delivery link. Every external failure
/// is terminal for this submission; nothing is retried or rolled back.
pub async fn generate(
    ctx: &QuoteContext,
    selection: &Selection,
    offline: bool,
) -> Result<Delivery, FlowError> {
    let estimate = estimate(ctx, selection).await?;

    // Configuration problems (missing tariff, bad code) fail here, before
    // any write reaches the backend.
    let quote = Quote::assemble(
        &estimate.draft,
        &estimate.warehouse,
        &estimate.breakdown,
        &ctx.reference,
    )?;
    let html = render_quote_html(&quote)?;
    let whatsapp_link = quote.whatsapp_link();

    if offline {
        let path = PathBuf::from(format!("{}.html", quote.id));
        fs::write(&path, &html)?;
        info!(id = %quote.id, path = %path.display(), "quote generated offline");
        return Ok(Delivery {
            quote,
            html,
            public_url: None,
            document_path: Some(path),
            whatsapp_link,
        });
    }

    let backend = ctx.backend_client()?;
    backend.insert_quote(&quote.record()).await?;
    backend.insert_document(&quote.id, &html).await?;

    // The document file is a scoped resource: created, uploaded, removed.
    let filename = format!("{}.html", quote.id);
    let path = env::temp_dir().join(&filename);
    fs::write(&path, &html)?;
    let upload = upload_from(&backend, &filename, &path).await;
    if let Err(error) = fs::remove_file(&path) {
        warn!(%error, path = %path.display(), "failed to remove temporary document");
    }
    let public_url = upload?;

    info!(id = %quote.id, %public_url, "quote generated and delivered");
    Ok(Delivery {
        quote,
        html,
        public_url: Some(public_url),
        document_path: None,
        whatsapp_link,
    })
}

async fn upload_from(
    backend: &BackendClient,
    filename: &str,
    path: &Path,
) -> Result<String, FlowError> {
    let bytes = fs::read(path)?;
    Ok(backend.upload_document(filename, bytes).await?)
}
