use clap::Parser;
use thiserror::Error;

use cotizador::app::{self, FlowError, QuoteContext};
use cotizador::cli::{Cli, Commands, ListTarget};
use cotizador::domain::entities::quantity_range;
use cotizador::infra::reference::{ReferenceData, ReferenceError};
use cotizador::util::format_money;
use cotizador::util::settings::{Settings, SettingsError};

#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    Reference(#[from] ReferenceError),
    #[error(transparent)]
    Settings(#[from] SettingsError),
    #[error(transparent)]
    Flow(#[from] FlowError),
}

#[tokio::main]
async fn main() {
    cotizador::init_tracing();

    let cli = Cli::parse();
    if let Err(error) = run(cli).await {
        eprintln!("error: {error}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    // Reference data is fatal at startup; settings stay lazy-checked per command.
    let reference = ReferenceData::load(cli.data_dir.as_deref())?;
    let settings = Settings::load(cli.config.as_deref())?;
    let ctx = QuoteContext {
        reference,
        settings,
        data_dir: cli.data_dir.clone(),
    };

    match cli.command {
        Commands::List { target } => {
            list(&ctx, target);
            Ok(())
        }
        Commands::Estimate { selection } => {
            let selection = selection.into();
            let estimate = app::estimate(&ctx, &selection).await?;
            println!("Distance:       {} km", estimate.distance_km);
            println!("Base rate:      {}", format_money(estimate.breakdown.base_rate));
            println!(
                "Surcharge:      {} (reference only)",
                format_money(estimate.breakdown.surcharge)
            );
            println!(
                "Insurance:      {}",
                format_money(estimate.breakdown.insurance_cost)
            );
            println!("Estimated cost: {}", format_money(estimate.breakdown.total));
            Ok(())
        }
        Commands::Generate { selection, offline } => {
            let selection = selection.into();
            let delivery = app::generate(&ctx, &selection, offline).await?;
            println!("Quote {} generated.", delivery.quote.id);
            println!("Final cost: {}", format_money(delivery.quote.final_cost));
            if let Some(url) = &delivery.public_url {
                println!("Document:   {url}");
            }
            if let Some(path) = &delivery.document_path {
                println!("Document:   {}", path.display());
            }
            println!("WhatsApp:   {}", delivery.whatsapp_link);
            println!("Valid for 24 hours; pricing assumes supplier delivery to our warehouses.");
            Ok(())
        }
    }
}

fn list(ctx: &QuoteContext, target: ListTarget) {
    match target {
        ListTarget::Warehouses => {
            for warehouse in ctx.reference.warehouses() {
                println!("{}  (WhatsApp +{})", warehouse.name, warehouse.whatsapp);
            }
        }
        ListTarget::Zones => {
            for zone_id in ctx.reference.zone_ids() {
                let name = ctx.reference.zone_name(zone_id).unwrap_or("?");
                println!("{zone_id}  {name}");
            }
        }
        ListTarget::Localities { zone } => {
            for entry in ctx.reference.localities_in(zone) {
                if entry.surcharge > 0.0 {
                    println!("{}  (surcharge {})", entry.locality, format_money(entry.surcharge));
                } else {
                    println!("{}", entry.locality);
                }
            }
        }
        ListTarget::Classes { zone } => {
            for tariff in ctx.reference.tariffs_in(zone) {
                let range = quantity_range(&tariff.cargo_class);
                let bounds = match range.max {
                    Some(max) => format!("{}..={max}", range.min),
                    None => format!("{}..", range.min),
                };
                println!(
                    "{}  base {}  quantity {bounds}",
                    tariff.cargo_class,
                    format_money(tariff.base_rate)
                );
            }
        }
    }
}
