use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::app::Selection;
use crate::util::version;

#[derive(Parser, Debug)]
#[command(
    name = "cotizador",
    version = Box::leak(version::version_label().into_boxed_str()) as &str,
    about = "Freight quoting desk for Transporte Rio Lavayen"
)]
pub struct Cli {
    /// Directory with the reference data files (defaults to the embedded tables)
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Settings file path (defaults to the user config directory)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List reference data: the choices behind each quote selection
    List {
        #[command(subcommand)]
        target: ListTarget,
    },

    /// Price a quote without persisting anything
    Estimate {
        #[command(flatten)]
        selection: SelectionArgs,
    },

    /// Generate a quote: persist it, upload the document, print delivery links
    Generate {
        #[command(flatten)]
        selection: SelectionArgs,

        /// Skip backend delivery and write the document to the working directory
        #[arg(long)]
        offline: bool,
    },
}

#[derive(Subcommand, Debug)]
pub enum ListTarget {
    /// Origin warehouses
    Warehouses,
    /// Destination zones
    Zones,
    /// Localities served within a zone
    Localities {
        #[arg(long)]
        zone: u32,
    },
    /// Cargo classes priced for a zone, with quantity bounds
    Classes {
        #[arg(long)]
        zone: u32,
    },
}

#[derive(Args, Debug)]
pub struct SelectionArgs {
    /// Origin warehouse name
    #[arg(long)]
    pub warehouse: String,

    /// Destination zone id
    #[arg(long)]
    pub zone: u32,

    /// Destination locality
    #[arg(long)]
    pub locality: String,

    /// Cargo class label (see `list classes`)
    #[arg(long)]
    pub cargo_class: String,

    /// Number of units; valid bounds depend on the cargo class
    #[arg(long, default_value_t = 1)]
    pub quantity: u32,

    /// Include the 21% VAT
    #[arg(long)]
    pub tax: bool,

    /// Request cargo insurance over the declared value
    #[arg(long)]
    pub insurance: bool,

    /// Declared cargo value the insurance premium is computed from
    #[arg(long, default_value_t = 0.0)]
    pub declared_value: f64,
}

impl From<SelectionArgs> for Selection {
    fn from(args: SelectionArgs) -> Self {
        Selection {
            warehouse: args.warehouse,
            zone_id: args.zone,
            locality: args.locality,
            cargo_class: args.cargo_class,
            quantity: args.quantity,
            tax_included: args.tax,
            insurance_requested: args.insurance,
            declared_value: args.declared_value,
        }
    }
}
