//! # cardlabel CLI
//!
//! Command-line interface for trading-card labels.
//!
//! ## Usage
//!
//! ```bash
//! # TSPL for one label
//! cardlabel tspl --title "Charizard" --sku PKM-004 --price 350
//!
//! # PNG preview with layout guides
//! cardlabel preview --layout layout.json --data card.json --guides -o label.png
//!
//! # Print-ready PDF at 300 DPI
//! cardlabel pdf --data card.json --dpi 300 -o label.pdf
//!
//! # Fill a pasted ZPL template
//! cardlabel template slab.zpl --engine zpl --set sku=PKM-004 --set price=350
//!
//! # Translate an editor scene
//! cardlabel scene scene.json
//!
//! # Run the print bridge
//! cardlabel serve --listen 127.0.0.1:9100
//!
//! # Print a batch through PrintNode
//! PRINTNODE_API_KEY=... cardlabel print --batch cards.json --printer 7301
//! ```

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use cardlabel::{
    CardLabelError,
    dispatch::{
        BatchOutcome, BridgeClient, PrintDispatcher, PrintDocument, PrintNodeClient,
        PrintNodeConfig, print_batch,
    },
    geometry::{PRINTER_DPI, PreviewScale},
    layout::{LabelData, LabelLayout},
    render::{
        FieldConfig, LabelSurface, QrRendering, generate_label_pdf_async, render_label_to_canvas,
        render_layout_preview,
    },
    scene::{Scene, scene_to_options},
    server::{CupsPrinter, RawPrinter, ServerConfig, SpoolDirPrinter},
    template::{TemplateEngine, render_template},
    tspl::{PrintSettings, build_tspl, label_data_to_tspl, layout_to_tspl},
};

/// cardlabel - Trading card label utility
#[derive(Parser, Debug)]
#[command(name = "cardlabel")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Where label content comes from. Flags override values from `--data`.
#[derive(Args, Debug, Clone)]
struct LabelArgs {
    /// Layout JSON file (omit for the built-in layout)
    #[arg(long, value_name = "FILE")]
    layout: Option<PathBuf>,

    /// Label data JSON file
    #[arg(long, value_name = "FILE")]
    data: Option<PathBuf>,

    #[arg(long)]
    title: Option<String>,
    #[arg(long)]
    sku: Option<String>,
    #[arg(long)]
    price: Option<String>,
    #[arg(long)]
    lot: Option<String>,
    #[arg(long)]
    condition: Option<String>,
    /// Symbol data (defaults to the SKU)
    #[arg(long)]
    barcode: Option<String>,
}

/// Job-level printer settings.
#[derive(Args, Debug, Clone, Copy)]
struct SettingsArgs {
    /// Gap between labels in inches
    #[arg(long, default_value = "0")]
    gap: f32,
    /// Print darkness (0-15)
    #[arg(long, default_value = "10")]
    density: u8,
    /// Print speed (2-8)
    #[arg(long, default_value = "4")]
    speed: u8,
}

impl From<SettingsArgs> for PrintSettings {
    fn from(args: SettingsArgs) -> Self {
        PrintSettings {
            gap_inches: args.gap,
            density: args.density,
            speed: args.speed,
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy)]
enum QrArg {
    /// Non-scannable preview pattern
    Placeholder,
    /// Real QR symbol
    Encoded,
}

impl From<QrArg> for QrRendering {
    fn from(arg: QrArg) -> Self {
        match arg {
            QrArg::Placeholder => QrRendering::Placeholder,
            QrArg::Encoded => QrRendering::Encoded,
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy)]
enum EngineArg {
    Zpl,
    Tspl,
}

impl From<EngineArg> for TemplateEngine {
    fn from(arg: EngineArg) -> Self {
        match arg {
            EngineArg::Zpl => TemplateEngine::Zpl,
            EngineArg::Tspl => TemplateEngine::Tspl,
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
enum Via {
    /// PrintNode cloud service
    Printnode,
    /// Local print bridge
    Bridge,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
enum PayloadArg {
    /// TSPL command text
    Tspl,
    /// Rendered PDF
    Pdf,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate the TSPL program for a label
    Tspl {
        #[command(flatten)]
        label: LabelArgs,
        #[command(flatten)]
        settings: SettingsArgs,
        /// Write to a file instead of stdout
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Render a PNG preview
    Preview {
        #[command(flatten)]
        label: LabelArgs,
        #[arg(short, long, value_name = "FILE")]
        output: PathBuf,
        /// Output resolution
        #[arg(long, default_value = "203")]
        dpi: f32,
        /// Draw dashed layout guides
        #[arg(long)]
        guides: bool,
        /// Render the field-editor view (hidden fields dimmed)
        #[arg(long)]
        editor: bool,
        /// Editor zoom factor
        #[arg(long, default_value = "1")]
        zoom: f32,
        #[arg(long, value_enum, default_value = "placeholder")]
        qr: QrArg,
    },

    /// Render a single-page print-ready PDF
    Pdf {
        #[command(flatten)]
        label: LabelArgs,
        #[arg(short, long, value_name = "FILE")]
        output: PathBuf,
        #[arg(long, default_value = "203")]
        dpi: f32,
        #[arg(long, value_enum, default_value = "placeholder")]
        qr: QrArg,
    },

    /// Fill a raw ZPL/TSPL template
    Template {
        /// Template file
        file: PathBuf,
        #[arg(long, value_enum)]
        engine: EngineArg,
        /// Token value as key=value (repeatable)
        #[arg(long = "set", value_name = "KEY=VALUE")]
        values: Vec<String>,
        /// Label data JSON file providing title/sku/price/lot/condition/barcode
        #[arg(long, value_name = "FILE")]
        data: Option<PathBuf>,
    },

    /// Translate an editor scene JSON file to TSPL
    Scene {
        file: PathBuf,
        #[command(flatten)]
        settings: SettingsArgs,
    },

    /// Run the print bridge and label API
    Serve {
        #[arg(long, default_value = "127.0.0.1:9100")]
        listen: String,
        /// Printer used when a request names none
        #[arg(long)]
        printer: Option<String>,
        /// Printer list cache lifetime in seconds
        #[arg(long, default_value = "30")]
        cache_ttl: u64,
        /// Write jobs to this directory instead of the OS print system
        #[arg(long, value_name = "DIR")]
        spool_dir: Option<PathBuf>,
    },

    /// Print labels through PrintNode or a print bridge
    Print {
        #[command(flatten)]
        label: LabelArgs,
        /// JSON array of label data; one label per entry
        #[arg(long, value_name = "FILE")]
        batch: Option<PathBuf>,
        /// Printer id (PrintNode) or name (bridge)
        #[arg(long)]
        printer: String,
        #[arg(long, default_value = "1")]
        copies: u32,
        #[arg(long, value_enum, default_value = "printnode")]
        via: Via,
        #[arg(long, value_enum, default_value = "pdf")]
        payload: PayloadArg,
        #[arg(long, env = "PRINTNODE_API_KEY", hide_env_values = true)]
        api_key: Option<String>,
        #[arg(long, default_value = cardlabel::dispatch::DEFAULT_PRINTNODE_URL)]
        printnode_url: String,
        #[arg(long, default_value = cardlabel::dispatch::DEFAULT_BRIDGE_URL)]
        bridge_url: String,
        #[command(flatten)]
        settings: SettingsArgs,
    },
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<(), CardLabelError> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Tspl {
            label,
            settings,
            output,
        } => {
            let (layout, data) = load_label(&label)?;
            let options = match &layout {
                Some(layout) => layout_to_tspl(layout, &data, settings.into()),
                None => label_data_to_tspl(&data, settings.into()),
            };
            write_text(output.as_deref(), &build_tspl(&options))?;
        }

        Commands::Preview {
            label,
            output,
            dpi,
            guides,
            editor,
            zoom,
            qr,
        } => {
            let (layout, data) = load_label(&label)?;
            let surface = if editor {
                render_layout_preview(&layout.unwrap_or_default(), &data, PreviewScale::zoom(zoom))
            } else {
                let mut config = layout.as_ref().map(FieldConfig::from).unwrap_or_default();
                config.qr = qr.into();
                let mut surface = LabelSurface::new(PreviewScale::for_output_dpi(dpi));
                render_label_to_canvas(&mut surface, &config, &data, guides)?;
                surface
            };
            std::fs::write(&output, surface.to_png()?)?;
            log::info!(
                "saved {}x{} preview to {}",
                surface.width(),
                surface.height(),
                output.display()
            );
        }

        Commands::Pdf {
            label,
            output,
            dpi,
            qr,
        } => {
            let (layout, data) = load_label(&label)?;
            let mut config = layout.as_ref().map(FieldConfig::from).unwrap_or_default();
            config.qr = qr.into();
            let pdf = cardlabel::render::generate_label_pdf(&config, &data, dpi)?;
            std::fs::write(&output, pdf)?;
            log::info!("saved PDF to {}", output.display());
        }

        Commands::Template {
            file,
            engine,
            values,
            data,
        } => {
            let body = std::fs::read_to_string(&file)?;
            let mut map = match data {
                Some(path) => read_json::<LabelData>(&path)?.to_values(),
                None => HashMap::new(),
            };
            for pair in &values {
                let (key, value) = pair.split_once('=').ok_or_else(|| {
                    CardLabelError::Validation(format!("expected KEY=VALUE, got '{}'", pair))
                })?;
                map.insert(key.trim().to_string(), value.to_string());
            }
            print!("{}", render_template(&body, &map, engine.into())?);
        }

        Commands::Scene { file, settings } => {
            let scene: Scene = read_json(&file)?;
            print!("{}", build_tspl(&scene_to_options(&scene, settings.into())));
        }

        Commands::Serve {
            listen,
            printer,
            cache_ttl,
            spool_dir,
        } => {
            let config = ServerConfig {
                listen_addr: listen,
                default_printer: printer.clone(),
                printer_cache_ttl: Duration::from_secs(cache_ttl),
            };
            let backend: Arc<dyn RawPrinter> = match spool_dir {
                Some(dir) => Arc::new(SpoolDirPrinter::new(
                    dir,
                    printer.unwrap_or_else(|| "spool".to_string()),
                )),
                None => Arc::new(CupsPrinter),
            };
            runtime()?.block_on(cardlabel::server::serve(config, backend))?;
        }

        Commands::Print {
            label,
            batch,
            printer,
            copies,
            via,
            payload,
            api_key,
            printnode_url,
            bridge_url,
            settings,
        } => {
            let (layout, data) = load_label(&label)?;
            let labels = match batch {
                Some(path) => read_json::<Vec<LabelData>>(&path)?,
                None => vec![data],
            };

            let dispatcher: Box<dyn PrintDispatcher> = match via {
                Via::Printnode => {
                    let api_key = api_key.ok_or_else(|| {
                        CardLabelError::Validation(
                            "PrintNode needs --api-key or PRINTNODE_API_KEY".to_string(),
                        )
                    })?;
                    Box::new(PrintNodeClient::new(PrintNodeConfig {
                        api_key,
                        base_url: printnode_url,
                    }))
                }
                Via::Bridge => {
                    if payload == PayloadArg::Pdf {
                        return Err(CardLabelError::Validation(
                            "the print bridge only takes --payload tspl".to_string(),
                        ));
                    }
                    Box::new(BridgeClient::new(bridge_url))
                }
            };

            let settings: PrintSettings = settings.into();
            let outcome = runtime()?.block_on(send_labels(
                dispatcher.as_ref(),
                &printer,
                copies,
                layout,
                labels,
                payload,
                settings,
            ));

            println!(
                "Printed {} label(s), {} failed",
                outcome.success_count, outcome.failed_count
            );
            if let Some(error) = outcome.first_error {
                return Err(CardLabelError::Dispatch(error));
            }
        }
    }

    Ok(())
}

async fn send_labels(
    dispatcher: &dyn PrintDispatcher,
    printer: &str,
    copies: u32,
    layout: Option<LabelLayout>,
    labels: Vec<LabelData>,
    payload: PayloadArg,
    settings: PrintSettings,
) -> BatchOutcome {
    let config = layout.as_ref().map(FieldConfig::from).unwrap_or_default();

    print_batch(dispatcher, printer, copies, labels, |data| {
        let config = config.clone();
        let layout = layout.clone();
        async move {
            match payload {
                PayloadArg::Pdf => generate_label_pdf_async(config, data, PRINTER_DPI)
                    .await
                    .map(PrintDocument::Raster),
                PayloadArg::Tspl => {
                    let options = match &layout {
                        Some(layout) => layout_to_tspl(layout, &data, settings),
                        None => label_data_to_tspl(&data, settings),
                    };
                    Ok(PrintDocument::Raw(build_tspl(&options)))
                }
            }
        }
    })
    .await
}

fn runtime() -> Result<tokio::runtime::Runtime, CardLabelError> {
    Ok(tokio::runtime::Runtime::new()?)
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, CardLabelError> {
    let text = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&text)?)
}

/// Layout (if given) and data with flag overrides applied.
fn load_label(args: &LabelArgs) -> Result<(Option<LabelLayout>, LabelData), CardLabelError> {
    let layout = match &args.layout {
        Some(path) => Some(LabelLayout::from_json(&std::fs::read_to_string(path)?)?),
        None => None,
    };

    let mut data = match &args.data {
        Some(path) => read_json::<LabelData>(path)?,
        None => LabelData::default(),
    };
    let overrides = [
        (&args.title, &mut data.title),
        (&args.sku, &mut data.sku),
        (&args.price, &mut data.price),
        (&args.lot, &mut data.lot),
        (&args.condition, &mut data.condition),
        (&args.barcode, &mut data.barcode),
    ];
    for (flag, field) in overrides {
        if let Some(value) = flag {
            *field = value.clone();
        }
    }

    Ok((layout, data))
}

fn write_text(path: Option<&Path>, text: &str) -> Result<(), CardLabelError> {
    match path {
        Some(path) => {
            std::fs::write(path, text)?;
            log::info!("wrote {}", path.display());
        }
        None => print!("{}", text),
    }
    Ok(())
}
