// Entry point and interactive CLI flow.
//
// - Option [1] asks for a site id and loads that site's report from the
//   aggregated export, printing a preview.
// - Option [2] exports the loaded report as XLSX, CSV and a JSON summary.
// - Option [3] prints the age pyramids when a pyramid file was given.
use chrono::Datelike;
use clap::Parser;
use site_report::config::ExportConfig;
use site_report::pyramid::{build_pyramids, PyramidRow, POPULATION_AGE_ORDER, UNDER5_AGE_ORDER};
use site_report::session::{LoadOutcome, ReportSession, ReportState};
use site_report::source::FileRowSource;
use site_report::{export, output, reports, util};
use std::io::{self, Write};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "site_report", about = "HDSS site indicator report")]
struct Cli {
    /// Aggregated indicator export (.csv or .json)
    input: PathBuf,

    /// Load this site right away
    #[arg(long)]
    site: Option<u32>,

    /// Directory the exports are written to
    #[arg(long, default_value = ".")]
    out_dir: PathBuf,

    /// TOML file overriding export layout
    #[arg(long)]
    config: Option<PathBuf>,

    /// Age pyramid rows (JSON)
    #[arg(long)]
    pyramids: Option<PathBuf>,

    /// Treat the pyramid rows as under-5 yearly bands
    #[arg(long)]
    under5: bool,

    /// Indicator rows shown in the terminal preview
    #[arg(long, default_value_t = 25)]
    preview_rows: usize,
}

struct App {
    session: ReportSession<FileRowSource>,
    cfg: ExportConfig,
    cli: Cli,
}

fn read_choice(prompt: &str) -> String {
    print!("{}", prompt);
    let _ = io::stdout().flush();
    let mut buf = String::new();
    io::stdin().read_line(&mut buf).ok();
    buf.trim().to_string()
}

/// Ask whether to go back to the menu after an export.
///
/// Returns `true` for `Y`, `false` for `N`.
fn prompt_back_to_menu() -> bool {
    loop {
        match read_choice("Back to menu (Y/N): ").to_uppercase().as_str() {
            "Y" => return true,
            "N" => return false,
            _ => println!("Invalid choice. Please enter Y or N."),
        }
    }
}

/// Handle option [1]: load a site and print its preview, or the state
/// that explains why there is nothing to show.
async fn handle_load(app: &App, site: Option<u32>) {
    let site = match site {
        Some(s) => Some(s),
        None => util::parse_u32_safe(Some(&read_choice("Site id: "))),
    };
    if app.session.load(site).await == LoadOutcome::Superseded {
        return;
    }
    match app.session.state() {
        ReportState::NoSiteSelected => {
            println!("No site selected. Please enter a positive site id.\n");
        }
        ReportState::Failed { message, .. } => {
            eprintln!("{}\n", message);
        }
        ReportState::Empty { table } => {
            println!("{}", output::render_table(&table, Some(app.cli.preview_rows)));
        }
        ReportState::Ready { table, duplicates } => {
            println!("{}", output::render_table(&table, Some(app.cli.preview_rows)));
            if !duplicates.is_empty() {
                println!(
                    "Note: {} indicator/year pairs appeared more than once; the later value was kept.\n",
                    util::format_int(duplicates.len())
                );
            }
        }
        ReportState::Idle | ReportState::Loading { .. } => {}
    }
}

/// Handle option [2]: write the XLSX workbook, the CSV grid and the JSON
/// summary for the loaded report.
fn handle_export(app: &App) {
    let state = app.session.state();
    let (table, duplicates) = match &state {
        ReportState::Ready { table, duplicates } => (table, duplicates.len()),
        ReportState::Empty { .. } => {
            println!("Nothing to export: this site has no data.\n");
            return;
        }
        _ => {
            println!("Error: No report loaded. Please load a site first (option 1).\n");
            return;
        }
    };

    let year = table.header.generated_at.year();
    let xlsx_name = export::export_file_name(&app.cfg, table.header.site_id, year);
    let xlsx_path = app.cli.out_dir.join(&xlsx_name);
    if let Err(e) = export::write_xlsx(&xlsx_path, table, &app.cfg) {
        eprintln!("Write error: {}", e);
    } else {
        println!("Workbook saved to {}", xlsx_path.display());
    }

    let csv_path = xlsx_path.with_extension("csv");
    if let Err(e) = export::write_csv_layout(&csv_path, table, &app.cfg) {
        eprintln!("Write error: {}", e);
    } else {
        println!("CSV saved to {}", csv_path.display());
    }

    let summary = reports::summarize(table, duplicates);
    let json_path = xlsx_path.with_extension("summary.json");
    if let Err(e) = output::write_json(&json_path, &summary) {
        eprintln!("Write error: {}", e);
    }
    println!(
        "Summary: {} indicators, {} of {} cells blank\n",
        util::format_int(summary.total_indicators),
        util::format_int(summary.blank_cells),
        util::format_int(summary.total_cells)
    );
}

/// Handle option [3]: print the age pyramids.
fn handle_pyramids(app: &App) {
    let Some(path) = &app.cli.pyramids else {
        println!("No pyramid file given (--pyramids).\n");
        return;
    };
    let rows: Vec<PyramidRow> = match std::fs::read_to_string(path)
        .map_err(|e| e.to_string())
        .and_then(|s| serde_json::from_str(&s).map_err(|e| e.to_string()))
    {
        Ok(rows) => rows,
        Err(e) => {
            eprintln!("Failed to read {}: {}\n", path.display(), e);
            return;
        }
    };
    let order = if app.cli.under5 { UNDER5_AGE_ORDER } else { POPULATION_AGE_ORDER };
    println!("{}", output::render_pyramids(&build_pyramids(&rows, order)));
}

#[tokio::main]
async fn main() {
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder().with_env_filter(env).init();

    let cli = Cli::parse();
    let cfg = match &cli.config {
        Some(path) => match ExportConfig::load(path) {
            Ok(cfg) => cfg,
            Err(e) => {
                eprintln!("{}", e);
                std::process::exit(2);
            }
        },
        None => ExportConfig::default(),
    };
    let source = match FileRowSource::new(cli.input.clone()) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(2);
        }
    };
    info!(input = %source.path().display(), "startup");

    let initial_site = cli.site;
    let app = App {
        session: ReportSession::new(source),
        cfg,
        cli,
    };
    if initial_site.is_some() {
        handle_load(&app, initial_site).await;
    }

    loop {
        println!("Select an option:");
        println!("[1] Load site report");
        println!("[2] Export report");
        println!("[3] Age pyramids");
        println!("[0] Exit\n");
        match read_choice("Enter choice: ").as_str() {
            "1" => handle_load(&app, None).await,
            "2" => {
                handle_export(&app);
                if !prompt_back_to_menu() {
                    println!("Exiting the program.");
                    break;
                }
            }
            "3" => handle_pyramids(&app),
            "0" => break,
            _ => println!("Invalid choice. Please enter 0, 1, 2 or 3.\n"),
        }
    }
}
