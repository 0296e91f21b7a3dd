use clap::{Parser, ValueEnum};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

mod api;
mod csv_export;
mod feed;
mod gui;
mod records;
mod session;
mod settings;
mod table;
mod theme;

use api::ApiClient;
use records::CrimeDb;
use settings::{
    default_base_path, ensure_base_folders, load_or_init_settings, save_settings, Settings,
};
use table::{build_rows, TypeFilter};

#[derive(Parser, Debug)]
#[command(
    name = "crimedesk",
    version,
    about = "CrimeDesk - desktop console for the crime records service"
)]
struct CliArgs {
    /// Choose GUI (default) or CLI mode
    #[arg(long, value_enum, default_value = "gui")]
    mode: RunMode,
    /// Override data base path (defaults to ./data next to the exe)
    #[arg(long)]
    base_path: Option<PathBuf>,
    /// Override the backend URL from settings
    #[arg(long)]
    server_url: Option<String>,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum RunMode {
    Gui,
    Cli,
}

fn main() {
    let args = CliArgs::parse();
    let base_path = args.base_path.unwrap_or_else(default_base_path);

    if let Err(e) = ensure_base_folders(&base_path) {
        eprintln!(
            "Failed to create base folders at {}: {}",
            base_path.display(),
            e
        );
        return;
    }

    let mut settings = match load_or_init_settings(&base_path) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Failed to load settings: {}", e);
            return;
        }
    };

    println!("Using data path: {}", base_path.display());

    if let Some(url) = args.server_url {
        settings.server_url = url;
    }
    settings.base_path = base_path.to_string_lossy().to_string();

    // The GUI persists its own settings (theme switches and the like), so
    // only the CLI branch saves here.
    match args.mode {
        RunMode::Gui => {
            if let Err(e) = gui::launch_gui(base_path.clone(), settings.clone()) {
                eprintln!("Failed to start GUI: {}", e);
            }
        }
        RunMode::Cli => {
            run_cli(&settings, &base_path);
            if let Err(e) = save_settings(&settings, &base_path) {
                eprintln!("Could not save settings: {}", e);
            }
        }
    }
}

fn run_cli(settings: &Settings, base_path: &Path) {
    println!("CrimeDesk CLI starting up");
    println!("Base path: {}", base_path.display());
    println!("Server: {}", settings.server_url);
    println!("Type 'help' for commands, 'exit' to quit.\n");

    let api = ApiClient::new(&settings.server_url);
    let mut db = CrimeDb::default();
    refresh(&api, &mut db);

    loop {
        print!("crimedesk> ");
        io::stdout().flush().ok();

        let mut input = String::new();
        if io::stdin().read_line(&mut input).is_err() {
            println!("Error reading input. Exiting.");
            break;
        }

        let input = input.trim();
        if input.is_empty() {
            continue;
        }
        if input.eq_ignore_ascii_case("exit") {
            println!("Goodbye");
            break;
        }

        match input {
            "help" => {
                println!("Commands:");
                println!("  refresh           (re-fetch crime records from the backend)");
                println!("  stats             (totals, open cases, type breakdown)");
                println!("  table [TYPE]      (print the records table, optionally filtered)");
                println!("  export <path>     (write the current snapshot as CSV)");
                println!("  safety <area>     (ask the backend for an area safety score)");
                println!("  hotspots          (list predicted hotspot coordinates)");
                println!("  exit");
            }
            "refresh" => refresh(&api, &mut db),
            "stats" => {
                println!("Crime records: {}", db.total_count());
                println!("Open cases:    {}", db.open_cases());
                println!("By type:");
                for (label, count) in db.type_counts() {
                    println!("  {:<16} {}", label, count);
                }
            }
            "hotspots" => match api.fetch_hotspots() {
                Ok(spots) => {
                    if spots.is_empty() {
                        println!("No hotspot predictions available.");
                    } else {
                        for (i, spot) in spots.iter().enumerate() {
                            println!("  #{:<3} {:.4}, {:.4}", i + 1, spot.lat, spot.lng);
                        }
                    }
                }
                Err(e) => println!("Hotspot fetch failed: {}", e),
            },
            _ if input == "table" || input.starts_with("table ") => {
                let filter = match input.strip_prefix("table ").map(str::trim) {
                    Some(t) if !t.is_empty() && !t.eq_ignore_ascii_case("all") => {
                        TypeFilter::Only(t.to_string())
                    }
                    _ => TypeFilter::All,
                };
                print_table(&db, &filter);
            }
            _ if input.starts_with("export ") => {
                let path = PathBuf::from(input["export ".len()..].trim());
                if path.as_os_str().is_empty() {
                    println!("Usage: export <path.csv>");
                } else if db.is_empty() {
                    println!("No records to export. Run 'refresh' first.");
                } else {
                    let csv = csv_export::render_csv(db.crimes());
                    match std::fs::write(&path, csv) {
                        Ok(()) => println!(
                            "Exported {} records to {}",
                            db.crimes().len(),
                            path.display()
                        ),
                        Err(e) => println!("Could not write CSV: {}", e),
                    }
                }
            }
            _ if input.starts_with("safety ") => {
                let area = input["safety ".len()..].trim();
                if area.is_empty() {
                    println!("Usage: safety <area name>");
                } else {
                    match api.predict_safety(area) {
                        Ok(report) => {
                            println!("{}: {:.1} / 10 ({})", area, report.score, report.label);
                            println!("{}", report.summary);
                        }
                        Err(e) => println!("Safety lookup failed: {}", e),
                    }
                }
            }
            _ => println!("Unknown command. Type 'help' for the list."),
        }
    }
}

fn refresh(api: &ApiClient, db: &mut CrimeDb) {
    match api.fetch_crimes() {
        Ok(batch) => {
            db.replace(batch.count, batch.crimes);
            println!("Loaded {} crime records.", db.total_count());
        }
        Err(e) => {
            db.clear();
            println!("Could not load crime records: {}", e);
        }
    }
}

fn print_table(db: &CrimeDb, filter: &TypeFilter) {
    let rows = build_rows(db.crimes(), filter);
    println!(
        "{:<8} {:<14} {:<20} {:<20} {:<8}",
        "ID", "Type", "Date", "Location", "Arrested"
    );
    for row in rows {
        if row.is_placeholder {
            println!("{}", row.crime_type);
            continue;
        }
        println!(
            "{:<8} {:<14} {:<20} {:<20} {:<8}",
            row.id,
            row.crime_type,
            row.date,
            row.coords,
            if row.arrested { "Yes" } else { "No" }
        );
    }
}
