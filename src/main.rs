// Entry point and high-level CLI flow.
//
// - Option [1] loads and cleans the rejection export, printing diagnostics.
// - Option [2] writes every report plus a JSON summary for the current
//   filter selections.
// - Option [3] adjusts the period/line/SKU filters.
// - Option [4] discards the loaded data.
use clap::Parser;
use once_cell::sync::Lazy;
use reject_report::calendar::PERIODS;
use reject_report::config::AnalyzerConfig;
use reject_report::filter::Dimension;
use reject_report::loader;
use reject_report::output;
use reject_report::reports::{self, ReportKind};
use reject_report::session::{FilterCommand, Session};
use reject_report::sku::SkuMaster;
use reject_report::util;
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard, PoisonError};

#[derive(Debug, Parser)]
#[command(name = "reject_report", about = "Rejected units analyzer")]
struct Args {
    /// Rejection export (CSV) to analyze.
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Item master CSV with `Name` and `Description` columns.
    #[arg(long)]
    sku_master: Option<PathBuf>,

    /// Optional TOML config with production totals and report sizes.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory for report files.
    #[arg(short, long)]
    out_dir: Option<PathBuf>,

    /// Log at info level (RUST_LOG still wins when set).
    #[arg(short, long)]
    verbose: bool,
}

// Loaded once, reused across menu choices. All filter mutation and view
// recomputation goes through this lock.
static APP_STATE: Lazy<Mutex<AppState>> = Lazy::new(|| {
    Mutex::new(AppState {
        session: Session::new(),
        config: AnalyzerConfig::default(),
    })
});

struct AppState {
    session: Session,
    config: AnalyzerConfig,
}

fn state() -> MutexGuard<'static, AppState> {
    APP_STATE.lock().unwrap_or_else(PoisonError::into_inner)
}

fn read_line(prompt: &str) -> String {
    print!("{}", prompt);
    let _ = io::stdout().flush();
    let mut buf = String::new();
    io::stdin().read_line(&mut buf).ok();
    buf.trim().to_string()
}

/// Read a single line of input after printing the common "Enter choice:" prompt.
fn read_choice() -> String {
    read_line("Enter choice: ")
}

/// Ask whether to go back to the menu after generating reports.
///
/// Returns `true` if the user chose `Y`, `false` if they chose `N`.
fn prompt_back_to_menu() -> bool {
    loop {
        let resp = read_line("Back to Report Selection (Y/N): ").to_uppercase();
        match resp.as_str() {
            "Y" => return true,
            "N" => return false,
            _ => println!("Invalid choice. Please enter Y or N."),
        }
    }
}

fn print_dashboard(session: &Session) {
    let view = session.view();
    let dash = view.dashboard();
    let original = session.store().map(|s| s.len()).unwrap_or(0);
    println!(
        "Total Rejections: {} (of {} loaded)",
        util::format_int(dash.total_rejections),
        util::format_int(original)
    );
    println!("Top Reason: {}", dash.top_reason);
    println!("Date Range: {}\n", dash.date_range);
}

/// Handle option [1]: load and clean the rejection export.
///
/// On success the records replace whatever was loaded before and the filter
/// selections are rebuilt. On failure nothing changes.
fn handle_load() {
    let mut st = state();
    let path = st.config.input.clone();
    let skus = SkuMaster::load_or_empty(&st.config.sku_master);
    match loader::load_and_clean(&path, &skus) {
        Ok((store, report)) => {
            println!(
                "Processing dataset... ({} rows loaded, {} unreadable)",
                util::format_int(report.total_rows),
                util::format_int(report.unreadable_rows)
            );
            println!(
                "Note: {} rows have no valid reject datetime, {} fall outside the period calendar.",
                util::format_int(report.invalid_timestamps),
                util::format_int(report.unknown_periods)
            );
            if !skus.is_empty() {
                println!(
                    "Info: Mapped {} of {} SKU records to descriptions.",
                    util::format_int(report.skus_resolved),
                    util::format_int(report.skus_present)
                );
            }
            println!();
            st.session.load(store);
            print_dashboard(&st.session);
        }
        Err(e) => {
            eprintln!("Failed to load file: {}\n", e);
        }
    }
}

/// Handle option [2]: write every report and the JSON summary.
///
/// Side effects: one CSV per report, `summary.json`, and Markdown previews
/// printed to the console.
fn handle_generate_reports() {
    let st = state();
    let Some(filter) = st.session.filter() else {
        println!("Error: No data loaded. Please load the export first (option 1).\n");
        return;
    };
    let config = &st.config;
    let view = st.session.view();

    println!("Generating reports...");
    println!("Outputs saved to individual files...\n");

    if let Err(e) = std::fs::create_dir_all(&config.out_dir) {
        eprintln!("Cannot create output directory {}: {}", config.out_dir.display(), e);
        return;
    }
    for (idx, kind) in ReportKind::ALL.iter().enumerate() {
        println!("Report {}: {}", idx + 1, kind.title());
        if let Err(e) = kind.emit(&view, config, &config.out_dir, 3) {
            eprintln!("Write error: {}", e);
        }
    }

    let summary = reports::generate_summary(&view, filter, &config.production);
    if let Err(e) = output::write_json(&config.out_dir.join("summary.json"), &summary) {
        eprintln!("Write error: {}", e);
    }
    println!("Summary Stats (summary.json):");
    println!(
        "{{\"total_rejections\": {}, \"overall_rejection_rate\": {}%}}\n",
        util::format_int(summary.total_rejections),
        util::format_number(summary.overall_rejection_rate, 2)
    );
}

fn print_filters(session: &Session) {
    let Some(filter) = session.filter() else {
        return;
    };
    for dimension in Dimension::ALL {
        let sel = filter.selection(dimension);
        println!(
            "{} ({} of {} selected):",
            dimension,
            sel.selected_count(),
            sel.enabled_count()
        );
        for choice in sel.choices() {
            let mark = match (choice.enabled, choice.selected) {
                (false, _) => "   ",
                (true, true) => "[x]",
                (true, false) => "[ ]",
            };
            match PERIODS.iter().find(|p| p.label == choice.value) {
                Some(period) => println!("  {} {}: {}", mark, choice.value, period.describe()),
                None => println!("  {} {}", mark, choice.value),
            }
        }
    }
    println!();
}

/// Handle option [3]: adjust the filter selections.
///
/// Commands: `all <dim>`, `reset <dim>`, `solo <dim> <value>`,
/// `toggle <dim> <value>`; an empty line returns to the menu.
fn handle_filters() {
    if !state().session.is_loaded() {
        println!("Error: No data loaded. Please load the export first (option 1).\n");
        return;
    }
    print_filters(&state().session);
    println!("Filter commands: all|reset <periods|lines|skus>, solo|toggle <dimension> <value>");
    println!("(empty line to return)\n");
    loop {
        let line = read_line("filter> ");
        if line.is_empty() {
            break;
        }
        if line.eq_ignore_ascii_case("show") {
            print_filters(&state().session);
            continue;
        }
        match line.parse::<FilterCommand>() {
            Ok(cmd) => {
                let mut st = state();
                st.session.apply(&cmd);
                let original = st.session.store().map(|s| s.len()).unwrap_or(0);
                println!(
                    "Filtered data: {} rows (original: {} rows)",
                    util::format_int(st.session.view().len()),
                    util::format_int(original)
                );
            }
            Err(e) => println!("{}", e),
        }
    }
    print_dashboard(&state().session);
}

/// Handle option [4]: drop the loaded data and its filter state.
fn handle_clear() {
    state().session.clear();
    println!("Loaded data cleared.\n");
}

fn init_logging(verbose: bool) {
    let level = if verbose {
        log::LevelFilter::Info
    } else {
        log::LevelFilter::Warn
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
}

fn main() {
    let args = Args::parse();
    init_logging(args.verbose);

    let mut analyzer = match AnalyzerConfig::load_or_default(args.config.as_deref()) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Warning: {}. Using defaults.", e);
            AnalyzerConfig::default()
        }
    };
    if let Some(input) = args.input {
        analyzer.input = input;
    }
    if let Some(sku_master) = args.sku_master {
        analyzer.sku_master = sku_master;
    }
    if let Some(out_dir) = args.out_dir {
        analyzer.out_dir = out_dir;
    }
    state().config = analyzer;

    loop {
        println!("Rejected Units Analyzer:");
        println!("[1] Load the file");
        println!("[2] Generate Reports");
        println!("[3] Adjust Filters");
        println!("[4] Clear Data\n");
        match read_choice().as_str() {
            "1" => handle_load(),
            "2" => {
                println!();
                handle_generate_reports();
                if !prompt_back_to_menu() {
                    println!("Exiting the program.");
                    break;
                }
            }
            "3" => handle_filters(),
            "4" => handle_clear(),
            _ => println!("Invalid choice. Please enter 1, 2, 3 or 4.\n"),
        }
    }
}
