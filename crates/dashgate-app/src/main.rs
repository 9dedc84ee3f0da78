//! Terminal shell for dashgate.
//!
//! Reads one command per line from stdin and renders the current view as
//! text. Time-driven state (the simulated upload) advances on a monotonic
//! clock before every command.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use clap::Parser;
use dashgate_app::{
    AppConfig, AppError, AppState, app_version, init_logging, load_dashboard, open_storage,
    parse_system_theme, project_shell, redact_sensitive,
};
use dashgate_auth::DemoAuthenticator;
use dashgate_dashboard::{ReportLoadState, Trend};
use dashgate_ui::{SIDEBAR_LINKS, View};
use dashgate_upload::{FileHandle, SimulatedBackend, Slot, SubmitOutcome, TaskState};

#[derive(Parser, Debug)]
#[command(name = "dashgate", version, about = "Metrics dashboard and media upload shell")]
struct Args {
    /// Directory holding durable storage.
    #[arg(long, env = "DASHGATE_DATA_DIR", default_value = ".dashgate")]
    data_dir: PathBuf,

    /// Ambient theme used until the user toggles (`dark` or `light`).
    #[arg(long, env = "DASHGATE_SYSTEM_THEME", default_value = "light")]
    system_theme: String,

    /// Dashboard JSON document replacing the built-in dashboard.
    #[arg(long, env = "DASHGATE_DASHBOARD_FILE")]
    dashboard_file: Option<PathBuf>,

    /// Seed for preview handle generation.
    #[arg(long, default_value_t = 0)]
    preview_seed: u64,

    /// Tracing filter directives; defaults to `RUST_LOG`, then `dashgate=info`.
    #[arg(long)]
    log_filter: Option<String>,
}

fn main() {
    let args = Args::parse();
    init_logging(args.log_filter.as_deref());

    if let Err(error) = run(args) {
        tracing::error!(%error, "shell terminated");
        eprintln!("failed to start dashgate: {error}");
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<(), AppError> {
    let config = AppConfig {
        data_dir: args.data_dir,
        system_theme: parse_system_theme(&args.system_theme),
        preview_seed: args.preview_seed,
        dashboard_file: args.dashboard_file,
    };
    tracing::info!(
        version = app_version(),
        storage = %config.storage_path().display(),
        "starting dashgate"
    );

    let storage = open_storage(&config.storage_path())?;
    let dashboard = match load_dashboard(config.dashboard_file.as_deref()) {
        Ok(dashboard) => dashboard,
        Err(error) => {
            tracing::warn!(%error, "using built-in dashboard");
            load_dashboard(None)?
        }
    };
    let mut state = AppState::new(
        storage,
        Arc::new(DemoAuthenticator::default()),
        Arc::new(SimulatedBackend::default()),
        dashboard,
        &config,
    )?;

    let clock = Instant::now();
    let now_ms = || clock.elapsed().as_millis() as u64;

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    render(&state, &mut stdout)?;

    for line in stdin.lock().lines() {
        let line = line?;
        state.tick(now_ms());

        match execute(&mut state, line.trim(), now_ms) {
            Ok(Flow::Continue) => {}
            Ok(Flow::Quit) => break,
            Err(error) => {
                tracing::debug!(command = %redact_sensitive(&line), %error, "command failed");
                writeln!(stdout, "! {error}")?;
            }
        }

        state.tick(now_ms());
        render(&state, &mut stdout)?;
    }

    state.shutdown();
    tracing::info!("shell closed");
    Ok(())
}

enum Flow {
    Continue,
    Quit,
}

fn execute(
    state: &mut AppState,
    line: &str,
    now_ms: impl Fn() -> u64,
) -> Result<Flow, AppError> {
    let mut words = line.split_whitespace();
    let Some(command) = words.next() else {
        return Ok(Flow::Continue);
    };
    let rest: Vec<&str> = words.collect();

    match (command, rest.as_slice()) {
        ("quit" | "exit", _) => return Ok(Flow::Quit),
        ("help", _) => print_help(),
        ("go", [path]) => {
            state.navigate(path)?;
        }
        ("login", [email, password]) => {
            if let Err(error) = state.login(email, password) {
                tracing::debug!(%error, "login command rejected");
            }
        }
        ("logout", []) => {
            state.logout()?;
        }
        ("theme", []) => {
            state.toggle_theme();
        }
        ("menu", []) => state.toggle_sidebar(),
        ("profile", []) => state.toggle_profile_menu(),
        ("product", [index]) => {
            if let Ok(index) = index.parse::<usize>() {
                state.select_product(index);
            }
        }
        ("report", ["loaded"]) => state.report_loaded(),
        ("report", ["failed"]) => state.report_failed(),
        ("select", [slot, path]) => {
            if let (Some(slot), Some(form)) = (Slot::parse(slot), state.upload_mut()) {
                let handle = FileHandle::from_path(path)?;
                form.select(slot, handle);
            }
        }
        ("remove", [slot]) => {
            if let (Some(slot), Some(form)) = (Slot::parse(slot), state.upload_mut()) {
                form.remove(slot);
            }
        }
        ("submit", []) => {
            if let Some(form) = state.upload_mut()
                && form.submit(now_ms())? == SubmitOutcome::NotReady
            {
                println!("Select a valid video file before uploading.");
            }
        }
        ("cancel", []) => {
            if let Some(form) = state.upload_mut() {
                form.cancel();
            }
        }
        ("wait", [millis]) => {
            if let Ok(millis) = millis.parse::<u64>() {
                std::thread::sleep(Duration::from_millis(millis));
            }
        }
        _ => println!("unknown command; type `help`"),
    }

    Ok(Flow::Continue)
}

fn print_help() {
    println!(
        "commands:
  go <path>                  navigate (/login, /dashboard, /upload, ...)
  login <email> <password>   sign in
  logout                     sign out
  theme                      toggle dark/light
  menu | profile             toggle sidebar / profile menu
  product <n>                select product tab
  report loaded|failed       embedded report events
  select <slot> <file>       pick video/image/subtitle file
  remove <slot>              clear a slot
  submit | cancel            start or abandon the upload
  wait <ms>                  let time pass
  quit"
    );
}

fn render(state: &AppState, out: &mut impl Write) -> Result<(), AppError> {
    let text = render_view(state);
    out.write_all(text.as_bytes())?;
    out.flush()?;
    Ok(())
}

fn render_view(state: &AppState) -> String {
    let status = project_shell(state);
    let mut text = String::new();
    let theme = status.theme.as_str();

    match status.view {
        View::Login => {
            text.push_str(&format!("== Sign in to your account [{theme}] ==\n"));
            if let Some(error) = state.login_error() {
                text.push_str(&format!("  ! {error}\n"));
            }
            text.push_str("  login <email> <password>\n");
        }
        View::Dashboard | View::Upload => {
            let user = status.user_name.as_deref().unwrap_or("");
            text.push_str(&format!("== dashgate {} | {user} | {theme} ==\n", app_version()));
            let links: Vec<String> = SIDEBAR_LINKS
                .iter()
                .map(|link| {
                    if Some(link.name) == status.active_link {
                        format!("[{}]", link.name)
                    } else {
                        link.name.to_string()
                    }
                })
                .collect();
            text.push_str(&format!("  {}\n", links.join("  ")));
            if status.view == View::Dashboard {
                render_dashboard(state, user, &mut text);
            } else {
                render_upload(state, &mut text);
            }
        }
    }

    text.push_str("> ");
    text
}

fn render_dashboard(state: &AppState, user: &str, text: &mut String) {
    let dashboard = state.dashboard();
    let palette = state.palette();
    text.push_str(&format!("  {}\n", dashboard.greeting(user)));
    for metric in &dashboard.welcome_metrics {
        text.push_str(&format!("    {}: {}\n", metric.label, metric.value));
    }
    for card in &dashboard.stats {
        let arrow = match card.trend() {
            Trend::Up => "+",
            Trend::Down => "-",
        };
        text.push_str(&format!(
            "  {} {} ({} {arrow})\n",
            card.title, card.value, card.change
        ));
    }
    for chart in &dashboard.charts {
        text.push_str(&format!(
            "  {} [{:?}, grid {}]\n",
            chart.title, chart.kind, palette.grid
        ));
        for dataset in &chart.datasets {
            let values: Vec<String> = dataset.data.iter().map(|value| value.to_string()).collect();
            text.push_str(&format!(
                "    {}: {}\n",
                dataset.label.as_deref().unwrap_or("-"),
                values.join(" ")
            ));
        }
    }
    if let Some(product) = state.products().active() {
        text.push_str(&format!("  product: {product}\n"));
    }
    match state.report().state() {
        ReportLoadState::Loading => text.push_str("  report: loading...\n"),
        ReportLoadState::Loaded => {
            text.push_str(&format!("  report: {}\n", state.report().url()));
        }
        ReportLoadState::Failed => {
            if let Some((message, hint)) = state.report().fallback_message() {
                text.push_str(&format!("  report: {message}. {hint}\n"));
            }
        }
    }
}

fn render_upload(state: &AppState, text: &mut String) {
    let Some(form) = state.upload() else {
        return;
    };
    text.push_str("  Upload Video\n");
    for slot in Slot::ALL {
        match form.selection(slot) {
            Some(selected) => {
                text.push_str(&format!(
                    "    {slot}: {} ({})",
                    selected.name, selected.size_label
                ));
                if let Some(message) = &selected.error_message {
                    text.push_str(&format!(" ! {message}"));
                }
                text.push('\n');
            }
            None => text.push_str(&format!("    {slot}: -\n")),
        }
    }
    let task = match form.task() {
        TaskState::Idle => "ready".to_string(),
        TaskState::Running(_) => "uploading...".to_string(),
        TaskState::Succeeded { .. } => "upload successful".to_string(),
        TaskState::Failed(message) => format!("failed: {message}"),
        TaskState::Cancelled => "cancelled".to_string(),
    };
    text.push_str(&format!("  status: {task}\n"));
}
