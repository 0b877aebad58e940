use anyhow::{Context, Result};
use clap::Parser;
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use crypttui::App;
use crypttui::cli::{Cli, Commands};
use crypttui::command::SystemRunner;
use crypttui::device;
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use std::io;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    // Logs go to stderr so they never bleed into the alternate screen.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Some(Commands::List { json }) => run_list(json),
        None => run_tui(),
    }
}

fn run_list(json: bool) -> Result<()> {
    let devices = device::scan(&SystemRunner).context("failed to enumerate devices")?;
    if json {
        println!("{}", serde_json::to_string_pretty(&devices)?);
    } else {
        for device in &devices {
            println!("{}\t{}", device.label(), device.status_line());
        }
    }
    Ok(())
}

fn run_tui() -> Result<()> {
    enable_raw_mode().context("failed to enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).context("failed to enter alternate screen")?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new();
    let result = app.run(&mut terminal);

    // Restore the terminal even when the loop bailed out with an error.
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result.map_err(Into::into)
}
