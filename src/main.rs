use dashlab::{read_commands, Dashboard, DashboardConfig, DashboardError, HELP};
use std::io;

#[tokio::main]
async fn main() -> Result<(), DashboardError> {
    // Set RUST_LOG=info (or debug) to see what the dashboard is doing.
    env_logger::init();

    let config = DashboardConfig::builder().chart_dir("charts").build();
    let dashboard = Dashboard::new(config)?;
    let session = dashboard.open_session();

    println!("{HELP}\n");
    // Blocking stdin reads stay off the runtime so quitting does not wait for a line.
    let sender = session.sender();
    let reader = std::thread::spawn(move || read_commands(io::stdin().lock(), io::stdout(), sender));
    session.run(|page| println!("{page}")).await;

    if reader.is_finished() {
        if let Ok(result) = reader.join() {
            result?;
        }
    }
    Ok(())
}
