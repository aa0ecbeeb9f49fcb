use clap::Parser;

use npw_cli::Cli;

fn main() {
    env_logger::init();
    let cli = Cli::parse();
    let mut stdout = std::io::stdout().lock();
    match cli.command.run(&mut stdout) {
        Ok(()) => log::info!("finished."),
        Err(e) => {
            log::error!("npw failed: {e:#}");
            std::process::exit(1);
        }
    }
}
