use std::process::ExitCode;

use clap::Parser;
use clap::error::ErrorKind;
use log::{error, info};
use rgbblit_cli::app::{App, Outcome};
use rgbblit_cli::args::{Cli, USAGE};

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            let _ = e.print();
            return ExitCode::SUCCESS;
        }
        Err(e) => {
            let _ = e.print();
            return ExitCode::FAILURE;
        }
    };
    let worker = cli.worker_index;

    match App::new(cli).and_then(|app| app.run()) {
        Ok(Outcome::Usage) => {
            eprintln!("{USAGE}");
            ExitCode::SUCCESS
        }
        Ok(Outcome::Rendered(stats)) => {
            info!("r0: painted {} pixels", stats.received);
            ExitCode::SUCCESS
        }
        Ok(Outcome::Worked(_)) => ExitCode::SUCCESS,
        Err(e) => {
            match worker {
                Some(index) => error!("w{index}: {e:#}"),
                None => error!("r0: {e:#}"),
            }
            ExitCode::FAILURE
        }
    }
}
