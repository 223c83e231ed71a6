//! Shellkit binary entry point.

use std::process::ExitCode;

use shellkit::archive::{self, DirSelector};
use shellkit::cli::{self, Action};
use shellkit::config::Config;
use shellkit::{logging, EchoPolicy, ShellKitError};
use tracing::info;

#[tokio::main]
async fn main() -> ExitCode {
    let args = match cli::parse_args() {
        Ok(args) => args,
        Err(e) => {
            eprintln!("error: {}", e);
            eprintln!("Run 'shellkit --help' for usage.");
            return ExitCode::from(2);
        }
    };

    if args.help {
        cli::print_help();
        return ExitCode::SUCCESS;
    }

    if args.version {
        cli::print_version();
        return ExitCode::SUCCESS;
    }

    let config = match Config::load(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: {}", e);
            return ExitCode::from(2);
        }
    };

    logging::init(Some(config.log_filter()));

    let Some(action) = args.action else {
        cli::print_help();
        return ExitCode::from(2);
    };

    match run(&config, action).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            // Interactive failures already reported on the terminal.
            if !e.suppress_diagnostic() {
                eprintln!("error: {}", e);
            }
            ExitCode::FAILURE
        }
    }
}

async fn run(config: &Config, action: Action) -> Result<(), ShellKitError> {
    match action {
        Action::Run { commands, echo } => {
            let runner = config.runner();
            let outputs = if echo {
                runner.collect_all_echoed(commands).await?
            } else {
                runner.collect_all(commands).await?
            };
            for output in outputs {
                println!("{}", output);
            }
        }
        Action::Exec { commands, quiet } => {
            let mut runner = config.runner();
            if quiet {
                let policy = EchoPolicy {
                    interactive: false,
                    ..runner.echo_policy()
                };
                runner = runner.with_echo(policy);
            }
            runner.interactive_all(commands).await?;
        }
        Action::Untar {
            archive: path,
            dest,
            only,
        } => {
            let selector = only
                .into_iter()
                .fold(DirSelector::new(&dest), |selector, prefix| selector.only(prefix));
            let file = tokio::fs::File::open(&path).await?;
            let summary = archive::untar_files(file, selector.into_selector()).await?;
            info!(
                archive = %path.display(),
                dest = %dest.display(),
                entries = summary.entries,
                written = summary.written,
                "unpacked"
            );
        }
    }

    Ok(())
}
