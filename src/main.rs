// src/main.rs

use dagrun::{cli, logging, run};

#[tokio::main]
async fn main() {
    match run_main().await {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(err) => {
            eprintln!("dagrun error: {err:?}");
            std::process::exit(1);
        }
    }
}

/// Returns whether the run (if any) fully succeeded.
async fn run_main() -> anyhow::Result<bool> {
    let args = cli::parse();
    logging::init_logging(args.log_level)?;

    match run(args).await? {
        Some(summary) => {
            eprintln!("{summary}");
            Ok(summary.is_success())
        }
        None => Ok(true),
    }
}
