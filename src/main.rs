use std::{
    io::{self, BufWriter},
    path::PathBuf,
    process::ExitCode,
};

use clap::Parser;
use cyan::{config::ROOT_ENV, Dispatcher, Invocation, Storage, StoreConfig};
use log::debug;

#[derive(Parser)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Name of the database to operate on
    database: String,

    /// Operation to run: `select` or `insert`
    operation: String,

    /// JSON document to store with `insert`
    #[arg(allow_hyphen_values = true)]
    payload: Option<String>,

    /// Sets the directory that holds every database
    #[arg(short, long, value_name = "DIR", env = ROOT_ENV, default_value = ".")]
    root: PathBuf,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    let config = StoreConfig::new(cli.root);
    debug!("using store root {}", config.root.display());

    let dispatcher = Dispatcher::new(Storage::new(config.root));
    let invocation = Invocation::new(cli.database, cli.operation, cli.payload);

    let mut out = BufWriter::new(io::stdout().lock());
    match dispatcher.run(&invocation, &mut out) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            drop(out);
            eprintln!("error: {e}");
            ExitCode::from(e.exit_code())
        }
    }
}
