use std::env;
use std::process;

use log::{error, info};

use expense_report::Config;

fn main() {
    // A .env next to the binary can hold EXPENSE_* overrides.
    let _ = dotenvy::dotenv();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = env::args().collect();
    let assets_dir = match args.len() {
        1 => "assets".to_string(),
        2 => args[1].clone(),
        _ => {
            eprintln!("Usage: expense-report [ASSETS_DIR]");
            process::exit(1);
        }
    };

    let config = Config::from_env(assets_dir);
    match expense_report::run(&config) {
        Ok(path) => info!("done: {}", path.display()),
        Err(e) => {
            error!("{e}");
            process::exit(e.exit_code());
        }
    }
}
