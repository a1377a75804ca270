#![forbid(unsafe_code)]

use std::env;
use std::time::{SystemTime, UNIX_EPOCH};

use automod_kernel_contracts::UnixTimeMs;
use automod_os::admin::AutomodAdmin;
use automod_storage::document::JsonFileStore;
use automod_storage::documents::{ConfigDocument, StrikeDocument};
use automod_storage::paths;
use automod_tools::admin_cli::{execute_admin_command, USAGE};
use automod_tools::logging::init_logging;

fn main() {
    if let Err(err) = run() {
        eprintln!("{err}");
        std::process::exit(2);
    }
}

fn run() -> Result<(), String> {
    let mut args: Vec<String> = env::args().skip(1).collect();
    let verbosity = args.iter().filter(|a| a.as_str() == "-v").count();
    args.retain(|a| a != "-v");
    init_logging(u8::try_from(verbosity).unwrap_or(u8::MAX));

    if args.is_empty() {
        return Err(USAGE.to_string());
    }

    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|e| format!("system clock before unix epoch: {e}"))?;
    let now = UnixTimeMs(u64::try_from(now.as_millis()).map_err(|e| e.to_string())?);

    let config_store: JsonFileStore<ConfigDocument> = JsonFileStore::new(paths::config_path());
    let strike_store: JsonFileStore<StrikeDocument> = JsonFileStore::new(paths::strikes_path());
    let mut admin = AutomodAdmin::open(config_store, strike_store);
    let argv: Vec<&str> = args.iter().map(String::as_str).collect();
    let output = execute_admin_command(&mut admin, &argv, now)?;
    if !output.is_empty() {
        println!("{output}");
    }
    Ok(())
}
