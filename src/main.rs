use meshplane::cli;

fn main() -> anyhow::Result<()> {
    // Load .env file if it exists; flags are read from the environment afterwards
    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            eprintln!("Warning: Error loading .env file: {}", e);
        }
    }

    cli::run_cli()
}
