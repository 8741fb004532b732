use barbershop::{Config, build_rocket};

#[rocket::main]
async fn main() {
    let _ = dotenvy::dotenv();

    let config = match Config::load() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("Failed to load configuration: {err}");
            std::process::exit(1);
        }
    };

    if let Err(err) = build_rocket(config).launch().await {
        tracing::error!(error = %err, "server stopped with an error");
        std::process::exit(1);
    }
}
