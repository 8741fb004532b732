use barbershop::{Config, SeedOutcome, count_records, init_tracing, seed_admin};

fn print_usage(bin_name: &str) {
    eprintln!("Usage: {bin_name} <seed-admin | check-db>");
}

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();

    let mut args = std::env::args();
    let bin_name = args.next().unwrap_or_else(|| "barbershop-admin".to_string());
    let command = args.next();

    if args.next().is_some() {
        print_usage(&bin_name);
        std::process::exit(2);
    }

    let config = match Config::load() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("Failed to load configuration: {err}");
            std::process::exit(1);
        }
    };

    init_tracing(&config.logging.level, config.logging.json_format);

    match command.as_deref() {
        Some("seed-admin") => match seed_admin(&config).await {
            Ok(SeedOutcome::Created(id)) => println!("Administrator created: id={id}"),
            Ok(SeedOutcome::Promoted(id)) => println!("Existing account promoted to ADMIN: id={id}"),
            Ok(SeedOutcome::AlreadyAdmin(id)) => println!("Administrator already present: id={id}"),
            Err(err) => {
                eprintln!("Seeding failed: {err:?}");
                std::process::exit(1);
            }
        },
        Some("check-db") => match count_records(&config).await {
            Ok(counts) => println!(
                "Database reachable: users={}, services={}, appointments={}",
                counts.users, counts.services, counts.appointments
            ),
            Err(err) => {
                eprintln!("Database check failed: {err:?}");
                std::process::exit(1);
            }
        },
        _ => {
            print_usage(&bin_name);
            std::process::exit(2);
        }
    }
}
