use clap::Parser;
use virtual_tryon::adapters::NewGarment;
use virtual_tryon::utils::logger;
use virtual_tryon::{Catalog, CliConfig};

fn initial_garments() -> Vec<NewGarment> {
    vec![
        NewGarment::new("Blue Shirt", "/garments/shirt-1.png", Some("shirt")),
        NewGarment::new("Summer Dress", "/garments/dress-1.png", Some("dress")),
        NewGarment::new("Leather Jacket", "/garments/jacket-1.png", Some("jacket")),
    ]
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();
    logger::init_cli_logger(cli.verbose);

    let config = cli.load()?;
    println!("📂 Opening catalog at {}", config.database.url);
    let catalog = Catalog::connect(&config.database.url).await?;

    let garments = initial_garments();
    catalog.replace_garments(&garments).await?;

    println!("✅ Seeded {} garments", garments.len());
    Ok(())
}
