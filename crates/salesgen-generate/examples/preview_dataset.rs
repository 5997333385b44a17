use std::env;
use std::path::PathBuf;

use salesgen_generate::{GenerationConfig, PriorCustomers, build_catalog, synthesize};
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let mut args = env::args().skip(1);
    let mut config_path: Option<PathBuf> = None;
    let mut rows = 5_usize;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" => config_path = args.next().map(PathBuf::from),
            "--rows" => rows = args.next().ok_or("missing --rows value")?.parse()?,
            _ => return Err(format!("unexpected argument '{arg}'").into()),
        }
    }

    let config = match config_path {
        Some(path) => GenerationConfig::from_toml_path(&path)?,
        None => GenerationConfig {
            sales: 50,
            ..GenerationConfig::default()
        },
    };
    let catalog = build_catalog(&config.taxonomy);
    let dataset = synthesize(&config, &catalog, PriorCustomers::Absent)?;

    for customer in dataset.customers.iter().take(rows) {
        println!(
            "customer {} {} <{}> {}/{}",
            customer.id, customer.name, customer.email, customer.city, customer.state
        );
    }
    for sale in dataset.sales.iter().take(rows) {
        println!(
            "sale {} {} customer={} product={} qty={} total={}",
            sale.id, sale.timestamp, sale.customer_id, sale.product_id, sale.quantity, sale.total
        );
    }
    println!(
        "customers={} sales={}",
        dataset.customers.len(),
        dataset.sales.len()
    );
    Ok(())
}
