use std::collections::HashSet;

use chrono::NaiveDate;
use rand::RngCore;
use rust_decimal::{Decimal, RoundingStrategy};

use salesgen_core::{Customer, CustomerId, NormalizedEmail, Product, Sale, sale_total, validate_dataset};
use salesgen_generate::config::{Taxonomy, TaxonomyCategory, TaxonomyEntry};
use salesgen_generate::continuity::ContinuityStatus;
use salesgen_generate::profiles::{PersonProfile, ProfileSource};
use salesgen_generate::{
    Emitter, EmitterError, GenerationConfig, GenerationError, IdentityPolicy, MemoryEmitter,
    PriorCustomers, SaleSynthesizer, TimestampMode, build_catalog, generate_into, synthesize,
};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

fn config_2022(sales: u64) -> GenerationConfig {
    GenerationConfig {
        sales,
        start_date: date(2022, 1, 1),
        end_date: date(2022, 12, 31),
        ..GenerationConfig::default()
    }
}

fn prior_customers(count: usize) -> Vec<Customer> {
    (0..count)
        .map(|index| Customer {
            id: CustomerId::Numeric(10_000 + index as i64),
            name: format!("Cliente Antigo {index}"),
            email: NormalizedEmail::parse(&format!("antigo{index}@yahoo.com.br"))
                .expect("valid email"),
            country: "Brasil".to_string(),
            state: "Paraná".to_string(),
            city: "Curitiba".to_string(),
        })
        .collect()
}

#[test]
fn sales_are_numbered_and_reference_emitted_rows() {
    let config = config_2022(500);
    let catalog = build_catalog(&config.taxonomy);
    let dataset = synthesize(&config, &catalog, PriorCustomers::Absent).expect("synthesize");

    assert_eq!(dataset.sales.len(), 500);
    let ids: Vec<u64> = dataset.sales.iter().map(|sale| sale.id).collect();
    assert_eq!(ids, (1..=500).collect::<Vec<_>>());

    let customer_ids: HashSet<&CustomerId> = dataset.customers.iter().map(|c| &c.id).collect();
    for sale in &dataset.sales {
        assert!(customer_ids.contains(&sale.customer_id));
        let product = catalog.get(sale.product_id).expect("product in catalog");
        assert_eq!(sale.total, sale_total(product.unit_price, sale.quantity));
        assert!((1..=5).contains(&sale.quantity));
    }

    validate_dataset(&dataset.products, &dataset.customers, &dataset.sales)
        .expect("dataset invariants hold");
}

#[test]
fn sub_cent_prices_are_kept_and_only_totals_are_rounded() {
    let taxonomy = Taxonomy::new(vec![TaxonomyCategory {
        name: "Granel".to_string(),
        products: vec![
            TaxonomyEntry {
                name: "Parafuso".to_string(),
                unit_price: Decimal::new(125, 3),
            },
            TaxonomyEntry {
                name: "Arruela".to_string(),
                unit_price: Decimal::new(3335, 3),
            },
        ],
    }])
    .expect("valid taxonomy");
    let config = GenerationConfig {
        taxonomy,
        ..config_2022(200)
    };
    let catalog = build_catalog(&config.taxonomy);
    assert_eq!(catalog.get(1).expect("first product").unit_price, Decimal::new(125, 3));

    let dataset = synthesize(&config, &catalog, PriorCustomers::Absent).expect("synthesize");
    for sale in &dataset.sales {
        let product = catalog.get(sale.product_id).expect("product in catalog");
        let expected = (product.unit_price * Decimal::from(sale.quantity))
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
        assert_eq!(sale.total, expected);
        assert_eq!(sale.total.scale(), 2);
    }
    assert!(
        dataset
            .sales
            .iter()
            .any(|sale| sale.product_id == 1 && sale.quantity % 2 == 1),
        "odd quantities of 0.125 exercise the half-cent rounding"
    );
    validate_dataset(&dataset.products, &dataset.customers, &dataset.sales)
        .expect("dataset invariants hold");
}

#[test]
fn reuse_keeps_customer_count_between_one_and_sales() {
    let config = config_2022(500);
    let catalog = build_catalog(&config.taxonomy);
    let dataset = synthesize(&config, &catalog, PriorCustomers::Absent).expect("synthesize");

    let distinct: HashSet<&CustomerId> = dataset.sales.iter().map(|s| &s.customer_id).collect();
    assert!(!distinct.is_empty());
    assert!(distinct.len() <= 500);
    assert!(dataset.customers.len() < 500, "reuse probability 0.7 should reuse");
    assert!(dataset.summary.pool.reused > 0);
}

#[test]
fn timestamps_stay_inside_the_window() {
    let config = config_2022(300);
    let catalog = build_catalog(&config.taxonomy);
    let dataset = synthesize(&config, &catalog, PriorCustomers::Absent).expect("synthesize");

    let start = date(2022, 1, 1).and_hms_opt(0, 0, 0).unwrap();
    let end = date(2022, 12, 31).and_hms_opt(0, 0, 0).unwrap();
    for sale in &dataset.sales {
        assert!(sale.timestamp >= start && sale.timestamp <= end);
    }
}

#[test]
fn distinct_sorted_timestamps_follow_sale_ids() {
    let config = GenerationConfig {
        timestamps: TimestampMode::DistinctSorted,
        ..config_2022(1000)
    };
    let catalog = build_catalog(&config.taxonomy);
    let dataset = synthesize(&config, &catalog, PriorCustomers::Absent).expect("synthesize");

    assert!(
        dataset
            .sales
            .windows(2)
            .all(|pair| pair[0].timestamp < pair[1].timestamp)
    );
}

#[test]
fn same_seed_reproduces_the_dataset() {
    let config = GenerationConfig {
        identity: IdentityPolicy::RandomToken,
        ..config_2022(200)
    };
    let catalog = build_catalog(&config.taxonomy);

    let a = synthesize(&config, &catalog, PriorCustomers::Loaded(prior_customers(300)))
        .expect("synthesize a");
    let b = synthesize(&config, &catalog, PriorCustomers::Loaded(prior_customers(300)))
        .expect("synthesize b");
    assert_eq!(a.customers, b.customers);
    assert_eq!(a.sales, b.sales);

    let other = GenerationConfig {
        seed: config.seed + 1,
        ..config.clone()
    };
    let c = synthesize(&other, &catalog, PriorCustomers::Absent).expect("synthesize c");
    assert_ne!(a.sales, c.sales);
}

#[test]
fn preserved_customers_lead_the_customer_set() {
    let mut config = config_2022(200);
    config.identity = IdentityPolicy::DeterministicHash;
    config.continuity.fractions_percent = vec![6];
    let catalog = build_catalog(&config.taxonomy);

    let dataset = synthesize(&config, &catalog, PriorCustomers::Loaded(prior_customers(1000)))
        .expect("synthesize");

    assert_eq!(dataset.continuity.status, ContinuityStatus::Sampled);
    assert_eq!(dataset.continuity.preserved, 60);
    assert_eq!(dataset.summary.customers_preserved, 60);
    assert!(
        dataset.customers[..60]
            .iter()
            .all(|customer| customer.email.as_str().starts_with("antigo"))
    );
    assert_eq!(
        dataset.customers.len() as u64,
        60 + dataset.summary.customers_created
    );
    validate_dataset(&dataset.products, &dataset.customers, &dataset.sales)
        .expect("dataset invariants hold");
}

#[test]
fn invalid_config_emits_nothing() {
    let config = GenerationConfig {
        end_date: date(2021, 12, 31),
        ..config_2022(10)
    };
    let catalog = build_catalog(&config.taxonomy);
    let mut emitter = MemoryEmitter::new();

    let result = generate_into(&config, &catalog, Vec::new(), &mut emitter);

    assert!(matches!(result, Err(GenerationError::Config(_))));
    assert!(emitter.products.is_empty());
    assert!(emitter.customers.is_empty());
    assert!(emitter.sales.is_empty());
}

#[test]
fn distinct_mode_with_too_few_seconds_is_rejected() {
    let config = GenerationConfig {
        sales: 100,
        start_date: date(2022, 1, 1),
        end_date: date(2022, 1, 2),
        timestamps: TimestampMode::DistinctSorted,
        ..GenerationConfig::default()
    };
    assert!(config.validate().is_ok());

    let config = GenerationConfig {
        sales: 86_402,
        ..config
    };
    assert!(matches!(config.validate(), Err(GenerationError::Config(_))));
}

/// Rejects any sale whose customer has not been emitted yet.
#[derive(Default)]
struct OrderingEmitter {
    products: HashSet<u32>,
    customers: HashSet<CustomerId>,
    sales: u64,
}

impl Emitter for OrderingEmitter {
    fn emit_product(&mut self, product: &Product) -> Result<(), EmitterError> {
        self.products.insert(product.id);
        Ok(())
    }

    fn emit_customer(&mut self, customer: &Customer) -> Result<(), EmitterError> {
        if !self.customers.insert(customer.id.clone()) {
            return Err(EmitterError::Rejected(format!(
                "customer {} emitted twice",
                customer.id
            )));
        }
        Ok(())
    }

    fn emit_sale(&mut self, sale: &Sale) -> Result<(), EmitterError> {
        if !self.customers.contains(&sale.customer_id) {
            return Err(EmitterError::Rejected(format!(
                "sale {} references unseen customer {}",
                sale.id, sale.customer_id
            )));
        }
        if !self.products.contains(&sale.product_id) {
            return Err(EmitterError::Rejected(format!(
                "sale {} references unseen product {}",
                sale.id, sale.product_id
            )));
        }
        self.sales += 1;
        Ok(())
    }

    fn flush(&mut self) -> Result<(), EmitterError> {
        Ok(())
    }
}

#[test]
fn customers_are_emitted_before_their_first_sale() {
    let config = config_2022(400);
    let catalog = build_catalog(&config.taxonomy);
    let mut emitter = OrderingEmitter::default();

    let summary = generate_into(&config, &catalog, prior_customers(20), &mut emitter)
        .expect("ordering respected");

    assert_eq!(emitter.sales, 400);
    assert_eq!(summary.customers_emitted(), emitter.customers.len() as u64);
}

/// Fails on the n-th sale.
struct FailingEmitter {
    fail_at: u64,
    seen: u64,
    flushed: bool,
}

impl Emitter for FailingEmitter {
    fn emit_product(&mut self, _product: &Product) -> Result<(), EmitterError> {
        Ok(())
    }

    fn emit_customer(&mut self, _customer: &Customer) -> Result<(), EmitterError> {
        Ok(())
    }

    fn emit_sale(&mut self, _sale: &Sale) -> Result<(), EmitterError> {
        self.seen += 1;
        if self.seen == self.fail_at {
            return Err(EmitterError::Rejected("disk full".to_string()));
        }
        Ok(())
    }

    fn flush(&mut self) -> Result<(), EmitterError> {
        self.flushed = true;
        Ok(())
    }
}

#[test]
fn emitter_errors_stop_the_run() {
    let config = config_2022(100);
    let catalog = build_catalog(&config.taxonomy);
    let mut emitter = FailingEmitter {
        fail_at: 10,
        seen: 0,
        flushed: false,
    };

    let result = generate_into(&config, &catalog, Vec::new(), &mut emitter);

    assert!(matches!(
        result,
        Err(GenerationError::Emitter(EmitterError::Rejected(_)))
    ));
    assert_eq!(emitter.seen, 10);
    assert!(!emitter.flushed);
}

/// Cycles through a fixed list of names.
struct ScriptedProfiles {
    names: Vec<&'static str>,
    next: usize,
}

impl ProfileSource for ScriptedProfiles {
    fn next_profile(&mut self, _rng: &mut dyn RngCore) -> PersonProfile {
        let name = self.names[self.next % self.names.len()];
        self.next += 1;
        PersonProfile {
            name: name.to_string(),
            country: "Brasil".to_string(),
            state: "Ceará".to_string(),
            city: "Fortaleza".to_string(),
        }
    }
}

#[test]
fn hashed_identity_resolves_repeated_names_to_existing_customers() {
    let mut config = config_2022(50);
    config.reuse_probability = 0.0;
    config.identity = IdentityPolicy::DeterministicHash;
    config.email.strategy = salesgen_generate::email::EmailStrategy::Plain;
    config.email.domains = vec!["gmail.com".to_string()];
    let catalog = build_catalog(&config.taxonomy);

    let synthesizer = SaleSynthesizer::new(&config, &catalog).expect("valid config");
    let mut profiles = ScriptedProfiles {
        names: vec!["Maria Silva", "João Souza"],
        next: 0,
    };
    let mut emitter = MemoryEmitter::new();
    let summary = synthesizer
        .run(Vec::new(), &mut profiles, &mut emitter)
        .expect("run");

    assert_eq!(emitter.customers.len(), 2);
    assert_eq!(summary.pool.email_collisions, 48);
    assert_eq!(emitter.sales.len(), 50);
    validate_dataset(&emitter.products, &emitter.customers, &emitter.sales)
        .expect("dataset invariants hold");
}
