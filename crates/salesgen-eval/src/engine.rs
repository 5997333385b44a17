use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::str::FromStr;
use std::time::Instant;

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde::de::DeserializeOwned;

use salesgen_core::{Customer, CustomerId, NormalizedEmail, Product, Sale, sale_total};
use salesgen_generate::output::csv::{CUSTOMER_HEADER, PRODUCT_HEADER, SALE_HEADER};
use salesgen_generate::output::write_bytes_atomic;
use salesgen_generate::{DatasetStore, GenerationReport};

use crate::errors::EvalError;
use crate::metrics::{
    ConstraintSummary, IntegrityReport, METRICS_VERSION, PerformanceMetrics, TableMetrics,
    WarningItem,
};
use crate::model::{VerificationResult, VerifyOptions, Violation};
use crate::report::render_report;

pub const METRICS_FILE: &str = "integrity_metrics.json";
pub const REPORT_FILE: &str = "integrity_report.md";

/// Re-reads a dataset directory and checks its relational invariants.
#[derive(Debug, Clone)]
pub struct VerificationEngine {
    options: VerifyOptions,
}

impl VerificationEngine {
    pub fn new(options: VerifyOptions) -> Self {
        Self { options }
    }

    /// Load products, customers and sales (in that order) and collect every
    /// violation found.
    ///
    /// With `strict`, returns [`EvalError::Violations`] after the outputs are
    /// written.
    pub fn run(&self, dataset_dir: &Path) -> Result<VerificationResult, EvalError> {
        let total_start = Instant::now();
        let load_start = Instant::now();

        let store = DatasetStore::new(dataset_dir);
        let generation = read_generation_report(&store);
        let run_id = generation
            .as_ref()
            .map(|report| report.run_id.clone())
            .unwrap_or_else(|| "unknown".to_string());

        let mut warnings = Vec::new();
        let mut violations = Vec::new();
        let mut constraints = ConstraintSummary::default();

        let products = load_table(
            &store.products_path(),
            "products",
            &PRODUCT_HEADER,
            parse_product,
            &mut warnings,
            &mut violations,
            &mut constraints,
        )?;
        let customers = load_table(
            &store.customers_path(),
            "customers",
            &CUSTOMER_HEADER,
            parse_customer,
            &mut warnings,
            &mut violations,
            &mut constraints,
        )?;
        let sales = load_table(
            &store.sales_path(),
            "sales",
            &SALE_HEADER,
            parse_sale,
            &mut warnings,
            &mut violations,
            &mut constraints,
        )?;

        let load_ms = load_start.elapsed().as_millis();
        let validate_start = Instant::now();

        let product_index = check_products(&products, &mut violations, &mut constraints);
        let customer_ids = check_customers(&customers, &mut violations, &mut constraints);
        let distinct_customers = check_sales(
            &sales,
            &product_index,
            &customer_ids,
            &mut violations,
            &mut constraints,
        );

        sort_violations(&mut violations);
        let validate_ms = validate_start.elapsed().as_millis();

        let expected = |pick: fn(&GenerationReport) -> u64| generation.as_ref().map(pick);
        let tables = vec![
            TableMetrics {
                table: "products".to_string(),
                rows_found: products.rows_found,
                rows_expected: expected(|report| report.products),
            },
            TableMetrics {
                table: "customers".to_string(),
                rows_found: customers.rows_found,
                rows_expected: expected(|report| report.customers.total),
            },
            TableMetrics {
                table: "sales".to_string(),
                rows_found: sales.rows_found,
                rows_expected: expected(|report| report.sales_generated),
            },
        ];
        for table in &tables {
            if let Some(expected) = table.rows_expected {
                if expected != table.rows_found {
                    warnings.push(WarningItem {
                        code: "row_count_mismatch".to_string(),
                        path: format!("{}.csv", table.table),
                        message: format!(
                            "generation report lists {expected} rows, found {}",
                            table.rows_found
                        ),
                        hint: Some("the dataset may have been edited after generation".to_string()),
                    });
                }
            }
        }

        let metrics = IntegrityReport {
            metrics_version: METRICS_VERSION.to_string(),
            run_id,
            tables,
            distinct_customers_in_sales: distinct_customers,
            constraints,
            warnings,
            performance: PerformanceMetrics {
                load_ms,
                validate_ms,
                total_ms: total_start.elapsed().as_millis(),
            },
        };

        let report = render_report(&metrics, &violations, self.options.max_examples);

        let (metrics_path, report_path) = if self.options.write_outputs {
            let out_dir = self
                .options
                .out_dir
                .clone()
                .unwrap_or_else(|| dataset_dir.to_path_buf());
            let metrics_path = out_dir.join(METRICS_FILE);
            write_bytes_atomic(&metrics_path, &serde_json::to_vec_pretty(&metrics)?)?;
            let report_path = out_dir.join(REPORT_FILE);
            write_bytes_atomic(&report_path, report.as_bytes())?;
            (Some(metrics_path), Some(report_path))
        } else {
            (None, None)
        };

        if self.options.strict && !violations.is_empty() {
            return Err(EvalError::Violations(violations.len() as u64));
        }

        Ok(VerificationResult {
            metrics_path,
            report_path,
            metrics,
            report,
            violations,
        })
    }
}

struct Loaded<T> {
    /// Parsed rows with their 1-based row number.
    rows: Vec<(u64, T)>,
    rows_found: u64,
}

fn load_table<R, T>(
    path: &Path,
    table: &str,
    expected_header: &[&str],
    parse: fn(R) -> Result<T, String>,
    warnings: &mut Vec<WarningItem>,
    violations: &mut Vec<Violation>,
    constraints: &mut ConstraintSummary,
) -> Result<Loaded<T>, EvalError>
where
    R: DeserializeOwned,
{
    if !path.is_file() {
        return Err(EvalError::InvalidDataset(format!(
            "missing {}",
            path.display()
        )));
    }

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)?;
    let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();

    let missing: Vec<&str> = expected_header
        .iter()
        .copied()
        .filter(|column| !headers.iter().any(|header| header == column))
        .collect();
    if !missing.is_empty() {
        return Err(EvalError::InvalidDataset(format!(
            "{table}.csv is missing columns: {}",
            missing.join(", ")
        )));
    }

    let extra: Vec<&str> = headers
        .iter()
        .map(String::as_str)
        .filter(|header| !expected_header.contains(header))
        .collect();
    if !extra.is_empty() {
        warnings.push(WarningItem {
            code: "extra_columns".to_string(),
            path: format!("{table}.csv"),
            message: format!("unexpected columns: {}", extra.join(", ")),
            hint: None,
        });
    }

    let mut rows = Vec::new();
    let mut rows_found = 0_u64;
    for (index, result) in reader.deserialize::<R>().enumerate() {
        let row_index = index as u64 + 1;
        rows_found += 1;
        let parsed = result
            .map_err(|err| err.to_string())
            .and_then(parse);
        constraints.parse.record(parsed.is_ok());
        match parsed {
            Ok(row) => rows.push((row_index, row)),
            Err(message) => violations.push(Violation {
                code: "invalid_row".to_string(),
                path: format!("{table}.csv"),
                message,
                row_index: Some(row_index),
                example: None,
            }),
        }
    }

    Ok(Loaded { rows, rows_found })
}

#[derive(Debug, Deserialize)]
struct RawProduct {
    id: String,
    name: String,
    category: String,
    unit_price: String,
}

#[derive(Debug, Deserialize)]
struct RawCustomer {
    id: String,
    name: String,
    email: String,
    country: String,
    state: String,
    city: String,
}

#[derive(Debug, Deserialize)]
struct RawSale {
    id: String,
    timestamp: String,
    customer_id: String,
    product_id: String,
    quantity: String,
    total: String,
}

fn parse_product(raw: RawProduct) -> Result<Product, String> {
    Ok(Product {
        id: parse_number(&raw.id, "id")?,
        name: raw.name,
        category: raw.category,
        unit_price: parse_decimal(&raw.unit_price, "unit_price")?,
    })
}

fn parse_customer(raw: RawCustomer) -> Result<Customer, String> {
    Ok(Customer {
        id: CustomerId::parse(&raw.id).map_err(|err| err.to_string())?,
        name: raw.name,
        email: NormalizedEmail::parse(&raw.email).map_err(|err| err.to_string())?,
        country: raw.country,
        state: raw.state,
        city: raw.city,
    })
}

fn parse_sale(raw: RawSale) -> Result<Sale, String> {
    Ok(Sale {
        id: parse_number(&raw.id, "id")?,
        timestamp: NaiveDateTime::from_str(raw.timestamp.trim())
            .map_err(|err| format!("invalid timestamp '{}': {err}", raw.timestamp))?,
        customer_id: CustomerId::parse(&raw.customer_id).map_err(|err| err.to_string())?,
        product_id: parse_number(&raw.product_id, "product_id")?,
        quantity: parse_number(&raw.quantity, "quantity")?,
        total: parse_decimal(&raw.total, "total")?,
    })
}

fn parse_number<T: FromStr>(value: &str, column: &str) -> Result<T, String>
where
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse::<T>()
        .map_err(|err| format!("invalid {column} '{value}': {err}"))
}

fn parse_decimal(value: &str, column: &str) -> Result<Decimal, String> {
    Decimal::from_str(value.trim()).map_err(|err| format!("invalid {column} '{value}': {err}"))
}

fn check_products<'a>(
    products: &'a Loaded<Product>,
    violations: &mut Vec<Violation>,
    constraints: &mut ConstraintSummary,
) -> HashMap<u32, &'a Product> {
    let mut by_id = HashMap::new();
    let mut names = HashSet::new();
    for (row_index, product) in &products.rows {
        let fresh_id = !by_id.contains_key(&product.id);
        constraints.pk.record(fresh_id);
        if fresh_id {
            by_id.insert(product.id, product);
        } else {
            violations.push(violation(
                "pk",
                "products.id",
                "duplicate product id",
                *row_index,
                product.id.to_string(),
            ));
        }

        let fresh_name = names.insert(product.name.as_str());
        constraints.unique.record(fresh_name);
        if !fresh_name {
            violations.push(violation(
                "unique",
                "products.name",
                "duplicate product name",
                *row_index,
                product.name.clone(),
            ));
        }
    }
    by_id
}

fn check_customers<'a>(
    customers: &'a Loaded<Customer>,
    violations: &mut Vec<Violation>,
    constraints: &mut ConstraintSummary,
) -> HashSet<&'a CustomerId> {
    let mut ids = HashSet::new();
    let mut emails = HashSet::new();
    for (row_index, customer) in &customers.rows {
        let fresh_id = ids.insert(&customer.id);
        constraints.pk.record(fresh_id);
        if !fresh_id {
            violations.push(violation(
                "pk",
                "customers.id",
                "duplicate customer id",
                *row_index,
                customer.id.to_string(),
            ));
        }

        let fresh_email = emails.insert(&customer.email);
        constraints.unique.record(fresh_email);
        if !fresh_email {
            violations.push(violation(
                "unique",
                "customers.email",
                "duplicate customer email",
                *row_index,
                customer.email.to_string(),
            ));
        }
    }
    ids
}

/// Returns the number of distinct customers referenced by sales.
fn check_sales(
    sales: &Loaded<Sale>,
    products: &HashMap<u32, &Product>,
    customers: &HashSet<&CustomerId>,
    violations: &mut Vec<Violation>,
    constraints: &mut ConstraintSummary,
) -> u64 {
    let mut ids = HashSet::new();
    let mut referenced = HashSet::new();
    let mut previous: Option<u64> = None;

    for (row_index, sale) in &sales.rows {
        let row_index = *row_index;

        let fresh_id = ids.insert(sale.id);
        constraints.pk.record(fresh_id);
        if !fresh_id {
            violations.push(violation(
                "pk",
                "sales.id",
                "duplicate sale id",
                row_index,
                sale.id.to_string(),
            ));
        }

        let increasing = previous.is_none_or(|last| sale.id > last);
        constraints.sequence.record(increasing);
        if !increasing {
            violations.push(violation(
                "sequence",
                "sales.id",
                "sale ids are not increasing",
                row_index,
                sale.id.to_string(),
            ));
        }
        previous = Some(sale.id);

        let known_customer = customers.contains(&sale.customer_id);
        constraints.fk.record(known_customer);
        if known_customer {
            referenced.insert(&sale.customer_id);
        } else {
            violations.push(violation(
                "fk",
                "sales.customer_id",
                "sale references an unknown customer",
                row_index,
                sale.customer_id.to_string(),
            ));
        }

        let product = products.get(&sale.product_id);
        constraints.fk.record(product.is_some());
        match product {
            Some(product) => {
                let expected = sale_total(product.unit_price, sale.quantity);
                let exact = expected == sale.total;
                constraints.total.record(exact);
                if !exact {
                    violations.push(violation(
                        "total",
                        "sales.total",
                        &format!("total should be {expected}"),
                        row_index,
                        sale.total.to_string(),
                    ));
                }
            }
            None => violations.push(violation(
                "fk",
                "sales.product_id",
                "sale references an unknown product",
                row_index,
                sale.product_id.to_string(),
            )),
        }

        let positive = sale.quantity >= 1;
        constraints.quantity.record(positive);
        if !positive {
            violations.push(violation(
                "quantity",
                "sales.quantity",
                "quantity must be at least 1",
                row_index,
                sale.quantity.to_string(),
            ));
        }
    }

    referenced.len() as u64
}

fn violation(code: &str, path: &str, message: &str, row_index: u64, example: String) -> Violation {
    Violation {
        code: code.to_string(),
        path: path.to_string(),
        message: message.to_string(),
        row_index: Some(row_index),
        example: Some(example),
    }
}

fn read_generation_report(store: &DatasetStore) -> Option<GenerationReport> {
    let contents = std::fs::read_to_string(store.report_path()).ok()?;
    serde_json::from_str(&contents).ok()
}

fn sort_violations(violations: &mut [Violation]) {
    violations.sort_by(|a, b| {
        (a.path.as_str(), a.row_index.unwrap_or_default(), a.code.as_str()).cmp(&(
            b.path.as_str(),
            b.row_index.unwrap_or_default(),
            b.code.as_str(),
        ))
    });
}
