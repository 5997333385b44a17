use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use serde::Deserialize;

use salesgen_core::{Customer, CustomerId, NormalizedEmail};

use crate::continuity::PriorCustomers;
use crate::errors::{EmitterError, GenerationError};
use crate::model::GenerationReport;
use crate::output::atomic::write_json_atomic;
use crate::output::csv::CsvEmitter;

pub const PRODUCTS_FILE: &str = "products.csv";
pub const CUSTOMERS_FILE: &str = "customers.csv";
pub const SALES_FILE: &str = "sales.csv";
pub const REPORT_FILE: &str = "generation_report.json";
pub const LOG_FILE: &str = "logs.ndjson";

/// Files moved aside before a new dataset is written, in this order.
const ARCHIVED_FILES: [&str; 4] = [PRODUCTS_FILE, CUSTOMERS_FILE, SALES_FILE, REPORT_FILE];

/// Layout of a dataset directory.
#[derive(Debug, Clone)]
pub struct DatasetStore {
    dir: PathBuf,
}

impl DatasetStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn products_path(&self) -> PathBuf {
        self.dir.join(PRODUCTS_FILE)
    }

    pub fn customers_path(&self) -> PathBuf {
        self.dir.join(CUSTOMERS_FILE)
    }

    pub fn sales_path(&self) -> PathBuf {
        self.dir.join(SALES_FILE)
    }

    pub fn report_path(&self) -> PathBuf {
        self.dir.join(REPORT_FILE)
    }

    pub fn log_path(&self) -> PathBuf {
        self.dir.join(LOG_FILE)
    }

    pub fn ensure_dir(&self) -> Result<(), GenerationError> {
        std::fs::create_dir_all(&self.dir)?;
        Ok(())
    }

    /// Customers of the dataset currently in place.
    ///
    /// A missing file is [`PriorCustomers::Absent`]; any read or parse
    /// failure is reported as [`PriorCustomers::Unreadable`].
    pub fn load_prior_customers(&self) -> PriorCustomers {
        let path = self.customers_path();
        if !path.is_file() {
            return PriorCustomers::Absent;
        }
        match read_customers(&path) {
            Ok(customers) => PriorCustomers::Loaded(customers),
            Err(err) => PriorCustomers::Unreadable(format!("{}: {err}", path.display())),
        }
    }

    /// Rename the current dataset files to `<stem>_<YYYYmmdd_HHMMSS>.<ext>`.
    ///
    /// When that name is taken, `_1`, `_2`, ... is appended. Returns the new
    /// paths.
    pub fn archive_previous(&self, now: NaiveDateTime) -> Result<Vec<PathBuf>, GenerationError> {
        let stamp = now.format("%Y%m%d_%H%M%S").to_string();
        let mut archived = Vec::new();
        for name in ARCHIVED_FILES {
            let source = self.dir.join(name);
            if !source.is_file() {
                continue;
            }
            let target = self.archive_target(name, &stamp);
            std::fs::rename(&source, &target)?;
            archived.push(target);
        }
        Ok(archived)
    }

    fn archive_target(&self, name: &str, stamp: &str) -> PathBuf {
        let (stem, extension) = name.rsplit_once('.').unwrap_or((name, ""));
        let with_extension = |base: String| {
            if extension.is_empty() {
                base
            } else {
                format!("{base}.{extension}")
            }
        };

        let mut candidate = self.dir.join(with_extension(format!("{stem}_{stamp}")));
        let mut counter = 1_u32;
        while candidate.exists() {
            candidate = self
                .dir
                .join(with_extension(format!("{stem}_{stamp}_{counter}")));
            counter += 1;
        }
        candidate
    }

    pub fn create_emitter(&self, batch_size: usize) -> Result<CsvEmitter, EmitterError> {
        CsvEmitter::create(
            &self.products_path(),
            &self.customers_path(),
            &self.sales_path(),
            batch_size,
        )
    }

    pub fn write_report(&self, report: &GenerationReport) -> Result<(), GenerationError> {
        write_json_atomic(&self.report_path(), report)
    }
}

#[derive(Debug, Deserialize)]
struct CustomerRow {
    id: String,
    name: String,
    email: String,
    country: String,
    state: String,
    city: String,
}

fn read_customers(path: &Path) -> Result<Vec<Customer>, GenerationError> {
    let mut reader = csv::Reader::from_path(path)?;
    let mut customers = Vec::new();
    for row in reader.deserialize::<CustomerRow>() {
        let row = row?;
        customers.push(Customer {
            id: CustomerId::parse(&row.id)?,
            name: row.name,
            email: NormalizedEmail::parse(&row.email)?,
            country: row.country,
            state: row.state,
            city: row.city,
        });
    }
    Ok(customers)
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    fn temp_store() -> DatasetStore {
        let dir = std::env::temp_dir().join(format!("salesgen_store_{}", uuid::Uuid::new_v4()));
        let store = DatasetStore::new(dir);
        store.ensure_dir().unwrap();
        store
    }

    fn noon() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 5, 17)
            .unwrap()
            .and_hms_opt(12, 30, 5)
            .unwrap()
    }

    #[test]
    fn missing_customers_file_is_absent() {
        let store = temp_store();
        assert!(matches!(store.load_prior_customers(), PriorCustomers::Absent));
    }

    #[test]
    fn malformed_customers_file_is_unreadable() {
        let store = temp_store();
        std::fs::write(store.customers_path(), "id,name\n1\n").unwrap();
        assert!(matches!(
            store.load_prior_customers(),
            PriorCustomers::Unreadable(_)
        ));
    }

    #[test]
    fn reads_numeric_and_token_ids() {
        let store = temp_store();
        std::fs::write(
            store.customers_path(),
            "id,name,email,country,state,city\n\
             42,Maria Silva,maria.silva@gmail.com,Brasil,Bahia,Salvador\n\
             7f1c9a52-5d7e-4c1b-9d7a-0c6f3e2b8a11,João Souza,JOAO.SOUZA@outlook.com,Brasil,Pará,Belém\n",
        )
        .unwrap();

        let PriorCustomers::Loaded(customers) = store.load_prior_customers() else {
            panic!("expected loaded customers");
        };
        assert_eq!(customers.len(), 2);
        assert_eq!(customers[0].id, CustomerId::Numeric(42));
        assert!(matches!(customers[1].id, CustomerId::Token(_)));
        assert_eq!(customers[1].email.as_str(), "joao.souza@outlook.com");
    }

    #[test]
    fn archive_renames_with_timestamp_and_counter() {
        let store = temp_store();
        std::fs::write(store.customers_path(), "a").unwrap();
        std::fs::write(store.sales_path(), "b").unwrap();

        let first = store.archive_previous(noon()).unwrap();
        assert_eq!(
            first,
            vec![
                store.dir().join("customers_20240517_123005.csv"),
                store.dir().join("sales_20240517_123005.csv"),
            ]
        );
        assert!(!store.customers_path().exists());

        std::fs::write(store.customers_path(), "c").unwrap();
        let second = store.archive_previous(noon()).unwrap();
        assert_eq!(
            second,
            vec![store.dir().join("customers_20240517_123005_1.csv")]
        );
        assert_eq!(
            std::fs::read_to_string(store.dir().join("customers_20240517_123005.csv")).unwrap(),
            "a"
        );
    }
}
