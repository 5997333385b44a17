use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use salesgen_core::{Customer, Product, Sale};

use crate::emitter::Emitter;
use crate::errors::EmitterError;
use crate::output::atomic::{non_empty_parent, sync_dir, temp_path};

pub const PRODUCT_HEADER: [&str; 4] = ["id", "name", "category", "unit_price"];
pub const CUSTOMER_HEADER: [&str; 6] = ["id", "name", "email", "country", "state", "city"];
pub const SALE_HEADER: [&str; 6] = [
    "id",
    "timestamp",
    "customer_id",
    "product_id",
    "quantity",
    "total",
];

/// Summary of one written file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileOutput {
    pub path: PathBuf,
    pub rows: u64,
    pub bytes: u64,
}

/// Files committed by [`StagedCsv::commit`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CsvOutput {
    pub products: FileOutput,
    pub customers: FileOutput,
    pub sales: FileOutput,
    pub batches: u64,
}

impl CsvOutput {
    pub fn bytes_written(&self) -> u64 {
        self.products.bytes + self.customers.bytes + self.sales.bytes
    }
}

/// Writes products, customers and sales as three CSV files.
///
/// Rows go to `<file>.tmp`. [`CsvEmitter::stage`] syncs the temporary files
/// and [`StagedCsv::commit`] renames them into place. Customers and sales
/// are buffered in batches of `batch_size` sales; each batch writes its
/// customers before its sales.
pub struct CsvEmitter {
    products: TableWriter,
    customers: TableWriter,
    sales: TableWriter,
    pending_customers: Vec<Customer>,
    pending_sales: Vec<Sale>,
    batch_size: usize,
    batches: u64,
}

impl CsvEmitter {
    pub fn create(
        products_path: &Path,
        customers_path: &Path,
        sales_path: &Path,
        batch_size: usize,
    ) -> Result<Self, EmitterError> {
        let products = TableWriter::create(products_path, &PRODUCT_HEADER)?;
        let customers = match TableWriter::create(customers_path, &CUSTOMER_HEADER) {
            Ok(writer) => writer,
            Err(err) => {
                products.discard();
                return Err(err);
            }
        };
        let sales = match TableWriter::create(sales_path, &SALE_HEADER) {
            Ok(writer) => writer,
            Err(err) => {
                products.discard();
                customers.discard();
                return Err(err);
            }
        };
        Ok(Self {
            products,
            customers,
            sales,
            pending_customers: Vec::new(),
            pending_sales: Vec::new(),
            batch_size: batch_size.max(1),
            batches: 0,
        })
    }

    fn commit_batch(&mut self) -> Result<(), EmitterError> {
        if self.pending_customers.is_empty() && self.pending_sales.is_empty() {
            return Ok(());
        }
        for customer in self.pending_customers.drain(..) {
            self.customers.write(&customer)?;
        }
        self.customers.flush()?;
        for sale in self.pending_sales.drain(..) {
            self.sales.write(&sale)?;
        }
        self.sales.flush()?;
        self.batches += 1;
        debug!(batch = self.batches, "batch committed");
        Ok(())
    }

    /// Commit the last batch and sync every temporary file.
    ///
    /// Nothing in place is replaced yet. On error the temporary files are
    /// removed.
    pub fn stage(mut self) -> Result<StagedCsv, EmitterError> {
        if let Err(err) = self.commit_batch() {
            self.abort();
            return Err(err);
        }
        let tmp_paths = [
            self.products.tmp_path.clone(),
            self.customers.tmp_path.clone(),
            self.sales.tmp_path.clone(),
        ];
        let batches = self.batches;
        let staged = self.products.seal().and_then(|products| {
            Ok(StagedCsv {
                products,
                customers: self.customers.seal()?,
                sales: self.sales.seal()?,
                batches,
            })
        });
        if staged.is_err() {
            for path in &tmp_paths {
                remove_temp(path);
            }
        }
        staged
    }

    /// Drop the temporary files; nothing already in place is touched.
    pub fn abort(self) {
        self.products.discard();
        self.customers.discard();
        self.sales.discard();
    }
}

impl Emitter for CsvEmitter {
    fn emit_product(&mut self, product: &Product) -> Result<(), EmitterError> {
        self.products.write(product)
    }

    fn emit_customer(&mut self, customer: &Customer) -> Result<(), EmitterError> {
        self.pending_customers.push(customer.clone());
        Ok(())
    }

    fn emit_sale(&mut self, sale: &Sale) -> Result<(), EmitterError> {
        self.pending_sales.push(sale.clone());
        if self.pending_sales.len() >= self.batch_size {
            self.commit_batch()?;
        }
        Ok(())
    }

    fn flush(&mut self) -> Result<(), EmitterError> {
        self.commit_batch()?;
        self.products.flush()
    }
}

/// Synced temporary files waiting to replace the dataset in place.
#[derive(Debug)]
pub struct StagedCsv {
    products: StagedFile,
    customers: StagedFile,
    sales: StagedFile,
    batches: u64,
}

impl StagedCsv {
    /// Rename every temporary file over its final path.
    pub fn commit(self) -> Result<CsvOutput, EmitterError> {
        let products = self.products.commit()?;
        let customers = self.customers.commit()?;
        let sales = self.sales.commit()?;
        if let Some(parent) = non_empty_parent(&sales.path) {
            sync_dir(parent)?;
        }
        Ok(CsvOutput {
            products,
            customers,
            sales,
            batches: self.batches,
        })
    }

    pub fn discard(self) {
        for file in [self.products, self.customers, self.sales] {
            remove_temp(&file.tmp_path);
        }
    }
}

#[derive(Debug)]
struct StagedFile {
    path: PathBuf,
    tmp_path: PathBuf,
    rows: u64,
    bytes: u64,
}

impl StagedFile {
    fn commit(self) -> Result<FileOutput, EmitterError> {
        std::fs::rename(&self.tmp_path, &self.path)?;
        Ok(FileOutput {
            path: self.path,
            rows: self.rows,
            bytes: self.bytes,
        })
    }
}

fn remove_temp(path: &Path) {
    if let Err(err) = std::fs::remove_file(path) {
        debug!(path = %path.display(), error = %err, "temporary file not removed");
    }
}

struct TableWriter {
    path: PathBuf,
    tmp_path: PathBuf,
    writer: csv::Writer<CountingWriter<BufWriter<File>>>,
    rows: u64,
}

impl TableWriter {
    fn create(path: &Path, header: &[&str]) -> Result<Self, EmitterError> {
        let tmp_path = temp_path(path)?;
        let file = File::create(&tmp_path)?;
        let counting = CountingWriter::new(BufWriter::new(file));
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(counting);
        writer.write_record(header)?;
        Ok(Self {
            path: path.to_path_buf(),
            tmp_path,
            writer,
            rows: 0,
        })
    }

    fn write<T: Serialize>(&mut self, row: &T) -> Result<(), EmitterError> {
        self.writer.serialize(row)?;
        self.rows += 1;
        Ok(())
    }

    fn flush(&mut self) -> Result<(), EmitterError> {
        self.writer.flush()?;
        Ok(())
    }

    fn seal(self) -> Result<StagedFile, EmitterError> {
        let counting = self.writer.into_inner().map_err(|err| err.into_error())?;
        let bytes = counting.bytes_written();
        let file = counting
            .into_inner()
            .into_inner()
            .map_err(|err| err.into_error())?;
        file.sync_all()?;
        Ok(StagedFile {
            path: self.path,
            tmp_path: self.tmp_path,
            rows: self.rows,
            bytes,
        })
    }

    fn discard(self) {
        let tmp_path = self.tmp_path;
        drop(self.writer);
        remove_temp(&tmp_path);
    }
}

struct CountingWriter<W: Write> {
    inner: W,
    bytes: u64,
}

impl<W: Write> CountingWriter<W> {
    fn new(inner: W) -> Self {
        Self { inner, bytes: 0 }
    }

    fn bytes_written(&self) -> u64 {
        self.bytes
    }

    fn into_inner(self) -> W {
        self.inner
    }
}

impl<W: Write> Write for CountingWriter<W> {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        let size = self.inner.write(buf)?;
        self.bytes = self.bytes.saturating_add(size as u64);
        Ok(size)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.inner.flush()
    }
}
