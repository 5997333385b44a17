use salesgen_core::{Customer, Product, Sale};

use crate::errors::EmitterError;

/// Sink for generated rows.
///
/// The synthesizer emits every product first, then interleaves customers and
/// sales so that a customer always arrives before the first sale that
/// references it. Errors stop the run and are propagated as-is.
pub trait Emitter {
    fn emit_product(&mut self, product: &Product) -> Result<(), EmitterError>;
    fn emit_customer(&mut self, customer: &Customer) -> Result<(), EmitterError>;
    fn emit_sale(&mut self, sale: &Sale) -> Result<(), EmitterError>;
    /// Commit buffered rows.
    fn flush(&mut self) -> Result<(), EmitterError>;
}

impl<E: Emitter + ?Sized> Emitter for &mut E {
    fn emit_product(&mut self, product: &Product) -> Result<(), EmitterError> {
        (**self).emit_product(product)
    }

    fn emit_customer(&mut self, customer: &Customer) -> Result<(), EmitterError> {
        (**self).emit_customer(customer)
    }

    fn emit_sale(&mut self, sale: &Sale) -> Result<(), EmitterError> {
        (**self).emit_sale(sale)
    }

    fn flush(&mut self) -> Result<(), EmitterError> {
        (**self).flush()
    }
}

/// Collects rows in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryEmitter {
    pub products: Vec<Product>,
    pub customers: Vec<Customer>,
    pub sales: Vec<Sale>,
    pub flushes: u64,
}

impl MemoryEmitter {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Emitter for MemoryEmitter {
    fn emit_product(&mut self, product: &Product) -> Result<(), EmitterError> {
        self.products.push(product.clone());
        Ok(())
    }

    fn emit_customer(&mut self, customer: &Customer) -> Result<(), EmitterError> {
        self.customers.push(customer.clone());
        Ok(())
    }

    fn emit_sale(&mut self, sale: &Sale) -> Result<(), EmitterError> {
        self.sales.push(sale.clone());
        Ok(())
    }

    fn flush(&mut self) -> Result<(), EmitterError> {
        self.flushes += 1;
        Ok(())
    }
}
