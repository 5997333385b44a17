use std::collections::{BTreeMap, BTreeSet};

use crate::error::{Error, Result};
use crate::records::{Customer, Product, Sale, sale_total};

/// Validate the cross-record invariants of a generated dataset.
///
/// This checks:
/// - product ids and names are unique and prices are non-negative
/// - customer ids and emails are unique
/// - sale ids are strictly increasing, quantities are positive
/// - every sale references an existing customer and product
/// - every sale total equals the rounded price times quantity
pub fn validate_dataset(products: &[Product], customers: &[Customer], sales: &[Sale]) -> Result<()> {
    let mut catalog = BTreeMap::new();
    let mut product_names = BTreeSet::new();
    for product in products {
        if product.id == 0 {
            return Err(Error::InvalidRecord(format!(
                "product '{}' has id 0",
                product.name
            )));
        }
        if product.unit_price.is_sign_negative() {
            return Err(Error::InvalidRecord(format!(
                "product {} has negative unit price {}",
                product.id, product.unit_price
            )));
        }
        if catalog.insert(product.id, product).is_some() {
            return Err(Error::InvalidDataset(format!(
                "duplicate product id: {}",
                product.id
            )));
        }
        if !product_names.insert(product.name.as_str()) {
            return Err(Error::InvalidDataset(format!(
                "duplicate product name: {}",
                product.name
            )));
        }
    }

    let mut customer_ids = BTreeSet::new();
    let mut emails = BTreeSet::new();
    for customer in customers {
        if !customer_ids.insert(&customer.id) {
            return Err(Error::InvalidDataset(format!(
                "duplicate customer id: {}",
                customer.id
            )));
        }
        if !emails.insert(&customer.email) {
            return Err(Error::InvalidDataset(format!(
                "duplicate customer email: {}",
                customer.email
            )));
        }
    }

    let mut previous_id = 0_u64;
    for sale in sales {
        if sale.id <= previous_id {
            return Err(Error::InvalidDataset(format!(
                "sale id {} does not follow {}",
                sale.id, previous_id
            )));
        }
        previous_id = sale.id;

        if sale.quantity == 0 {
            return Err(Error::InvalidRecord(format!(
                "sale {} has quantity 0",
                sale.id
            )));
        }
        if !customer_ids.contains(&sale.customer_id) {
            return Err(Error::InvalidDataset(format!(
                "sale {} references unknown customer {}",
                sale.id, sale.customer_id
            )));
        }
        let product = catalog.get(&sale.product_id).ok_or_else(|| {
            Error::InvalidDataset(format!(
                "sale {} references unknown product {}",
                sale.id, sale.product_id
            ))
        })?;
        let expected = sale_total(product.unit_price, sale.quantity);
        if sale.total != expected {
            return Err(Error::InvalidDataset(format!(
                "sale {} total {} does not match {} x {} = {}",
                sale.id, sale.total, product.unit_price, sale.quantity, expected
            )));
        }
    }

    Ok(())
}
