use rand::{Rng, RngCore};

use salesgen_core::Product;

use crate::config::Taxonomy;

/// Products available to a run, indexed by id.
///
/// Ids are assigned sequentially from 1 in taxonomy order, so
/// `products[id - 1]` is the product with that id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Catalog {
    products: Vec<Product>,
}

impl Catalog {
    pub fn get(&self, id: u32) -> Option<&Product> {
        let index = usize::try_from(id).ok()?.checked_sub(1)?;
        self.products.get(index)
    }

    /// Uniform pick.
    pub fn choose(&self, rng: &mut dyn RngCore) -> &Product {
        &self.products[rng.random_range(0..self.products.len())]
    }

    pub fn products(&self) -> &[Product] {
        &self.products
    }

    pub fn iter(&self) -> impl Iterator<Item = &Product> {
        self.products.iter()
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}

/// Flatten the taxonomy into products.
///
/// A [`Taxonomy`] always holds at least one product, so the catalog is never
/// empty.
pub fn build_catalog(taxonomy: &Taxonomy) -> Catalog {
    let products = taxonomy
        .categories()
        .iter()
        .flat_map(|category| {
            category
                .products
                .iter()
                .map(move |entry| (category.name.as_str(), entry))
        })
        .zip(1_u32..)
        .map(|((category, entry), id)| Product {
            id,
            name: entry.name.clone(),
            category: category.to_string(),
            unit_price: entry.unit_price,
        })
        .collect();
    Catalog { products }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    use super::*;

    #[test]
    fn assigns_sequential_ids_in_taxonomy_order() {
        let catalog = build_catalog(&Taxonomy::default());

        assert_eq!(catalog.len(), 11);
        let ids: Vec<u32> = catalog.iter().map(|product| product.id).collect();
        assert_eq!(ids, (1..=11).collect::<Vec<_>>());

        let first = catalog.get(1).unwrap();
        assert_eq!(first.name, "iPhone 13");
        assert_eq!(first.category, "Celulares");
        assert_eq!(first.unit_price.to_string(), "850.00");

        let sixth = catalog.get(6).unwrap();
        assert_eq!(sixth.name, "Carregador USB-C");
        assert_eq!(sixth.category, "Acessórios");

        assert!(catalog.get(0).is_none());
        assert!(catalog.get(12).is_none());
    }

    #[test]
    fn choose_returns_catalog_members() {
        let catalog = build_catalog(&Taxonomy::default());
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        for _ in 0..50 {
            let product = catalog.choose(&mut rng);
            assert_eq!(catalog.get(product.id), Some(product));
        }
    }
}
