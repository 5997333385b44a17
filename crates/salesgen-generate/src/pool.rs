//! In-memory customer registry for one run.

use std::collections::HashMap;

use rand::{Rng, RngCore};
use serde::{Deserialize, Serialize};

use salesgen_core::{Customer, CustomerId, NormalizedEmail};

use crate::config::GenerationConfig;
use crate::email::{EmailStrategy, synthesize_email};
use crate::errors::GenerationError;
use crate::identity::IdentityGenerator;
use crate::profiles::ProfileSource;

/// Parameters consulted by [`CustomerPool::get_or_create`].
#[derive(Debug, Clone)]
pub struct CustomerPolicy {
    pub reuse_probability: f64,
    pub identity: IdentityGenerator,
    pub email_strategy: EmailStrategy,
    pub domains: Vec<String>,
}

impl CustomerPolicy {
    pub fn from_config(config: &GenerationConfig) -> Self {
        Self {
            reuse_probability: config.reuse_probability,
            identity: IdentityGenerator::new(config.identity),
            email_strategy: config.email.strategy,
            domains: config.email.domains.clone(),
        }
    }
}

/// Why a draw returned the customer it did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawOrigin {
    /// Picked uniformly from the pool.
    Reused,
    /// Newly synthesized and inserted.
    Created,
    /// Synthesized email already belonged to this customer.
    EmailCollision,
    /// Derived id already belonged to this customer.
    IdCollision,
}

#[derive(Debug, Clone, Copy)]
pub struct PoolDraw<'a> {
    pub customer: &'a Customer,
    pub origin: DrawOrigin,
}

impl PoolDraw<'_> {
    pub fn is_new(&self) -> bool {
        self.origin == DrawOrigin::Created
    }
}

/// Result of inserting a customer directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PoolInsert {
    Inserted,
    /// Another customer already owns the email; holds its index.
    EmailTaken(usize),
    /// Another customer already owns the id; holds its index.
    IdTaken(usize),
}

/// Counters kept by the pool.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolStats {
    pub seeded: u64,
    pub seed_duplicates: u64,
    pub created: u64,
    pub reused: u64,
    pub email_collisions: u64,
    pub id_collisions: u64,
}

/// Customers keyed by normalized email, with a secondary index by id.
///
/// Both keys are unique; insertion order is kept so outputs are stable.
#[derive(Debug, Default)]
pub struct CustomerPool {
    customers: Vec<Customer>,
    by_email: HashMap<NormalizedEmail, usize>,
    by_id: HashMap<CustomerId, usize>,
    stats: PoolStats,
}

impl CustomerPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pool seeded with preserved customers; duplicates are skipped.
    pub fn seeded(customers: impl IntoIterator<Item = Customer>) -> Self {
        let mut pool = Self::new();
        for customer in customers {
            match pool.insert(customer) {
                PoolInsert::Inserted => pool.stats.seeded += 1,
                PoolInsert::EmailTaken(_) | PoolInsert::IdTaken(_) => {
                    pool.stats.seed_duplicates += 1
                }
            }
        }
        pool
    }

    pub fn insert(&mut self, customer: Customer) -> PoolInsert {
        if let Some(&index) = self.by_email.get(&customer.email) {
            return PoolInsert::EmailTaken(index);
        }
        if let Some(&index) = self.by_id.get(&customer.id) {
            return PoolInsert::IdTaken(index);
        }
        self.push(customer);
        PoolInsert::Inserted
    }

    fn push(&mut self, customer: Customer) -> usize {
        let index = self.customers.len();
        self.by_email.insert(customer.email.clone(), index);
        self.by_id.insert(customer.id.clone(), index);
        self.customers.push(customer);
        index
    }

    /// Reuse an existing customer with probability `reuse_probability`,
    /// otherwise synthesize a new one.
    ///
    /// A synthesized email or id that is already owned resolves to the owner
    /// instead of failing.
    pub fn get_or_create(
        &mut self,
        profiles: &mut dyn ProfileSource,
        policy: &CustomerPolicy,
        rng: &mut dyn RngCore,
    ) -> Result<PoolDraw<'_>, GenerationError> {
        if !self.customers.is_empty() && rng.random::<f64>() < policy.reuse_probability {
            let index = rng.random_range(0..self.customers.len());
            self.stats.reused += 1;
            return Ok(self.draw(index, DrawOrigin::Reused));
        }

        let profile = profiles.next_profile(rng);
        let by_email = &self.by_email;
        let email = synthesize_email(
            &profile.name,
            &policy.domains,
            policy.email_strategy,
            |candidate| by_email.contains_key(candidate),
            rng,
        )?;
        if let Some(&index) = self.by_email.get(&email) {
            self.stats.email_collisions += 1;
            return Ok(self.draw(index, DrawOrigin::EmailCollision));
        }

        let id = policy.identity.derive_normalized(&email, rng);
        if let Some(&index) = self.by_id.get(&id) {
            self.stats.id_collisions += 1;
            return Ok(self.draw(index, DrawOrigin::IdCollision));
        }

        let customer = Customer {
            id,
            name: profile.name,
            email,
            country: profile.country,
            state: profile.state,
            city: profile.city,
        };
        let index = self.push(customer);
        self.stats.created += 1;
        Ok(self.draw(index, DrawOrigin::Created))
    }

    fn draw(&self, index: usize, origin: DrawOrigin) -> PoolDraw<'_> {
        PoolDraw {
            customer: &self.customers[index],
            origin,
        }
    }

    pub fn get_by_email(&self, email: &NormalizedEmail) -> Option<&Customer> {
        self.by_email.get(email).map(|&index| &self.customers[index])
    }

    pub fn get_by_id(&self, id: &CustomerId) -> Option<&Customer> {
        self.by_id.get(id).map(|&index| &self.customers[index])
    }

    pub fn customers(&self) -> &[Customer] {
        &self.customers
    }

    pub fn len(&self) -> usize {
        self.customers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.customers.is_empty()
    }

    pub fn stats(&self) -> PoolStats {
        self.stats
    }
}
