//! Person profiles for newly created customers.

use fake::Fake;
use fake::faker::address::raw::{CityName, StateName};
use fake::faker::impls::address::CityNameGenFn;
use fake::faker::name::raw::{FirstName, LastName};
use fake::locales::{DE_DE, EN, FR_FR, PT_BR};
use rand::{Rng, RngCore};

use crate::locales::LocaleKey;

/// Demographic fields of a customer, before email and identity are assigned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersonProfile {
    pub name: String,
    pub country: String,
    pub state: String,
    pub city: String,
}

/// Source of person profiles consulted by the customer pool.
pub trait ProfileSource {
    fn next_profile(&mut self, rng: &mut dyn RngCore) -> PersonProfile;
}

/// Profiles drawn from the `fake` locale data.
///
/// When several locales are configured, one is picked uniformly per profile.
#[derive(Debug, Clone)]
pub struct FakerProfiles {
    locales: Vec<LocaleKey>,
}

impl FakerProfiles {
    pub fn new(locales: Vec<LocaleKey>) -> Self {
        let locales = if locales.is_empty() {
            vec![LocaleKey::PtBr]
        } else {
            locales
        };
        Self { locales }
    }

    pub fn locales(&self) -> &[LocaleKey] {
        &self.locales
    }
}

impl ProfileSource for FakerProfiles {
    fn next_profile(&mut self, rng: &mut dyn RngCore) -> PersonProfile {
        let locale = if self.locales.len() == 1 {
            self.locales[0]
        } else {
            self.locales[rng.random_range(0..self.locales.len())]
        };
        match locale {
            LocaleKey::EnUs => fake_profile(EN, locale, rng),
            LocaleKey::PtBr => fake_profile(PT_BR, locale, rng),
            LocaleKey::FrFr => fake_profile(FR_FR, locale, rng),
            LocaleKey::DeDe => fake_profile(DE_DE, locale, rng),
        }
    }
}

fn fake_profile<L: CityNameGenFn>(data: L, locale: LocaleKey, rng: &mut dyn RngCore) -> PersonProfile {
    let first: String = FirstName(data).fake_with_rng(rng);
    let last: String = LastName(data).fake_with_rng(rng);
    let state: String = StateName(data).fake_with_rng(rng);
    let city: String = CityName(data).fake_with_rng(rng);
    PersonProfile {
        name: format!("{first} {last}"),
        country: locale.country().to_string(),
        state,
        city,
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    use super::*;

    #[test]
    fn faker_profiles_are_deterministic_per_seed() {
        let mut source = FakerProfiles::new(vec![LocaleKey::PtBr]);
        let mut rng_a = ChaCha8Rng::seed_from_u64(11);
        let mut rng_b = ChaCha8Rng::seed_from_u64(11);

        let a = source.next_profile(&mut rng_a);
        let b = source.next_profile(&mut rng_b);

        assert_eq!(a, b);
        assert_eq!(a.country, "Brasil");
        assert!(a.name.contains(' '));
        assert!(!a.state.is_empty());
        assert!(!a.city.is_empty());
    }

    #[test]
    fn every_locale_produces_a_city() {
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        for locale in LocaleKey::ALL {
            let mut source = FakerProfiles::new(vec![*locale]);
            for _ in 0..20 {
                let profile = source.next_profile(&mut rng);
                assert_eq!(profile.country, locale.country());
                assert!(!profile.city.trim().is_empty(), "{locale:?} city empty");
                assert!(!profile.state.trim().is_empty());
            }
        }
    }

    #[test]
    fn empty_locale_list_falls_back_to_pt_br() {
        let source = FakerProfiles::new(Vec::new());
        assert_eq!(source.locales(), &[LocaleKey::PtBr]);
    }
}
