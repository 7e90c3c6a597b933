//! Temporary variable names.

use rand::distributions::Alphanumeric;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use swc_common::DUMMY_SP;
use swc_ecma_ast::Ident;

const SUFFIX_LEN: usize = 6;

/// Issues `tempVar_<suffix>_<n>` identifiers. The suffix is drawn once, the
/// counter starts at 1 and belongs to this value alone.
#[derive(Debug, Clone)]
pub struct TempNames {
    prefix: String,
    issued: usize,
}

impl TempNames {
    pub fn new<R: Rng>(rng: &mut R) -> Self {
        let suffix: String = (0..SUFFIX_LEN)
            .map(|_| char::from(rng.sample(Alphanumeric)))
            .collect();
        Self {
            prefix: format!("tempVar_{}_", suffix),
            issued: 0,
        }
    }

    /// Deterministic for `Some(seed)`, entropy-seeded otherwise.
    pub fn seeded(seed: Option<u64>) -> Self {
        match seed {
            Some(seed) => Self::new(&mut StdRng::seed_from_u64(seed)),
            None => Self::new(&mut StdRng::from_entropy()),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn issued(&self) -> usize {
        self.issued
    }

    pub fn next_name(&mut self) -> String {
        self.issued += 1;
        format!("{}{}", self.prefix, self.issued)
    }

    pub fn next_ident(&mut self) -> Ident {
        Ident::new_no_ctxt(self.next_name().into(), DUMMY_SP)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_are_numbered() {
        let mut names = TempNames::seeded(Some(1));
        let prefix = names.prefix().to_string();
        assert_eq!(names.next_name(), format!("{}1", prefix));
        assert_eq!(names.next_name(), format!("{}2", prefix));
        assert_eq!(names.issued(), 2);
    }

    #[test]
    fn test_prefix_shape() {
        let names = TempNames::seeded(None);
        let suffix = names
            .prefix()
            .strip_prefix("tempVar_")
            .and_then(|rest| rest.strip_suffix('_'))
            .unwrap();
        assert_eq!(suffix.len(), SUFFIX_LEN);
        assert!(suffix.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn test_same_seed_same_prefix() {
        assert_eq!(
            TempNames::seeded(Some(42)).prefix(),
            TempNames::seeded(Some(42)).prefix()
        );
    }

    #[test]
    fn test_counters_are_independent() {
        let mut first = TempNames::seeded(Some(3));
        let mut second = TempNames::seeded(Some(3));
        first.next_name();
        first.next_name();
        assert!(second.next_name().ends_with("_1"));
    }
}
