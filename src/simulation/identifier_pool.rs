//! Identifier pool
//!
//! Holds the simulated tag population: the configured EPCs, in order,
//! followed by randomly generated ones up to the target total.

use rand::Rng;
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use tracing::{debug, info};

use crate::simulation::{SimulationError, SimulationResult};
use crate::types::Epc;

/// The final set of simulated tag identifiers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentifierPool {
    epcs: Vec<Epc>,
    explicit_count: usize,
}

impl IdentifierPool {
    /// Build a pool of `max(total, explicit.len())` identifiers
    ///
    /// Explicit EPCs come first and are kept exactly as given. Generated EPCs
    /// never repeat an explicit EPC or each other; a colliding draw is redrawn.
    pub fn populate<R: Rng + ?Sized>(explicit: &[Epc], total: usize, rng: &mut R) -> Self {
        let missing = total.saturating_sub(explicit.len());
        let mut epcs = Vec::with_capacity(explicit.len() + missing);
        epcs.extend_from_slice(explicit);

        let mut seen: HashSet<Epc> = explicit.iter().cloned().collect();
        while epcs.len() < explicit.len() + missing {
            let candidate = Epc::random(rng);
            if seen.insert(candidate.clone()) {
                epcs.push(candidate);
            } else {
                debug!("Redrawing colliding EPC {}", candidate);
            }
        }

        info!(
            "Identifier pool ready: {} configured, {} generated",
            explicit.len(),
            missing
        );

        Self { epcs, explicit_count: explicit.len() }
    }

    /// Number of identifiers
    pub fn len(&self) -> usize {
        self.epcs.len()
    }

    /// Whether the pool is empty
    pub fn is_empty(&self) -> bool {
        self.epcs.is_empty()
    }

    /// Iterate identifiers in pool order
    pub fn iter(&self) -> std::slice::Iter<'_, Epc> {
        self.epcs.iter()
    }

    /// Identifiers in pool order
    pub fn as_slice(&self) -> &[Epc] {
        &self.epcs
    }

    /// Number of identifiers taken from configuration
    pub fn explicit_count(&self) -> usize {
        self.explicit_count
    }

    /// Number of generated identifiers
    pub fn generated_count(&self) -> usize {
        self.epcs.len() - self.explicit_count
    }

    /// Whether `epc` is part of the pool
    pub fn contains(&self, epc: &Epc) -> bool {
        self.epcs.contains(epc)
    }

    /// Write the pool to `path`, one EPC per line
    pub fn persist<P: AsRef<Path>>(&self, path: P) -> SimulationResult<()> {
        let path = path.as_ref();
        let contents = self.epcs.iter().map(Epc::as_str).collect::<Vec<_>>().join("\n");

        fs::write(path, contents)
            .map_err(|e| SimulationError::persistence_error(path.display().to_string(), e))?;

        info!("Saved {} EPCs to {}", self.epcs.len(), path.display());
        Ok(())
    }
}

impl<'a> IntoIterator for &'a IdentifierPool {
    type Item = &'a Epc;
    type IntoIter = std::slice::Iter<'a, Epc>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::GENERATED_EPC_LEN;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn epcs(values: &[&str]) -> Vec<Epc> {
        values.iter().map(|v| Epc::parse(v).unwrap()).collect()
    }

    #[test]
    fn test_fills_up_to_total_after_explicit() {
        let explicit = epcs(&["AA11", "BB22", "CC33"]);
        let mut rng = StdRng::seed_from_u64(7);

        let pool = IdentifierPool::populate(&explicit, 5, &mut rng);

        assert_eq!(pool.len(), 5);
        assert_eq!(&pool.as_slice()[..3], explicit.as_slice());
        assert_eq!(pool.explicit_count(), 3);
        assert_eq!(pool.generated_count(), 2);
        for generated in &pool.as_slice()[3..] {
            assert_eq!(generated.as_str().len(), GENERATED_EPC_LEN);
        }
    }

    #[test]
    fn test_total_below_explicit_generates_nothing() {
        let explicit = epcs(&["AA11", "BB22"]);
        let mut rng = StdRng::seed_from_u64(7);

        let pool = IdentifierPool::populate(&explicit, 1, &mut rng);

        assert_eq!(pool.as_slice(), explicit.as_slice());
        assert_eq!(pool.generated_count(), 0);
    }

    #[test]
    fn test_empty_pool() {
        let mut rng = StdRng::seed_from_u64(7);
        let pool = IdentifierPool::populate(&[], 0, &mut rng);
        assert!(pool.is_empty());
    }

    #[test]
    fn test_persist_writes_one_epc_per_line() {
        let explicit = epcs(&["AA11", "BB22"]);
        let mut rng = StdRng::seed_from_u64(7);
        let pool = IdentifierPool::populate(&explicit, 2, &mut rng);

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("epcs.txt");
        pool.persist(&path).unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "AA11\nBB22");
    }

    #[test]
    fn test_persist_into_missing_directory_fails() {
        let mut rng = StdRng::seed_from_u64(7);
        let pool = IdentifierPool::populate(&epcs(&["AA11"]), 1, &mut rng);

        let dir = tempfile::tempdir().unwrap();
        let result = pool.persist(dir.path().join("missing").join("epcs.txt"));

        assert!(matches!(result, Err(SimulationError::PersistenceError { .. })));
    }
}
