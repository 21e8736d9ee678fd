use super::error::{AuthError, UniqueField};
use super::models::{Seller, SellerId};
use super::repository::SellerRepository;
use rand::Rng;
use std::sync::Arc;
use tracing::{debug, warn};

pub const DEFAULT_MAX_ATTEMPTS: u32 = 32;

/// Produces seller id candidates. Candidates may repeat; the allocator handles it.
pub trait IdCandidates: Send + Sync {
    fn next_candidate(&self) -> SellerId;
}

/// Uniformly random over the full five digit range.
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomCandidates;

impl IdCandidates for RandomCandidates {
    fn next_candidate(&self) -> SellerId {
        SellerId::random()
    }
}

/// Random picks from a fixed set of numbers. Small pools make collisions routine.
#[derive(Debug, Clone)]
pub struct PoolCandidates {
    pool: Vec<SellerId>,
}

impl PoolCandidates {
    /// Numbers outside the five digit range are dropped. Returns `None` if nothing is left.
    pub fn new(numbers: impl IntoIterator<Item = u32>) -> Option<Self> {
        let pool: Vec<SellerId> = numbers
            .into_iter()
            .filter_map(SellerId::from_number)
            .collect();
        (!pool.is_empty()).then_some(Self { pool })
    }
}

impl IdCandidates for PoolCandidates {
    fn next_candidate(&self) -> SellerId {
        let index = rand::rng().random_range(0..self.pool.len());
        self.pool[index].clone()
    }
}

/// Outcome of an allocation run.
#[derive(Debug)]
pub enum Allocation {
    /// The seller was committed under a fresh id.
    Allocated(Seller),
    /// Every attempt collided.
    Exhausted { attempts: u32 },
}

/// Claims a unique seller id by committing the seller record itself.
///
/// The store probe only avoids pointless inserts; uniqueness comes from
/// `SellerRepository::insert_unique`, and a duplicate id reported there is retried
/// like any other collision.
#[derive(Clone)]
pub struct SellerIdAllocator {
    max_attempts: u32,
    candidates: Arc<dyn IdCandidates>,
}

impl Default for SellerIdAllocator {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ATTEMPTS, Arc::new(RandomCandidates))
    }
}

impl SellerIdAllocator {
    pub fn new(max_attempts: u32, candidates: Arc<dyn IdCandidates>) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            candidates,
        }
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Insert the seller produced by `build` under the first free candidate id.
    ///
    /// Store failures and duplicate emails are returned as errors, never retried.
    pub async fn allocate<F>(
        &self,
        sellers: &dyn SellerRepository,
        mut build: F,
    ) -> Result<Allocation, AuthError>
    where
        F: FnMut(SellerId) -> Seller + Send,
    {
        for attempt in 1..=self.max_attempts {
            let candidate = self.candidates.next_candidate();

            if sellers.find_by_id(&candidate).await?.is_some() {
                debug!(attempt, seller_id = %candidate, "seller id candidate already taken");
                continue;
            }

            match sellers.insert_unique(build(candidate)).await {
                Ok(seller) => {
                    debug!(attempt, seller_id = %seller.seller_id, "seller id allocated");
                    return Ok(Allocation::Allocated(seller));
                }
                Err(AuthError::DuplicateKey(UniqueField::SellerId)) => {
                    debug!(attempt, "seller id claimed concurrently, retrying");
                }
                Err(e) => return Err(e),
            }
        }

        warn!(
            attempts = self.max_attempts,
            "seller id allocation exhausted its retry budget"
        );
        Ok(Allocation::Exhausted {
            attempts: self.max_attempts,
        })
    }
}
