use futures::future::join_all;
use marketbase::auth::{
    AuthError, AuthService, LogNotifier, MemorySellerRepository, MokaSessionRepository,
    PoolCandidates, SellerId, SellerIdAllocator, SellerRepository, SledSellerRepository,
};
use std::collections::HashSet;
use std::sync::Arc;
use tempfile::TempDir;

const SIGNUPS: usize = 120;

fn crowded_allocator() -> SellerIdAllocator {
    // 150 numbers for 120 sellers keeps collisions frequent
    let pool = PoolCandidates::new(10_000..10_150).unwrap();
    SellerIdAllocator::new(10_000, Arc::new(pool))
}

async fn run_signups(auth: Arc<AuthService>) -> Vec<SellerId> {
    let handles = (0..SIGNUPS).map(|i| {
        let auth = auth.clone();
        tokio::spawn(async move {
            auth.signup(&format!("seller{i}@x.com"), &format!("555{i:04}"), "pw")
                .await
        })
    });

    join_all(handles)
        .await
        .into_iter()
        .map(|joined| joined.unwrap().unwrap())
        .collect()
}

fn assert_unique_and_well_formed(ids: &[SellerId]) {
    let distinct: HashSet<&str> = ids.iter().map(SellerId::as_str).collect();
    assert_eq!(distinct.len(), ids.len());

    for id in ids {
        let digits = id.as_str().strip_prefix("MBSLR").unwrap();
        assert_eq!(digits.len(), 5);
        assert!(digits.bytes().all(|b| b.is_ascii_digit()));
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn concurrent_signups_get_unique_ids_in_memory() {
    let sellers = Arc::new(MemorySellerRepository::new());
    let auth = Arc::new(
        AuthService::new(
            sellers.clone(),
            Arc::new(MokaSessionRepository::with_defaults()),
            Arc::new(LogNotifier::new("http://localhost:5000")),
        )
        .with_allocator(crowded_allocator()),
    );

    let ids = run_signups(auth).await;

    assert_unique_and_well_formed(&ids);
    assert_eq!(sellers.len(), SIGNUPS);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn concurrent_signups_get_unique_ids_in_sled() {
    let dir = TempDir::new().unwrap();
    let sellers = Arc::new(SledSellerRepository::new(dir.path().join("sellers.sled")).unwrap());
    let auth = Arc::new(
        AuthService::new(
            sellers.clone(),
            Arc::new(MokaSessionRepository::with_defaults()),
            Arc::new(LogNotifier::new("http://localhost:5000")),
        )
        .with_allocator(crowded_allocator()),
    );

    let ids = run_signups(auth).await;

    assert_unique_and_well_formed(&ids);
    for id in &ids {
        assert!(sellers.find_by_id(id).await.unwrap().is_some());
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_signups_with_one_email_commit_once() {
    let sellers = Arc::new(MemorySellerRepository::new());
    let auth = Arc::new(AuthService::new(
        sellers.clone(),
        Arc::new(MokaSessionRepository::with_defaults()),
        Arc::new(LogNotifier::new("http://localhost:5000")),
    ));

    let handles = (0..16).map(|_| {
        let auth = auth.clone();
        tokio::spawn(async move { auth.signup("same@x.com", "1", "pw").await })
    });
    let results: Vec<_> = join_all(handles)
        .await
        .into_iter()
        .map(|joined| joined.unwrap())
        .collect();

    let committed = results.iter().filter(|r| r.is_ok()).count();
    assert_eq!(committed, 1);
    assert!(
        results
            .iter()
            .filter_map(|r| r.as_ref().err())
            .all(|e| matches!(e, AuthError::DuplicateEmail))
    );
    assert_eq!(sellers.len(), 1);
}
