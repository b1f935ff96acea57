//! Per-customer cart cache kept consistent with cart mutations.
//!
//! Each customer gets one slot holding a revisioned snapshot of their cart.
//! The slot's mutex serializes that customer's mutations: a mutation holds it
//! across the upstream call, bumps the revision and stores the returned cart.
//! Reads fetch without holding the lock and only store their result if no
//! mutation committed in the meantime, so a slow read can never overwrite a
//! newer mutation result. A read that loses to an invalidation is retried,
//! since its cart predates the clear.

use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use bazaar_core::{ProductId, UserId};
use moka::future::Cache;
use tokio::sync::Mutex;
use tracing::{debug, instrument, warn};

use crate::commerce::{Cart, CommerceClient, CommerceError};

/// How long a stored snapshot is served without refetching.
pub const SNAPSHOT_TTL: Duration = Duration::from_secs(30 * 60);

/// Fetches per refresh before settling for a read that began after an
/// invalidation.
const FETCH_ATTEMPTS: u32 = 2;

/// A cart as of a given revision.
#[derive(Debug, Clone)]
pub struct CartSnapshot {
    /// Number of committed mutations (and invalidations) for this customer.
    pub revision: u64,
    pub cart: Arc<Cart>,
}

#[derive(Debug, Default)]
struct CartSlot {
    revision: u64,
    cart: Option<(Arc<Cart>, Instant)>,
}

impl CartSlot {
    fn snapshot(&self) -> Option<CartSnapshot> {
        self.cart
            .as_ref()
            .filter(|(_, stored_at)| stored_at.elapsed() < SNAPSHOT_TTL)
            .map(|(cart, _)| CartSnapshot {
                revision: self.revision,
                cart: Arc::clone(cart),
            })
    }

    /// Store a mutation result as a new revision.
    fn commit_mutation(&mut self, cart: Option<Arc<Cart>>) -> u64 {
        self.revision += 1;
        self.cart = cart.map(|c| (c, Instant::now()));
        self.revision
    }

    /// Store a fetched cart if it was read at the current revision.
    ///
    /// Returns `false` when a mutation committed after the read began.
    fn commit_fetch(&mut self, seen_revision: u64, cart: Arc<Cart>) -> bool {
        if self.revision != seen_revision {
            return false;
        }
        self.cart = Some((cart, Instant::now()));
        true
    }

    /// Resolve a finished fetch against the slot.
    ///
    /// Yields the fetched cart if it was stored, or the newer mutation result
    /// if one won. Hands the cart back when the slot was invalidated during
    /// the read, as there is nothing newer to serve and the fetch is stale.
    fn resolve_fetch(
        &mut self,
        seen_revision: u64,
        cart: Arc<Cart>,
    ) -> Result<CartSnapshot, Arc<Cart>> {
        if self.commit_fetch(seen_revision, Arc::clone(&cart)) {
            return Ok(CartSnapshot {
                revision: seen_revision,
                cart,
            });
        }
        self.snapshot().ok_or(cart)
    }
}

/// Cart synchronization service.
///
/// Cheap to clone; clones share the same slots.
#[derive(Clone)]
pub struct CartSync {
    inner: Arc<CartSyncInner>,
}

struct CartSyncInner {
    commerce: CommerceClient,
    slots: Cache<UserId, Arc<Mutex<CartSlot>>>,
}

impl CartSync {
    /// Create a cart sync service over the given API client.
    #[must_use]
    pub fn new(commerce: CommerceClient) -> Self {
        // Idle expiry only. A size bound could evict a slot whose lock is
        // held, letting a second mutation run beside the first.
        let slots = Cache::builder().time_to_idle(SNAPSHOT_TTL).build();

        Self {
            inner: Arc::new(CartSyncInner { commerce, slots }),
        }
    }

    async fn slot(&self, user: &UserId) -> Arc<Mutex<CartSlot>> {
        self.inner
            .slots
            .get_with(user.clone(), async { Arc::new(Mutex::new(CartSlot::default())) })
            .await
    }

    /// The stored snapshot, if one is fresh.
    pub async fn current(&self, user: &UserId) -> Option<CartSnapshot> {
        let slot = self.inner.slots.get(user).await?;
        let state = slot.lock().await;
        state.snapshot()
    }

    /// Fetch the cart from the API and refresh the snapshot.
    ///
    /// If a mutation commits while the fetch is in flight, the newer
    /// mutation result is returned instead of the fetched cart. If the
    /// snapshot is invalidated instead, the cart is fetched again.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, token), fields(user_id = %user))]
    pub async fn refresh(&self, user: &UserId, token: &str) -> Result<CartSnapshot, CommerceError> {
        let slot = self.slot(user).await;
        let mut attempt = 1;

        loop {
            let seen = slot.lock().await.revision;
            let cart = Arc::new(self.inner.commerce.get_cart(token).await?);

            let mut state = slot.lock().await;
            match state.resolve_fetch(seen, cart) {
                Ok(snapshot) => {
                    if snapshot.revision != seen {
                        debug!(
                            seen,
                            current = snapshot.revision,
                            "Cart changed during fetch, keeping newer snapshot"
                        );
                    }
                    return Ok(snapshot);
                }
                // This read began after an invalidation, so it reflects the clear.
                Err(cart) if attempt >= FETCH_ATTEMPTS => {
                    return Ok(CartSnapshot {
                        revision: state.revision,
                        cart,
                    });
                }
                Err(_) => {
                    debug!(
                        seen,
                        current = state.revision,
                        "Cart invalidated during fetch, refetching"
                    );
                    attempt += 1;
                }
            }
        }
    }

    /// The snapshot when fresh, else a refreshed one.
    ///
    /// # Errors
    ///
    /// Returns an error if a refetch is needed and fails.
    pub async fn get_or_refresh(
        &self,
        user: &UserId,
        token: &str,
    ) -> Result<CartSnapshot, CommerceError> {
        match self.current(user).await {
            Some(snapshot) => Ok(snapshot),
            None => self.refresh(user, token).await,
        }
    }

    /// Number of distinct products in the cart.
    ///
    /// # Errors
    ///
    /// Returns an error if a refetch is needed and fails.
    pub async fn count(&self, user: &UserId, token: &str) -> Result<u32, CommerceError> {
        Ok(self.get_or_refresh(user, token).await?.cart.item_count)
    }

    /// Add `quantity` units of a product.
    ///
    /// The API adds one unit per call; larger quantities are applied with a
    /// follow-up count update.
    ///
    /// # Errors
    ///
    /// Returns an error if any API request fails.
    #[instrument(skip(self, token), fields(user_id = %user, product_id = %product_id))]
    pub async fn add(
        &self,
        user: &UserId,
        token: &str,
        product_id: &ProductId,
        quantity: u32,
    ) -> Result<CartSnapshot, CommerceError> {
        self.mutate(user, token, |client| async move {
            let cart = client.add_to_cart(token, product_id).await?;
            if quantity <= 1 {
                return Ok(cart);
            }
            let after_add = cart.line_for(product_id).map_or(1, |line| line.count);
            let target = after_add.saturating_add(quantity - 1);
            client.update_cart_count(token, product_id, target).await
        })
        .await
    }

    /// Set the count of a product in the cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, token), fields(user_id = %user, product_id = %product_id))]
    pub async fn update(
        &self,
        user: &UserId,
        token: &str,
        product_id: &ProductId,
        count: u32,
    ) -> Result<CartSnapshot, CommerceError> {
        self.mutate(user, token, |client| async move {
            client.update_cart_count(token, product_id, count).await
        })
        .await
    }

    /// Remove a product from the cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, token), fields(user_id = %user, product_id = %product_id))]
    pub async fn remove(
        &self,
        user: &UserId,
        token: &str,
        product_id: &ProductId,
    ) -> Result<CartSnapshot, CommerceError> {
        self.mutate(user, token, |client| async move {
            client.remove_from_cart(token, product_id).await
        })
        .await
    }

    /// Empty the cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, token), fields(user_id = %user))]
    pub async fn clear(&self, user: &UserId, token: &str) -> Result<CartSnapshot, CommerceError> {
        self.mutate(user, token, |client| async move {
            client.clear_cart(token).await?;
            Ok(Cart::empty())
        })
        .await
    }

    /// Drop the snapshot (after checkout or logout).
    ///
    /// Counts as a revision so in-flight reads do not restore the old cart.
    pub async fn invalidate(&self, user: &UserId) {
        if let Some(slot) = self.inner.slots.get(user).await {
            slot.lock().await.commit_mutation(None);
        }
    }

    /// Run one mutation under the customer's lock and commit the result.
    async fn mutate<F, Fut>(
        &self,
        user: &UserId,
        token: &str,
        op: F,
    ) -> Result<CartSnapshot, CommerceError>
    where
        F: FnOnce(CommerceClient) -> Fut,
        Fut: Future<Output = Result<Cart, CommerceError>>,
    {
        let slot = self.slot(user).await;
        let mut state = slot.lock().await;

        let cart = match op(self.inner.commerce.clone()).await {
            Ok(cart) => cart,
            Err(e) => {
                // Upstream may have partially applied the change.
                state.commit_mutation(None);
                return Err(e);
            }
        };

        if cart.is_hydrated() {
            let cart = Arc::new(cart);
            let revision = state.commit_mutation(Some(Arc::clone(&cart)));
            return Ok(CartSnapshot { revision, cart });
        }

        // Mutation responses carry product ids only.
        match self.inner.commerce.get_cart(token).await {
            Ok(full) => {
                let cart = Arc::new(full);
                let revision = state.commit_mutation(Some(Arc::clone(&cart)));
                Ok(CartSnapshot { revision, cart })
            }
            Err(e) => {
                warn!(error = %e, "Cart mutation succeeded but refetch failed");
                let revision = state.commit_mutation(None);
                Ok(CartSnapshot {
                    revision,
                    cart: Arc::new(cart),
                })
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::config::CommerceApiConfig;
    use bazaar_core::Price;

    fn cart_with_total(pounds: i64) -> Arc<Cart> {
        Arc::new(Cart {
            total: Price::from_pounds(pounds),
            item_count: 1,
            ..Cart::default()
        })
    }

    fn service() -> CartSync {
        CartSync::new(CommerceClient::new(&CommerceApiConfig::default()).unwrap())
    }

    #[test]
    fn test_stale_fetch_is_discarded() {
        let mut slot = CartSlot::default();
        let seen = slot.revision;

        slot.commit_mutation(Some(cart_with_total(200)));
        assert!(!slot.commit_fetch(seen, cart_with_total(100)));
        assert_eq!(slot.snapshot().unwrap().cart.total, Price::from_pounds(200));
    }

    #[test]
    fn test_fetch_at_current_revision_is_stored() {
        let mut slot = CartSlot::default();
        slot.commit_mutation(Some(cart_with_total(200)));
        let seen = slot.revision;

        assert!(slot.commit_fetch(seen, cart_with_total(300)));
        let snapshot = slot.snapshot().unwrap();
        assert_eq!(snapshot.revision, 1);
        assert_eq!(snapshot.cart.total, Price::from_pounds(300));
    }

    #[test]
    fn test_invalidation_bumps_revision() {
        let mut slot = CartSlot::default();
        slot.commit_fetch(0, cart_with_total(100));
        let seen = slot.revision;

        slot.commit_mutation(None);
        assert!(slot.snapshot().is_none());
        assert!(!slot.commit_fetch(seen, cart_with_total(100)));
    }

    #[test]
    fn test_fetch_racing_invalidation_is_not_served() {
        let mut slot = CartSlot::default();
        let seen = slot.revision;

        // Checkout clears the cart while a read of the old cart is in flight.
        slot.commit_mutation(None);
        let stale = cart_with_total(100);
        let handed_back = slot.resolve_fetch(seen, Arc::clone(&stale)).unwrap_err();
        assert!(Arc::ptr_eq(&handed_back, &stale));
        assert!(slot.snapshot().is_none());

        // A read begun after the clear is stored.
        let seen = slot.revision;
        let fresh = slot.resolve_fetch(seen, Arc::new(Cart::empty())).unwrap();
        assert_eq!(fresh.revision, 1);
        assert_eq!(fresh.cart.item_count, 0);
    }

    #[test]
    fn test_fetch_racing_mutation_yields_mutation_result() {
        let mut slot = CartSlot::default();
        let seen = slot.revision;

        slot.commit_mutation(Some(cart_with_total(200)));
        let snapshot = slot.resolve_fetch(seen, cart_with_total(100)).unwrap();
        assert_eq!(snapshot.revision, 1);
        assert_eq!(snapshot.cart.total, Price::from_pounds(200));
    }

    #[tokio::test]
    async fn test_slots_expire_on_idle_only() {
        let sync = service();
        let policy = sync.inner.slots.policy();
        assert_eq!(policy.max_capacity(), None);
        assert_eq!(policy.time_to_idle(), Some(SNAPSHOT_TTL));

        let user = UserId::parse("u1").unwrap();
        let held = sync.slot(&user).await;
        let _guard = held.lock().await;
        assert!(Arc::ptr_eq(&held, &sync.slot(&user).await));
    }

    #[tokio::test]
    async fn test_current_and_invalidate() {
        let sync = service();
        let user = UserId::parse("u1").unwrap();
        assert!(sync.current(&user).await.is_none());

        let slot = sync.slot(&user).await;
        slot.lock().await.commit_mutation(Some(cart_with_total(50)));
        assert_eq!(sync.current(&user).await.unwrap().revision, 1);

        sync.invalidate(&user).await;
        assert!(sync.current(&user).await.is_none());
        assert_eq!(slot.lock().await.revision, 2);
    }

    #[tokio::test]
    async fn test_slots_are_per_user() {
        let sync = service();
        let a = UserId::parse("a").unwrap();
        let b = UserId::parse("b").unwrap();

        sync.slot(&a)
            .await
            .lock()
            .await
            .commit_mutation(Some(cart_with_total(10)));
        assert!(sync.current(&a).await.is_some());
        assert!(sync.current(&b).await.is_none());
    }
}
