use common_structs::{LoanPool, LoanTypeId, PoolConfig, PoolId, PoolState, PriceFeed};

multiversx_sc::imports!();

/// Loan pools are keyed by `loan_type_id << 8 | pool_id`.
fn loan_pool_key(loan_type_id: LoanTypeId, pool_id: PoolId) -> u32 {
    ((loan_type_id as u32) << 8) | pool_id as u32
}

fn split_loan_pool_key(key: u32) -> (LoanTypeId, PoolId) {
    ((key >> 8) as LoanTypeId, (key & 0xff) as PoolId)
}

/// Operation scoped stage of every pool and loan pool an operation touches.
///
/// **Scope**: samples the block timestamp once, refreshes each pool's
/// interest indexes and each loan pool's reward indexes the first time they
/// are read, and keeps the mutated copies in memory.
///
/// **Goal**: every read of an operation observes the same instant, and storage
/// is written once, after every precondition has passed. A failed `require!`
/// aborts before anything reaches storage.
pub struct Cache<'a, C>
where
    C: crate::storage::Storage
        + crate::oracle::OracleModule
        + crate::pools::PoolModule
        + crate::rewards::RewardsModule,
{
    sc_ref: &'a C,
    /// Block timestamp sampled when the cache is created.
    pub timestamp: u64,
    pool_configs: ManagedMapEncoded<C::Api, PoolId, PoolConfig<C::Api>>,
    pool_states: ManagedMapEncoded<C::Api, PoolId, PoolState<C::Api>>,
    loan_pools: ManagedMapEncoded<C::Api, u32, LoanPool<C::Api>>,
    price_feeds: ManagedMapEncoded<C::Api, PoolId, PriceFeed<C::Api>>,
    touched_pools: ManagedVec<C::Api, PoolId>,
    touched_loan_pools: ManagedVec<C::Api, u32>,
    commit: bool,
}

impl<'a, C> Cache<'a, C>
where
    C: crate::storage::Storage
        + crate::oracle::OracleModule
        + crate::pools::PoolModule
        + crate::rewards::RewardsModule,
{
    pub fn new(sc_ref: &'a C) -> Self {
        Cache {
            timestamp: sc_ref.blockchain().get_block_timestamp(),
            pool_configs: ManagedMapEncoded::new(),
            pool_states: ManagedMapEncoded::new(),
            loan_pools: ManagedMapEncoded::new(),
            price_feeds: ManagedMapEncoded::new(),
            touched_pools: ManagedVec::new(),
            touched_loan_pools: ManagedVec::new(),
            commit: true,
            sc_ref,
        }
    }

    /// Same staging, nothing written back and no refresh logged. Used by views.
    pub fn new_view(sc_ref: &'a C) -> Self {
        let mut cache = Self::new(sc_ref);
        cache.commit = false;
        cache
    }

    pub fn get_pool_config(&mut self, pool_id: PoolId) -> PoolConfig<C::Api> {
        if self.pool_configs.contains(&pool_id) {
            return self.pool_configs.get(&pool_id);
        }

        let config = self.sc_ref.get_listed_pool_config(pool_id);
        self.pool_configs.put(&pool_id, &config);

        config
    }

    /// Writes through to storage; configuration only changes in owner calls.
    pub fn set_pool_config(&mut self, pool_id: PoolId, config: &PoolConfig<C::Api>) {
        self.sc_ref.pool_config(pool_id).set(config);
        self.pool_configs.put(&pool_id, config);
    }

    /// Returns the pool state with its indexes refreshed to `self.timestamp`.
    pub fn get_pool_state(&mut self, pool_id: PoolId) -> PoolState<C::Api> {
        if self.pool_states.contains(&pool_id) {
            return self.pool_states.get(&pool_id);
        }

        let config = self.get_pool_config(pool_id);
        let mut state = self.sc_ref.pool_state(pool_id).get();
        if self.commit {
            self.sc_ref
                .update_interest_indexes(pool_id, &config, &mut state, self.timestamp);
        } else {
            self.sc_ref
                .accrue_interest_indexes(&config, &mut state, self.timestamp);
        }

        self.pool_states.put(&pool_id, &state);
        self.touched_pools.push(pool_id);

        state
    }

    pub fn set_pool_state(&mut self, pool_id: PoolId, state: &PoolState<C::Api>) {
        if !self.pool_states.contains(&pool_id) {
            self.touched_pools.push(pool_id);
        }
        self.pool_states.put(&pool_id, state);
    }

    /// Returns the loan pool with its reward indexes refreshed to `self.timestamp`.
    pub fn get_loan_pool(&mut self, loan_type_id: LoanTypeId, pool_id: PoolId) -> LoanPool<C::Api> {
        let key = loan_pool_key(loan_type_id, pool_id);
        if self.loan_pools.contains(&key) {
            return self.loan_pools.get(&key);
        }

        let mut loan_pool = self.sc_ref.get_listed_loan_pool(loan_type_id, pool_id);
        if self.commit {
            self.sc_ref
                .update_reward_indexes(loan_type_id, pool_id, &mut loan_pool, self.timestamp);
        } else {
            self.sc_ref.accrue_reward_indexes(&mut loan_pool, self.timestamp);
        }

        self.loan_pools.put(&key, &loan_pool);
        self.touched_loan_pools.push(key);

        loan_pool
    }

    pub fn set_loan_pool(
        &mut self,
        loan_type_id: LoanTypeId,
        pool_id: PoolId,
        loan_pool: &LoanPool<C::Api>,
    ) {
        let key = loan_pool_key(loan_type_id, pool_id);
        if !self.loan_pools.contains(&key) {
            self.touched_loan_pools.push(key);
        }
        self.loan_pools.put(&key, loan_pool);
    }

    pub fn get_price_feed(&mut self, pool_id: PoolId) -> PriceFeed<C::Api> {
        if self.price_feeds.contains(&pool_id) {
            return self.price_feeds.get(&pool_id);
        }

        let feed = self.sc_ref.get_price_feed(pool_id);
        self.price_feeds.put(&pool_id, &feed);

        feed
    }
}

impl<C> Drop for Cache<'_, C>
where
    C: crate::storage::Storage
        + crate::oracle::OracleModule
        + crate::pools::PoolModule
        + crate::rewards::RewardsModule,
{
    fn drop(&mut self) {
        if !self.commit {
            return;
        }

        for pool_id in self.touched_pools.iter() {
            self.sc_ref
                .pool_state(pool_id)
                .set(self.pool_states.get(&pool_id));
        }

        for key in self.touched_loan_pools.iter() {
            let (loan_type_id, pool_id) = split_loan_pool_key(key);
            self.sc_ref
                .loan_pool(loan_type_id, pool_id)
                .set(self.loan_pools.get(&key));
        }
    }
}
