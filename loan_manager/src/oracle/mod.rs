use common_constants::MAX_ASSET_DECIMALS;
use common_errors::{
    ERROR_CALLER_NOT_PRICE_UPDATER, ERROR_INVALID_DECIMALS, ERROR_INVALID_PRICE,
    ERROR_NO_PRICE_FEED, ERROR_POOL_NOT_FOUND,
};
use common_structs::{PoolId, PriceFeed};

use crate::storage;

multiversx_sc::imports!();

/// Push based price feed: allow-listed updaters publish one dollar price per
/// pool, 18 decimals per whole token.
#[multiversx_sc::module]
pub trait OracleModule:
    storage::Storage + common_events::EventsModule + common_math::SharedMathModule
{
    /// Publishes the dollar price of one whole token of the pool asset.
    ///
    /// # Arguments
    /// - `pool_id`: Listed pool.
    /// - `price`: Raw price with 18 decimals.
    ///
    /// # Errors
    /// - `ERROR_CALLER_NOT_PRICE_UPDATER`: Caller is not in the allow-list.
    /// - `ERROR_POOL_NOT_FOUND`: Unknown pool.
    /// - `ERROR_INVALID_PRICE`: Zero price.
    #[endpoint(updatePriceFeed)]
    fn update_price_feed(&self, pool_id: PoolId, price: BigUint) {
        let caller = self.blockchain().get_caller();
        require!(
            self.price_feed_updaters().contains(&caller),
            ERROR_CALLER_NOT_PRICE_UPDATER
        );

        let config_mapper = self.pool_config(pool_id);
        require!(!config_mapper.is_empty(), ERROR_POOL_NOT_FOUND);
        require!(price > BigUint::zero(), ERROR_INVALID_PRICE);

        let decimals = config_mapper.get().asset_decimals;
        require!(decimals <= MAX_ASSET_DECIMALS, ERROR_INVALID_DECIMALS);

        let feed = PriceFeed {
            price: self.to_decimal_wad(price),
            decimals,
        };
        self.price_feed(pool_id).set(&feed);

        self.price_feed_updated_event(pool_id, &feed.price, feed.decimals);
    }

    /// Current feed of a pool.
    ///
    /// # Errors
    /// - `ERROR_NO_PRICE_FEED`: Nothing was ever published for the pool.
    fn get_price_feed(&self, pool_id: PoolId) -> PriceFeed<Self::Api> {
        let mapper = self.price_feed(pool_id);
        require!(!mapper.is_empty(), ERROR_NO_PRICE_FEED);

        mapper.get()
    }
}
