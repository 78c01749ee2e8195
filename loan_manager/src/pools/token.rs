use common_structs::{BridgeTransfer, PoolConfig, PoolId, TokenPoolKind};
use multiversx_sc::contract_base::ManagedSerializer;

multiversx_sc::imports!();

#[multiversx_sc::module]
pub trait TokenPoolModule: common_events::EventsModule {
    /// Hands `amount` of the pool asset to `recipient`.
    ///
    /// Wrapped and bridged pools pay from the hub's balance of the pool token.
    /// The hub never receives payments itself, the orchestrator transfers the
    /// token in ahead of the operations that pay out. A short balance fails
    /// the whole operation.
    ///
    /// # Returns
    /// - Empty for direct and wrapped pools. For a bridged pool, the encoded
    ///   `BridgeTransfer` the caller forwards to the adapter so it mints on the
    ///   destination chain.
    fn send_token(
        &self,
        pool_id: PoolId,
        config: &PoolConfig<Self::Api>,
        recipient: &ManagedAddress,
        amount: &BigUint,
    ) -> ManagedBuffer {
        match &config.token_pool {
            TokenPoolKind::Direct => ManagedBuffer::new(),
            TokenPoolKind::Wrapped(token) => {
                self.tx()
                    .to(recipient)
                    .egld_or_single_esdt(token, 0, amount)
                    .transfer_if_not_empty();

                ManagedBuffer::new()
            },
            TokenPoolKind::Bridged(bridged) => {
                if amount > &BigUint::zero() {
                    self.send().esdt_local_burn(&bridged.token, 0, amount);
                }

                let transfer = BridgeTransfer {
                    adapter: bridged.adapter.clone(),
                    chain_id: bridged.chain_id,
                    token: bridged.token.clone(),
                    recipient: recipient.clone(),
                    amount: amount.clone(),
                };
                self.bridge_transfer_event(pool_id, &transfer);

                ManagedSerializer::new().top_encode_to_managed_buffer(&transfer)
            },
        }
    }
}
