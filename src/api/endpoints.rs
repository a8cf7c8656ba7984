//! Relative paths of the Injective REST routes the exporter polls.

pub const SYNCING: &str = "/cosmos/base/tendermint/v1beta1/syncing";
pub const MODULE_STATE: &str = "/peggy/v1/module_state";

/// Last event nonce claimed by the orchestrator.
pub fn oracle_event(orchestrator_address: &str) -> String {
    format!("/peggy/v1/oracle/event/{orchestrator_address}")
}

/// Valsets the orchestrator has not yet confirmed.
pub fn last_pending_valsets(orchestrator_address: &str) -> String {
    format!("/peggy/v1/valset/last?address={orchestrator_address}")
}

/// Batches the orchestrator has not yet confirmed.
pub fn last_pending_batches(orchestrator_address: &str) -> String {
    format!("/peggy/v1/batch/last?address={orchestrator_address}")
}
