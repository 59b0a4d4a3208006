// ── Host collaborator boundary ──
//
// The smart-home host's accessory persistence, reduced to three batch
// calls. Implementations live outside the core (the daemon ships a
// JSON cache host); tests use recording stubs.

use tracing::debug;

use crate::model::AccessoryRecord;

/// The host's accessory registry, as seen by the core.
///
/// Calls are infallible from the core's point of view: a host that
/// fails to persist logs and carries on, it never aborts a reconcile
/// pass.
pub trait AccessoryHost: Send + Sync {
    /// New accessories sighted this pass.
    fn register_accessories(&self, accessories: &[AccessoryRecord]);

    /// Existing accessories whose state was recomputed this pass.
    fn update_accessories(&self, accessories: &[AccessoryRecord]);

    /// Accessories whose devices vanished from the upstream inventory.
    fn unregister_accessories(&self, accessories: &[AccessoryRecord]);
}

/// Host that does nothing but trace. Useful for tests and dry runs.
#[derive(Debug, Default)]
pub struct NullHost;

impl AccessoryHost for NullHost {
    fn register_accessories(&self, accessories: &[AccessoryRecord]) {
        debug!(count = accessories.len(), "register (null host)");
    }

    fn update_accessories(&self, accessories: &[AccessoryRecord]) {
        debug!(count = accessories.len(), "update (null host)");
    }

    fn unregister_accessories(&self, accessories: &[AccessoryRecord]) {
        debug!(count = accessories.len(), "unregister (null host)");
    }
}
