use crate::diagnostics::Diagnostics;
use crate::state::State;
use async_trait::async_trait;

/// Lifecycle operations invoked by the declarative driver.
///
/// Each call runs to completion before the next one is issued for the same
/// instance. Outcomes are reported as diagnostics and as changes to the
/// tracked state:
/// - `create` records the new model in `state`
/// - `read` refreshes `state`, or empties it when the resource is gone
/// - `update` replaces the model in `state`
/// - `delete` empties `state` on success
/// - `import_state` materialises `state` from an external key; the driver is
///   expected to call `read` right after
#[async_trait]
pub trait Resource: Send + Sync {
    type Model: Clone + Send + Sync;

    fn type_name(&self) -> &'static str;

    async fn create(&self, plan: &Self::Model, state: &mut State<Self::Model>) -> Diagnostics;

    async fn read(&self, state: &mut State<Self::Model>) -> Diagnostics;

    async fn update(&self, plan: &Self::Model, state: &mut State<Self::Model>) -> Diagnostics;

    async fn delete(&self, state: &mut State<Self::Model>) -> Diagnostics;

    fn import_state(&self, id: &str, state: &mut State<Self::Model>) -> Diagnostics;
}
