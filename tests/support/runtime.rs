//! Tokio runtime and mock Treehole server shared by behavioural steps.

use std::future::Future;
use std::io;
use std::rc::Rc;

use rstest_bdd::Slot;
use tokio::runtime::Runtime;
use wiremock::MockServer;

/// Cloneable handle to the scenario's Tokio runtime.
#[derive(Clone)]
pub struct ScenarioRuntime(Rc<Runtime>);

impl ScenarioRuntime {
    /// Runs `future` to completion on the scenario runtime.
    pub fn block_on<F: Future>(&self, future: F) -> F::Output {
        self.0.block_on(future)
    }
}

/// Returns the scenario runtime, starting it and the mock API on first use.
///
/// # Errors
///
/// Returns an error if the Tokio runtime cannot be created.
pub fn start_mock_api(
    runtime: &Slot<ScenarioRuntime>,
    server: &Slot<MockServer>,
) -> Result<ScenarioRuntime, io::Error> {
    let handle = match runtime.get() {
        Some(existing) => existing,
        None => {
            let created = ScenarioRuntime(Rc::new(Runtime::new()?));
            runtime.set(created.clone());
            created
        }
    };

    if server.with_ref(|_| ()).is_none() {
        server.set(handle.block_on(MockServer::start()));
    }

    Ok(handle)
}
