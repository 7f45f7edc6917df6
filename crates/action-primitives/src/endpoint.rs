use crate::primitives::execute;
use crate::waiting::WaitOptions;
use action_middleware::{ActionContext, Endpoint};
use async_trait::async_trait;
use resilience_core_types::{ActionError, ActionOutput};

/// Chain endpoint performing the action on the device
#[derive(Debug, Clone, Copy, Default)]
pub struct PrimitiveEndpoint {
    wait: WaitOptions,
}

impl PrimitiveEndpoint {
    pub fn new(wait: WaitOptions) -> Self {
        Self { wait }
    }

    pub fn wait_options(&self) -> &WaitOptions {
        &self.wait
    }
}

#[async_trait]
impl Endpoint for PrimitiveEndpoint {
    async fn call(&self, ctx: &mut ActionContext<'_>) -> Result<ActionOutput, ActionError> {
        execute(ctx, &self.wait).await
    }
}
