//! Concrete UI actions

use crate::waiting::{wait_for_element, WaitOptions};
use action_middleware::ActionContext;
use element_cache::ElementCache;
use resilience_core_types::{
    ActionArgs, ActionError, ActionKind, ActionOutput, Device, ElementHandle, Locator,
};
use tracing::{debug, info};

/// Element resolved for an action
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved {
    pub element: ElementHandle,
    pub from_cache: bool,
}

/// Cache-first resolution; a fresh resolution is stored in the cache
pub async fn locate(
    device: &dyn Device,
    cache: &mut ElementCache,
    locator: &Locator,
    options: &WaitOptions,
) -> Result<Resolved, ActionError> {
    if let Some(element) = cache.get(locator, device).await {
        debug!("cache hit for {}", locator);
        return Ok(Resolved {
            element,
            from_cache: true,
        });
    }

    let element = wait_for_element(device, locator, options).await?;
    cache.put(locator.clone(), element.clone());
    Ok(Resolved {
        element,
        from_cache: false,
    })
}

/// Run `action` against an already resolved element
pub async fn apply(
    device: &dyn Device,
    element: &ElementHandle,
    action: ActionKind,
    args: &ActionArgs,
) -> Result<ActionOutput, ActionError> {
    match action {
        ActionKind::Locate => {}
        ActionKind::Click => {
            device.click(element).await?;
        }
        ActionKind::TypeText => {
            let text = args.text.as_deref().unwrap_or_default();
            device.clear(element).await?;
            device.send_keys(element, text).await?;
        }
        ActionKind::ReadText => {
            return Ok(ActionOutput::Text(device.text(element).await?));
        }
    }
    Ok(ActionOutput::Element(element.clone()))
}

/// Resolve `ctx.locator` and perform `ctx.action` on it
///
/// A cached handle that turns out stale while the action runs is dropped
/// from the cache and resolved again, once.
pub async fn execute(
    ctx: &mut ActionContext<'_>,
    options: &WaitOptions,
) -> Result<ActionOutput, ActionError> {
    let resolved = locate(ctx.device, ctx.cache, &ctx.locator, options).await?;

    info!(
        action_id = %ctx.action_id,
        action = %ctx.action,
        element = %resolved.element,
        from_cache = resolved.from_cache,
        "Applying action"
    );

    match apply(ctx.device, &resolved.element, ctx.action, &ctx.args).await {
        Err(err) if err.is_stale() && resolved.from_cache => {
            debug!(
                action_id = %ctx.action_id,
                "cached element went stale, resolving {} again",
                ctx.locator
            );
            ctx.cache.invalidate(&ctx.locator);
            let element = wait_for_element(ctx.device, &ctx.locator, options).await?;
            ctx.cache.put(ctx.locator.clone(), element.clone());
            apply(ctx.device, &element, ctx.action, &ctx.args).await
        }
        other => other,
    }
}
