//! Built-in recovery strategies
//!
//! | name                | priority | repairs                                  |
//! |---------------------|----------|------------------------------------------|
//! | `permission_dialog` | 10       | Android runtime-permission prompt        |
//! | `anr_dialog`        | 15       | "App isn't responding" dialog            |
//! | `system_dialog`     | 20       | update / rating / generic system dialogs |
//! | `native_alert`      | 25       | native alert reported by the driver      |
//! | `webview_escape`    | 35       | session stuck in a webview context       |
//! | `crash_restart`     | 40       | "has stopped" crash dialog               |
//! | `back_button`       | 50       | unknown screen                           |

use crate::errors::RecoveryError;
use crate::manager::RecoveryManager;
use crate::strategy::RecoveryStrategy;
use async_trait::async_trait;
use resilience_core_types::{Device, DeviceError, Locator, NATIVE_CONTEXT};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, info};

pub const PERMISSION_ALLOW_BUTTON_IDS: &[&str] = &[
    "com.android.packageinstaller:id/permission_allow_button",
    "com.android.permissioncontroller:id/permission_allow_button",
    "com.android.permissioncontroller:id/permission_allow_foreground_only_button",
    "com.android.packageinstaller:id/permission_allow_always_button",
];

pub const ANR_WAIT_XPATH: &str = r#"//*[@text="等待" or @text="Wait"]"#;

pub const SYSTEM_DIALOG_DISMISS_XPATHS: &[&str] = &[
    r#"//*[@text="取消" or @text="Cancel" or @text="稍後"]"#,
    r#"//*[@text="不用了" or @text="No thanks" or @text="略過"]"#,
    r#"//*[@text="關閉" or @text="Close" or @text="Dismiss"]"#,
    r#"//*[@text="OK" or @text="確定" or @text="Got it"]"#,
    r#"//*[@resource-id="android:id/button2"]"#,
];

pub const CRASH_INDICATOR_XPATHS: &[&str] = &[
    r#"//*[contains(@text,"has stopped")]"#,
    r#"//*[contains(@text,"已停止")]"#,
    r#"//*[contains(@text,"keeps stopping")]"#,
    r#"//*[contains(@text,"持續停止")]"#,
];

pub const CRASH_CLOSE_XPATH: &str =
    r#"//*[@text="Close" or @text="關閉" or @text="OK" or @text="確定"]"#;

/// Time given to a restarted app to come back up
pub const CRASH_RESTART_WAIT: Duration = Duration::from_secs(3);

/// Time given to the previous screen to render after "back"
pub const BACK_SETTLE_WAIT: Duration = Duration::from_secs(1);

/// A page source shorter than this means the app is no longer in front
const MIN_IN_APP_SOURCE_LEN: usize = 100;

/// Register every built-in strategy with its default priority
pub fn register_builtin_strategies(manager: &RecoveryManager) -> Result<(), RecoveryError> {
    manager.register("permission_dialog", 10, Arc::new(PermissionDialog))?;
    manager.register("anr_dialog", 15, Arc::new(AnrDialog))?;
    manager.register("system_dialog", 20, Arc::new(SystemDialog))?;
    manager.register("native_alert", 25, Arc::new(NativeAlert))?;
    manager.register("webview_escape", 35, Arc::new(WebviewEscape))?;
    manager.register("crash_restart", 40, Arc::new(CrashRestart::default()))?;
    manager.register("back_button", 50, Arc::new(BackButton::default()))?;
    Ok(())
}

/// Click the element if it exists and is displayed; lookup failures are "no"
async fn click_if_displayed(device: &dyn Device, locator: &Locator) -> bool {
    let element = match device.find_element(locator).await {
        Ok(element) => element,
        Err(_) => return false,
    };
    if !matches!(device.is_displayed(&element).await, Ok(true)) {
        return false;
    }
    match device.click(&element).await {
        Ok(()) => true,
        Err(err) => {
            debug!("click on {} failed: {}", locator, err);
            false
        }
    }
}

async fn is_displayed(device: &dyn Device, locator: &Locator) -> bool {
    match device.find_element(locator).await {
        Ok(element) => matches!(device.is_displayed(&element).await, Ok(true)),
        Err(_) => false,
    }
}

/// Allows the pending runtime-permission request
pub struct PermissionDialog;

#[async_trait]
impl RecoveryStrategy for PermissionDialog {
    async fn recover(&self, device: &dyn Device) -> Result<bool, DeviceError> {
        for id in PERMISSION_ALLOW_BUTTON_IDS {
            if click_if_displayed(device, &Locator::id(*id)).await {
                info!("permission dialog allowed");
                return Ok(true);
            }
        }
        Ok(false)
    }
}

/// Presses "Wait" on an ANR dialog
pub struct AnrDialog;

#[async_trait]
impl RecoveryStrategy for AnrDialog {
    async fn recover(&self, device: &dyn Device) -> Result<bool, DeviceError> {
        if click_if_displayed(device, &Locator::xpath(ANR_WAIT_XPATH)).await {
            info!("ANR dialog dismissed with 'wait'");
            return Ok(true);
        }
        Ok(false)
    }
}

/// Dismisses update, rating and similar system dialogs
pub struct SystemDialog;

#[async_trait]
impl RecoveryStrategy for SystemDialog {
    async fn recover(&self, device: &dyn Device) -> Result<bool, DeviceError> {
        for xpath in SYSTEM_DIALOG_DISMISS_XPATHS {
            if click_if_displayed(device, &Locator::xpath(*xpath)).await {
                info!("system dialog dismissed via {}", xpath);
                return Ok(true);
            }
        }
        Ok(false)
    }
}

/// Accepts a native alert the driver reports as open
pub struct NativeAlert;

#[async_trait]
impl RecoveryStrategy for NativeAlert {
    async fn recover(&self, device: &dyn Device) -> Result<bool, DeviceError> {
        match device.accept_alert().await {
            Ok(()) => {
                info!("native alert accepted");
                Ok(true)
            }
            Err(DeviceError::NoAlertOpen) => Ok(false),
            Err(err) => Err(err),
        }
    }
}

/// Switches a session stuck in a webview back to the native context
pub struct WebviewEscape;

#[async_trait]
impl RecoveryStrategy for WebviewEscape {
    async fn recover(&self, device: &dyn Device) -> Result<bool, DeviceError> {
        let context = device.current_context().await?;
        if !context.to_uppercase().contains("WEBVIEW") {
            return Ok(false);
        }
        device.switch_context(NATIVE_CONTEXT).await?;
        info!("switched from {} back to {}", context, NATIVE_CONTEXT);
        Ok(true)
    }
}

/// Closes a crash dialog and relaunches the app
pub struct CrashRestart {
    restart_wait: Duration,
}

impl CrashRestart {
    pub fn new(restart_wait: Duration) -> Self {
        Self { restart_wait }
    }
}

impl Default for CrashRestart {
    fn default() -> Self {
        Self::new(CRASH_RESTART_WAIT)
    }
}

#[async_trait]
impl RecoveryStrategy for CrashRestart {
    async fn recover(&self, device: &dyn Device) -> Result<bool, DeviceError> {
        let mut crashed = false;
        for xpath in CRASH_INDICATOR_XPATHS {
            if is_displayed(device, &Locator::xpath(*xpath)).await {
                crashed = true;
                break;
            }
        }
        if !crashed {
            return Ok(false);
        }

        let Some(app_id) = device.app_id() else {
            debug!("crash dialog found but the app id is unknown");
            return Ok(false);
        };

        // the dialog may already be gone
        click_if_displayed(device, &Locator::xpath(CRASH_CLOSE_XPATH)).await;
        device.activate_app(&app_id).await?;
        sleep(self.restart_wait).await;
        info!("app {} restarted after crash", app_id);
        Ok(true)
    }
}

/// Navigates back and checks the app is still in front
pub struct BackButton {
    settle_wait: Duration,
}

impl BackButton {
    pub fn new(settle_wait: Duration) -> Self {
        Self { settle_wait }
    }
}

impl Default for BackButton {
    fn default() -> Self {
        Self::new(BACK_SETTLE_WAIT)
    }
}

#[async_trait]
impl RecoveryStrategy for BackButton {
    async fn recover(&self, device: &dyn Device) -> Result<bool, DeviceError> {
        device.back().await?;
        sleep(self.settle_wait).await;
        let source = device.page_source().await?;
        if source.len() > MIN_IN_APP_SOURCE_LEN {
            info!("navigated back");
            return Ok(true);
        }
        Ok(false)
    }
}
