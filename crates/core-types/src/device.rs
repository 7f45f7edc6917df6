//! Port to the device-automation driver
//!
//! The pipeline never assumes a transport. Anything that can answer these
//! calls (an Appium/WebDriver client, a simulator bridge, a test double) can
//! drive it.

use crate::errors::DeviceError;
use crate::locator::{ElementHandle, Locator};
use async_trait::async_trait;

/// Automation context name of the native UI layer
pub const NATIVE_CONTEXT: &str = "NATIVE_APP";

/// Capabilities the pipeline requires from the automation driver
///
/// `find_element` performs a single lookup; waiting and polling are done by
/// the pipeline so every wait stays bounded by its own configuration.
#[async_trait]
pub trait Device: Send + Sync {
    /// Single, non-waiting lookup of one element
    async fn find_element(&self, locator: &Locator) -> Result<ElementHandle, DeviceError>;

    /// All elements currently matching the locator (possibly none)
    async fn find_elements(&self, locator: &Locator) -> Result<Vec<ElementHandle>, DeviceError>;

    async fn click(&self, element: &ElementHandle) -> Result<(), DeviceError>;

    async fn send_keys(&self, element: &ElementHandle, text: &str) -> Result<(), DeviceError>;

    async fn clear(&self, element: &ElementHandle) -> Result<(), DeviceError>;

    /// Visible text of the element
    async fn text(&self, element: &ElementHandle) -> Result<String, DeviceError>;

    async fn is_displayed(&self, element: &ElementHandle) -> Result<bool, DeviceError>;

    async fn is_enabled(&self, element: &ElementHandle) -> Result<bool, DeviceError>;

    /// Hierarchical XML snapshot of the current UI
    async fn page_source(&self) -> Result<String, DeviceError>;

    /// Identifier of the current screen (activity on Android, empty if unknown)
    async fn current_activity(&self) -> Result<String, DeviceError>;

    /// Name of the active automation context (`NATIVE_APP`, `WEBVIEW_*`)
    async fn current_context(&self) -> Result<String, DeviceError>;

    async fn switch_context(&self, name: &str) -> Result<(), DeviceError>;

    /// Platform "back" navigation
    async fn back(&self) -> Result<(), DeviceError>;

    /// Package / bundle id of the application under test, if known
    fn app_id(&self) -> Option<String>;

    /// Bring the application to the foreground, launching it if needed
    async fn activate_app(&self, app_id: &str) -> Result<(), DeviceError>;

    async fn accept_alert(&self) -> Result<(), DeviceError>;

    async fn dismiss_alert(&self) -> Result<(), DeviceError>;
}
