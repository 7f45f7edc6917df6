//! In-memory scripted device
//!
//! Elements are registered under one or more exact locators. Failures can be
//! queued per operation so tests can reproduce crashes, dialogs and stale
//! handles deterministically.

use crate::device::{Device, NATIVE_CONTEXT};
use crate::errors::DeviceError;
use crate::locator::{ElementHandle, Locator};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};

/// Operations that can have failures queued against them
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FakeOp {
    FindElement,
    Click,
    SendKeys,
    Clear,
    Text,
    IsDisplayed,
    IsEnabled,
    PageSource,
    Back,
    ActivateApp,
}

#[derive(Debug, Clone)]
struct FakeElement {
    handle: ElementHandle,
    locators: Vec<Locator>,
    text: String,
    displayed: bool,
    enabled: bool,
    attached: bool,
}

#[derive(Debug)]
struct FakeState {
    elements: Vec<FakeElement>,
    page_source: String,
    activity: String,
    context: String,
    alert: Option<String>,
    failures: HashMap<FakeOp, VecDeque<DeviceError>>,
    calls: Vec<String>,
    typed: HashMap<String, String>,
    next_id: u64,
}

/// Scripted [`Device`] for tests
#[derive(Debug)]
pub struct FakeDevice {
    state: Mutex<FakeState>,
    app_id: Option<String>,
}

impl FakeDevice {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(FakeState {
                elements: Vec::new(),
                page_source: String::from("<hierarchy/>"),
                activity: String::from(".MainActivity"),
                context: NATIVE_CONTEXT.to_string(),
                alert: None,
                failures: HashMap::new(),
                calls: Vec::new(),
                typed: HashMap::new(),
                next_id: 1,
            }),
            app_id: Some(String::from("com.example.app")),
        }
    }

    pub fn with_app_id(mut self, app_id: Option<String>) -> Self {
        self.app_id = app_id;
        self
    }

    /// Register a displayed, enabled element reachable through `locator`
    pub fn add_element(&self, locator: Locator, text: &str) -> ElementHandle {
        let mut state = self.state.lock();
        let handle = ElementHandle::new(format!("el-{}", state.next_id));
        state.next_id += 1;
        state.elements.push(FakeElement {
            handle: handle.clone(),
            locators: vec![locator],
            text: text.to_string(),
            displayed: true,
            enabled: true,
            attached: true,
        });
        handle
    }

    /// Make an existing element reachable through another locator
    pub fn add_alias(&self, handle: &ElementHandle, locator: Locator) {
        let mut state = self.state.lock();
        if let Some(element) = state.elements.iter_mut().find(|e| &e.handle == handle) {
            element.locators.push(locator);
        }
    }

    /// Detach the element: lookups miss and existing handles turn stale
    pub fn remove_element(&self, handle: &ElementHandle) {
        let mut state = self.state.lock();
        if let Some(element) = state.elements.iter_mut().find(|e| &e.handle == handle) {
            element.attached = false;
        }
    }

    pub fn set_displayed(&self, handle: &ElementHandle, displayed: bool) {
        let mut state = self.state.lock();
        if let Some(element) = state.elements.iter_mut().find(|e| &e.handle == handle) {
            element.displayed = displayed;
        }
    }

    pub fn set_enabled(&self, handle: &ElementHandle, enabled: bool) {
        let mut state = self.state.lock();
        if let Some(element) = state.elements.iter_mut().find(|e| &e.handle == handle) {
            element.enabled = enabled;
        }
    }

    pub fn set_page_source(&self, xml: &str) {
        self.state.lock().page_source = xml.to_string();
    }

    pub fn set_activity(&self, activity: &str) {
        self.state.lock().activity = activity.to_string();
    }

    pub fn set_context(&self, context: &str) {
        self.state.lock().context = context.to_string();
    }

    pub fn set_alert(&self, alert: Option<&str>) {
        self.state.lock().alert = alert.map(str::to_string);
    }

    /// Queue an error returned by the next call of `op`
    pub fn fail_next(&self, op: FakeOp, error: DeviceError) {
        self.state
            .lock()
            .failures
            .entry(op)
            .or_default()
            .push_back(error);
    }

    /// Every call made against the device, in order (`"click:el-1"`, ...)
    pub fn calls(&self) -> Vec<String> {
        self.state.lock().calls.clone()
    }

    /// Number of calls whose log entry starts with `prefix`
    pub fn call_count(&self, prefix: &str) -> usize {
        self.state
            .lock()
            .calls
            .iter()
            .filter(|call| call.starts_with(prefix))
            .count()
    }

    /// Last text typed into the element
    pub fn typed_text(&self, handle: &ElementHandle) -> Option<String> {
        self.state.lock().typed.get(&handle.id).cloned()
    }

    pub fn context(&self) -> String {
        self.state.lock().context.clone()
    }

    fn enter(&self, op: FakeOp, call: String) -> Result<(), DeviceError> {
        let mut state = self.state.lock();
        state.calls.push(call);
        match state.failures.get_mut(&op).and_then(VecDeque::pop_front) {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    fn with_attached<T>(
        &self,
        handle: &ElementHandle,
        f: impl FnOnce(&mut FakeElement) -> T,
    ) -> Result<T, DeviceError> {
        let mut state = self.state.lock();
        match state
            .elements
            .iter_mut()
            .find(|e| &e.handle == handle && e.attached)
        {
            Some(element) => Ok(f(element)),
            None => Err(DeviceError::StaleElement(handle.id.clone())),
        }
    }
}

impl Default for FakeDevice {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Device for FakeDevice {
    async fn find_element(&self, locator: &Locator) -> Result<ElementHandle, DeviceError> {
        self.enter(FakeOp::FindElement, format!("find:{}", locator.value))?;
        let state = self.state.lock();
        state
            .elements
            .iter()
            .find(|e| e.attached && e.locators.contains(locator))
            .map(|e| e.handle.clone())
            .ok_or_else(|| DeviceError::NoSuchElement(locator.to_string()))
    }

    async fn find_elements(&self, locator: &Locator) -> Result<Vec<ElementHandle>, DeviceError> {
        self.enter(FakeOp::FindElement, format!("find_all:{}", locator.value))?;
        let state = self.state.lock();
        Ok(state
            .elements
            .iter()
            .filter(|e| e.attached && e.locators.contains(locator))
            .map(|e| e.handle.clone())
            .collect())
    }

    async fn click(&self, element: &ElementHandle) -> Result<(), DeviceError> {
        self.enter(FakeOp::Click, format!("click:{}", element.id))?;
        self.with_attached(element, |_| ())
    }

    async fn send_keys(&self, element: &ElementHandle, text: &str) -> Result<(), DeviceError> {
        self.enter(FakeOp::SendKeys, format!("send_keys:{}", element.id))?;
        self.with_attached(element, |_| ())?;
        self.state
            .lock()
            .typed
            .insert(element.id.clone(), text.to_string());
        Ok(())
    }

    async fn clear(&self, element: &ElementHandle) -> Result<(), DeviceError> {
        self.enter(FakeOp::Clear, format!("clear:{}", element.id))?;
        self.with_attached(element, |_| ())?;
        self.state.lock().typed.remove(&element.id);
        Ok(())
    }

    async fn text(&self, element: &ElementHandle) -> Result<String, DeviceError> {
        self.enter(FakeOp::Text, format!("text:{}", element.id))?;
        self.with_attached(element, |e| e.text.clone())
    }

    async fn is_displayed(&self, element: &ElementHandle) -> Result<bool, DeviceError> {
        self.enter(FakeOp::IsDisplayed, format!("is_displayed:{}", element.id))?;
        self.with_attached(element, |e| e.displayed)
    }

    async fn is_enabled(&self, element: &ElementHandle) -> Result<bool, DeviceError> {
        self.enter(FakeOp::IsEnabled, format!("is_enabled:{}", element.id))?;
        self.with_attached(element, |e| e.enabled)
    }

    async fn page_source(&self) -> Result<String, DeviceError> {
        self.enter(FakeOp::PageSource, "page_source".to_string())?;
        Ok(self.state.lock().page_source.clone())
    }

    async fn current_activity(&self) -> Result<String, DeviceError> {
        Ok(self.state.lock().activity.clone())
    }

    async fn current_context(&self) -> Result<String, DeviceError> {
        Ok(self.state.lock().context.clone())
    }

    async fn switch_context(&self, name: &str) -> Result<(), DeviceError> {
        let mut state = self.state.lock();
        state.calls.push(format!("switch_context:{}", name));
        state.context = name.to_string();
        Ok(())
    }

    async fn back(&self) -> Result<(), DeviceError> {
        self.enter(FakeOp::Back, "back".to_string())
    }

    fn app_id(&self) -> Option<String> {
        self.app_id.clone()
    }

    async fn activate_app(&self, app_id: &str) -> Result<(), DeviceError> {
        self.enter(FakeOp::ActivateApp, format!("activate_app:{}", app_id))
    }

    async fn accept_alert(&self) -> Result<(), DeviceError> {
        let mut state = self.state.lock();
        state.calls.push("accept_alert".to_string());
        state.alert.take().map(|_| ()).ok_or(DeviceError::NoAlertOpen)
    }

    async fn dismiss_alert(&self) -> Result<(), DeviceError> {
        let mut state = self.state.lock();
        state.calls.push("dismiss_alert".to_string());
        state.alert.take().map(|_| ()).ok_or(DeviceError::NoAlertOpen)
    }
}
