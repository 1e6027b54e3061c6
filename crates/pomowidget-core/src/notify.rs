//! Completion notifications.

use std::cell::RefCell;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

/// Notification permission as reported by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Permission {
    /// Not asked yet.
    Default,
    Granted,
    Denied,
    /// The host has no notification service.
    Unsupported,
}

pub trait Notifier {
    fn permission(&self) -> Permission;

    /// Ask for permission. Fire-and-forget; the answer shows up later through
    /// [`Notifier::permission`].
    fn request_permission(&mut self);

    fn notify(&mut self, message: &str);
}

#[derive(Debug)]
struct RecorderInner {
    permission: Permission,
    grant_on_request: bool,
    requests: usize,
    messages: Vec<String>,
}

/// In-process notifier that records what it was asked to do. Clones share
/// the record.
#[derive(Debug, Clone)]
pub struct RecordingNotifier {
    inner: Rc<RefCell<RecorderInner>>,
}

impl RecordingNotifier {
    pub fn with_permission(permission: Permission) -> Self {
        Self {
            inner: Rc::new(RefCell::new(RecorderInner {
                permission,
                grant_on_request: false,
                requests: 0,
                messages: Vec::new(),
            })),
        }
    }

    /// Answer any permission request with `Granted`.
    pub fn granting(self) -> Self {
        self.inner.borrow_mut().grant_on_request = true;
        self
    }

    pub fn permission_requests(&self) -> usize {
        self.inner.borrow().requests
    }

    pub fn messages(&self) -> Vec<String> {
        self.inner.borrow().messages.clone()
    }
}

impl Notifier for RecordingNotifier {
    fn permission(&self) -> Permission {
        self.inner.borrow().permission
    }

    fn request_permission(&mut self) {
        let mut inner = self.inner.borrow_mut();
        inner.requests += 1;
        if inner.grant_on_request {
            inner.permission = Permission::Granted;
        }
    }

    fn notify(&mut self, message: &str) {
        self.inner.borrow_mut().messages.push(message.to_string());
    }
}
