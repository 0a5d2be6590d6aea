//! Navigator that records every navigation instead of performing it

use std::sync::Mutex;

use tabauth_core::ports::Navigator;
use tabauth_domain::Result as DomainResult;

pub struct RecordingNavigator {
    location: Mutex<String>,
    assigned: Mutex<Vec<String>>,
    replaced: Mutex<Vec<String>>,
}

impl RecordingNavigator {
    pub fn new(location: &str) -> Self {
        Self {
            location: Mutex::new(location.to_string()),
            assigned: Mutex::new(Vec::new()),
            replaced: Mutex::new(Vec::new()),
        }
    }

    /// Full navigations, oldest first
    pub fn assigned(&self) -> Vec<String> {
        self.assigned.lock().unwrap().clone()
    }

    /// In-place history replacements, oldest first
    pub fn replaced(&self) -> Vec<String> {
        self.replaced.lock().unwrap().clone()
    }

    pub fn location(&self) -> String {
        self.location.lock().unwrap().clone()
    }
}

impl Navigator for RecordingNavigator {
    fn current_url(&self) -> String {
        self.location()
    }

    fn assign(&self, url: &str) -> DomainResult<()> {
        self.assigned.lock().unwrap().push(url.to_string());
        Ok(())
    }

    fn replace(&self, url: &str) -> DomainResult<()> {
        self.replaced.lock().unwrap().push(url.to_string());
        *self.location.lock().unwrap() = url.to_string();
        Ok(())
    }
}
