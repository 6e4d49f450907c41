//! Address-bar abstraction.
//!
//! The table never pushes history entries; every write replaces the current
//! entry so back/forward navigation is not polluted by keystrokes or page
//! clicks.

/// The browsing context's current location.
pub trait AddressBar: Send + Sync {
    /// Returns the current path plus query string.
    fn current(&self) -> String;

    /// Replaces the current location without navigating.
    fn replace(&self, url: &str);
}

/// An in-memory address bar for testing and headless hosts.
pub mod mock {
    use super::AddressBar;
    use std::sync::Mutex;

    /// Records every replacement.
    #[derive(Debug, Default)]
    pub struct MemoryAddressBar {
        current: Mutex<String>,
        replaced: Mutex<Vec<String>>,
    }

    impl MemoryAddressBar {
        /// Creates an address bar showing `url`.
        pub fn new(url: impl Into<String>) -> Self {
            Self {
                current: Mutex::new(url.into()),
                replaced: Mutex::new(Vec::new()),
            }
        }

        /// Every URL written so far, oldest first.
        pub fn replacements(&self) -> Vec<String> {
            self.replaced.lock().unwrap().clone()
        }

        /// Number of writes so far.
        pub fn write_count(&self) -> usize {
            self.replaced.lock().unwrap().len()
        }

        /// Simulates the user editing the address bar directly.
        pub fn set_current(&self, url: impl Into<String>) {
            *self.current.lock().unwrap() = url.into();
        }
    }

    impl AddressBar for MemoryAddressBar {
        fn current(&self) -> String {
            self.current.lock().unwrap().clone()
        }

        fn replace(&self, url: &str) {
            *self.current.lock().unwrap() = url.to_string();
            self.replaced.lock().unwrap().push(url.to_string());
        }
    }
}
