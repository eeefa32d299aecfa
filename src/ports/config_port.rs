//! Configuration access port trait.

/// Read-only view of sectioned `key = value` settings.
///
/// Values come back raw; typing and range checks live in
/// `domain::config_validation`.
pub trait ConfigPort {
    fn get_string(&self, section: &str, key: &str) -> Option<String>;

    /// Section names present in the source, lowercased.
    fn sections(&self) -> Vec<String>;
}
