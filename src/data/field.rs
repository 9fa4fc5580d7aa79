//! A value that may not have been loaded yet.

use std::fmt;

/// Text shown for a field that has never been loaded.
pub const LOADING: &str = "Loading...";

/// A snapshot slot: either never loaded, or the last good value.
///
/// This replaces placeholder strings, so "never loaded" can't be confused
/// with a loaded value that happens to equal the placeholder text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Field<T> {
    Unloaded,
    Loaded(T),
}

impl<T> Default for Field<T> {
    fn default() -> Self {
        Field::Unloaded
    }
}

impl<T> Field<T> {
    pub fn is_loaded(&self) -> bool {
        matches!(self, Field::Loaded(_))
    }

    /// Borrow the loaded value, if any.
    pub fn get(&self) -> Option<&T> {
        match self {
            Field::Loaded(value) => Some(value),
            Field::Unloaded => None,
        }
    }

    /// Render with a custom formatter, or the placeholder if unloaded.
    pub fn display_with<F>(&self, placeholder: &str, f: F) -> String
    where
        F: FnOnce(&T) -> String,
    {
        match self {
            Field::Loaded(value) => f(value),
            Field::Unloaded => placeholder.to_string(),
        }
    }
}

impl<T: Copy + Default> Field<T> {
    /// The loaded value, or `T::default()` (zero for counters).
    pub fn value_or_default(&self) -> T {
        self.get().copied().unwrap_or_default()
    }
}

impl<T: fmt::Display> fmt::Display for Field<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Field::Loaded(value) => value.fmt(f),
            Field::Unloaded => f.write_str(LOADING),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unloaded_displays_placeholder() {
        let field: Field<u64> = Field::default();
        assert_eq!(field.to_string(), "Loading...");
        assert!(!field.is_loaded());
    }

    #[test]
    fn loaded_placeholder_text_is_still_loaded() {
        let field = Field::Loaded(LOADING.to_string());
        assert!(field.is_loaded());
        assert_ne!(field, Field::Unloaded);
    }

    #[test]
    fn value_or_default_is_zero_when_unloaded() {
        assert_eq!(Field::<u64>::Unloaded.value_or_default(), 0);
        assert_eq!(Field::Loaded(7u64).value_or_default(), 7);
    }
}
