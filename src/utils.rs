//! # Utility Functions Module
//!
//! Small helpers for building tool command lines.

/// Converts any iterable of string-like items to `Vec<String>`.
///
/// # Example
/// ```rust,ignore
/// use crate::utils::to_string_vec;
///
/// let quality = 80;
/// let args = to_string_vec(["--verbose", "--quality", &quality.to_string()]);
/// ```
pub fn to_string_vec<T, I>(items: I) -> Vec<String>
where
    T: ToString,
    I: IntoIterator<Item = T>,
{
    items.into_iter().map(|item| item.to_string()).collect()
}

/// Builds an argument vector from mixed `Display` values.
///
/// # Example
/// ```rust,ignore
/// let quality = 80;
/// let args = args!["--verbose", "--quality", quality];
/// ```
#[macro_export]
macro_rules! args {
    [$($item:expr),* $(,)?] => {
        $crate::utils::to_string_vec::<&dyn ::std::fmt::Display, _>([$(&$item as &dyn ::std::fmt::Display),*])
    };
}
