//! Small string helpers shared by pipeline stages

/// Left-pad `value` with zeros to `width` characters
///
/// Strings already at or beyond `width` are returned unchanged.
///
/// # Examples
///
/// ```
/// use pipedb::utils::zero_fill;
///
/// assert_eq!(zero_fill("42", 5), "00042");
/// assert_eq!(zero_fill("123456", 5), "123456");
/// ```
pub fn zero_fill(value: &str, width: usize) -> String {
    format!("{:0>width$}", value, width = width)
}
