/// Builds a [`BlockMap`](crate::BlockMap) from `key => value` pairs.
///
/// A bracketed value `[a, b]` becomes a repeated key; anything else is a single
/// value converted with `Value::from`. Negative numbers need parentheses.
///
/// ```rust
/// use epoch_deck::{block, Entry, Value};
///
/// let control = block! {
///     "nx" => 400,
///     "t_end" => 1.5e-12,
///     "x_min" => (-10),
///     "include_species" => ["electron", "proton"],
/// };
/// assert_eq!(control.get_value("x_min"), Some(&Value::from(-10)));
/// assert!(matches!(control.get("include_species"), Some(Entry::Repeated(v)) if v.len() == 2));
/// ```
#[macro_export]
macro_rules! block {
    // Repeated key
    (@entry [ $($elem:expr),* $(,)? ]) => {
        $crate::Entry::Repeated(vec![$($crate::Value::from($elem)),*])
    };

    // Single value
    (@entry $value:expr) => {
        $crate::Entry::Single($crate::Value::from($value))
    };

    // Handle empty block
    () => {
        $crate::BlockMap::new()
    };

    ($($key:literal => $value:tt),+ $(,)?) => {{
        let mut block = $crate::BlockMap::new();
        $(
            block.insert($key.to_string(), $crate::block!(@entry $value));
        )+
        block
    }};
}
