//! PropertyMap — statement parameters and GDS configuration maps.

use std::collections::HashMap;
use super::Value;

/// A map of property names to values.
pub type PropertyMap = HashMap<String, Value>;

/// Convert a list of (key, value) pairs into a `Value::Map`.
impl<K, V> From<Vec<(K, V)>> for Value
where
    K: Into<String>,
    V: Into<Value>,
{
    fn from(pairs: Vec<(K, V)>) -> Self {
        Value::Map(pairs.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// Build a [`PropertyMap`] from literal pairs.
///
/// ```
/// use neo4j_gds::{props, Value};
///
/// let p = props! { "g" => "graph", "maxIterations" => 20 };
/// assert_eq!(p["maxIterations"], Value::Int(20));
/// ```
#[macro_export]
macro_rules! props {
    () => { $crate::PropertyMap::new() };
    ($($key:expr => $val:expr),+ $(,)?) => {{
        let mut map = $crate::PropertyMap::new();
        $( map.insert(::std::string::String::from($key), $crate::Value::from($val)); )+
        map
    }};
}
