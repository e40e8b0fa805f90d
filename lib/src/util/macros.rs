/// Builds an Elementor settings map from `json!`-style object syntax.
#[doc(hidden)]
#[macro_export]
macro_rules! settings {
    () => ($crate::elementor::Settings::new());
    ($($json:tt)+) => (
        match $crate::serde_json::json!({ $($json)+ }) {
            $crate::serde_json::Value::Object(map) => map,
            _ => $crate::elementor::Settings::new(),
        }
    );
}

pub use settings;
