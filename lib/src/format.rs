use std::path::Path;

use serde::de::DeserializeOwned;

use crate::error::{Chainable, ErrorDetail, Result};

/// A serde data format that configuration can be read from.
pub trait Format: Sized {
    /// The data format's error type.
    type Error: serde::de::Error + ErrorDetail + 'static;

    const NAME: &'static str;

    /// Parses `string` as the data format `Self` as a `T` or returns an error
    /// if the `string` is an invalid `T`.
    fn from_str<T: DeserializeOwned>(string: &str) -> Result<T, Self::Error>;

    fn read<T: DeserializeOwned, P: AsRef<Path>>(path: P) -> Result<T> {
        let path = path.as_ref();
        let string = std::fs::read_to_string(path).chain_with(|| error! {
            "failed to open file for reading",
            "file path" => path.display(),
        })?;

        Self::from_str(&string).chain_with(|| error! {
            format!("{} deserialization failed", Self::NAME),
            "file path" => path.display(),
        })
    }
}

macro_rules! impl_format {
    ($name:ident ($display:literal) : $func:expr, $E:ty) => (
        #[derive(Debug, Clone, Copy, Default)]
        pub struct $name;

        impl Format for $name {
            type Error = $E;

            const NAME: &'static str = $display;

            fn from_str<T: DeserializeOwned>(s: &str) -> Result<T, $E> {
                $func(s)
            }
        }
    );
}

impl_format!(Toml ("TOML"): toml::from_str, toml::de::Error);
impl_format!(Json ("JSON"): serde_json::from_str, serde_json::Error);
impl_format!(Yaml ("YAML"): serde_yaml::from_str, serde_yaml::Error);

/// File extensions understood by [`read_any`].
pub const EXTENSIONS: &[&str] = &["yaml", "yml", "toml", "json"];

/// Reads `path` with the format its extension names.
pub fn read_any<T: DeserializeOwned, P: AsRef<Path>>(path: P) -> Result<T> {
    let path = path.as_ref();
    match path.extension().and_then(|e| e.to_str()) {
        Some("yaml") | Some("yml") => Yaml::read(path),
        Some("toml") => Toml::read(path),
        Some("json") => Json::read(path),
        _ => err! {
            "unrecognized configuration format",
            "file path" => path.display(),
            "supported extensions" => EXTENSIONS.join(", "),
        },
    }
}
