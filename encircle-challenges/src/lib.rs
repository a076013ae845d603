/// Declares a parameter struct that serialises as a compact `key=value,key=value`
/// string. Missing keys keep their `Default` value, unknown keys are rejected.
macro_rules! impl_kv_string_serde {
    ($name:ident { $( $field:ident : $ty:ty ),* $(,)? }) => {
        #[derive(Debug, Clone, PartialEq)]
        pub struct $name {
            $( pub $field : $ty ),*
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                let pairs: Vec<String> = vec![
                    $( format!("{}={}", stringify!($field), self.$field) ),*
                ];
                write!(f, "{}", pairs.join(","))
            }
        }

        impl std::str::FromStr for $name {
            type Err = anyhow::Error;

            fn from_str(s: &str) -> anyhow::Result<Self> {
                let mut parsed = Self::default();
                for pair in s.split(',').map(str::trim).filter(|p| !p.is_empty()) {
                    let (key, raw) = pair
                        .split_once('=')
                        .ok_or_else(|| anyhow::anyhow!("Expected key=value, got '{}'", pair))?;
                    match key.trim() {
                        $(
                            stringify!($field) => {
                                parsed.$field = raw.trim().parse::<$ty>().map_err(|e| {
                                    anyhow::anyhow!("Invalid value for {}: '{}' ({})", key, raw, e)
                                })?;
                            }
                        )*
                        other => {
                            return Err(anyhow::anyhow!(
                                "Unknown key '{}' for {}",
                                other,
                                stringify!($name)
                            ))
                        }
                    }
                }
                Ok(parsed)
            }
        }

        impl serde::Serialize for $name {
            fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
            where
                S: serde::Serializer,
            {
                serializer.serialize_str(&self.to_string())
            }
        }

        impl<'de> serde::Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: serde::Deserializer<'de>,
            {
                let s = <String as serde::Deserialize>::deserialize(deserializer)?;
                s.parse::<$name>().map_err(serde::de::Error::custom)
            }
        }
    };
}

pub mod geometry;
pub mod enclosing_circle;
pub use enclosing_circle as c001;
