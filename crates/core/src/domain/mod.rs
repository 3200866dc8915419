pub mod agency;
pub mod prediction;
pub mod procurement;
pub mod status;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer};

/// Backend rows come out of dataframes, so any field may be `null` as well as missing.
pub(crate) fn nullable<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Integer column that may arrive as `83`, `83.0` (pandas upcasts columns with nulls) or `null`.
pub(crate) fn whole_number<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Number {
        Int(i64),
        Float(f64),
    }

    match Option::<Number>::deserialize(deserializer)? {
        None => Ok(0),
        Some(Number::Int(n)) => Ok(n),
        Some(Number::Float(f)) if f.is_finite() && f.fract() == 0.0 => Ok(f as i64),
        Some(Number::Float(f)) => Err(D::Error::custom(format!(
            "expected a whole number, got {f}"
        ))),
    }
}
