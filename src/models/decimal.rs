//! Money fields arrive as JSON numbers from computed endpoints and as decimal
//! strings (`"9.99"`) from model serializers. Both read as `f64`.

use serde::de::{self, Deserializer};
use serde::Deserialize;

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrText {
    Number(f64),
    Text(String),
}

impl NumberOrText {
    fn into_f64<E: de::Error>(self) -> Result<f64, E> {
        match self {
            NumberOrText::Number(n) => Ok(n),
            NumberOrText::Text(s) => s
                .trim()
                .parse()
                .map_err(|_| E::invalid_value(de::Unexpected::Str(&s), &"a decimal number")),
        }
    }
}

pub(crate) fn option<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<NumberOrText>::deserialize(deserializer)?
        .map(NumberOrText::into_f64)
        .transpose()
}

/// Like [`option`], with `null` read as zero. Aggregates over no rows are `null`.
pub(crate) fn number<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(option(deserializer)?.unwrap_or_default())
}
