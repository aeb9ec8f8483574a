use serde::{Deserialize, Deserializer};

// the API is not consistent about id types, some deployments send numbers
#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Text(String),
    Number(i64),
}

impl From<RawId> for String {
    fn from(value: RawId) -> Self {
        match value {
            RawId::Text(v) => v,
            RawId::Number(v) => v.to_string(),
        }
    }
}

pub fn deserialize_optional_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<RawId>::deserialize(deserializer)?;
    Ok(value.map(String::from))
}
