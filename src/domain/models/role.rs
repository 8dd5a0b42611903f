use serde::Deserialize;
use serde::Serialize;

/// Who produced a turn in the conversation. Serialized the way the provider
/// expects it on the wire.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Role {
    User,
    Model,
}
