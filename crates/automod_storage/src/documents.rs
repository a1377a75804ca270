#![forbid(unsafe_code)]

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use automod_kernel_contracts::config::AutomodConfig;
use automod_kernel_contracts::strike::StrikeBook;

/// Community configuration document. Keys owned by other bot features are
/// carried through untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfigDocument {
    #[serde(default)]
    pub automod: AutomodConfig,
    #[serde(flatten)]
    pub other: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StrikeDocument {
    #[serde(default, rename = "automodStrikes", alias = "automod_strikes")]
    pub strikes: StrikeBook,
    #[serde(flatten)]
    pub other: Map<String, Value>,
}
