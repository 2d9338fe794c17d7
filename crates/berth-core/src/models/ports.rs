use serde::{Deserialize, Serialize};

use crate::models::ExtraKeys;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortMapping {
    pub local_port: u16,
    pub external_port: u16,
    #[serde(flatten)]
    pub extra: ExtraKeys,
}

impl PortMapping {
    pub fn new(local_port: u16, external_port: u16) -> Self {
        Self {
            local_port,
            external_port,
            extra: ExtraKeys::new(),
        }
    }
}
