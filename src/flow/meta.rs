use serde::{Deserialize, Serialize};

/// Funnel-level deployment metadata, consumed read-only by the draft-status
/// computation. Trigger types are opaque strings owned by the hosting
/// platform; the core only cares whether one is configured.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FunnelMeta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub membership_trigger_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_trigger_type: Option<String>,
    #[serde(default)]
    pub merchant_type: MerchantType,
}

/// What the merchant sells through this funnel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MerchantType {
    #[default]
    Qualification,
    Upsell,
}

impl FunnelMeta {
    pub fn new(merchant_type: MerchantType) -> Self {
        FunnelMeta {
            merchant_type,
            ..FunnelMeta::default()
        }
    }

    /// True if at least one go-live trigger is configured.
    pub fn has_trigger(&self) -> bool {
        self.membership_trigger_type.is_some() || self.app_trigger_type.is_some()
    }
}
