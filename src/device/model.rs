use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct DeviceId(String);

impl DeviceId {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DeviceId {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

impl From<u64> for DeviceId {
    fn from(value: u64) -> Self {
        Self(value.to_string())
    }
}

impl<'de> Deserialize<'de> for DeviceId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Number(u64),
            Text(String),
        }

        Ok(match RawId::deserialize(deserializer)? {
            RawId::Number(value) => Self::from(value),
            RawId::Text(value) => Self(value),
        })
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceGroup {
    pub id: u32,
    pub name: String,
    #[serde(default)]
    pub is_default: bool,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlockList {
    pub ads_trackers: bool,
    pub gambling: bool,
    pub social_media: bool,
    pub porn: bool,
    pub gaming: bool,
    pub streaming: bool,
    pub facebook: bool,
    pub instagram: bool,
    pub tiktok: bool,
    pub netflix: bool,
    pub youtube: bool,
    pub ai: bool,
    pub safesearch: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockCategory {
    AdsTrackers,
    Gambling,
    SocialMedia,
    Porn,
    Gaming,
    Streaming,
    Facebook,
    Instagram,
    Tiktok,
    Netflix,
    Youtube,
    Ai,
    Safesearch,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown blocklist category `{0}`")]
pub struct ParseCategoryError(pub String);

impl BlockCategory {
    pub const ALL: [Self; 13] = [
        Self::AdsTrackers,
        Self::Gambling,
        Self::SocialMedia,
        Self::Porn,
        Self::Gaming,
        Self::Streaming,
        Self::Facebook,
        Self::Instagram,
        Self::Tiktok,
        Self::Netflix,
        Self::Youtube,
        Self::Ai,
        Self::Safesearch,
    ];

    pub fn key(self) -> &'static str {
        match self {
            Self::AdsTrackers => "ads_trackers",
            Self::Gambling => "gambling",
            Self::SocialMedia => "social_media",
            Self::Porn => "porn",
            Self::Gaming => "gaming",
            Self::Streaming => "streaming",
            Self::Facebook => "facebook",
            Self::Instagram => "instagram",
            Self::Tiktok => "tiktok",
            Self::Netflix => "netflix",
            Self::Youtube => "youtube",
            Self::Ai => "ai",
            Self::Safesearch => "safesearch",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::AdsTrackers => "Ads & trackers",
            Self::Gambling => "Gambling",
            Self::SocialMedia => "Social media",
            Self::Porn => "Adult content",
            Self::Gaming => "Gaming",
            Self::Streaming => "Streaming",
            Self::Facebook => "Facebook",
            Self::Instagram => "Instagram",
            Self::Tiktok => "TikTok",
            Self::Netflix => "Netflix",
            Self::Youtube => "YouTube",
            Self::Ai => "AI services",
            Self::Safesearch => "Safe search",
        }
    }
}

impl FromStr for BlockCategory {
    type Err = ParseCategoryError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|category| category.key() == value)
            .ok_or_else(|| ParseCategoryError(value.to_owned()))
    }
}

impl BlockList {
    pub fn get(&self, category: BlockCategory) -> bool {
        match category {
            BlockCategory::AdsTrackers => self.ads_trackers,
            BlockCategory::Gambling => self.gambling,
            BlockCategory::SocialMedia => self.social_media,
            BlockCategory::Porn => self.porn,
            BlockCategory::Gaming => self.gaming,
            BlockCategory::Streaming => self.streaming,
            BlockCategory::Facebook => self.facebook,
            BlockCategory::Instagram => self.instagram,
            BlockCategory::Tiktok => self.tiktok,
            BlockCategory::Netflix => self.netflix,
            BlockCategory::Youtube => self.youtube,
            BlockCategory::Ai => self.ai,
            BlockCategory::Safesearch => self.safesearch,
        }
    }

    pub fn set(&mut self, category: BlockCategory, blocked: bool) {
        let slot = match category {
            BlockCategory::AdsTrackers => &mut self.ads_trackers,
            BlockCategory::Gambling => &mut self.gambling,
            BlockCategory::SocialMedia => &mut self.social_media,
            BlockCategory::Porn => &mut self.porn,
            BlockCategory::Gaming => &mut self.gaming,
            BlockCategory::Streaming => &mut self.streaming,
            BlockCategory::Facebook => &mut self.facebook,
            BlockCategory::Instagram => &mut self.instagram,
            BlockCategory::Tiktok => &mut self.tiktok,
            BlockCategory::Netflix => &mut self.netflix,
            BlockCategory::Youtube => &mut self.youtube,
            BlockCategory::Ai => &mut self.ai,
            BlockCategory::Safesearch => &mut self.safesearch,
        };
        *slot = blocked;
    }

    /// Any content category other than safe search is blocked.
    pub fn has_restrictions(&self) -> bool {
        BlockCategory::ALL
            .into_iter()
            .filter(|category| *category != BlockCategory::Safesearch)
            .any(|category| self.get(category))
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AiClassification {
    pub device_type: String,
    pub device_category: String,
    pub confidence: f32,
    pub reasoning: String,
    pub indicators: Vec<String>,
    pub last_classified: String,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Device {
    pub id: DeviceId,
    #[serde(default)]
    pub mac: String,
    #[serde(default)]
    pub hostname: String,
    #[serde(default)]
    pub vendor: String,
    #[serde(default)]
    pub given_name: String,
    #[serde(default)]
    pub ip: String,
    #[serde(default)]
    pub user_agent: Vec<String>,
    #[serde(default)]
    pub group: Option<DeviceGroup>,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default)]
    pub has_custom_blocklist: bool,
    #[serde(default)]
    pub first_seen: String,
    #[serde(default)]
    pub last_seen: String,
    #[serde(default)]
    pub is_mac_universal: bool,
    #[serde(default)]
    pub os_name: String,
    #[serde(default)]
    pub os_accuracy: u32,
    #[serde(default)]
    pub os_type: String,
    #[serde(default)]
    pub os_vendor: String,
    #[serde(default)]
    pub os_family: String,
    #[serde(default)]
    pub blocklist: BlockList,
    #[serde(default)]
    pub ai_classification: AiClassification,
}

impl Device {
    pub fn display_name(&self) -> &str {
        if self.given_name.is_empty() {
            &self.hostname
        } else {
            &self.given_name
        }
    }

    pub fn group_id(&self) -> Option<u32> {
        self.group.as_ref().map(|group| group.id)
    }

    pub fn group_name(&self) -> Option<&str> {
        self.group.as_ref().map(|group| group.name.as_str())
    }

    pub fn confidence(&self) -> f32 {
        self.ai_classification.confidence
    }

    pub fn category(&self) -> &str {
        &self.ai_classification.device_category
    }

    pub fn has_restrictions(&self) -> bool {
        self.blocklist.has_restrictions()
    }

    pub fn has_custom_blocklist(&self) -> bool {
        self.has_custom_blocklist
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_accept_numbers_and_strings() {
        let numeric: DeviceId = serde_json::from_str("42").unwrap();
        let text: DeviceId = serde_json::from_str("\"aa:bb\"").unwrap();
        assert_eq!(numeric.as_str(), "42");
        assert_eq!(text.as_str(), "aa:bb");
    }

    #[test]
    fn category_keys_round_trip_through_from_str() {
        for category in BlockCategory::ALL {
            assert_eq!(category.key().parse::<BlockCategory>(), Ok(category));
        }
        assert_eq!(
            "casino".parse::<BlockCategory>(),
            Err(ParseCategoryError("casino".to_owned()))
        );
    }

    #[test]
    fn safesearch_alone_is_not_a_restriction() {
        let mut blocklist = BlockList {
            safesearch: true,
            ..Default::default()
        };
        assert!(!blocklist.has_restrictions());

        blocklist.set(BlockCategory::Gaming, true);
        assert!(blocklist.has_restrictions());
        assert!(blocklist.get(BlockCategory::Gaming));
    }

    #[test]
    fn display_name_falls_back_to_hostname() {
        let device = Device {
            id: DeviceId::from("1"),
            hostname: "nas.lan".to_owned(),
            ..Default::default()
        };
        assert_eq!(device.display_name(), "nas.lan");
    }
}
