//! ストレージリソースモデル

use crate::error::{Result, StackError};
use serde::{Deserialize, Serialize};
use stackforge_cloud::ResourceConfig;
use std::fmt;

/// ストレージコンテナのリソースタイプ
pub const STORAGE_RESOURCE_TYPE: &str = "storage.container";

/// 生成されるコンテナ名を指す属性
pub const BUCKET_NAME_ATTRIBUTE: &str = "bucket_name";

/// スタックから削除されたときのデータの扱い
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RemovalPolicy {
    /// リソースごと削除する
    Destroy,
    /// リソースを残す
    #[default]
    Retain,
    /// スナップショットを取ってから削除する
    Snapshot,
}

impl fmt::Display for RemovalPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RemovalPolicy::Destroy => write!(f, "destroy"),
            RemovalPolicy::Retain => write!(f, "retain"),
            RemovalPolicy::Snapshot => write!(f, "snapshot"),
        }
    }
}

/// ストレージコンテナ設定
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageContainer {
    /// オブジェクトのバージョニング
    pub versioned: bool,

    pub removal_policy: RemovalPolicy,

    /// 削除時に中身のオブジェクトも消す（Destroy のときのみ有効）
    pub auto_delete_objects: bool,
}

impl StorageContainer {
    pub fn new() -> Self {
        Self::default()
    }

    /// スタック削除時にコンテナと中身を消すデフォルト設定
    pub fn disposable() -> Self {
        Self {
            removal_policy: RemovalPolicy::Destroy,
            auto_delete_objects: true,
            ..Self::default()
        }
    }

    pub fn with_versioning(mut self, versioned: bool) -> Self {
        self.versioned = versioned;
        self
    }

    pub fn with_removal_policy(mut self, removal_policy: RemovalPolicy) -> Self {
        self.removal_policy = removal_policy;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.auto_delete_objects && self.removal_policy != RemovalPolicy::Destroy {
            return Err(StackError::InvalidConfig(format!(
                "auto_delete_objects には removal_policy = destroy が必要です (現在: {})",
                self.removal_policy
            )));
        }
        Ok(())
    }

    pub fn to_resource(&self, id: &str, provider: &str) -> Result<ResourceConfig> {
        self.validate()?;
        let config = serde_json::to_value(self)?;
        Ok(ResourceConfig::new(STORAGE_RESOURCE_TYPE, id, provider, config))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disposable_defaults() {
        let bucket = StorageContainer::disposable().with_versioning(true);
        assert!(bucket.versioned);
        assert!(bucket.auto_delete_objects);
        assert_eq!(bucket.removal_policy, RemovalPolicy::Destroy);
        assert!(bucket.validate().is_ok());
    }

    #[test]
    fn test_auto_delete_requires_destroy() {
        let bucket = StorageContainer::disposable().with_removal_policy(RemovalPolicy::Retain);
        assert!(matches!(bucket.validate(), Err(StackError::InvalidConfig(_))));
        assert!(bucket.to_resource("Bucket", "aws").is_err());
    }

    #[test]
    fn test_to_resource() {
        let resource = StorageContainer::disposable()
            .with_versioning(true)
            .to_resource("Bucket", "aws")
            .unwrap();
        assert_eq!(resource.resource_type, STORAGE_RESOURCE_TYPE);
        assert_eq!(resource.get_config::<bool>("versioned"), Some(true));
        assert_eq!(
            resource.get_config::<RemovalPolicy>("removal_policy"),
            Some(RemovalPolicy::Destroy)
        );
        assert_eq!(resource.get_config::<bool>("auto_delete_objects"), Some(true));
    }
}
