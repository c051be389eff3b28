//! コンピュートリソースモデル

use crate::error::{Result, StackError};
use crate::model::network::{Network, SubnetSelection};
use serde::{Deserialize, Serialize};
use stackforge_cloud::{Reference, ResourceConfig};
use std::fmt;
use std::str::FromStr;

/// 踏み台ホストのリソースタイプ
pub const BASTION_RESOURCE_TYPE: &str = "compute.bastion_host";

/// OSファミリー
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OsFamily {
    #[serde(rename = "amazon-linux-2")]
    AmazonLinux2,
}

/// マシンイメージの解決方法
///
/// 実際のイメージIDはエンジンが適用時に解決する
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MachineImage {
    /// ファミリー内の最新イメージ
    LatestOfFamily { family: OsFamily },
}

impl MachineImage {
    pub fn latest_amazon_linux() -> Self {
        MachineImage::LatestOfFamily {
            family: OsFamily::AmazonLinux2,
        }
    }
}

/// インスタンスタイプ（例: t3.small）
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct InstanceType {
    class: String,
    size: String,
}

impl InstanceType {
    pub fn class(&self) -> &str {
        &self.class
    }

    pub fn size(&self) -> &str {
        &self.size
    }
}

impl FromStr for InstanceType {
    type Err = StackError;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || StackError::InvalidInstanceType(s.to_string());
        let (class, size) = s.split_once('.').ok_or_else(invalid)?;

        let class_ok = class.starts_with(|c: char| c.is_ascii_lowercase())
            && class.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-');
        let size_ok = !size.is_empty()
            && size.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit());
        if !class_ok || !size_ok {
            return Err(invalid());
        }

        Ok(Self {
            class: class.to_string(),
            size: size.to_string(),
        })
    }
}

impl TryFrom<String> for InstanceType {
    type Error = StackError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<InstanceType> for String {
    fn from(instance_type: InstanceType) -> Self {
        instance_type.to_string()
    }
}

impl fmt::Display for InstanceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.class, self.size)
    }
}

/// 踏み台ホスト設定
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BastionInstance {
    pub machine_image: MachineImage,

    pub instance_type: InstanceType,

    /// 配置先のサブネットグループ
    pub subnet_selection: SubnetSelection,
}

impl BastionInstance {
    pub fn new(
        machine_image: MachineImage,
        instance_type: InstanceType,
        subnet_selection: SubnetSelection,
    ) -> Self {
        Self {
            machine_image,
            instance_type,
            subnet_selection,
        }
    }

    /// `network` 内のサブネットグループを解決してリソース設定を作る
    pub fn to_resource(
        &self,
        id: &str,
        provider: &str,
        network: &Network,
        network_ref: &Reference,
    ) -> Result<ResourceConfig> {
        #[derive(Serialize)]
        struct BastionConfig<'a> {
            #[serde(flatten)]
            instance: &'a BastionInstance,
            network: &'a Reference,
            subnet_group: &'a str,
        }

        let group = network.select(&self.subnet_selection)?;
        let config = serde_json::to_value(BastionConfig {
            instance: self,
            network: network_ref,
            subnet_group: &group.name,
        })?;

        Ok(
            ResourceConfig::new(BASTION_RESOURCE_TYPE, id, provider, config)
                .with_dependency(&network_ref.resource_id),
        )
    }
}
