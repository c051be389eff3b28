//! ネットワークモデル
//!
//! アドレス範囲、サブネットグループ、サブネット選択の定義

use crate::error::{Result, StackError};
use serde::{Deserialize, Serialize};
use stackforge_cloud::ResourceConfig;
use std::collections::HashSet;
use std::fmt;
use std::net::Ipv4Addr;
use std::str::FromStr;

/// ネットワークのリソースタイプ
pub const NETWORK_RESOURCE_TYPE: &str = "network.vpc";

/// サブネットとして許可する最小のブロック (/28)
const MAX_SUBNET_MASK: u8 = 28;

/// IPv4 アドレス範囲 (例: 10.0.0.0/16)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Ipv4Cidr {
    addr: Ipv4Addr,
    prefix: u8,
}

impl Ipv4Cidr {
    pub fn new(addr: Ipv4Addr, prefix: u8) -> Result<Self> {
        if prefix > 32 {
            return Err(StackError::InvalidCidr(format!(
                "{}/{}: プレフィックス長は 0〜32 です",
                addr, prefix
            )));
        }
        if u32::from(addr) & !Self::mask_bits(prefix) != 0 {
            return Err(StackError::InvalidCidr(format!(
                "{}/{}: ホスト部にビットが立っています",
                addr, prefix
            )));
        }
        Ok(Self { addr, prefix })
    }

    pub fn network(&self) -> Ipv4Addr {
        self.addr
    }

    pub fn prefix(&self) -> u8 {
        self.prefix
    }

    /// ブロックに含まれるアドレス数
    pub fn num_addresses(&self) -> u64 {
        1u64 << (32 - self.prefix)
    }

    /// `mask` のブロックに分割したときの `index` 番目の子ブロック
    pub fn subnet(&self, mask: u8, index: u64) -> Result<Ipv4Cidr> {
        if mask < self.prefix || mask > 32 {
            return Err(StackError::InvalidCidr(format!(
                "/{} は {} の内側に収まりません",
                mask, self
            )));
        }
        let count = 1u64 << (mask - self.prefix);
        if index >= count {
            return Err(StackError::InvalidCidr(format!(
                "{} には /{} のブロックが {} 個しかありません (index: {})",
                self, mask, count, index
            )));
        }
        let offset = index * (1u64 << (32 - mask));
        let base = u64::from(u32::from(self.addr)) + offset;
        Self::new(Ipv4Addr::from(base as u32), mask)
    }

    fn mask_bits(prefix: u8) -> u32 {
        if prefix == 0 {
            0
        } else {
            u32::MAX << (32 - prefix)
        }
    }
}

impl FromStr for Ipv4Cidr {
    type Err = StackError;

    fn from_str(s: &str) -> Result<Self> {
        let (addr, prefix) = s
            .split_once('/')
            .ok_or_else(|| StackError::InvalidCidr(format!("{}: '/' がありません", s)))?;
        let addr: Ipv4Addr = addr
            .parse()
            .map_err(|_| StackError::InvalidCidr(format!("{}: アドレスが不正です", s)))?;
        let prefix: u8 = prefix
            .parse()
            .map_err(|_| StackError::InvalidCidr(format!("{}: プレフィックス長が不正です", s)))?;
        Self::new(addr, prefix)
    }
}

impl TryFrom<String> for Ipv4Cidr {
    type Error = StackError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<Ipv4Cidr> for String {
    fn from(cidr: Ipv4Cidr) -> Self {
        cidr.to_string()
    }
}

impl fmt::Display for Ipv4Cidr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.addr, self.prefix)
    }
}

/// サブネットの種類（インターネットへの到達性）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubnetType {
    /// インターネットゲートウェイ経由で直接到達可能
    Public,
    /// NAT 経由で外向き通信のみ可能
    PrivateWithEgress,
    /// 外部への経路なし
    PrivateIsolated,
}

impl fmt::Display for SubnetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubnetType::Public => write!(f, "public"),
            SubnetType::PrivateWithEgress => write!(f, "private-with-egress"),
            SubnetType::PrivateIsolated => write!(f, "private-isolated"),
        }
    }
}

/// サブネットグループ設定
///
/// 各ゾーンに1つずつ、同じ用途のサブネットを作る
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubnetGroupSpec {
    /// グループ名（ネットワーク内で一意）
    pub name: String,

    pub subnet_type: SubnetType,

    /// 各サブネットのマスク長
    pub cidr_mask: u8,
}

impl SubnetGroupSpec {
    pub fn new(name: impl Into<String>, subnet_type: SubnetType, cidr_mask: u8) -> Self {
        Self {
            name: name.into(),
            subnet_type,
            cidr_mask,
        }
    }
}

/// インスタンスを配置するサブネットグループの選択条件
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubnetSelection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subnet_type: Option<SubnetType>,

    /// 同じ種類のグループが複数ある場合に必要
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subnet_group_name: Option<String>,
}

impl SubnetSelection {
    pub fn of_type(subnet_type: SubnetType) -> Self {
        Self {
            subnet_type: Some(subnet_type),
            subnet_group_name: None,
        }
    }

    pub fn named(name: impl Into<String>) -> Self {
        Self {
            subnet_type: None,
            subnet_group_name: Some(name.into()),
        }
    }

    fn matches(&self, group: &SubnetGroupSpec) -> bool {
        self.subnet_type.is_none_or(|t| t == group.subnet_type)
            && self
                .subnet_group_name
                .as_deref()
                .is_none_or(|n| n == group.name)
    }
}

/// 割り当て済みのサブネット
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubnetAllocation {
    pub group: String,
    pub subnet_type: SubnetType,
    pub zone_index: u8,
    pub cidr: Ipv4Cidr,
}

/// ネットワークリソース設定
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Network {
    /// ネットワーク全体のアドレス範囲
    pub cidr: Ipv4Cidr,

    /// 使用するアベイラビリティゾーン数の上限
    pub max_azs: u8,

    /// 作成するサブネットグループ（順序は表示と割り当て順にのみ影響）
    pub subnet_configuration: Vec<SubnetGroupSpec>,
}

impl Network {
    pub fn new(cidr: Ipv4Cidr) -> Self {
        Self {
            cidr,
            max_azs: 1,
            subnet_configuration: Vec::new(),
        }
    }

    pub fn with_max_azs(mut self, max_azs: u8) -> Self {
        self.max_azs = max_azs;
        self
    }

    pub fn with_subnet_group(mut self, group: SubnetGroupSpec) -> Self {
        self.subnet_configuration.push(group);
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_azs == 0 {
            return Err(StackError::InvalidNetwork(
                "max_azs は 1 以上が必要です".to_string(),
            ));
        }
        if self.subnet_configuration.is_empty() {
            return Err(StackError::InvalidNetwork(
                "サブネットグループが1つもありません".to_string(),
            ));
        }

        let mut names = HashSet::new();
        for group in &self.subnet_configuration {
            if !names.insert(group.name.as_str()) {
                return Err(StackError::InvalidNetwork(format!(
                    "サブネットグループ名が重複しています: {}",
                    group.name
                )));
            }
            if group.cidr_mask < self.cidr.prefix() || group.cidr_mask > MAX_SUBNET_MASK {
                return Err(StackError::InvalidNetwork(format!(
                    "{} のマスク /{} は /{}〜/{} の範囲外です",
                    group.name,
                    group.cidr_mask,
                    self.cidr.prefix(),
                    MAX_SUBNET_MASK
                )));
            }
        }
        Ok(())
    }

    /// 選択条件に一致するサブネットグループを1つに解決する
    pub fn select(&self, selection: &SubnetSelection) -> Result<&SubnetGroupSpec> {
        let mut matched = self
            .subnet_configuration
            .iter()
            .filter(|g| selection.matches(g));

        match (matched.next(), matched.next()) {
            (Some(group), None) => Ok(group),
            (None, _) => Err(StackError::SubnetSelection(format!(
                "条件に一致するサブネットグループがありません: {:?}",
                selection
            ))),
            (Some(_), Some(_)) => Err(StackError::SubnetSelection(format!(
                "複数のサブネットグループが一致します。グループ名を指定してください: {:?}",
                selection
            ))),
        }
    }

    /// グループ順・ゾーン順にアドレス範囲の先頭から詰めて割り当てる
    pub fn allocate_subnets(&self) -> Result<Vec<SubnetAllocation>> {
        self.validate()?;

        let total = self.cidr.num_addresses();
        let mut cursor: u64 = 0;
        let mut allocations = Vec::new();

        for group in &self.subnet_configuration {
            let block = 1u64 << (32 - group.cidr_mask);
            for zone_index in 0..self.max_azs {
                cursor = cursor.div_ceil(block) * block;
                if cursor + block > total {
                    return Err(StackError::InvalidNetwork(format!(
                        "{} のアドレス空間が不足しています ({} の /{} サブネット)",
                        self.cidr, group.name, group.cidr_mask
                    )));
                }
                allocations.push(SubnetAllocation {
                    group: group.name.clone(),
                    subnet_type: group.subnet_type,
                    zone_index,
                    cidr: self.cidr.subnet(group.cidr_mask, cursor / block)?,
                });
                cursor += block;
            }
        }

        Ok(allocations)
    }

    pub fn to_resource(&self, id: &str, provider: &str) -> Result<ResourceConfig> {
        #[derive(Serialize)]
        struct NetworkConfig<'a> {
            #[serde(flatten)]
            network: &'a Network,
            subnets: Vec<SubnetAllocation>,
        }

        let config = serde_json::to_value(NetworkConfig {
            network: self,
            subnets: self.allocate_subnets()?,
        })?;
        Ok(ResourceConfig::new(NETWORK_RESOURCE_TYPE, id, provider, config))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_tier() -> Network {
        Network::new("10.0.0.0/16".parse().unwrap())
            .with_subnet_group(SubnetGroupSpec::new("Public", SubnetType::Public, 24))
            .with_subnet_group(SubnetGroupSpec::new(
                "PrivateWithEgress",
                SubnetType::PrivateWithEgress,
                24,
            ))
    }

    #[test]
    fn test_parse_cidr() {
        let cidr: Ipv4Cidr = "10.0.0.0/16".parse().unwrap();
        assert_eq!(cidr.network(), Ipv4Addr::new(10, 0, 0, 0));
        assert_eq!(cidr.prefix(), 16);
        assert_eq!(cidr.num_addresses(), 65_536);
        assert_eq!(cidr.to_string(), "10.0.0.0/16");
    }

    #[test]
    fn test_parse_cidr_rejects_malformed() {
        for input in ["10.0.0.0", "10.0.0/16", "10.0.0.0/33", "10.0.0.1/16", "x/8", "10.0.0.0/a"] {
            let result = input.parse::<Ipv4Cidr>();
            assert!(
                matches!(result, Err(StackError::InvalidCidr(_))),
                "{} should be rejected",
                input
            );
        }
    }

    #[test]
    fn test_cidr_serde_as_string() {
        let cidr: Ipv4Cidr = "10.0.0.0/16".parse().unwrap();
        assert_eq!(serde_json::to_value(cidr).unwrap(), "10.0.0.0/16");
        assert!(serde_json::from_str::<Ipv4Cidr>("\"10.0.0.0/99\"").is_err());
    }

    #[test]
    fn test_subnet() {
        let cidr: Ipv4Cidr = "10.0.0.0/16".parse().unwrap();
        assert_eq!(cidr.subnet(24, 0).unwrap().to_string(), "10.0.0.0/24");
        assert_eq!(cidr.subnet(24, 255).unwrap().to_string(), "10.0.255.0/24");
        assert!(cidr.subnet(24, 256).is_err());
        assert!(cidr.subnet(8, 0).is_err());
    }

    #[test]
    fn test_allocate_two_tier() {
        let allocations = two_tier().allocate_subnets().unwrap();
        assert_eq!(allocations.len(), 2);
        assert_eq!(allocations[0].group, "Public");
        assert_eq!(allocations[0].cidr.to_string(), "10.0.0.0/24");
        assert_eq!(allocations[1].group, "PrivateWithEgress");
        assert_eq!(allocations[1].cidr.to_string(), "10.0.1.0/24");
    }

    #[test]
    fn test_allocate_aligns_mixed_masks() {
        let network = Network::new("10.0.0.0/16".parse().unwrap())
            .with_max_azs(2)
            .with_subnet_group(SubnetGroupSpec::new("Small", SubnetType::Public, 26))
            .with_subnet_group(SubnetGroupSpec::new("Big", SubnetType::PrivateIsolated, 24));

        let cidrs: Vec<String> = network
            .allocate_subnets()
            .unwrap()
            .iter()
            .map(|a| a.cidr.to_string())
            .collect();
        assert_eq!(
            cidrs,
            vec!["10.0.0.0/26", "10.0.0.64/26", "10.0.1.0/24", "10.0.2.0/24"]
        );
    }

    #[test]
    fn test_allocate_out_of_space() {
        let network = Network::new("10.0.0.0/24".parse().unwrap())
            .with_max_azs(2)
            .with_subnet_group(SubnetGroupSpec::new("All", SubnetType::Public, 24));
        assert!(matches!(
            network.allocate_subnets(),
            Err(StackError::InvalidNetwork(_))
        ));
    }

    #[test]
    fn test_validate() {
        assert!(two_tier().validate().is_ok());
        assert!(two_tier().with_max_azs(0).validate().is_err());
        assert!(Network::new("10.0.0.0/16".parse().unwrap()).validate().is_err());

        let duplicate =
            two_tier().with_subnet_group(SubnetGroupSpec::new("Public", SubnetType::Public, 24));
        assert!(duplicate.validate().is_err());

        let too_small = Network::new("10.0.0.0/16".parse().unwrap())
            .with_subnet_group(SubnetGroupSpec::new("Tiny", SubnetType::Public, 29));
        assert!(too_small.validate().is_err());
    }

    #[test]
    fn test_select_by_type() {
        let network = two_tier();
        let public = network
            .select(&SubnetSelection::of_type(SubnetType::Public))
            .unwrap();
        assert_eq!(public.name, "Public");

        let private = network
            .select(&SubnetSelection::of_type(SubnetType::PrivateWithEgress))
            .unwrap();
        assert_eq!(private.name, "PrivateWithEgress");

        assert!(network
            .select(&SubnetSelection::of_type(SubnetType::PrivateIsolated))
            .is_err());
    }

    #[test]
    fn test_select_ambiguous_needs_name() {
        let network =
            two_tier().with_subnet_group(SubnetGroupSpec::new("Dmz", SubnetType::Public, 24));

        assert!(matches!(
            network.select(&SubnetSelection::of_type(SubnetType::Public)),
            Err(StackError::SubnetSelection(_))
        ));
        assert_eq!(
            network.select(&SubnetSelection::named("Dmz")).unwrap().name,
            "Dmz"
        );
    }

    #[test]
    fn test_to_resource_includes_layout() {
        let resource = two_tier().to_resource("TheVPC", "aws").unwrap();
        assert_eq!(resource.resource_type, NETWORK_RESOURCE_TYPE);
        assert_eq!(resource.config["cidr"], "10.0.0.0/16");
        assert_eq!(resource.config["max_azs"], 1);
        assert_eq!(resource.config["subnet_configuration"][1]["subnet_type"], "private_with_egress");
        assert_eq!(resource.config["subnets"][1]["cidr"], "10.0.1.0/24");
    }
}
