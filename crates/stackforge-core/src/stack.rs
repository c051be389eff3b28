//! スタック定義
//!
//! ストレージコンテナ1つ、2層構成のネットワーク、各サブネットグループの
//! 踏み台ホスト、コンテナ名の出力をエンジンに宣言する。

use crate::error::{Result, StackError};
use crate::model::{
    BUCKET_NAME_ATTRIBUTE, BastionInstance, InstanceType, MachineImage, Network,
    StorageContainer, SubnetGroupSpec, SubnetSelection, SubnetType,
};
use serde::{Deserialize, Serialize};
use stackforge_cloud::{
    Assembly, ExportedValue, ProvisioningEngine, Reference, ResourceConfig, StackProps,
    SynthEngine,
};

/// リソースを宣言するプロバイダー名
pub const PROVIDER: &str = "aws";

pub const BUCKET_ID: &str = "Bucket";
pub const NETWORK_ID: &str = "TheVPC";
pub const PUBLIC_BASTION_ID: &str = "PublicBastion";
pub const PRIVATE_BASTION_ID: &str = "PrivateBastionWithEgress";
pub const BUCKET_NAME_OUTPUT: &str = "BucketName";

const NETWORK_CIDR: &str = "10.0.0.0/16";
const MAX_AZS: u8 = 1;
const SUBNET_MASK: u8 = 24;
const PUBLIC_GROUP: &str = "Public";
const PRIVATE_GROUP: &str = "PrivateWithEgress";
const BASTION_INSTANCE_TYPE: &str = "t3.small";

/// スタックを保持する親スコープ
///
/// 宣言先のエンジンを所有する
pub struct App<E: ProvisioningEngine> {
    engine: E,
    stacks: Vec<String>,
}

impl<E: ProvisioningEngine> App<E> {
    pub fn new(engine: E) -> Self {
        Self {
            engine,
            stacks: Vec::new(),
        }
    }

    pub fn into_engine(self) -> E {
        self.engine
    }

    /// 定義済みスタックのID（定義順）
    pub fn stack_ids(&self) -> &[String] {
        &self.stacks
    }
}

impl App<SynthEngine> {
    /// 宣言されたすべてのスタックをテンプレートとして取り出す
    pub fn synth(self) -> Assembly {
        self.into_engine().into_assembly()
    }
}

impl Default for App<SynthEngine> {
    fn default() -> Self {
        Self::new(SynthEngine::new())
    }
}

/// スタック設定
///
/// 共通のスタック設定に独自項目を1つ加えたもの
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppStackProps {
    #[serde(flatten)]
    pub base: StackProps,

    /// 受け付けるが、現在のスタック定義では参照しない
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_prop: Option<String>,
}

impl AppStackProps {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_base(mut self, base: StackProps) -> Self {
        self.base = base;
        self
    }

    pub fn with_custom_prop(mut self, custom_prop: impl Into<String>) -> Self {
        self.custom_prop = Some(custom_prop.into());
        self
    }
}

/// スタックに含めるリソースの設定一式
#[derive(Debug, Clone)]
struct Blueprint {
    bucket: StorageContainer,
    network: Network,
    public_bastion: BastionInstance,
    private_bastion: BastionInstance,
}

impl Blueprint {
    fn standard() -> Result<Self> {
        let network = Network::new(NETWORK_CIDR.parse()?)
            .with_max_azs(MAX_AZS)
            .with_subnet_group(SubnetGroupSpec::new(
                PUBLIC_GROUP,
                SubnetType::Public,
                SUBNET_MASK,
            ))
            .with_subnet_group(SubnetGroupSpec::new(
                PRIVATE_GROUP,
                SubnetType::PrivateWithEgress,
                SUBNET_MASK,
            ));

        let instance_type: InstanceType = BASTION_INSTANCE_TYPE.parse()?;
        let bastion = |subnet_type| {
            BastionInstance::new(
                MachineImage::latest_amazon_linux(),
                instance_type.clone(),
                SubnetSelection::of_type(subnet_type),
            )
        };

        Ok(Self {
            bucket: StorageContainer::disposable().with_versioning(true),
            public_bastion: bastion(SubnetType::Public),
            private_bastion: bastion(SubnetType::PrivateWithEgress),
            network,
        })
    }

    /// エンジンに渡す前にすべてのリソース設定を組み立てる
    fn prepare(&self) -> Result<Prepared> {
        let network_ref = Reference::primary(NETWORK_ID);
        Ok(Prepared {
            bucket: self.bucket.to_resource(BUCKET_ID, PROVIDER)?,
            network: self.network.to_resource(NETWORK_ID, PROVIDER)?,
            public_bastion: self.public_bastion.to_resource(
                PUBLIC_BASTION_ID,
                PROVIDER,
                &self.network,
                &network_ref,
            )?,
            private_bastion: self.private_bastion.to_resource(
                PRIVATE_BASTION_ID,
                PROVIDER,
                &self.network,
                &network_ref,
            )?,
            bucket_name: ExportedValue::new(
                BUCKET_NAME_OUTPUT,
                Reference::new(BUCKET_ID, BUCKET_NAME_ATTRIBUTE),
            ),
        })
    }
}

/// 検証済みでエンジンに渡すだけの宣言
struct Prepared {
    bucket: ResourceConfig,
    network: ResourceConfig,
    public_bastion: ResourceConfig,
    private_bastion: ResourceConfig,
    bucket_name: ExportedValue,
}

struct Declared {
    bucket: Reference,
    network: Reference,
    public_bastion: Reference,
    private_bastion: Reference,
}

impl Prepared {
    fn submit<E: ProvisioningEngine>(
        self,
        engine: &mut E,
        stack_id: &str,
    ) -> stackforge_cloud::Result<Declared> {
        let bucket = engine.construct(stack_id, self.bucket)?;
        engine.export_value(stack_id, self.bucket_name)?;
        let network = engine.construct(stack_id, self.network)?;
        let public_bastion = engine.construct(stack_id, self.public_bastion)?;
        let private_bastion = engine.construct(stack_id, self.private_bastion)?;

        Ok(Declared {
            bucket,
            network,
            public_bastion,
            private_bastion,
        })
    }
}

/// 定義済みスタック
///
/// エンジンに渡した各リソースの設定と参照を保持する
#[derive(Debug, Clone, PartialEq)]
pub struct AppStack {
    pub id: String,
    pub props: AppStackProps,

    pub bucket: StorageContainer,
    pub bucket_ref: Reference,

    pub network: Network,
    pub network_ref: Reference,

    pub public_bastion: BastionInstance,
    pub public_bastion_ref: Reference,

    pub private_bastion: BastionInstance,
    pub private_bastion_ref: Reference,

    pub bucket_name: ExportedValue,
}

impl AppStack {
    pub fn new<E: ProvisioningEngine>(
        scope: &mut App<E>,
        id: &str,
        props: AppStackProps,
    ) -> Result<Self> {
        Self::declare(scope, id, props, Blueprint::standard()?)
    }

    /// 検証をすべて終えてからスタックを開く。エンジン側で失敗した場合は破棄する
    fn declare<E: ProvisioningEngine>(
        scope: &mut App<E>,
        id: &str,
        props: AppStackProps,
        blueprint: Blueprint,
    ) -> Result<Self> {
        validate_stack_id(id)?;
        let prepared = blueprint.prepare()?;
        let bucket_name = prepared.bucket_name.clone();

        if let Some(custom_prop) = &props.custom_prop {
            tracing::debug!("custom_prop is set but not used: {}", custom_prop);
        }

        let engine = &mut scope.engine;
        engine.open_stack(id, &props.base)?;
        tracing::info!("Defining stack {} with engine {}", id, engine.name());

        let declared = match prepared.submit(engine, id) {
            Ok(declared) => declared,
            Err(e) => {
                engine.discard_stack(id);
                return Err(e.into());
            }
        };

        scope.stacks.push(id.to_string());

        Ok(Self {
            id: id.to_string(),
            props,
            bucket: blueprint.bucket,
            bucket_ref: declared.bucket,
            network: blueprint.network,
            network_ref: declared.network,
            public_bastion: blueprint.public_bastion,
            public_bastion_ref: declared.public_bastion,
            private_bastion: blueprint.private_bastion,
            private_bastion_ref: declared.private_bastion,
            bucket_name,
        })
    }
}

/// 英数字とハイフンのみ、空は不可
fn validate_stack_id(id: &str) -> Result<()> {
    let valid = !id.is_empty() && id.chars().all(|c| c.is_ascii_alphanumeric() || c == '-');
    if valid {
        Ok(())
    } else {
        Err(StackError::InvalidStackId(id.to_string()))
    }
}
