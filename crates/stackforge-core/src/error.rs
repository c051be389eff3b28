use stackforge_cloud::CloudError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StackError {
    #[error("無効なスタックID: '{0}'\nヒント: 英数字とハイフンのみ使用できます")]
    InvalidStackId(String),

    #[error("無効なCIDR: {0}")]
    InvalidCidr(String),

    #[error("無効なインスタンスタイプ: '{0}' (例: t3.small)")]
    InvalidInstanceType(String),

    #[error("無効なネットワーク設定: {0}")]
    InvalidNetwork(String),

    #[error("サブネット選択エラー: {0}")]
    SubnetSelection(String),

    #[error("無効な設定: {0}")]
    InvalidConfig(String),

    #[error("プロビジョニングエンジンエラー: {0}")]
    Cloud(#[from] CloudError),

    #[error("JSONエラー: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, StackError>;
