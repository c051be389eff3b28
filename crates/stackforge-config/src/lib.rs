pub mod error;

pub use error::*;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// 設定ファイルのパスを直接指定する環境変数
pub const CONFIG_PATH_ENV: &str = "STACKFORGE_CONFIG_PATH";

const CANDIDATES: [&str; 4] = [
    "stack.local.yaml",
    ".stack.local.yaml",
    "stack.yaml",
    ".stack.yaml",
];

/// スタック設定ファイルの内容
///
/// すべて省略可能。CLI の引数が指定された場合はそちらが優先される
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StackConfig {
    /// スタックID
    pub stack_id: Option<String>,

    /// スタックの説明
    pub description: Option<String>,

    /// 全リソースに付与するタグ
    #[serde(default)]
    pub tags: BTreeMap<String, String>,

    /// 削除保護
    #[serde(default)]
    pub termination_protection: bool,

    /// スタック定義に渡す自由形式の値
    pub custom_prop: Option<String>,
}

/// stackforgeの設定ディレクトリを取得
pub fn get_config_dir() -> Result<PathBuf> {
    let config_dir = dirs::config_dir()
        .ok_or(ConfigError::ConfigDirNotFound)?
        .join("stackforge");

    if !config_dir.exists() {
        std::fs::create_dir_all(&config_dir)?;
    }

    Ok(config_dir)
}

/// スタック設定ファイルを探す
///
/// STACKFORGE_CONFIG_PATH が既存のファイルを指していればそれを使う。
/// なければカレントディレクトリ、./.stackforge/ の順に候補名を探し、
/// 最後に ~/.config/stackforge/stack.yaml を見る
pub fn find_stack_file() -> Result<PathBuf> {
    if let Some(path) = std::env::var_os(CONFIG_PATH_ENV).map(PathBuf::from) {
        if path.is_file() {
            return Ok(path);
        }
        tracing::warn!(
            "{} が指すファイルが存在しません: {}",
            CONFIG_PATH_ENV,
            path.display()
        );
    }

    let searched = search_paths()?;
    if let Some(found) = searched.iter().find(|p| p.is_file()) {
        tracing::debug!("Found stack config: {}", found.display());
        return Ok(found.clone());
    }

    Err(ConfigError::StackFileNotFound { searched })
}

/// 優先順に並べた候補パス
fn search_paths() -> Result<Vec<PathBuf>> {
    let current_dir = std::env::current_dir()?;
    let project_dirs = [current_dir.clone(), current_dir.join(".stackforge")];

    let local = project_dirs
        .into_iter()
        .flat_map(|dir| CANDIDATES.map(|name| dir.join(name)));
    let global = dirs::config_dir().map(|dir| dir.join("stackforge").join("stack.yaml"));

    Ok(local.chain(global).collect())
}

/// YAML のスタック設定ファイルを読み込む
pub fn load_stack_config(path: impl AsRef<Path>) -> Result<StackConfig> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)?;
    let config = serde_yaml::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::debug!("Loaded stack config from {}", path.display());
    Ok(config)
}

/// 設定ファイルがあれば読み込み、なければデフォルト値を返す
pub fn load_or_default() -> Result<StackConfig> {
    match find_stack_file() {
        Ok(path) => load_stack_config(path),
        Err(ConfigError::StackFileNotFound { .. }) => Ok(StackConfig::default()),
        Err(e) => Err(e),
    }
}
