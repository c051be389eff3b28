use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("設定ディレクトリが見つかりません")]
    ConfigDirNotFound,

    #[error(
        "スタック設定ファイルが見つかりません。探索した場所:\n{}\n\
        STACKFORGE_CONFIG_PATH 環境変数で直接指定することもできます",
        list_paths(.searched)
    )]
    StackFileNotFound { searched: Vec<PathBuf> },

    #[error("設定ファイルのパースエラー: {path}\n理由: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("IO エラー: {0}")]
    Io(#[from] std::io::Error),
}

fn list_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| format!("  - {}", p.display()))
        .collect::<Vec<_>>()
        .join("\n")
}

pub type Result<T> = std::result::Result<T, ConfigError>;
