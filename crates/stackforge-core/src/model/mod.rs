//! リソースモデル
//!
//! スタック定義が宣言するリソース（ストレージ、ネットワーク、踏み台ホスト）

pub mod compute;
pub mod network;
pub mod storage;

pub use compute::*;
pub use network::*;
pub use storage::*;
