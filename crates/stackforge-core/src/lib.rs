//! stackforge スタック定義
//!
//! 型付きのリソースモデルと、それをプロビジョニングエンジンへ宣言する
//! スタック定義を提供する。
//!
//! ```ignore
//! use stackforge_core::{App, AppStack, AppStackProps};
//!
//! let mut app = App::default();
//! AppStack::new(&mut app, "Test", AppStackProps::new())?;
//! let assembly = app.synth();
//! println!("{}", assembly.stack("Test").unwrap().to_json()?);
//! ```

pub mod error;
pub mod model;
pub mod stack;

pub use error::{Result, StackError};
pub use model::*;
pub use stack::{
    App, AppStack, AppStackProps, BUCKET_ID, BUCKET_NAME_OUTPUT, NETWORK_ID, PRIVATE_BASTION_ID,
    PROVIDER, PUBLIC_BASTION_ID,
};
