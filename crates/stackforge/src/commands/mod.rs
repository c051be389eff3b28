pub mod list;
pub mod synth;

use crate::StackArgs;
use anyhow::Context;
use stackforge_cloud::{StackProps, StackTemplate};
use stackforge_config::StackConfig;
use stackforge_core::{App, AppStack, AppStackProps};

const DEFAULT_STACK_ID: &str = "AppStack";

/// 設定ファイルと引数からスタックを定義し、テンプレートを合成する
///
/// 引数で指定された値が設定ファイルより優先される
pub fn synthesize(args: &StackArgs) -> anyhow::Result<(AppStack, StackTemplate)> {
    let config = load_config(args)?;

    let stack_id = args
        .stack_id
        .clone()
        .or(config.stack_id)
        .unwrap_or_else(|| DEFAULT_STACK_ID.to_string());

    let props = AppStackProps {
        base: StackProps {
            description: config.description,
            tags: config.tags,
            termination_protection: config.termination_protection,
        },
        custom_prop: args.custom_prop.clone().or(config.custom_prop),
    };

    let mut app = App::default();
    let stack = AppStack::new(&mut app, &stack_id, props)
        .with_context(|| format!("スタック {} の定義に失敗しました", stack_id))?;

    let template = app
        .synth()
        .stack(&stack_id)
        .cloned()
        .with_context(|| format!("スタック {} のテンプレートがありません", stack_id))?;

    Ok((stack, template))
}

fn load_config(args: &StackArgs) -> anyhow::Result<StackConfig> {
    match &args.config {
        Some(path) => stackforge_config::load_stack_config(path)
            .with_context(|| format!("設定ファイルを読み込めません: {}", path.display())),
        None => Ok(stackforge_config::load_or_default()?),
    }
}
