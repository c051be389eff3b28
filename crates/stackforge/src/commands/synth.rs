use crate::{Format, StackArgs};
use anyhow::Context;
use colored::Colorize;
use std::path::Path;

pub async fn handle(
    args: &StackArgs,
    format: Format,
    output: Option<&Path>,
) -> anyhow::Result<()> {
    let (stack, template) = super::synthesize(args)?;

    let rendered = match format {
        Format::Json => template.to_json()?,
        Format::Yaml => template.to_yaml()?,
    };

    match output {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                tokio::fs::create_dir_all(parent).await?;
            }
            tokio::fs::write(path, &rendered)
                .await
                .with_context(|| format!("書き込みに失敗しました: {}", path.display()))?;

            println!(
                "{} {} ({}個のリソース, {}個の出力)",
                "✓ テンプレートを出力しました:".green(),
                path.display().to_string().cyan(),
                template.resources.len(),
                template.outputs.len()
            );
        }
        None => println!("{}", rendered),
    }

    tracing::info!("Synthesized stack {}", stack.id);
    Ok(())
}
