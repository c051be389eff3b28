use crate::StackArgs;
use colored::Colorize;

pub fn handle(args: &StackArgs) -> anyhow::Result<()> {
    let (stack, template) = super::synthesize(args)?;

    println!("スタック: {}", stack.id.cyan().bold());
    if let Some(description) = &template.description {
        println!("  {}", description);
    }

    println!("リソース: {}個", template.resources.len());
    for resource in template.resources.iter() {
        println!("  - {} ({})", resource.id.cyan(), resource.resource_type);
    }

    println!("サブネット ({}):", stack.network.cidr);
    for subnet in stack.network.allocate_subnets()? {
        println!(
            "  - {} [{}] zone {}: {}",
            subnet.group.cyan(),
            subnet.subnet_type,
            subnet.zone_index,
            subnet.cidr
        );
    }

    println!("出力: {}個", template.outputs.len());
    for output in &template.outputs {
        println!("  - {} = {}", output.name.cyan(), output.value);
    }

    Ok(())
}
