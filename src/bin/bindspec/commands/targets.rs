//! `bindspec targets` command

use anyhow::Result;

use super::Outcome;
use crate::cli::TargetsArgs;
use bindspec::targets::TargetRegistry;

pub fn execute(args: TargetsArgs) -> Result<Outcome> {
    let registry = TargetRegistry::new();

    println!("Targets:");
    println!();

    for target in registry.all() {
        let table = target.mapping().table();

        println!("  {} - {}", target.id(), target.description());
        println!("    Naming:     {:?}", target.naming());
        println!("    Bridge:     {}", target.default_bridge_module());

        if args.mappings {
            println!("    Primitives:");
            for (name, rendered) in table.primitives {
                println!("      {:<18} {}", name, rendered);
            }
            println!("    Templates:");
            for name in table.template_names() {
                println!("      {}", name);
            }
        } else {
            println!(
                "    Primitives: {}",
                table.primitive_names().collect::<Vec<_>>().join(", ")
            );
            println!(
                "    Templates:  {}",
                table.template_names().collect::<Vec<_>>().join(", ")
            );
        }
        println!();
    }

    Ok(Outcome::Success)
}
