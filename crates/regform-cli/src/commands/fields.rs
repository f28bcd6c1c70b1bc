use anyhow::Result;
use colored::Colorize;
use regform::{registration_schema, RegformConfig};

pub fn execute(config: &RegformConfig) -> Result<()> {
    let schema = registration_schema(config)?;

    println!("{}", "Registration fields".green().bold());
    println!();

    for field in schema.fields() {
        let rules: Vec<&str> = field.rules().iter().map(|rule| rule.name()).collect();
        let transform = field.get_transform().map(|t| t.name()).unwrap_or("-");
        println!(
            "  {:<16} {:<18} {:<9} {:<10} {}",
            field.name().cyan(),
            field.display_label(),
            field.kind().as_str(),
            transform,
            rules.join(", ")
        );
    }

    if !schema.cross_field_rules().is_empty() {
        println!();
        println!("{}", "Cross-field rules".green().bold());
        for rule in schema.cross_field_rules() {
            let deps: Vec<&str> = rule.depends_on().iter().map(String::as_str).collect();
            println!(
                "  {:<16} on {:<16} reads {}",
                rule.name(),
                rule.attach_to().cyan(),
                deps.join(", ")
            );
        }
    }

    Ok(())
}
