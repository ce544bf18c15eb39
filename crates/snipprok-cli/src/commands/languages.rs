//! Languages command implementation

use anyhow::Result;
use colored::Colorize;

pub fn run() -> Result<()> {
    println!("Snipprok v{}", env!("CARGO_PKG_VERSION"));
    println!();
    println!("Languages:");
    for (name, aliases) in snipprok::lex::languages() {
        if aliases.is_empty() {
            println!("  {}", name.bold());
        } else {
            println!("  {}{}", format!("{name:<18}").bold(), aliases.join(", "));
        }
    }
    Ok(())
}
