//! Welcome banner for the terminal chat.

use console::style;

/// Print the banner shown when the chat starts.
pub fn print_welcome_banner(model_path: &str) {
    println!();
    println!(
        "  {}",
        style("┌─────────────────────────────────────────────┐").cyan()
    );
    println!(
        "  {}",
        style("│            Charla — local AI chat           │").cyan()
    );
    println!(
        "  {}",
        style("└─────────────────────────────────────────────┘").cyan()
    );
    println!();
    println!("  {}  {}", style("Model:").bold(), style(model_path).dim());
    println!();
    println!(
        "  {}",
        style("Type a message and press Enter. '/pic <path>' describes an image.").yellow()
    );
    println!(
        "  {}",
        style("Type 'exit' (or press Ctrl+D) to leave.").yellow()
    );
    println!();
}
