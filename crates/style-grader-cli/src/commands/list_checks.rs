//! List checks command implementation.

use style_grader_checks::all_checks;

/// Runs the list-checks command.
pub fn run() {
    println!("Available checks:\n");
    println!("{:<8} {:<16} {:<9} Description", "Code", "Name", "Severity");
    println!("{}", "-".repeat(80));

    for check in all_checks() {
        println!(
            "{:<8} {:<16} {:<9} {}",
            check.code(),
            check.name(),
            check.default_severity().as_str(),
            check.description()
        );
        println!("{:<35} triggers: {}", "", check.triggers().join(", "));
    }

    println!("\nA check only runs when the style guide has a rule mentioning one of its triggers.");
    println!("Use --checks to restrict the run, e.g.:");
    println!("  style-grader check --guide guide.md --checks naming,null-sentinel");
    println!("  style-grader check --guide guide.md --checks SG001,SG007");
}
