//! Binary to generate/update .expected.erb files
//!
//! Usage:
//!   cargo run --bin accept_expected            # Update all
//!   cargo run --bin accept_expected -- forms   # Update only fixtures matching "forms"

use haml2erb::convert_with_stats;
use std::fs;
use std::path::Path;
use walkdir::WalkDir;

fn main() {
    let filter: Option<String> = std::env::args().nth(1);
    let fixture_dir = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures");

    let mut updated = 0;
    let mut skipped = 0;

    for entry in WalkDir::new(&fixture_dir)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.path().extension().is_some_and(|s| s == "haml"))
    {
        let path = entry.path();
        let path_str = path.to_string_lossy();

        // Apply filter if provided
        if let Some(ref f) = filter {
            if !path_str.contains(f) {
                skipped += 1;
                continue;
            }
        }

        if process_file(path) {
            updated += 1;
        }
    }

    println!("Updated {} files, skipped {}", updated, skipped);
}

fn process_file(path: &Path) -> bool {
    let source = match fs::read_to_string(path) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Failed to read {:?}: {}", path, e);
            return false;
        }
    };

    let conversion = convert_with_stats(&source);
    if conversion.stats.passthrough_lines > 0 {
        println!(
            "  note: {} line(s) passed through unchanged in {}",
            conversion.stats.passthrough_lines,
            path.display()
        );
    }

    let expected = path.with_extension("expected.erb");
    if let Err(e) = fs::write(&expected, &conversion.erb) {
        eprintln!("Failed to write {:?}: {}", expected, e);
        return false;
    }
    println!("  wrote {}", expected.display());
    true
}
