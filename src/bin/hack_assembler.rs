// hack-assembler - assembly to binary text
// Resolves symbols in two passes and writes one 16-digit word per line

use std::env;
use std::path::Path;
use std::process;

use hackforge::Assembler;

fn main() {
    // Initialize logging
    env_logger::init();

    let args: Vec<String> = env::args().collect();

    let mut positional: Vec<&str> = Vec::new();
    let mut verbose = false;

    for arg in args.iter().skip(1) {
        match arg.as_str() {
            "-v" | "--verbose" => verbose = true,
            "-h" | "--help" => {
                print_usage(&args[0]);
                process::exit(0);
            }
            other if other.starts_with('-') => {
                eprintln!("Error: Unknown option '{}'", other);
                print_usage(&args[0]);
                process::exit(1);
            }
            other => positional.push(other),
        }
    }

    if positional.len() != 2 {
        eprintln!("Error: expected an input file and an output file");
        print_usage(&args[0]);
        process::exit(1);
    }
    let (input, output) = (Path::new(positional[0]), Path::new(positional[1]));

    if verbose {
        println!("Assembling {} -> {}", input.display(), output.display());
    }

    match Assembler::new().assemble_file(input, output) {
        Ok(program) => {
            if verbose {
                println!(
                    "Wrote {} words ({} user symbols) to {}",
                    program.words.len(),
                    program.symbols.user_symbol_count(),
                    output.display()
                );
            }
        }
        Err(err) => {
            eprintln!("Assembly error: {}", err);
            process::exit(err.exit_code());
        }
    }
}

fn print_usage(program_name: &str) {
    println!("Usage: {} [options] <input.asm> <output.hack>", program_name);
    println!();
    println!("Options:");
    println!("  -v, --verbose          Verbose output");
    println!("  -h, --help             Show this help message");
}
