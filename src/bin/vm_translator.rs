// vm-translator - VM to assembly translator
// Translates a .vm file, or every .vm file in a directory, into one .asm file

use std::env;
use std::path::Path;
use std::process;

use hackforge::{BuildConfig, VmTranslator};

fn main() {
    // Initialize logging
    env_logger::init();

    let args: Vec<String> = env::args().collect();

    let mut positional: Vec<&str> = Vec::new();
    let mut config_file: Option<&str> = None;
    let mut no_bootstrap = false;
    let mut verbose = false;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "-c" | "--config" => {
                if i + 1 >= args.len() {
                    eprintln!("Error: --config requires a filename");
                    process::exit(1);
                }
                config_file = Some(args[i + 1].as_str());
                i += 2;
            }
            "--no-bootstrap" => {
                no_bootstrap = true;
                i += 1;
            }
            "-v" | "--verbose" => {
                verbose = true;
                i += 1;
            }
            "-h" | "--help" => {
                print_usage(&args[0]);
                process::exit(0);
            }
            arg if arg.starts_with('-') => {
                eprintln!("Error: Unknown option '{}'", arg);
                print_usage(&args[0]);
                process::exit(1);
            }
            arg => {
                positional.push(arg);
                i += 1;
            }
        }
    }

    if positional.len() != 2 {
        eprintln!("Error: expected an input path and an output file");
        print_usage(&args[0]);
        process::exit(1);
    }
    let (input, output) = (Path::new(positional[0]), Path::new(positional[1]));

    let mut config = match config_file {
        Some(path) => match BuildConfig::load(Path::new(path)) {
            Ok(config) => config,
            Err(err) => {
                eprintln!("{}", err);
                process::exit(err.exit_code());
            }
        },
        None => BuildConfig::default(),
    };
    if no_bootstrap {
        config.translator.bootstrap = false;
    }

    if verbose {
        println!("Translating {} -> {}", input.display(), output.display());
    }

    let translator = VmTranslator::new(config.translator);
    match translator.translate_path(input, output) {
        Ok(units) => {
            if verbose {
                println!("Translated {} unit(s) to {}", units, output.display());
            }
        }
        Err(err) => {
            eprintln!("Translation error: {}", err);
            process::exit(err.exit_code());
        }
    }
}

fn print_usage(program_name: &str) {
    println!("Usage: {} [options] <input.vm | dir> <output.asm>", program_name);
    println!();
    println!("Options:");
    println!("  -c, --config <file>    TOML build configuration");
    println!("  --no-bootstrap         Omit the stack setup and entry call");
    println!("  -v, --verbose          Verbose output");
    println!("  -h, --help             Show this help message");
}
