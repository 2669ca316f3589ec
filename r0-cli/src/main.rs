//! Entrypoint for CLI
use std::{env, fs, process};

use log::debug;

static USAGE: &str = r#"
usage: r0c INPUT OUTPUT

Compiles an r0 source file into an image for the r0 virtual machine.

example:
    r0c program.r0 program.o0
"#;

fn main() {
    simple_logger::SimpleLogger::new().env().init().unwrap();

    let args: Vec<String> = env::args().skip(1).collect();
    let (input, output) = match args.as_slice() {
        [input, output] => (input, output),
        _ => {
            print_usage();
            process::exit(1);
        }
    };

    let source = match fs::read_to_string(input) {
        Ok(source) => source,
        Err(err) => {
            println!("cannot open the file {}: {}", input, err);
            process::exit(1);
        }
    };

    debug!("compiling {}", input);
    let bytes = match r0_compiler::compile_str(&source) {
        Ok(bytes) => bytes,
        Err(err) => {
            println!("{}", err.render(input));
            process::exit(1);
        }
    };

    if let Err(err) = fs::write(output, &bytes) {
        println!("cannot write the file {}: {}", output, err);
        process::exit(1);
    }

    println!("No errors found");
}

fn print_usage() {
    println!("r0c v{}", env!("CARGO_PKG_VERSION"));
    println!("{}", USAGE);
}
