use std::{env, fs, path::Path, process};

use gearscript::bytecode::{disassemble, Compiler};
use gearscript::lexer::Tokenizer;
use gearscript::parser::Parser;

fn main() {
    let args: Vec<String> = env::args().collect();

    let tokens_only = args.contains(&"--tokens".to_string());
    let ast = args.contains(&"--ast".to_string());
    let bytecode = args.contains(&"--bc".to_string()) || args.contains(&"--bytecode".to_string());

    // first non-flag argument is the filename
    let filename = args.iter().skip(1).find(|a| !a.starts_with('-'));

    match filename {
        Some(filename) => {
            ensure_extension(filename);
            match fs::read_to_string(filename) {
                Ok(source) => {
                    if tokens_only {
                        dump_tokens(&source, filename);
                    } else if ast {
                        dump_ast(&source, filename);
                    } else if bytecode {
                        dump_bytecode(&source, filename);
                    } else {
                        run_script(&source, filename);
                    }
                }
                Err(e) => {
                    eprintln!("Failed to read '{}': {}", filename, e);
                    process::exit(1);
                }
            }
        }
        None => print_usage(),
    }
}

fn ensure_extension(filename: &str) {
    let path = Path::new(filename);
    if path.extension().and_then(|e| e.to_str()) != Some("cgs") {
        eprintln!("Error: expected a .cgs file, got {}", filename);
        process::exit(1);
    }
}

fn print_usage() {
    println!("GEARSCRIPT - Embeddable Scripting Engine");
    println!();
    println!("Usage:");
    println!("  gearscript <file.cgs>           Run a script");
    println!("  gearscript --tokens <file.cgs>  Show the token stream");
    println!("  gearscript --ast <file.cgs>     Show the parse tree");
    println!("  gearscript --bc <file.cgs>      Show the compiled bytecode");
}

fn dump_tokens(source: &str, filename: &str) {
    let mut tokenizer = match Tokenizer::new(source, filename) {
        Ok(t) => t,
        Err(e) => {
            eprintln!("{}", e);
            process::exit(1);
        }
    };

    while !tokenizer.is_eof() {
        println!(
            "{}:{}\t{:?}\t{}",
            tokenizer.token_line,
            tokenizer.token_col,
            tokenizer.token_type,
            tokenizer.describe()
        );
        if let Err(e) = tokenizer.next() {
            eprintln!("{}", e);
            process::exit(1);
        }
    }
}

fn dump_ast(source: &str, filename: &str) {
    match parse(source, filename) {
        Ok(program) => println!("{:#?}", program),
        Err(e) => {
            eprintln!("{}", e);
            process::exit(1);
        }
    }
}

fn dump_bytecode(source: &str, filename: &str) {
    let listing = parse(source, filename)
        .and_then(|program| Compiler::new().compile_program(&program))
        .and_then(|compiled| disassemble(&compiled));

    match listing {
        Ok(listing) => print!("{}", listing),
        Err(e) => {
            eprintln!("{}", e);
            process::exit(1);
        }
    }
}

fn parse(source: &str, filename: &str) -> Result<gearscript::ast::Program, gearscript::ScriptError> {
    let mut tokenizer = Tokenizer::new(source, filename)?;
    Parser::new(&mut tokenizer).parse_program()
}

fn run_script(source: &str, filename: &str) {
    let mut runtime = match gearscript::compile(source, filename) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("{}", e);
            process::exit(1);
        }
    };

    match runtime.start() {
        Ok(result) => {
            if !result.is_null() {
                println!("result: {}", result);
            }
            for (name, value) in runtime.root().entries() {
                println!("{} = {}", name, value);
            }
        }
        Err(e) => {
            eprintln!("{}", e);
            process::exit(1);
        }
    }
}
