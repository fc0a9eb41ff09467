//! # vfilter
//!
//! This binary compiles a filter expression and evaluates it against one JSON record.
extern crate vfilter;

mod cli;

use cli::*;

use std::{error::Error, fs, io::Read as _};

use log::{debug, error, info};
use vfilter::Value;

fn read_json(path: &std::path::Path) -> std::io::Result<Vec<u8>> {
    if path.as_os_str() == "-" {
        let mut buf = Vec::new();
        std::io::stdin().read_to_end(&mut buf)?;
        Ok(buf)
    } else {
        fs::read(path)
    }
}

fn caret_line(expr: &str, offset: usize) -> String {
    format!("{}\n{}^", expr, " ".repeat(offset))
}

fn dump_program(program: &vfilter::Program<'_>) {
    for value in program.ops() {
        match value {
            Value::Op { opcode, .. } => debug!("  {opcode:?}"),
            other => debug!("  push {other:?}"),
        }
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Cli::init();

    simple_logger::init_with_level((&args.verbosity).into()).unwrap();

    let program = match vfilter::compile(&args.expr) {
        Ok(program) => program,
        Err(compile_error) => {
            error!("{compile_error}");
            eprintln!("{}", caret_line(&args.expr, compile_error.offset));
            std::process::exit(1);
        }
    };

    if args.dump_program {
        info!("Compiled program:");
        dump_program(&program);
    }

    let json = read_json(&args.json)?;
    let result = vfilter::run(&program, &json);

    println!("{result}");
    Ok(())
}
