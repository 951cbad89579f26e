use std::env;
use std::fs;
use std::io::{self, Write};
use std::process::exit;

use picol::{Code, Interp, MAX_FILE_SIZE};

fn main() {
    env_logger::init();

    let args: Vec<String> = env::args().skip(1).collect();
    match args.as_slice() {
        [] => repl(),
        [path] => run_file(path),
        _ => {
            eprintln!("usage: picol [script]");
            exit(1);
        }
    }
}

fn repl() {
    let mut interp = Interp::new();
    let stdin = io::stdin();
    loop {
        print!("picol> ");
        if io::stdout().flush().is_err() {
            break;
        }
        let mut line = String::new();
        match stdin.read_line(&mut line) {
            Ok(0) | Err(_) => break,
            Ok(_) => {}
        }
        let code = interp.eval(&line).unwrap_or(Code::Err);
        if !interp.result().is_empty() {
            println!("[{}] {}", code, interp.result());
        }
    }
}

fn run_file(path: &str) {
    let mut interp = Interp::new();
    let contents = fs::read(path).unwrap_or_else(|e| {
        eprintln!("{}", e);
        exit(1);
    });
    let len = contents.len().min(MAX_FILE_SIZE);
    let text = String::from_utf8_lossy(&contents[..len]);
    if interp.eval(&text).is_err() {
        eprintln!("{}", interp.result());
    }
    exit(0);
}
