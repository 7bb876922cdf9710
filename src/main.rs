use std::{env, fs::read_to_string, path::PathBuf, process::exit, time::Instant};

use refront::{
    config::config::FrontOptions,
    diagnostics::diagnostics::{render, Diagnostic},
    driver::driver::Front,
};
use tracing::info;

const USAGE: &str = "Usage: refront [--no-stdlib] [--no-warnings] FILE...";

fn main() {
    tracing_subscriber::fmt::init();

    let mut options = FrontOptions::default();
    let mut files: Vec<String> = vec![];

    for arg in env::args().skip(1) {
        match arg.as_str() {
            "--no-stdlib" => options = options.without_stdlib(),
            "--no-warnings" => options = options.without_warnings(),
            "-h" | "--help" => {
                println!("{}", USAGE);
                return;
            }
            flag if flag.starts_with("--") => {
                eprintln!("Unknown option `{}`\n{}", flag, USAGE);
                exit(2);
            }
            _ => files.push(arg),
        }
    }

    if files.is_empty() {
        eprintln!("{}", USAGE);
        exit(2);
    }

    let start = Instant::now();
    let mut front = Front::new(options);

    for file in &files {
        let contents = match read_to_string(PathBuf::from(file)) {
            Ok(contents) => contents,
            Err(error) => {
                eprintln!("Failed to read `{}`: {}", file, error);
                exit(2);
            }
        };

        let file_name = match file.rsplit_once('/') {
            Some((_, name)) => name,
            None => file.as_str(),
        };
        front.add_source(&contents, file_name);
    }

    let success = front.analyze();
    info!(elapsed = ?start.elapsed(), "Front-end finished");

    for diagnostic in front.diagnostics().iter() {
        display_diagnostic(&front, diagnostic);
    }

    if !success {
        eprintln!(
            "Analysis failed with {} error(s)",
            front.diagnostics().error_count()
        );
        exit(1);
    }
    println!("Analyzed {} module(s): {}", front.order().len(), front.order().join(", "));
}

fn display_diagnostic(front: &Front, diagnostic: &Diagnostic) {
    match front.source_text(diagnostic.start.file.as_str()) {
        Some(source) => eprintln!("{}", render(diagnostic, source)),
        None => eprintln!("{}", diagnostic),
    }
}
