use std::env;
use std::io::{self, BufRead};
use std::process::ExitCode;

use colored::Colorize;
use earlex::Earlex;

fn usage() -> ExitCode {
    eprintln!("usage: earlex <grammar-file> <vocabulary-file> [--pos-yield] [--generate N]");
    eprintln!("Sentences are read from stdin, one per line.");
    ExitCode::FAILURE
}

fn main() -> ExitCode {
    let mut pos_yield = false;
    let mut generate: Option<usize> = None;
    let mut files = Vec::new();

    let args: Vec<String> = env::args().skip(1).collect();
    let mut words = args.iter();
    while let Some(arg) = words.next() {
        match arg.as_str() {
            "--pos-yield" => pos_yield = true,
            "--generate" => {
                generate = words.next().and_then(|n| n.parse().ok());
                if generate.is_none() {
                    return usage();
                }
            }
            _ => files.push(arg.clone()),
        }
    }
    if files.len() != 2 {
        return usage();
    }

    let engine = match Earlex::from_files(&files[0], &files[1]) {
        Ok(engine) => engine,
        Err(error) => {
            eprintln!("{}", error.to_string().red());
            return ExitCode::FAILURE;
        }
    };

    if let Some(max_words) = generate {
        let mut parser = engine.parser_for("", max_words);
        if let Err(error) = parser.generate_sentence() {
            eprintln!("{}", error.to_string().red());
            return ExitCode::FAILURE;
        }
        for length in 1..=max_words {
            for sentence in parser.formatted_strings(length, pos_yield) {
                println!("{sentence}");
            }
        }
        return ExitCode::SUCCESS;
    }

    for line in io::stdin().lock().lines() {
        let Ok(line) = line else { break };
        let sentence = line.trim();
        if sentence.is_empty() {
            continue;
        }
        let mut parser = engine.parser_for(sentence, 0);
        let outcome = parser.parse_sentence();
        if outcome.accepted {
            let count = parser.count_derivations();
            println!(
                "{} {} ({} derivations)",
                "accepted".green().bold(),
                sentence,
                count.to_string().bold()
            );
            for tree in parser.formatted_strings(0, pos_yield) {
                println!("  {}", tree.cyan());
            }
        } else {
            println!("{} {}", "rejected".red().bold(), sentence);
        }
    }
    ExitCode::SUCCESS
}
