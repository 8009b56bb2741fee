//! causelink CLI — decode error-chain wire records from the terminal.
//!
//! Usage:
//! ```bash
//! # Decode a wire JSON file (simple one-line output)
//! causelink decode --file wire.json
//!
//! # Full multi-frame listing
//! causelink decode --file wire.json --verbose
//!
//! # Re-encode back to JSON after the local decode pass
//! causelink decode --file wire.json --json
//!
//! # Build a sample chain and show every render mode
//! causelink demo
//! ```

use std::env;
use std::fs;
use std::io::Read;
use std::process;

use causelink_core::{decode, encode, global, simple, verbose, wrap, WireRecord};
use causelink_http::wrap_with_http_code;
use causelink_issue::{unimplemented, IssueLink};

fn main() {
    register_all();

    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        print_usage();
        process::exit(1);
    }

    match args[1].as_str() {
        "decode" => cmd_decode(&args[2..]),
        "demo" => cmd_demo(),
        "help" | "--help" | "-h" => {
            print_usage();
        }
        "version" | "--version" | "-V" => {
            println!("causelink {}", env!("CARGO_PKG_VERSION"));
        }
        other => {
            eprintln!("Unknown command: {other}");
            print_usage();
            process::exit(1);
        }
    }
}

/// All bundled registrants, installed before any decode runs.
fn register_all() {
    causelink_http::register();
    causelink_issue::register();
    causelink_os::register();
}

fn print_usage() {
    println!("causelink {}", env!("CARGO_PKG_VERSION"));
    println!("Decode error-chain wire records\n");
    println!("USAGE:");
    println!("    causelink <COMMAND>\n");
    println!("COMMANDS:");
    println!("    decode    Decode a JSON array of wire records");
    println!("    demo      Build a sample chain and print every render mode");
    println!("    version   Print version");
    println!("    help      Print this help\n");
    println!("DECODE FLAGS:");
    println!("    --file <PATH>     Wire JSON file ('-' for stdin)  [required]");
    println!("    --verbose         Multi-frame listing instead of the one-liner");
    println!("    --json            Re-encode the decoded chain as JSON");
}

fn cmd_decode(args: &[String]) {
    let mut file: Option<&str> = None;
    let mut as_verbose = false;
    let mut as_json = false;

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--file" => {
                i += 1;
                file = args.get(i).map(|s| s.as_str());
            }
            "--verbose" => as_verbose = true,
            "--json" => as_json = true,
            flag => {
                eprintln!("Unknown flag: {flag}");
                process::exit(1);
            }
        }
        i += 1;
    }

    let path = match file {
        Some(p) => p,
        None => {
            eprintln!("Error: --file is required");
            process::exit(1);
        }
    };

    let input = match read_input(path) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Cannot read {path}: {e}");
            process::exit(1);
        }
    };

    let records: Vec<WireRecord> = match serde_json::from_str(&input) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("Invalid wire JSON: {e}");
            process::exit(1);
        }
    };

    let err = match decode(global(), &records) {
        Ok(err) => err,
        Err(e) => {
            eprintln!("Decode error: {e}");
            process::exit(1);
        }
    };

    if as_json {
        let reencoded = encode(global(), err.as_ref());
        match serde_json::to_string_pretty(&reencoded) {
            Ok(json) => println!("{json}"),
            Err(e) => {
                eprintln!("JSON serialization error: {e}");
                process::exit(1);
            }
        }
    } else if as_verbose {
        println!("{}", verbose(err.as_ref()));
    } else {
        println!("{}", simple(err.as_ref()));
    }
}

fn read_input(path: &str) -> std::io::Result<String> {
    if path == "-" {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        return Ok(buf);
    }
    fs::read_to_string(path)
}

fn cmd_demo() {
    let root = unimplemented(
        IssueLink::with_detail("https://issues.example.com/4519", "multi-region variant"),
        "follower reads",
    );
    let err = wrap_with_http_code(wrap(Some(root), "executing query"), 501)
        .and_then(|e| wrap(Some(e), "handling request"))
        .unwrap_or_else(|| causelink_core::leaf("demo chain construction failed"));

    println!("simple:\n  {}\n", simple(err.as_ref()));
    println!("verbose:\n{}\n", verbose(err.as_ref()));

    let records = encode(global(), err.as_ref());
    match serde_json::to_string_pretty(&records) {
        Ok(json) => println!("wire:\n{json}"),
        Err(e) => {
            eprintln!("JSON serialization error: {e}");
            process::exit(1);
        }
    }
}
