//! memkv CLI Client
//!
//! Command-line interface for interacting with memkv.

use std::io::{self, BufRead, Write};

use clap::Parser;
use memkv::network::Client;

/// memkv CLI
#[derive(Parser, Debug)]
#[command(name = "memkv-cli")]
#[command(about = "CLI for the memkv key-value store")]
#[command(version)]
struct Args {
    /// Server address
    #[arg(short, long, default_value = "127.0.0.1:8080")]
    server: String,

    /// Command to send once, e.g. `SET name value`; omit for an interactive prompt
    #[arg(trailing_var_arg = true)]
    command: Vec<String>,
}

fn main() {
    let args = Args::parse();

    let mut client = match Client::connect(&args.server) {
        Ok(client) => client,
        Err(e) => {
            eprintln!("Could not connect to {}: {}", args.server, e);
            std::process::exit(1);
        }
    };

    if !args.command.is_empty() {
        match client.request(&args.command.join(" ")) {
            Ok(reply) => println!("{}", reply),
            Err(e) => {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        }
        return;
    }

    if let Err(e) = repl(&mut client, &args.server) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Read commands from stdin until EOF or `quit`
fn repl(client: &mut Client, server: &str) -> memkv::Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        write!(stdout, "{}> ", server)?;
        stdout.flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            return Ok(());
        }

        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line.eq_ignore_ascii_case("quit") || line.eq_ignore_ascii_case("exit") {
            return Ok(());
        }

        let reply = client.request(line)?;
        writeln!(stdout, "{}", reply)?;
    }
}
