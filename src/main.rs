// src/main.rs

use argon2id_token::{HashParams, HashRecord};
use clap::{Parser, Subcommand};
use log::{error, info};
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "argon2id-token", about = "Hash and verify secrets as Argon2id tokens")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Hash a secret and print the token
    Hash {
        secret: String,
        #[arg(long, default_value_t = HashParams::default().memory_cost)]
        memory_cost: u32,
        #[arg(long, default_value_t = HashParams::default().time_cost)]
        time_cost: u32,
        #[arg(long, default_value_t = HashParams::default().parallelism)]
        parallelism: u8,
        #[arg(long, default_value_t = HashParams::default().salt_length)]
        salt_length: usize,
        #[arg(long, default_value_t = HashParams::default().digest_length)]
        digest_length: usize,
    },
    /// Check a secret against a token
    Verify { token: String, secret: String },
    /// Print the fields stored in a token
    Inspect {
        token: String,
        #[arg(long)]
        json: bool,
    },
}

fn main() -> ExitCode {
    env_logger::init();
    let args = Cli::parse();

    match args.command {
        Command::Hash {
            secret,
            memory_cost,
            time_cost,
            parallelism,
            salt_length,
            digest_length,
        } => {
            let params = HashParams {
                memory_cost,
                time_cost,
                parallelism,
                salt_length,
                digest_length,
            };
            match HashRecord::with_params(&secret, &params) {
                Ok(record) => {
                    println!("{record}");
                    ExitCode::SUCCESS
                }
                Err(e) => {
                    error!("Failed to hash secret: {}", e);
                    ExitCode::FAILURE
                }
            }
        }
        Command::Verify { token, secret } => {
            let record = match HashRecord::parse(&token) {
                Ok(record) => record,
                Err(e) => {
                    error!("Failed to parse token: {}", e);
                    return ExitCode::FAILURE;
                }
            };
            if record.compare(&secret) {
                println!("match");
                ExitCode::SUCCESS
            } else {
                info!("Secret does not match token");
                println!("mismatch");
                ExitCode::FAILURE
            }
        }
        Command::Inspect { token, json } => {
            let record = match HashRecord::parse(&token) {
                Ok(record) => record,
                Err(e) => {
                    error!("Failed to parse token: {}", e);
                    return ExitCode::FAILURE;
                }
            };
            if json {
                match serde_json::to_string_pretty(&record.params()) {
                    Ok(out) => println!("{out}"),
                    Err(e) => {
                        error!("Failed to encode params: {:?}", e);
                        return ExitCode::FAILURE;
                    }
                }
            } else {
                println!("algorithm:   {}", record.algorithm());
                println!("version:     {}", record.version());
                println!("memory_cost: {}", record.memory_cost());
                println!("time_cost:   {}", record.time_cost());
                println!("parallelism: {}", record.parallelism());
                println!("salt:        {}", hex::encode(record.salt()));
                println!("digest:      {}", hex::encode(record.digest()));
            }
            ExitCode::SUCCESS
        }
    }
}
