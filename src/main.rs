//! CLI entrypoint for `kerbcrack`.
//!
//! Three subcommands mirror the three attack modes: `tgs` for one or more
//! TGS-REP encrypted parts (with an optional throughput benchmark), `asrep`
//! for a single hashcat-format AS-REP hash, and `ntlm` for a raw NT hash.
//! Input validation happens here; the engine only ever sees usable targets.
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand, ValueEnum};
use log::{LevelFilter, error};

use kerbcrack::{
    bench,
    engine::{self, EngineConfig, Target},
    oracle::MessageType,
    report::{render_bench, render_hit, render_summary},
    targets::{load_ticket_targets, parse_as_rep_hash, parse_nt_hash},
    wordlist::{DEFAULT_CHUNK_SIZE, LoadPolicy},
};

#[derive(Parser, Debug)]
#[command(
    name = "kerbcrack",
    version,
    about = "Offline wordlist cracker for Kerberos RC4-HMAC (etype 23) artifacts and NTLM hashes"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Increase verbosity (-v, -vv)
    #[arg(short = 'v', action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Control color output (auto, always, never)
    #[arg(long = "color", value_enum, default_value_t = ColorChoice::Auto, global = true)]
    color: ColorChoice,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ColorChoice {
    Auto,
    Always,
    Never,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Crack TGS-REP encrypted parts (one raw blob file per target)
    Tgs {
        /// Path(s) to files containing the raw encrypted part of a ticket
        #[arg(short = 'f', long = "file", required = true)]
        tickets: Vec<PathBuf>,

        /// Measure oracle throughput instead of searching the wordlist
        #[arg(short = 'b', long = "benchmark")]
        benchmark: bool,

        #[command(flatten)]
        search: SearchArgs,
    },
    /// Crack a hashcat-format AS-REP hash ($krb5asrep$23$...)
    Asrep {
        /// The AS-REP hash string
        #[arg(short = 'H', long = "hash")]
        hash: String,

        #[command(flatten)]
        search: SearchArgs,
    },
    /// Crack a raw NTLM hash (32 hex digits)
    Ntlm {
        /// The NTLM hash
        #[arg(short = 'H', long = "hash")]
        hash: String,

        #[command(flatten)]
        search: SearchArgs,
    },
}

#[derive(Args, Debug)]
struct SearchArgs {
    /// Path to the wordlist
    #[arg(short = 'w', long = "wordlist")]
    wordlist: Option<PathBuf>,

    /// Number of worker threads
    #[arg(short = 't', long = "threads", default_value_t = engine::default_workers())]
    workers: usize,

    /// Candidates per chunk sent to the workers
    #[arg(short = 's', long = "chunk-size", default_value_t = DEFAULT_CHUNK_SIZE)]
    chunk_size: usize,

    /// Scan the wordlist lazily for low-memory systems
    #[arg(short = 'l', long = "lazy")]
    lazy: bool,
}

impl SearchArgs {
    fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            workers: self.workers,
            policy: if self.lazy {
                LoadPolicy::Lazy
            } else {
                LoadPolicy::Eager
            },
            chunk_size: self.chunk_size,
            ..Default::default()
        }
    }

    /// The wordlist is optional at the clap level (benchmark mode does not
    /// read one) and enforced here for the search paths.
    fn wordlist(&self) -> Result<&PathBuf> {
        let Some(path) = self.wordlist.as_ref() else {
            bail!("missing wordlist (-w/--wordlist)");
        };
        if !path.exists() {
            bail!("wordlist not found: {}", path.display());
        }
        Ok(path)
    }
}

fn init_logger(verbosity: u8) {
    let level = match verbosity {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        _ => LevelFilter::Debug,
    };
    let _ = env_logger::Builder::from_default_env()
        .filter_level(level)
        .try_init();
}

fn run(command: Command) -> Result<()> {
    match command {
        Command::Tgs {
            tickets,
            benchmark,
            search,
        } => {
            for p in &tickets {
                if !p.exists() {
                    bail!("ticket file not found: {}", p.display());
                }
            }
            let targets = load_ticket_targets(&tickets).context("loading ticket files")?;
            if benchmark {
                let report = bench::run(&targets, search.workers);
                print!("{}", render_bench(&report));
                return Ok(());
            }
            println!("Cracking {} tickets...", targets.len());
            search_and_report(&search, targets)
        }
        Command::Asrep { hash, search } => {
            let ciphertext = parse_as_rep_hash(&hash)?;
            let targets = vec![Target::ticket(
                0,
                "AS-REP hash",
                MessageType::AsRep,
                ciphertext,
            )];
            search_and_report(&search, targets)
        }
        Command::Ntlm { hash, search } => {
            let key = parse_nt_hash(&hash)?;
            let targets = vec![Target::nt_hash(0, "NTLM hash", key)];
            search_and_report(&search, targets)
        }
    }
}

fn search_and_report(search: &SearchArgs, targets: Vec<Target>) -> Result<()> {
    let wordlist = search.wordlist()?;
    let config = search.engine_config();
    let report = engine::crack_with_observer(wordlist, targets, &config, &|hit| {
        println!("{}", render_hit(hit));
    })
    .context("crack run failed")?;
    print!("{}", render_summary(&report));
    Ok(())
}

fn main() {
    let cli = Cli::parse();
    init_logger(cli.verbose);
    match cli.color {
        ColorChoice::Always => colored::control::set_override(true),
        ColorChoice::Never => colored::control::set_override(false),
        ColorChoice::Auto => {}
    }
    if let Err(e) = run(cli.command) {
        error!("{:#}", e);
        std::process::exit(2);
    }
}
