use std::io::{self, BufWriter, IsTerminal, Write};

use anyhow::Context;
use clap::{ArgGroup, Parser, Subcommand};
use decv_crypto::BackendFamily;
use decv_vectors::{BackendConfig, GeneratorConfig, VectorGenerator, VectorVerifier};
use tracing::Level;

mod progress;

use progress::ProgressReporter;

#[derive(Parser, Debug)]
#[command(
    name = "decv",
    about = "Deterministic ECDSA test vectors over a BIP32 key tree",
    group(ArgGroup::new("backend").required(true).args(["libsecp256k1", "rustcrypto"]))
)]
struct Args {
    /// Use the libsecp256k1 backend (emits low-s natively)
    #[arg(long)]
    libsecp256k1: bool,

    /// Use the pure-Rust k256 backend (emits the raw s value)
    #[arg(long)]
    rustcrypto: bool,

    /// The log level for traces. opts: (error, debug, info, warn, trace)
    #[arg(long, default_value_t = Level::WARN)]
    log_level: Level,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write N random records to stdout
    Generate {
        /// Number of records
        n: u64,

        /// Start every path at 0' instead of 0
        #[arg(long, default_value_t = false)]
        hardened_root: bool,
    },

    /// Read records from stdin and check every one
    Verify,
}

impl Args {
    fn family(&self) -> BackendFamily {
        if self.libsecp256k1 {
            BackendFamily::Libsecp256k1
        } else {
            BackendFamily::RustCrypto
        }
    }
}

fn run(args: Args) -> anyhow::Result<()> {
    let family = args.family();
    let backend = BackendConfig::select(family)
        .with_context(|| format!("cannot use backend {family}"))?;

    // Only draw when stdout is a file or pipe; the bar would interleave with records otherwise.
    let show_progress = !io::stdout().is_terminal();

    match args.command {
        Command::Generate { n, hardened_root } => {
            let config = GeneratorConfig::default().with_hardened_root(hardened_root);
            let generator = VectorGenerator::new(&backend, config);
            let progress = ProgressReporter::bar(n, "generate", show_progress)?;

            let mut out = BufWriter::new(io::stdout().lock());
            let mut rng = rand::thread_rng();
            generator
                .write_records(&mut rng, n, &mut out, |done| progress.set_position(done))
                .context("generation failed")?;
            out.flush()?;
            progress.finish();
        }
        Command::Verify => {
            let verifier = VectorVerifier::new(&backend);
            let progress = ProgressReporter::spinner("verify", show_progress)?;

            let verified = verifier
                .verify_lines(io::stdin().lock(), |done| progress.set_position(done))
                .context("verification failed")?;
            progress.finish();
            println!("verified: {verified} signatures");
        }
    }

    Ok(())
}

fn main() {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_max_level(args.log_level)
        .with_writer(io::stderr)
        .init();

    if let Err(err) = run(args) {
        eprintln!("Error: {err:#}");
        std::process::exit(1);
    }
}
