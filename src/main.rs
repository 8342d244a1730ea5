use clap::{Parser, Subcommand};
use hashchain::chain::Chain;
use hashchain::clock::FixedClock;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "hashchain",
    version,
    about = "Append-only hash-linked chain of immutable records"
)]
struct Cli {
    /// Print debug logs (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Stamp every block with this timestamp instead of the wall clock
    #[arg(long, global = true)]
    timestamp: Option<i64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Append one block per payload and print the chain
    Append {
        /// Block payloads, in order
        #[arg(required = true)]
        data: Vec<String>,
        /// Print the chain as JSON
        #[arg(long)]
        json: bool,
    },
    /// Walk through an append, a stale fork and a tampered block
    Demo,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let chain = match cli.timestamp {
        Some(ts) => Chain::with_clock(FixedClock(ts)),
        None => Chain::init(),
    };

    let result = match cli.command {
        Commands::Append { data, json } => cmd_append(chain, &data, json),
        Commands::Demo => cmd_demo(chain),
    };

    if let Err(e) = result {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "hashchain=debug" } else { "hashchain=warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn cmd_append(
    mut chain: Chain,
    data: &[String],
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    for d in data {
        chain.push(d.as_str())?;
    }
    chain.verify()?;
    if json {
        println!("{}", serde_json::to_string_pretty(chain.blocks())?);
    } else {
        print_chain(&chain);
    }
    Ok(())
}

fn cmd_demo(mut chain: Chain) -> Result<(), Box<dyn std::error::Error>> {
    let genesis = chain.genesis().clone();

    let b1 = chain.create_block(&genesis, "a");
    chain.append(b1)?;
    println!("appended 'a' on genesis (length {})", chain.len());

    let stale = chain.create_block(&genesis, "b");
    match chain.append(stale) {
        Ok(()) => return Err("stale block was accepted".into()),
        Err(e) => println!("rejected 'b' on genesis: {}", e),
    }

    let mut forged = chain.create_block(chain.tail(), "c");
    forged.data = b"c (edited)".to_vec();
    match chain.append(forged) {
        Ok(()) => return Err("tampered block was accepted".into()),
        Err(e) => println!("rejected tampered 'c': {}", e),
    }

    println!("length {}", chain.len());
    println!();
    print_chain(&chain);
    Ok(())
}

fn print_chain(chain: &Chain) {
    for block in chain {
        println!("{}", block);
    }
}
