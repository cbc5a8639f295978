//! Command-line front end for the RV32IM circuit compiler.

use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{bail, Context as _};
use clap::{Parser, Subcommand, ValueEnum};
use log::info;
use zkrv_compiler::{compile, AdderKind, CompileConfig, MemoryTier, Program};
use zkrv_fmt::{write_circuit, CircuitReader};

use mimalloc::MiMalloc;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[derive(Parser)]
#[command(name = "zkrv")]
#[command(about = "RV32IM to Boolean circuit compiler", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile a hex program into a circuit file
    Compile {
        /// Input program: one 32-bit hex instruction word per line
        #[arg(value_name = "INPUT")]
        input: PathBuf,

        /// Output circuit file (defaults to input.zkrv)
        #[arg(short, long, value_name = "OUTPUT")]
        output: Option<PathBuf>,

        /// Memory tier backing loads and stores
        #[arg(short, long, value_enum, default_value = "ultra")]
        memory: MemoryArg,

        /// 32-bit adder primitive used by every emitter
        #[arg(short, long, value_enum, default_value = "ripple")]
        adder: AdderArg,

        /// Entry program counter (decimal or 0x-prefixed hex)
        #[arg(long, value_parser = parse_u32, default_value = "0")]
        entry_pc: u32,

        /// Raw initial bytes for the memory region
        #[arg(long, value_name = "FILE")]
        data: Option<PathBuf>,

        /// Recognise LUI+ADDI and AUIPC+ADDI pairs and emit combined circuits
        #[arg(long)]
        fuse: bool,

        /// Disable gate deduplication
        #[arg(long)]
        no_dedup: bool,

        /// Merkle depth for the authenticated tier
        #[arg(long, default_value_t = zkrv_compiler::config::DEFAULT_AUTH_DEPTH)]
        auth_depth: usize,

        /// Input bit budget, in bytes
        #[arg(long, default_value_t = zkrv_compiler::config::DEFAULT_MAX_IO_BYTES)]
        max_input_bytes: usize,

        /// Output bit budget, in bytes
        #[arg(long, default_value_t = zkrv_compiler::config::DEFAULT_MAX_IO_BYTES)]
        max_output_bytes: usize,
    },

    /// Print the header of a circuit file
    Info {
        /// Circuit file
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },

    /// Verify a circuit file: checksum plus structural invariants
    Verify {
        /// Circuit file
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum MemoryArg {
    Ultra,
    Simple,
    Authenticated,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum AdderArg {
    Ripple,
    KoggeStone,
}

fn parse_u32(s: &str) -> Result<u32, String> {
    let parsed = if let Some(hex) = s.strip_prefix("0x") {
        u32::from_str_radix(hex, 16)
    } else {
        s.parse()
    };
    parsed.map_err(|e| e.to_string())
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Compile {
            input,
            output,
            memory,
            adder,
            entry_pc,
            data,
            fuse,
            no_dedup,
            auth_depth,
            max_input_bytes,
            max_output_bytes,
        } => {
            let words = parse_hex_program(&input)?;
            let initial_data = match data {
                Some(path) => fs::read(&path)
                    .with_context(|| format!("reading initial data {}", path.display()))?,
                None => Vec::new(),
            };
            let program = Program {
                entry_pc,
                words,
                initial_data,
            };
            let config = CompileConfig {
                memory_tier: match memory {
                    MemoryArg::Ultra => MemoryTier::Ultra,
                    MemoryArg::Simple => MemoryTier::Simple,
                    MemoryArg::Authenticated => MemoryTier::Authenticated,
                },
                adder: match adder {
                    AdderArg::Ripple => AdderKind::Ripple,
                    AdderArg::KoggeStone => AdderKind::KoggeStone,
                },
                max_input_bytes,
                max_output_bytes,
                dedup: !no_dedup,
                fuse,
                auth_depth,
            };

            let output = output.unwrap_or_else(|| input.with_extension("zkrv"));
            println!("Compiling {} -> {}", input.display(), output.display());

            let start = Instant::now();
            let compiled = compile(&program, &config)?;
            info!("compilation took {:?}", start.elapsed());

            let file = File::create(&output)
                .with_context(|| format!("creating {}", output.display()))?;
            let stats = write_circuit(file, &compiled.circuit)?;

            println!("Total gates: {}", stats.total_gates);
            println!("  XOR gates: {}", stats.xor_gates);
            println!("  AND gates: {}", stats.and_gates);
            println!("Input bits:  {}", stats.input_bits);
            println!("Output bits: {}", stats.output_bits);
            println!("Wire count:  {}", stats.wire_count);
        }

        Commands::Info { file } => {
            let reader = open_reader(&file)?;
            let h = reader.header();
            println!("File:        {}", file.display());
            println!("Version:     {}", h.version);
            println!("Input bits:  {}", h.input_bits);
            println!("Output bits: {}", h.output_bits);
            println!("Total gates: {}", h.gate_count);
            println!("Wire count:  {}", h.wire_count);
            println!("Checksum:    {}", hex_string(&h.checksum));
        }

        Commands::Verify { file } => {
            let mut reader = open_reader(&file)?;
            reader
                .verify_checksum()
                .context("checksum verification failed")?;
            println!("Checksum OK");

            let circuit = reader.read_circuit().context("structural walk failed")?;
            let (xor_gates, and_gates) = circuit.count_kinds();
            println!("Structure OK");
            println!("Total gates: {}", circuit.gates().len());
            println!("  XOR gates: {xor_gates}");
            println!("  AND gates: {and_gates}");
        }
    }

    Ok(())
}

fn open_reader(path: &Path) -> anyhow::Result<CircuitReader<File>> {
    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    Ok(CircuitReader::new(file)?)
}

/// Parses one 32-bit hex word per line; `#` starts a comment.
fn parse_hex_program(path: &Path) -> anyhow::Result<Vec<u32>> {
    let text =
        fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let mut words = Vec::new();
    for (lineno, line) in text.lines().enumerate() {
        let token = line.split('#').next().unwrap_or("").trim();
        if token.is_empty() {
            continue;
        }
        let token = token.strip_prefix("0x").unwrap_or(token);
        match u32::from_str_radix(token, 16) {
            Ok(word) => words.push(word),
            Err(_) => bail!("line {}: not a 32-bit hex word: {line:?}", lineno + 1),
        }
    }
    Ok(words)
}

fn hex_string(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}
