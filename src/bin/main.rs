use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use jmmc::ast::{Ast, AstPrinter};
use jmmc::symtab::SymbolTable;
use jmmc::{Config, Report};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "jmmc")]
#[command(about = "Java-- semantic analyzer and OLLIR generator")]
#[command(version)]
struct Cli {
    /// Verbose output (repeat for more)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze a JSON AST and print its OLLIR
    Compile {
        /// Input AST in JSON form
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Write OLLIR to this file instead of stdout
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Fold and propagate constants before lowering
        #[arg(short = 'O', long)]
        optimize: bool,

        /// Register budget; 0 uses as many as needed
        #[arg(short, long, value_name = "N")]
        registers: Option<i32>,
    },

    /// Run the semantic analyzer only
    Check {
        #[arg(value_name = "FILE")]
        input: PathBuf,
    },

    /// Print the symbol table
    Symbols {
        #[arg(value_name = "FILE")]
        input: PathBuf,
    },

    /// Print the AST
    Tree {
        #[arg(value_name = "FILE")]
        input: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match &cli.command {
        Commands::Compile { input, output, optimize, registers } => {
            let config = Config::default()
                .with_optimize(*optimize)
                .with_register_budget(registers.unwrap_or(-1));
            compile_file(input, output.as_deref(), &config)?;
        }
        Commands::Check { input } => check_file(input)?,
        Commands::Symbols { input } => {
            let ast = load(input)?;
            let table = SymbolTable::build(&ast)?;
            print!("{}", table);
        }
        Commands::Tree { input } => {
            let ast = load(input)?;
            print!("{}", AstPrinter::new().print(&ast));
        }
    }

    Ok(())
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        _ => log::LevelFilter::Debug,
    };
    env_logger::Builder::from_default_env().filter_level(level).init();
}

fn load(input: &Path) -> Result<Ast> {
    let text = fs::read_to_string(input).with_context(|| format!("cannot read {}", input.display()))?;
    Ok(Ast::from_json(&text)?)
}

fn print_reports(reports: &[Report]) {
    for report in reports {
        eprintln!("{}", report);
    }
}

fn compile_file(input: &Path, output: Option<&Path>, config: &Config) -> Result<()> {
    let compilation = jmmc::compile(load(input)?, config)?;
    print_reports(&compilation.reports);

    let Some(text) = compilation.ollir() else {
        bail!("{}: semantic analysis failed", input.display());
    };
    match output {
        Some(path) => {
            fs::write(path, &text).with_context(|| format!("cannot write {}", path.display()))?;
            log::info!("wrote {}", path.display());
        }
        None => print!("{}", text),
    }
    if compilation.has_errors() {
        bail!("{}: register allocation failed", input.display());
    }
    Ok(())
}

fn check_file(input: &Path) -> Result<()> {
    let (_, reports) = jmmc::check(&load(input)?)?;
    print_reports(&reports);
    if jmmc::has_errors(&reports) {
        bail!("{}: {} error(s)", input.display(), reports.iter().filter(|r| r.is_error()).count());
    }
    println!("{}: ok", input.display());
    Ok(())
}
