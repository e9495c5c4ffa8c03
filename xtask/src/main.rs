use anyhow::Result;
use clap::{Parser, Subcommand};
use std::process::Command;

#[derive(Parser)]
#[command(name = "xtask", about = "Workspace automation for neoncity")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run all checks: fmt, clippy, tests, doc, smoke
    Check,
    /// Run cargo fmt --check on all crates
    Fmt,
    /// Run clippy on all crates
    Clippy,
    /// Run all tests
    Test,
    /// Run cargo deny check
    Deny,
    /// Build rustdoc for the workspace
    Doc,
    /// Build the entire workspace
    Build,
    /// Run the layout benchmark
    Bench,
    /// Exercise the CLI end to end against a scratch score store
    Smoke,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Check => {
            run_fmt()?;
            run_clippy()?;
            run_tests()?;
            run_doc()?;
            run_smoke()?;
        }
        Commands::Fmt => run_fmt()?,
        Commands::Clippy => run_clippy()?,
        Commands::Test => run_tests()?,
        Commands::Deny => run_deny()?,
        Commands::Doc => run_doc()?,
        Commands::Build => run_build()?,
        Commands::Bench => run_bench()?,
        Commands::Smoke => run_smoke()?,
    }

    Ok(())
}

/// Run `cargo <args>` and fail with `what` if it exits non-zero.
fn cargo(what: &str, args: &[&str]) -> Result<()> {
    println!("==> Running cargo {}", args.join(" "));
    let status = Command::new("cargo").args(args).status()?;
    if !status.success() {
        anyhow::bail!("{what} failed");
    }
    Ok(())
}

fn run_fmt() -> Result<()> {
    cargo("cargo fmt check", &["fmt", "--all", "--", "--check"])
}

fn run_clippy() -> Result<()> {
    cargo(
        "cargo clippy",
        &["clippy", "--workspace", "--all-targets", "--", "-D", "warnings"],
    )
}

fn run_tests() -> Result<()> {
    cargo("cargo test", &["test", "--workspace"])
}

fn run_deny() -> Result<()> {
    cargo("cargo deny check", &["deny", "check", "licenses", "bans", "sources"])
}

fn run_doc() -> Result<()> {
    cargo("cargo doc", &["doc", "--workspace", "--no-deps"])
}

fn run_build() -> Result<()> {
    cargo("cargo build", &["build", "--workspace"])
}

fn run_bench() -> Result<()> {
    cargo("layout bench", &["bench", "-p", "neoncity-layout"])
}

fn run_smoke() -> Result<()> {
    let scratch = std::env::temp_dir().join(format!("neoncity-smoke-{}", std::process::id()));
    let data_dir = scratch.to_string_lossy().into_owned();
    let cli = |args: &[&str]| {
        let mut full = vec!["run", "-q", "-p", "neoncity-cli", "--"];
        full.extend_from_slice(args);
        cargo("neoncity-cli smoke run", &full)
    };

    let result = (|| {
        cli(&["info"])?;
        cli(&["layout", "--cell", "3,7"])?;
        cli(&["seed", "--", "-8", "0"])?;
        cli(&["scores", "--data-dir", &data_dir, "init"])?;
        cli(&[
            "simulate", "--ticks", "5000", "--every", "0", "--play", "--alias", "SMOKE",
            "--data-dir", &data_dir,
        ])?;
        cli(&["scores", "--data-dir", &data_dir, "list"])
    })();
    let _ = std::fs::remove_dir_all(&scratch);
    result
}
