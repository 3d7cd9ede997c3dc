//! `ehst` binary.

fn main() -> Result<(), Box<dyn std::error::Error>> {
    ehst_cli::cli::cli()
}
