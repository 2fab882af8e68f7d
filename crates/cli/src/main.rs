use anyhow::Result;

fn main() -> Result<()> {
    analyst_cli::main_entry()
}
