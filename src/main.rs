use clap::Parser;
use patchstack::cli::output::Output;
use patchstack::cli::Cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    cli.run().await.map_err(|e| {
        if let Some(hint) = e.hint() {
            Output::tip(hint);
        }
        anyhow::Error::new(e)
    })
}
