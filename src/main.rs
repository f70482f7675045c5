use clap::Parser;
use tracing::error;
use vglogin::cli::Cli;
use vglogin::error::Result;
use vglogin::prompt::StdinPrompter;
use vglogin::session::BrowserSession;
use vglogin::{logging, login};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    logging::init_logging(cli.verbose);

    if let Err(err) = run(&cli).await {
        error!(target = "vglogin", error = %err, "login failed");
        std::process::exit(1);
    }
}

async fn run(cli: &Cli) -> Result<()> {
    let session = BrowserSession::launch(cli.headed).await?;
    login::run(&session, &StdinPrompter).await
}
