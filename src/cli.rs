use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "vglogin")]
#[command(about = "Log in to Vanguard Personal Investor from the terminal")]
#[command(version)]
pub struct Cli {
    /// Increase verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Show the browser window instead of running headless
    #[arg(long)]
    pub headed: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_quiet_headless() {
        let cli = Cli::parse_from(["vglogin"]);
        assert_eq!(cli.verbose, 0);
        assert!(!cli.headed);
    }

    #[test]
    fn verbose_flag_is_repeatable() {
        let cli = Cli::parse_from(["vglogin", "-vv"]);
        assert_eq!(cli.verbose, 2);
    }
}
