use youtube_link_server::cli::CliCommand;
use youtube_link_server::logging;

#[tokio::main]
async fn main() {
    // Initialize logging as early as possible.
    logging::init_logging();

    if let Err(err) = CliCommand::run_from_args().await {
        eprintln!("youtube-link-server error: {:#}", err);
        std::process::exit(1);
    }
}
