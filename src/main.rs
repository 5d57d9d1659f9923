use clap::{Parser, Subcommand};
use waiting_room::{Config, client, logging, server};

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Host a lobby server
    Host {
        /// Port to listen on (defaults to LOBBY_PORT or 8712)
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Open or join a waiting room
    Join {
        /// Server host (defaults to LOBBY_HOST or 127.0.0.1)
        #[arg(long)]
        host: Option<String>,
        /// Server port (defaults to LOBBY_PORT or 8712)
        #[arg(short, long)]
        port: Option<u16>,
        /// Player name; prompts when omitted
        #[arg(short, long)]
        name: Option<String>,
        /// Code of the game to join; opens a new game when omitted
        #[arg(short, long)]
        code: Option<String>,
    },
}

#[tokio::main]
async fn main() {
    let args = Args::parse();
    let mut config = Config::from_env();

    let result = match args.command {
        Command::Host { port } => {
            logging::init_stderr();
            if let Some(port) = port {
                config.port = port;
            }
            server::run(config).await
        }
        Command::Join {
            host,
            port,
            name,
            code,
        } => {
            if let Err(e) = logging::init_file(&config.log_file) {
                eprintln!("Cannot open log file {}: {}", config.log_file.display(), e);
                std::process::exit(1);
            }
            if let Some(host) = host {
                config.host = host;
            }
            if let Some(port) = port {
                config.port = port;
            }
            client::run(config.server_url(), name, code).await
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
