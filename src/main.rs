use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    std::fs::create_dir_all(&cli.data_dir)
        .unwrap_or_else(|err| panic!("failed to create data directory: {err}"));
    let data_dir = std::fs::canonicalize(&cli.data_dir)
        .unwrap_or_else(|err| panic!("failed to resolve data directory: {err}"));

    println!("listening on http://{}", cli.listen);

    let config = civicdesk::config::AppConfig {
        data_dir,
        app_name: cli.app_name,
    };
    civicdesk::serve(cli.listen, config).await;
}

#[derive(Parser, Debug)]
#[command(
    name = "civicdesk",
    version,
    about = "Local-first civic issue reporting demo server"
)]
struct Cli {
    #[arg(long, env = "CIVICDESK_DATA_DIR", default_value = "./data")]
    data_dir: PathBuf,
    #[arg(long, default_value = "CivicDesk")]
    app_name: String,
    #[arg(long, default_value = "127.0.0.1:3000")]
    listen: SocketAddr,
}
