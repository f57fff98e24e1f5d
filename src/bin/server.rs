//! Apicat REST API server
//!
//! Run with: cargo run --release --features server --bin apicat-server
//!
//! First call after a fresh start: POST /bootstrap with the initial admin
//! credentials, then log in and manage the catalog with the returned token.

use apicat::Config;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .init();

    let args: Vec<String> = std::env::args().collect();
    let mut db_path = "./apicat-db".to_string();
    let mut upload_root = "./uploads".to_string();
    let mut port: u16 = 3000;
    let mut max_file_size: Option<u64> = None;
    let mut token_ttl_secs: Option<u64> = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db-path" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--upload-root" | "-u" => {
                if i + 1 < args.len() {
                    upload_root = args[i + 1].clone();
                    i += 1;
                }
            }
            "--port" | "-p" => {
                if i + 1 < args.len() {
                    port = args[i + 1].parse().unwrap_or(3000);
                    i += 1;
                }
            }
            "--max-file-size" => {
                if i + 1 < args.len() {
                    max_file_size = args[i + 1].parse().ok();
                    i += 1;
                }
            }
            "--token-ttl" => {
                if i + 1 < args.len() {
                    token_ttl_secs = args[i + 1].parse().ok();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("apicat-server - interface catalog service\n");
                println!("USAGE:");
                println!("    apicat-server [OPTIONS]\n");
                println!("OPTIONS:");
                println!("    -d, --db-path <PATH>       Database directory (default: ./apicat-db)");
                println!("    -u, --upload-root <PATH>   Upload directory (default: ./uploads)");
                println!("    -p, --port <PORT>          Listen on PORT (default: 3000)");
                println!("        --max-file-size <N>    Per-file upload ceiling in bytes (default: 50 MiB)");
                println!("        --token-ttl <SECS>     Session lifetime, 0 = never expires (default: 24h)");
                println!("    -h, --help                 Show this help message");
                return;
            }
            _ => {}
        }
        i += 1;
    }

    let mut config = Config::new(&db_path, &upload_root)
        .with_token_ttl(token_ttl_secs.unwrap_or(86_400));
    if let Some(size) = max_file_size {
        config = config.with_max_file_size(size);
    }

    if let Err(e) = apicat::db::init(config) {
        eprintln!("failed to initialize database: {}", e);
        std::process::exit(1);
    }
    tracing::info!(db_path, upload_root, "storage initialized");

    let app = apicat::server::router();
    let addr = format!("0.0.0.0:{}", port);
    println!("apicat-server v{} listening on {}", env!("CARGO_PKG_VERSION"), addr);

    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(l) => l,
        Err(e) => {
            eprintln!("failed to bind {}: {}", addr, e);
            std::process::exit(1);
        }
    };
    if let Err(e) = axum::serve(listener, app).await {
        eprintln!("server error: {}", e);
        std::process::exit(1);
    }
}
