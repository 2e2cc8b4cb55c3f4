use actix_web::{middleware::Logger, web, App, HttpServer};
use blogo_backend::{
    config::Config,
    middleware::{build_cors, security_headers},
    routes,
    setup::db_setup,
    AppState,
};
use clap::Parser;
use std::fs;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "blogo_server", author, version, about = "Starts the blog metadata API server.")]
struct Cli {
    /// Path to the .env configuration file.
    #[arg(long, required = true, value_name = "FILE")]
    env_file: PathBuf,
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    let cli = Cli::parse();

    let config = Config::from_env(&cli.env_file)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string()))?;

    env_logger::init_from_env(env_logger::Env::new().default_filter_or(&config.log_level));

    fs::create_dir_all(config.upload_dir())?;

    let pool = db_setup::open_posts_db(&config.posts_db_path()).map_err(|e| {
        log::error!("FATAL: Failed to open posts database: {}", e);
        std::io::Error::new(std::io::ErrorKind::Other, e.to_string())
    })?;

    let app_state = web::Data::new(AppState {
        upload_dir: config.upload_dir(),
    });
    let pool_data = web::Data::new(pool);

    let server_address = format!("{}:{}", config.web.host, config.web.port);
    log::info!("Server starting at http://{}", server_address);

    HttpServer::new(move || {
        App::new()
            .wrap(build_cors(&config.allowed_origins))
            .wrap(Logger::default())
            .wrap(security_headers())
            .app_data(pool_data.clone())
            .app_data(app_state.clone())
            .configure(routes::public::config_api)
    })
    .bind(server_address)?
    .run()
    .await
}
