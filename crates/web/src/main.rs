use database::SqliteDatabase;
use regions::client::Client;
use web::{config::Config, start_web_server, WebState};

#[tokio::main]
async fn main() {
    env_logger::init();

    let config = Config::from_env().expect("invalid configuration in env.");
    log::info!(
        "tracing with a drag threshold of {} m, undo policy `{}`",
        config.trace.min_distance_meters,
        config.trace.undo_policy
    );

    // database
    let database = SqliteDatabase::connect(config.database)
        .await
        .expect("could not connect to database.");

    // web server
    let state = WebState::new(Client::new(database), config.trace);
    if let Err(why) = start_web_server(config.bind_address, state).await {
        log::error!("web server stopped: {}", why);
        std::process::exit(1);
    }
}
