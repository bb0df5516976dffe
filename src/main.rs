#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(e) = interview_coach_lib::run().await {
        eprintln!("Error running server: {:#}", e);
        std::process::exit(1);
    }
}
