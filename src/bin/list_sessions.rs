use std::env;
use std::sync::Arc;

use interview_coach_lib::client::{CoachClient, DEFAULT_API_URL};
use interview_coach_lib::practice::HistoryView;

#[tokio::main]
async fn main() {
    println!("🔧 Listing interview sessions...");

    dotenvy::dotenv().ok();

    let api_url = env::var("COACH_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string());
    println!("  COACH_API_URL: {}", api_url);

    let client = match CoachClient::new(&api_url) {
        Ok(client) => client,
        Err(e) => {
            eprintln!("❌ Failed to build HTTP client: {}", e);
            std::process::exit(1);
        }
    };

    let mut history = HistoryView::new(Arc::new(client));
    history.load().await;

    if let Some(error) = history.error() {
        eprintln!("❌ {}", error);
        std::process::exit(1);
    }

    let rows = history.rows();
    if rows.is_empty() {
        println!("\n📭 No interview sessions yet. Start practicing now!");
        return;
    }

    println!("\n📋 Found {} sessions:", rows.len());
    println!("{:-<120}", "");
    println!("{:<28} {:<7} {:<83}", "Date", "Score", "Question");
    println!("{:-<120}", "");

    for row in &rows {
        println!(
            "{:<28} {:<7} {:<83}",
            row.date,
            row.score,
            row.question.chars().take(80).collect::<String>(),
        );
        println!("    💬 {}", row.feedback.chars().take(110).collect::<String>());
    }

    println!("{:-<120}", "");
}
