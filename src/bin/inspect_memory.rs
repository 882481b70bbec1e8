use colored::*;
use relaybot::conversation::{ConversationStore, JsonFileStore};
use relaybot::models::Role;
use std::env;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        eprintln!("Usage: {} <memory.json> [--turns]", args[0]);
        std::process::exit(1);
    }

    let path = &args[1];
    let show_turns = args.len() > 2 && args[2] == "--turns";

    let store = JsonFileStore::new(path);
    let snapshot = match store.load() {
        Ok(snapshot) => snapshot,
        Err(e) => {
            eprintln!("{}", format!("Error: {}", e).red());
            std::process::exit(1);
        }
    };

    println!("{}", format!("Memory file: {}", path).green());
    println!("{}", format!("Conversations: {}", snapshot.len()).cyan());
    println!("{}", "-".repeat(80).dimmed());

    let mut users: Vec<_> = snapshot.iter().collect();
    users.sort_by(|a, b| b.1.last_interaction.cmp(&a.1.last_interaction));

    for (user_id, conversation) in users {
        let last = chrono::DateTime::from_timestamp_millis(conversation.last_interaction)
            .map(|t| t.to_rfc3339())
            .unwrap_or_else(|| conversation.last_interaction.to_string());
        println!(
            "{}  turns={}  last={}",
            user_id.bold(),
            conversation.history.len(),
            last
        );

        if show_turns {
            for turn in &conversation.history {
                let role = match turn.role {
                    Role::System => turn.role.to_string().dimmed(),
                    Role::User => turn.role.to_string().yellow(),
                    Role::Assistant => turn.role.to_string().cyan(),
                };
                println!("    {}: {}", role, turn.content);
            }
        }
    }

    Ok(())
}
