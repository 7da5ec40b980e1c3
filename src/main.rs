use clap::Parser;
use counsel::{ChatService, Config, Credentials, MemoryStore, NewConversation, ResponseBroker};
use std::io::{self, BufRead, Write};

/// Local driver for the advice service: starts a conversation and keeps
/// it going from stdin. Not a transport layer; the library is the product.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Partner's name
    #[arg(long)]
    partner: String,

    /// What the issue is about
    #[arg(long)]
    concern: String,

    /// Opening message
    #[arg()]
    message: Vec<String>,

    /// Your name (optional, enriches the first prompt)
    #[arg(long)]
    name: Option<String>,

    /// Your age (optional, enriches the first prompt)
    #[arg(long)]
    age: Option<u32>,

    /// OpenAI API key (overrides the configured default provider)
    #[arg(long)]
    openai_key: Option<String>,

    /// Anthropic API key
    #[arg(long)]
    anthropic_key: Option<String>,

    /// Gemini API key
    #[arg(long)]
    gemini_key: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenv::dotenv();
    env_logger::init();

    let args = Args::parse();
    let credentials = Credentials {
        openai: args.openai_key,
        anthropic: args.anthropic_key,
        gemini: args.gemini_key,
    };

    let config = Config::load()?;
    let broker = ResponseBroker::new(config)?;
    let service = ChatService::new(MemoryStore::new(), Box::new(broker));

    let owner = "local";
    let conversation = service
        .submit(
            owner,
            NewConversation {
                partner_name: args.partner,
                concern: args.concern,
                message: args.message.join(" "),
                caller_name: args.name,
                caller_age: args.age,
            },
            &credentials,
        )
        .await?;

    let reply = conversation
        .messages()
        .last()
        .map(|message| message.text().to_string())
        .unwrap_or_default();
    println!("{reply}");

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    loop {
        print!("> ");
        stdout.flush()?;

        let mut follow_up = String::new();
        if stdin.lock().read_line(&mut follow_up)? == 0 {
            break;
        }
        let follow_up = follow_up.trim();
        if follow_up.is_empty() {
            continue;
        }

        match service
            .continue_conversation(owner, conversation.id(), follow_up, &credentials)
            .await
        {
            Ok(outcome) => println!("{reply}", reply = outcome.reply),
            Err(e) => eprintln!("Error: {e}"),
        }
    }

    Ok(())
}
