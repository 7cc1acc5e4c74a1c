use clap::Parser;
use engine::{AllowList, Dispatcher, LedgerStore};

mod settings;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let args = settings::Args::parse();
    let settings = settings::Settings::new(&args.config)?;

    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "kasbot={level},telegram_bot={level},engine={level}",
            level = settings.app.level
        ))
        .init();

    let Some(telegram) = settings.telegram else {
        tracing::error!("no [telegram] section found in {}", args.config);
        return Err("telegram settings are required".into());
    };

    tracing::info!("Using ledger at {}", settings.ledger.path);
    let authorizer = AllowList::open()
        .users(telegram.allowed_users)
        .chats(telegram.allowed_chats);
    let dispatcher = Dispatcher::builder()
        .store(LedgerStore::json_file(&settings.ledger.path))
        .options(settings.commands.options())
        .prefix(&settings.commands.prefix)
        .page_size(settings.ledger.page_size)
        .authorizer(authorizer)
        .build();

    let bot = telegram_bot::Bot::builder()
        .token(&telegram.token)
        .dispatcher(dispatcher)
        .timezone(settings.ledger.timezone()?)
        .build()?;
    bot.run().await;

    Ok(())
}
