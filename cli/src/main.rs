use abacus_core::agent::{AgentLoop, AgentProfile, ContextBuilder, ConversationState, Session};
use abacus_core::error::AgentError;
use abacus_core::traits::{ContentPart, Message, Role};
use abacus_core::{config, memory, providers};
use anyhow::Result;
use clap::{Parser, Subcommand};
use console::style;
use interrupt::TurnInterrupt;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

mod interrupt;
mod onboard;

#[derive(Parser)]
#[command(name = "abacus")]
#[command(about = "abacus - a tool-using chat agent for arithmetic and images", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Interactive setup
    Init,
    Chat {
        #[arg(short, long)]
        message: Option<String>,
        #[arg(short, long, default_value = "basic")]
        agent: AgentProfile,
        /// Continue a stored thread (memory agents only)
        #[arg(short, long)]
        thread: Option<String>,
        /// Attach an image (vision agents only)
        #[arg(short, long)]
        image: Option<PathBuf>,
    },
    Threads {
        #[command(subcommand)]
        command: ThreadCommands,
    },
    /// List the tools available to tool-using agents
    Tools,
}

#[derive(Subcommand)]
enum ThreadCommands {
    List,
    Show { thread_id: String },
    Delete { thread_id: String },
}

/// Runs turns either on a throwaway history or on a stored thread.
enum Driver {
    Stateless(Arc<AgentLoop>),
    Persistent {
        session: Session,
        thread_id: Option<String>,
    },
}

impl Driver {
    async fn turn(&mut self, input: Message, cancel: &CancellationToken) -> Result<String> {
        match self {
            Driver::Stateless(agent) => {
                let mut state = ConversationState::new_thread();
                let answer = agent.run_turn(&mut state, input, cancel).await?;
                Ok(answer.text())
            }
            Driver::Persistent { session, thread_id } => {
                let outcome = session.run(thread_id.as_deref(), input, cancel).await?;
                if thread_id.is_none() {
                    eprintln!(
                        "{} thread {}",
                        style("→").green(),
                        style(&outcome.thread_id).cyan()
                    );
                }
                *thread_id = Some(outcome.thread_id);
                Ok(outcome.answer.text())
            }
        }
    }
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "abacus=warn,abacus_core=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn build_driver(
    config: &config::Config,
    profile: AgentProfile,
    thread: Option<String>,
) -> Result<Driver> {
    if thread.is_some() && !profile.persists() {
        anyhow::bail!(
            "--thread needs a memory agent (memory or vision-memory), not {}",
            profile
        );
    }

    let client = providers::create_client(config)?;
    let registry = Arc::new(profile.build_registry()?);
    let system_prompt = config
        .agent
        .system_prompt
        .clone()
        .unwrap_or_else(|| profile.system_prompt().to_string());

    let agent = AgentLoop::new(client, ContextBuilder::new(system_prompt), registry)
        .with_config(&config.agent);
    let agent = Arc::new(agent);

    if profile.persists() {
        let store = memory::create_store(config);
        tracing::debug!(store = store.name(), "using thread store");
        Ok(Driver::Persistent {
            session: Session::new(agent, store),
            thread_id: thread,
        })
    } else {
        Ok(Driver::Stateless(agent))
    }
}

fn build_input(text: &str, image: Option<&PathBuf>) -> Result<Message> {
    match image {
        Some(path) => Ok(Message::human_with_parts(vec![
            ContentPart::text(text),
            ContentPart::image_file(path)?,
        ])),
        None => Ok(Message::human(text)),
    }
}

/// Runs one turn; Ctrl-C cancels it without killing the process.
async fn run_turn(
    driver: &mut Driver,
    interrupt: &TurnInterrupt,
    input: Message,
) -> Result<String> {
    let cancel = interrupt.begin().await;
    let result = driver.turn(input, &cancel).await;
    interrupt.finish().await;
    result
}

fn retry_hint(error: &anyhow::Error) -> Option<&'static str> {
    error
        .downcast_ref::<AgentError>()
        .filter(|e| e.is_transient())
        .map(|_| "transient failure, sending the message again may work")
}

fn report_turn_error(error: &anyhow::Error) {
    eprintln!("❌ Error: {}", error);
    if let Some(hint) = retry_hint(error) {
        eprintln!("   {}", style(hint).yellow());
    }
}

async fn chat(
    profile: AgentProfile,
    message: Option<String>,
    thread: Option<String>,
    image: Option<PathBuf>,
) -> Result<()> {
    if image.is_some() && !profile.accepts_images() {
        anyhow::bail!(
            "--image needs a vision agent (vision or vision-memory), not {}",
            profile
        );
    }

    let config = config::Config::load_or_init()?;
    let mut driver = build_driver(&config, profile, thread)?;
    let interrupt = TurnInterrupt::new();
    interrupt.listen();

    if let Some(msg) = message {
        println!("\n🤔 Processing...\n");
        let input = build_input(&msg, image.as_ref())?;
        match run_turn(&mut driver, &interrupt, input).await {
            Ok(response) => println!("{}", response),
            Err(e) => {
                report_turn_error(&e);
                anyhow::bail!("Agent processing failed: {}", e);
            }
        }
        return Ok(());
    }

    println!("🧮 abacus ({} agent)", profile);
    println!("Type your message (Ctrl+D to exit).");
    println!("Ctrl+C cancels a running turn, or exits at the prompt.\n");
    let mut attachment = image;

    use std::io::BufRead;
    let stdin = std::io::stdin();
    loop {
        print!("> ");
        let _ = std::io::stdout().flush();

        let mut line = String::new();
        match stdin.lock().read_line(&mut line) {
            Ok(0) | Err(_) => {
                println!("\n👋 Goodbye!");
                break;
            }
            Ok(_) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }

                println!("\n🤔 Processing...\n");
                // an --image is attached to the first message only
                let input = build_input(line, attachment.take().as_ref())?;
                match run_turn(&mut driver, &interrupt, input).await {
                    Ok(response) => println!("{}", response),
                    Err(e) => report_turn_error(&e),
                }
                println!();
            }
        }
    }

    Ok(())
}

async fn threads(command: ThreadCommands) -> Result<()> {
    let config = config::Config::load_or_init()?;
    let store = memory::create_store(&config);

    match command {
        ThreadCommands::List => {
            let summaries = store.list().await?;
            if summaries.is_empty() {
                println!("No stored threads.");
            }
            for summary in summaries {
                println!(
                    "{}  {:>4} messages  {}",
                    style(&summary.thread_id).cyan(),
                    summary.message_count,
                    style(&summary.updated_at).dim()
                );
            }
        }
        ThreadCommands::Show { thread_id } => {
            let Some(state) = store.load(&thread_id).await? else {
                anyhow::bail!("Thread not found: {}", thread_id);
            };
            println!(
                "{}  {}",
                style(state.thread_id()).cyan().bold(),
                style(format!(
                    "created {}, updated {}",
                    state.created_at().format("%Y-%m-%d %H:%M:%S UTC"),
                    state.updated_at().format("%Y-%m-%d %H:%M:%S UTC")
                ))
                .dim()
            );
            for message in state.messages() {
                print_message(message);
            }
        }
        ThreadCommands::Delete { thread_id } => {
            if store.delete(&thread_id).await? {
                println!("{} Deleted {}", style("✓").green(), thread_id);
            } else {
                anyhow::bail!("Thread not found: {}", thread_id);
            }
        }
    }

    Ok(())
}

fn print_message(message: &Message) {
    match message.role() {
        Role::Human => {
            let image = if message.content().has_images() {
                " [image]"
            } else {
                ""
            };
            println!("👤 {}{}", message.text(), style(image).dim());
        }
        Role::Ai if message.has_tool_calls() => {
            for call in message.tool_calls() {
                println!(
                    "{}",
                    style(format!(
                        "🔧 {}({}) [{}]",
                        call.name,
                        serde_json::Value::Object(call.arguments.clone()),
                        call.id
                    ))
                    .dim()
                );
            }
        }
        Role::Ai => println!("🤖 {}", message.text()),
        Role::Tool => println!(
            "{}",
            style(format!(
                "   ↳ {} [{}]",
                message.text(),
                message.tool_call_id().unwrap_or("?")
            ))
            .dim()
        ),
        Role::System => println!("{}", style(message.text()).dim()),
    }
}

fn list_tools() -> Result<()> {
    let registry = AgentProfile::Basic.build_registry()?;
    for spec in registry.specs() {
        let params: Vec<String> = spec
            .parameters
            .iter()
            .map(|p| format!("{}: {}", p.name, p.kind))
            .collect();
        println!(
            "{}({})  {}",
            style(&spec.name).cyan().bold(),
            params.join(", "),
            style(&spec.description).dim()
        );
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let command = cli.command.unwrap_or_else(|| {
        if !config::config_exists() {
            Commands::Init
        } else {
            Commands::Chat {
                message: None,
                agent: AgentProfile::Basic,
                thread: None,
                image: None,
            }
        }
    });

    match command {
        Commands::Init => {
            let onboard_config = onboard::run_onboard().map_err(|e| {
                eprintln!("❌ Onboarding failed: {}", e);
                anyhow::anyhow!("Onboarding failed: {}", e)
            })?;
            config::save_config(&onboard_config)?;
        }
        Commands::Chat {
            message,
            agent,
            thread,
            image,
        } => chat(agent, message, thread, image).await?,
        Commands::Threads { command } => threads(command).await?,
        Commands::Tools => list_tools()?,
    }

    Ok(())
}
