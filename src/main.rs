use std::io::Write;
use std::sync::Arc;

use futures::StreamExt;

use destiny_quiz::config::QuizConfig;
use destiny_quiz::error::{self, Error};
use destiny_quiz::llm::{LlmConfig, LlmProvider, create_provider};
use destiny_quiz::oracle::{LlmOracle, OracleConfig, ReadingOracle};
use destiny_quiz::quiz::{Action, Session};
use destiny_quiz::terminal::{self, Command, Intent};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr so the quiz on stdout stays readable.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let quiz_config = QuizConfig::from_env();
    let (llm_config, llm) = match startup() {
        Ok(started) => started,
        Err(Error::Config(e)) => {
            eprintln!("Error: {e}");
            eprintln!("  export GEMINI_API_KEY=...");
            std::process::exit(1);
        }
        Err(e) => return Err(e.into()),
    };

    eprintln!("✨ Destiny Quiz v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   Model: {}", llm_config.model);
    eprintln!("   Type a number, an answer, next, back, restart or quit.\n");

    let oracle: Arc<dyn ReadingOracle> = Arc::new(LlmOracle::new(llm, OracleConfig::default()));
    let mut session = Session::new(quiz_config, oracle);
    let mut input = terminal::stdin_lines();

    show(&session);

    loop {
        tokio::select! {
            Some(event) = session.next_event() => {
                if session.handle_event(event) {
                    show(&session);
                }
            }
            line = input.next() => {
                let Some(line) = line else { break };
                let Some(command) = Command::parse(&line) else {
                    prompt();
                    continue;
                };

                let intent = terminal::interpret(&session.view(), command);
                let actions = match intent {
                    Intent::Quit => break,
                    Intent::Invalid(hint) => {
                        println!("{hint}");
                        prompt();
                        continue;
                    }
                    Intent::Actions(actions) => actions,
                    Intent::LoadPalm(path) => match terminal::load_palm_photo(&path).await {
                        Ok(image) => vec![Action::UploadPalm(image)],
                        Err(e) => {
                            tracing::warn!(path = %path.display(), error = %e, "Could not read palm photo");
                            println!("Could not read {}: {e}", path.display());
                            prompt();
                            continue;
                        }
                    },
                };

                let mut accepted = false;
                for action in actions {
                    accepted |= session.dispatch(action);
                }
                if !accepted {
                    println!("That is not available here.");
                }
                show(&session);
            }
        }
    }

    eprintln!("Goodbye.");
    Ok(())
}

fn startup() -> error::Result<(LlmConfig, Arc<dyn LlmProvider>)> {
    let config = LlmConfig::from_env()?;
    let llm = create_provider(&config)?;
    Ok((config, llm))
}

fn show(session: &Session) {
    println!("\n{}", terminal::render(&session.view()));
    prompt();
}

fn prompt() {
    print!("> ");
    let _ = std::io::stdout().flush();
}
