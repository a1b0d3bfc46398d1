//! Career assistant chat handler

use tokio::io::AsyncBufReadExt;
use tokio::io::BufReader;

use crate::api::build_state;
use crate::cli::output::print_error;
use crate::cli::output::print_info;
use crate::cli::output::print_warning;
use crate::rag::ChatTurnRequest;
use crate::rag::ClientMessage;
use crate::rag::RagService;
use crate::rag::TurnAnswer;
use crate::AppConfig;
use crate::AppError;
use crate::Result;

/// Ask one question; with `interactive`, keep reading follow-ups from stdin
/// in the same session until EOF or an empty line.
pub async fn handle_ask_command(config: &AppConfig, query: String, interactive: bool) -> Result<()> {
    let state = build_state(config).await?;
    let service = state.rag_service.as_ref();

    let mut history = Vec::new();
    let Some(mut session_id) = ask_once(service, query, &mut history, None).await? else {
        return Ok(());
    };
    if !interactive {
        return Ok(());
    }

    print_info("Ask a follow-up (empty line to quit):");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim().to_string();
        if line.is_empty() {
            break;
        }
        if let Some(next) = ask_once(service, line, &mut history, Some(session_id.clone())).await? {
            session_id = next;
        }
    }

    service.clear_session(&session_id).await;
    Ok(())
}

/// Returns the session id to continue with, or `None` when the turn was rejected
async fn ask_once(
    service: &RagService,
    query: String,
    history: &mut Vec<ClientMessage>,
    session_id: Option<String>,
) -> Result<Option<String>> {
    let response = match service
        .chat_turn(ChatTurnRequest {
            query,
            client_history: history.clone(),
            session_id,
        })
        .await
    {
        Ok(response) => response,
        Err(e @ AppError::ContextWindowExceeded { .. }) => {
            print_error(&e.to_string());
            return Ok(None);
        }
        Err(e) => return Err(e),
    };

    if let Some(company) = &response.target_company {
        println!("🏢 Target company: {company}");
    }
    println!("📚 Retrieved {} resumes", response.results.len());
    println!();
    match &response.answer {
        TurnAnswer::Generated(answer) => println!("{answer}"),
        TurnAnswer::Degraded { answer, reason } => {
            print_warning(&format!("Model unavailable: {reason}"));
            println!("{answer}");
        }
    }
    println!();

    *history = response.updated_chat_history;
    Ok(Some(response.session_id))
}
