use crate::controller::{fetch_definition, forward_answers};
use crate::models::{ServiceRequest, ServiceResponse};
use crate::service::QuizDataService;
use crossbeam_channel::{Receiver, Sender};
use std::io;
use std::sync::Arc;
use std::thread;
use tracing::{debug, info, warn};

/// Runs service calls off the UI thread. Exits when the request channel
/// disconnects.
pub fn spawn_service_worker(
    service: Arc<dyn QuizDataService>,
    response_tx: Sender<ServiceResponse>,
    request_rx: Receiver<ServiceRequest>,
) -> io::Result<thread::JoinHandle<()>> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    thread::Builder::new()
        .name("study-quiz::service_worker".to_string())
        .spawn(move || {
            for request in request_rx.iter() {
                let response = runtime.block_on(handle_request(service.as_ref(), request));
                if response_tx.send(response).is_err() {
                    debug!("Response channel closed, dropping response");
                    break;
                }
            }
            info!("Service worker channel disconnected, exiting");
        })
}

async fn handle_request(service: &dyn QuizDataService, request: ServiceRequest) -> ServiceResponse {
    match request {
        ServiceRequest::List => {
            let result = service.list_quizzes().await;
            if let Err(e) = &result {
                warn!("Listing quizzes failed: {}", e);
            }
            ServiceResponse::Listed(result)
        }
        ServiceRequest::Load {
            generation,
            quiz_id,
        } => {
            let result = fetch_definition(service, &quiz_id).await;
            if let Err(e) = &result {
                warn!("Loading quiz {} failed: {}", quiz_id, e);
            }
            ServiceResponse::Loaded { generation, result }
        }
        ServiceRequest::Submit {
            generation,
            request,
        } => {
            info!("Forwarding answers for quiz {}", request.quiz_id);
            let result = forward_answers(service, &request).await;
            ServiceResponse::Forwarded { generation, result }
        }
    }
}
