use super::*;

fn status_error(status: u16) -> ServiceError {
    ServiceError::Status {
        service: "Ollama",
        url: "http://localhost:11434/api/version".to_string(),
        status,
        message: String::new(),
    }
}

#[test]
fn successful_request_is_reachable() {
    let result: Result<(), ServiceError> = Ok(());
    assert!(is_reachable(&result));
}

#[test]
fn client_error_still_means_reachable() {
    let result: Result<(), ServiceError> = Err(status_error(404));
    assert!(is_reachable(&result));
}

#[test]
fn server_error_or_transport_failure_is_unreachable() {
    let server_error: Result<(), ServiceError> = Err(status_error(502));
    assert!(!is_reachable(&server_error));

    let refused: Result<(), ServiceError> = Err(ServiceError::Unavailable {
        service: "Qdrant",
        url: "http://localhost:6333/".to_string(),
        message: "connection refused".to_string(),
    });
    assert!(!is_reachable(&refused));
}
