//! Shared test utilities

use std::io::Read;
use std::thread::JoinHandle;

use serde_json::Value;
use tiny_http::{Header, Response, Server};

/// A request as seen by the stub server
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub url: String,
    pub body: String,
}

/// Stub Azkaban server answering requests in order with canned JSON bodies
pub struct StubServer {
    host: String,
    handle: JoinHandle<Vec<RecordedRequest>>,
}

impl StubServer {
    /// Start on an ephemeral port; serves exactly `responses.len()` requests
    pub fn start(responses: Vec<Value>) -> Self {
        let server = Server::http("127.0.0.1:0").expect("failed to bind stub server");
        let addr = server
            .server_addr()
            .to_ip()
            .expect("stub server is not listening on an IP address");

        let handle = std::thread::spawn(move || {
            let mut recorded = Vec::new();
            for body in responses {
                let mut request = server.recv().expect("stub server recv failed");

                let mut raw = Vec::new();
                request
                    .as_reader()
                    .read_to_end(&mut raw)
                    .expect("failed to read request body");

                recorded.push(RecordedRequest {
                    method: request.method().to_string(),
                    url: request.url().to_string(),
                    body: String::from_utf8_lossy(&raw).into_owned(),
                });

                let header = Header::from_bytes("Content-Type", "application/json")
                    .expect("invalid header");
                request
                    .respond(Response::from_string(body.to_string()).with_header(header))
                    .expect("failed to send stub response");
            }
            recorded
        });

        Self {
            host: format!("http://{addr}"),
            handle,
        }
    }

    /// Base URL of the stub, without trailing slash
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Wait for all canned responses to be served and return the requests
    pub fn finish(self) -> Vec<RecordedRequest> {
        self.handle.join().expect("stub server thread panicked")
    }
}

/// A host on which nothing is listening
pub fn closed_host() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("failed to bind");
    let addr = listener.local_addr().expect("no local addr");
    drop(listener);
    format!("http://{addr}")
}
