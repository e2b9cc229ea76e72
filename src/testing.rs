//! Test doubles: stub resolver, scripted SMTP peers and a recording logger.

use std::collections::{HashMap, VecDeque};
use std::future::Future;
use std::io;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};

use tokio::io::{
    AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader, DuplexStream, ReadBuf,
};
use tokio::task::JoinHandle;
use trust_dns_resolver::error::ResolveError;

use crate::logger::VerificationLogger;
use crate::mx::{LookupMx, MxCandidate};
use crate::smtp::Connect;

#[derive(Default)]
pub(crate) struct StubResolver {
    answers: HashMap<String, Result<Vec<MxCandidate>, String>>,
    queries: Mutex<Vec<String>>,
}

impl StubResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(mut self, domain: &str, records: Vec<MxCandidate>) -> Self {
        self.answers.insert(domain.to_string(), Ok(records));
        self
    }

    pub fn with_failure(mut self, domain: &str, message: &str) -> Self {
        self.answers
            .insert(domain.to_string(), Err(message.to_string()));
        self
    }

    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().expect("queries lock").clone()
    }
}

impl LookupMx for StubResolver {
    fn lookup_mx(
        &self,
        domain: &str,
    ) -> impl Future<Output = Result<Vec<MxCandidate>, ResolveError>> + Send {
        self.queries
            .lock()
            .expect("queries lock")
            .push(domain.to_string());
        let answer = match self.answers.get(domain) {
            Some(Ok(records)) => Ok(records.clone()),
            Some(Err(message)) => Err(ResolveError::from(message.clone())),
            None => Ok(Vec::new()),
        };
        std::future::ready(answer)
    }
}

/// One move of a scripted SMTP peer.
#[derive(Debug, Clone)]
pub(crate) enum PeerStep {
    /// Write raw bytes to the client.
    Send(&'static str),
    /// Read one line and assert it starts with the prefix.
    Expect(&'static str),
    /// Read until the client closes its side.
    AwaitClose,
    /// Stay silent forever with the connection open.
    Hang,
}

#[derive(Debug, Clone)]
enum Peer {
    Script(Vec<PeerStep>),
    Refuse,
}

/// Hands out in-memory streams whose far end plays a script per host.
#[derive(Default)]
pub(crate) struct ScriptedConnector {
    peers: HashMap<String, Peer>,
    connections: Mutex<Vec<(String, u16)>>,
    received: Arc<Mutex<Vec<String>>>,
    client_closed: Arc<Mutex<Vec<String>>>,
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

impl ScriptedConnector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_script(mut self, host: &str, steps: Vec<PeerStep>) -> Self {
        self.peers.insert(host.to_string(), Peer::Script(steps));
        self
    }

    pub fn refusing(mut self, host: &str) -> Self {
        self.peers.insert(host.to_string(), Peer::Refuse);
        self
    }

    /// Hosts in connection order.
    pub fn connected_hosts(&self) -> Vec<String> {
        self.connections
            .lock()
            .expect("connections lock")
            .iter()
            .map(|(host, _)| host.clone())
            .collect()
    }

    pub fn connected_ports(&self) -> Vec<u16> {
        self.connections
            .lock()
            .expect("connections lock")
            .iter()
            .map(|(_, port)| *port)
            .collect()
    }

    /// Lines received by all peers, prefixed with `host: `.
    pub fn received(&self) -> Vec<String> {
        self.received.lock().expect("received lock").clone()
    }

    /// Hosts whose connection was closed from the client side.
    pub fn closed_by_client(&self) -> Vec<String> {
        self.client_closed.lock().expect("closed lock").clone()
    }

    /// Waits for every finite script to complete; panics from peer
    /// assertions surface here.
    pub async fn finish(&self) {
        let tasks: Vec<_> = self.tasks.lock().expect("tasks lock").drain(..).collect();
        for task in tasks {
            task.await.expect("peer script");
        }
    }

    fn spawn_peer(&self, host: &str, steps: Vec<PeerStep>) -> DuplexStream {
        let (client, server) = tokio::io::duplex(4096);
        let task = tokio::spawn(run_script(
            server,
            steps,
            host.to_string(),
            Arc::clone(&self.received),
            Arc::clone(&self.client_closed),
        ));
        if !steps_hang(&self.peers, host) {
            self.tasks.lock().expect("tasks lock").push(task);
        }
        client
    }
}

fn steps_hang(peers: &HashMap<String, Peer>, host: &str) -> bool {
    matches!(peers.get(host), Some(Peer::Script(steps)) if steps.iter().any(|s| matches!(s, PeerStep::Hang)))
}

impl Connect for ScriptedConnector {
    type Stream = DuplexStream;

    fn connect(
        &self,
        host: &str,
        port: u16,
    ) -> impl Future<Output = io::Result<Self::Stream>> + Send {
        self.connections
            .lock()
            .expect("connections lock")
            .push((host.to_string(), port));
        let result = match self.peers.get(host).cloned() {
            Some(Peer::Script(steps)) => Ok(self.spawn_peer(host, steps)),
            Some(Peer::Refuse) | None => Err(io::Error::new(
                io::ErrorKind::ConnectionRefused,
                format!("connect ECONNREFUSED {host}:{port}"),
            )),
        };
        std::future::ready(result)
    }
}

async fn run_script(
    stream: DuplexStream,
    steps: Vec<PeerStep>,
    host: String,
    received: Arc<Mutex<Vec<String>>>,
    client_closed: Arc<Mutex<Vec<String>>>,
) {
    let mut reader = BufReader::new(stream);
    for step in steps {
        match step {
            PeerStep::Send(data) => {
                if reader.get_mut().write_all(data.as_bytes()).await.is_err() {
                    return;
                }
            }
            PeerStep::Expect(prefix) => {
                let mut line = String::new();
                let read = reader.read_line(&mut line).await.unwrap_or(0);
                assert!(read > 0, "{host}: connection closed, expected '{prefix}'");
                assert!(
                    line.starts_with(prefix),
                    "{host}: expected command starting with '{prefix}', got '{line}'"
                );
                received
                    .lock()
                    .expect("received lock")
                    .push(format!("{host}: {}", line.trim_end()));
            }
            PeerStep::AwaitClose => {
                let mut line = String::new();
                loop {
                    line.clear();
                    match reader.read_line(&mut line).await {
                        Ok(0) | Err(_) => break,
                        Ok(_) => {
                            received
                                .lock()
                                .expect("received lock")
                                .push(format!("{host}: {}", line.trim_end()));
                        }
                    }
                }
                client_closed.lock().expect("closed lock").push(host.clone());
            }
            PeerStep::Hang => std::future::pending::<()>().await,
        }
    }
}

/// Stream replaying canned reads; writes are swallowed. Reads past the
/// script report end of stream.
#[derive(Debug, Default)]
pub(crate) struct CannedStream {
    reads: VecDeque<io::Result<Vec<u8>>>,
    fail_shutdown: bool,
}

impl CannedStream {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn data(mut self, bytes: &str) -> Self {
        self.reads.push_back(Ok(bytes.as_bytes().to_vec()));
        self
    }

    pub fn error(mut self, kind: io::ErrorKind) -> Self {
        self.reads
            .push_back(Err(io::Error::new(kind, format!("{kind:?}"))));
        self
    }

    pub fn failing_shutdown(mut self) -> Self {
        self.fail_shutdown = true;
        self
    }
}

impl AsyncRead for CannedStream {
    fn poll_read(
        self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        match self.get_mut().reads.pop_front() {
            Some(Ok(bytes)) => {
                buf.put_slice(&bytes);
                Poll::Ready(Ok(()))
            }
            Some(Err(err)) => Poll::Ready(Err(err)),
            None => Poll::Ready(Ok(())),
        }
    }
}

impl AsyncWrite for CannedStream {
    fn poll_write(
        self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        data: &[u8],
    ) -> Poll<io::Result<usize>> {
        Poll::Ready(Ok(data.len()))
    }

    fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Poll::Ready(Ok(()))
    }

    fn poll_shutdown(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        if self.fail_shutdown {
            Poll::Ready(Err(io::Error::new(
                io::ErrorKind::BrokenPipe,
                "shutdown on broken pipe",
            )))
        } else {
            Poll::Ready(Ok(()))
        }
    }
}

/// Hands out a single [`CannedStream`]; later connects are refused.
pub(crate) struct CannedConnector(Mutex<Option<CannedStream>>);

impl CannedConnector {
    pub fn new(stream: CannedStream) -> Self {
        Self(Mutex::new(Some(stream)))
    }
}

impl Connect for CannedConnector {
    type Stream = CannedStream;

    fn connect(
        &self,
        _host: &str,
        _port: u16,
    ) -> impl Future<Output = io::Result<Self::Stream>> + Send {
        let stream = self.0.lock().expect("stream lock").take();
        std::future::ready(
            stream.ok_or_else(|| io::Error::from(io::ErrorKind::ConnectionRefused)),
        )
    }
}

/// Connect attempts that never complete.
pub(crate) struct StalledConnector;

impl Connect for StalledConnector {
    type Stream = DuplexStream;

    fn connect(
        &self,
        _host: &str,
        _port: u16,
    ) -> impl Future<Output = io::Result<Self::Stream>> + Send {
        std::future::pending()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Channel {
    Info,
    Error,
    Server,
    Client,
}

#[derive(Default)]
pub(crate) struct RecordingLogger {
    events: Mutex<Vec<(Channel, String)>>,
}

impl RecordingLogger {
    pub fn lines(&self, channel: Channel) -> Vec<String> {
        self.events
            .lock()
            .expect("events lock")
            .iter()
            .filter(|(c, _)| *c == channel)
            .map(|(_, line)| line.clone())
            .collect()
    }

    fn push(&self, channel: Channel, line: &str) {
        self.events
            .lock()
            .expect("events lock")
            .push((channel, line.to_string()));
    }
}

impl VerificationLogger for RecordingLogger {
    fn info(&self, message: &str) {
        self.push(Channel::Info, message);
    }

    fn error(&self, message: &str) {
        self.push(Channel::Error, message);
    }

    fn server(&self, data: &str) {
        self.push(Channel::Server, data);
    }

    fn client(&self, line: &str) {
        self.push(Channel::Client, line);
    }
}

/// Script of a server accepting the whole probe for `rcpt`.
pub(crate) fn accepting_script() -> Vec<PeerStep> {
    vec![
        PeerStep::Send("220 mx.example.com ESMTP\r\n"),
        PeerStep::Expect("EHLO "),
        PeerStep::Send("250-mx.example.com\r\n250 PIPELINING\r\n"),
        PeerStep::Expect("MAIL FROM:<"),
        PeerStep::Send("250 2.1.0 Ok\r\n"),
        PeerStep::Expect("RCPT TO:<"),
        PeerStep::Send("250 2.1.5 Ok\r\n"),
        PeerStep::Expect("QUIT"),
        PeerStep::Send("221 2.0.0 Bye\r\n"),
    ]
}
