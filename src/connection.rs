//! Async connection driver.
//!
//! [`spawn`] moves a [`Session`] into a tokio task that owns it for the life
//! of the transport. The task reads lines, feeds them to the session and
//! writes the session's outbound queue back in order. Callers talk to the
//! task through a cloneable [`Handle`]; requests are served between two
//! inbound lines, so a snapshot never reflects a half-applied event.
//!
//! Transport setup (TCP, TLS, retries) is left to the caller: anything that
//! is `AsyncRead + AsyncWrite` will do.
//!
//! # Example
//!
//! ```no_run
//! use slirc_session::config::ConfigBuilder;
//! use slirc_session::connection;
//! use slirc_session::Session;
//! use tokio::net::TcpStream;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ConfigBuilder::new("bob").auto_join("#rust").build()?;
//! let stream = TcpStream::connect(("irc.libera.chat", 6667)).await?;
//! let (handle, task) = connection::spawn(stream, Session::new(config))?;
//!
//! handle.wait_registered().await?;
//! handle.submit(slirc_session::Action::privmsg("#rust", "hello"))?;
//! task.await??;
//! # Ok(())
//! # }
//! ```

use futures_util::{SinkExt, StreamExt};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio_util::codec::Framed;
use tracing::{debug, error, warn};

use crate::action::Action;
use crate::error::{ConnectionError, ProtocolError};
use crate::line::LineCodec;
use crate::session::Session;
use crate::state::RegistrationState;
use crate::store::Store;

#[derive(Debug)]
enum Request {
    Submit(Action),
    SendRaw(String),
    Snapshot(oneshot::Sender<Store>),
}

/// Cloneable handle to a running connection task.
#[derive(Clone, Debug)]
pub struct Handle {
    requests: mpsc::UnboundedSender<Request>,
    state: watch::Receiver<RegistrationState>,
}

impl Handle {
    fn request(&self, request: Request) -> Result<(), ConnectionError> {
        self.requests
            .send(request)
            .map_err(|_| ConnectionError::Closed)
    }

    /// Queue an action. Invalid actions are dropped by the session.
    pub fn submit(&self, action: Action) -> Result<(), ConnectionError> {
        self.request(Request::Submit(action))
    }

    /// Queue a pre-formatted line. Lines with CR, LF or NUL are dropped by
    /// the session.
    pub fn send_raw(&self, line: impl Into<String>) -> Result<(), ConnectionError> {
        self.request(Request::SendRaw(line.into()))
    }

    /// Send QUIT. The task ends once the server closes the transport.
    pub fn quit(&self, reason: Option<String>) -> Result<(), ConnectionError> {
        self.submit(Action::quit(reason))
    }

    /// A copy of the session store.
    pub async fn snapshot(&self) -> Result<Store, ConnectionError> {
        let (tx, rx) = oneshot::channel();
        self.request(Request::Snapshot(tx))?;
        rx.await.map_err(|_| ConnectionError::Closed)
    }

    /// Watch the registration state, e.g. to enforce a registration timeout.
    pub fn registration(&self) -> watch::Receiver<RegistrationState> {
        self.state.clone()
    }

    /// Wait until RPL_WELCOME has been processed.
    pub async fn wait_registered(&self) -> Result<(), ConnectionError> {
        let mut state = self.state.clone();
        loop {
            match *state.borrow_and_update() {
                RegistrationState::Registered => return Ok(()),
                RegistrationState::Terminated => return Err(ConnectionError::Closed),
                _ => {}
            }
            state.changed().await.map_err(|_| ConnectionError::Closed)?;
        }
    }
}

/// Start driving `session` over `io`.
///
/// The registration lines are sent immediately. The returned task resolves
/// when the transport closes, with the codec error if it failed.
pub fn spawn<T>(
    io: T,
    session: Session,
) -> Result<(Handle, JoinHandle<Result<(), ConnectionError>>), ProtocolError>
where
    T: AsyncRead + AsyncWrite + Send + Unpin + 'static,
{
    let codec = LineCodec::new(&session.config().encoding)?;
    let framed = Framed::new(io, codec);
    let (requests, inbox) = mpsc::unbounded_channel();
    let (state_tx, state) = watch::channel(session.state());

    let task = tokio::spawn(run(framed, session, inbox, state_tx));
    Ok((Handle { requests, state }, task))
}

async fn run<T>(
    mut framed: Framed<T, LineCodec>,
    mut session: Session,
    mut inbox: mpsc::UnboundedReceiver<Request>,
    state_tx: watch::Sender<RegistrationState>,
) -> Result<(), ConnectionError>
where
    T: AsyncRead + AsyncWrite + Unpin,
{
    session.start();
    flush(&mut framed, &mut session, &state_tx).await?;

    let mut handles_open = true;
    loop {
        tokio::select! {
            line = framed.next() => match line {
                Some(Ok(line)) => {
                    // Malformed lines are logged and dropped by the session.
                    let _ = session.handle_line(&line);
                }
                Some(Err(e)) => {
                    error!(error = %e, "transport failed");
                    return Err(e.into());
                }
                None => {
                    debug!("transport closed");
                    return Ok(());
                }
            },
            request = inbox.recv(), if handles_open => match request {
                Some(Request::Submit(action)) => {
                    session.submit(action);
                }
                Some(Request::SendRaw(line)) => {
                    session.send_raw(line);
                }
                Some(Request::Snapshot(reply)) => {
                    let _ = reply.send(session.store().clone());
                }
                None => handles_open = false,
            },
        }

        flush(&mut framed, &mut session, &state_tx).await?;
    }
}

async fn flush<T>(
    framed: &mut Framed<T, LineCodec>,
    session: &mut Session,
    state_tx: &watch::Sender<RegistrationState>,
) -> Result<(), ConnectionError>
where
    T: AsyncRead + AsyncWrite + Unpin,
{
    let current = session.state();
    state_tx.send_if_modified(|state| {
        let changed = *state != current;
        *state = current;
        changed
    });

    if !session.has_outbound() {
        return Ok(());
    }
    for line in session.take_outbound() {
        match framed.feed(line).await {
            Ok(()) => {}
            Err(ProtocolError::IllegalControlChar(ch)) => {
                warn!(char = ?ch, "outbound line rejected by codec, skipped");
            }
            Err(e) => return Err(e.into()),
        }
    }
    framed.flush().await?;
    Ok(())
}
