//! Connection task tests against an in-memory server.

#![cfg(feature = "tokio")]

use futures_util::{SinkExt, StreamExt};
use slirc_session::connection;
use slirc_session::{
    Action, ConfigBuilder, ConnectionError, Handle, LineCodec, RegistrationState, Session,
};
use tokio::io::DuplexStream;
use tokio::task::JoinHandle;
use tokio_util::codec::Framed;

type Server = Framed<DuplexStream, LineCodec>;
type Task = JoinHandle<Result<(), ConnectionError>>;

fn setup(builder: ConfigBuilder) -> (Server, Handle, Task) {
    let (client_io, server_io) = tokio::io::duplex(4096);
    let session = Session::new(builder.build().unwrap());
    let (handle, task) = connection::spawn(client_io, session).unwrap();
    let server = Framed::new(server_io, LineCodec::new("utf-8").unwrap());
    (server, handle, task)
}

async fn expect_line(server: &mut Server) -> String {
    server
        .next()
        .await
        .expect("client closed the stream")
        .expect("client sent a valid line")
}

async fn send(server: &mut Server, line: &str) {
    server.send(line.to_string()).await.unwrap();
}

#[tokio::test]
async fn test_registration_over_transport() {
    let (mut server, handle, task) = setup(ConfigBuilder::new("bob").auto_join("#rust"));

    assert_eq!(expect_line(&mut server).await, "CAP LS");
    assert_eq!(expect_line(&mut server).await, "NICK bob");
    assert_eq!(
        expect_line(&mut server).await,
        "USER bob 8 * :slirc-session IRC client"
    );

    send(&mut server, ":srv CAP * LS :multi-prefix").await;
    assert_eq!(expect_line(&mut server).await, "CAP REQ :multi-prefix");
    send(&mut server, ":srv CAP bob ACK :multi-prefix").await;
    assert_eq!(expect_line(&mut server).await, "CAP END");

    send(&mut server, ":srv 001 bob :Welcome").await;
    assert_eq!(expect_line(&mut server).await, "JOIN #rust 0");
    handle.wait_registered().await.unwrap();
    assert_eq!(*handle.registration().borrow(), RegistrationState::Registered);

    drop(server);
    task.await.unwrap().unwrap();
}

#[tokio::test]
async fn test_ping_is_answered() {
    let (mut server, _handle, _task) = setup(ConfigBuilder::new("bob"));
    for _ in 0..3 {
        expect_line(&mut server).await;
    }

    send(&mut server, "PING :abc123").await;
    assert_eq!(expect_line(&mut server).await, "PONG abc123");
}

#[tokio::test]
async fn test_snapshot_and_submit() {
    let (mut server, handle, _task) = setup(ConfigBuilder::new("bob"));
    for _ in 0..3 {
        expect_line(&mut server).await;
    }

    send(&mut server, ":srv 001 bob :Welcome").await;
    send(&mut server, ":bob!u@h JOIN #a").await;
    send(&mut server, ":srv 353 bob = #a :bob @alice").await;
    send(&mut server, ":srv 366 bob #a :End").await;
    handle.wait_registered().await.unwrap();

    // Requests are served in order with inbound lines, so keep asking until
    // the NAMES burst has landed.
    let store = loop {
        let store = handle.snapshot().await.unwrap();
        if store
            .channel("#a")
            .is_some_and(|c| c.members.len() == 2)
        {
            break store;
        }
        tokio::task::yield_now().await;
    };
    assert_eq!(store.own_nick, "bob");

    handle.submit(Action::privmsg("#a", "hello")).unwrap();
    handle.send_raw("WHO #a").unwrap();
    assert_eq!(expect_line(&mut server).await, "PRIVMSG #a :hello");
    assert_eq!(expect_line(&mut server).await, "WHO #a");

    handle.quit(Some("bye".into())).unwrap();
    assert_eq!(expect_line(&mut server).await, "QUIT :bye");
}

#[tokio::test]
async fn test_error_terminates_registration() {
    let (mut server, handle, task) = setup(ConfigBuilder::new("bob"));
    for _ in 0..3 {
        expect_line(&mut server).await;
    }

    send(&mut server, "ERROR :Closing Link: banned").await;
    assert!(handle.wait_registered().await.is_err());

    drop(server);
    task.await.unwrap().unwrap();
    assert!(handle.submit(Action::join("#a")).is_err());
}

#[tokio::test]
async fn test_rejected_outbound_lines_keep_the_connection() {
    let (mut server, handle, task) = setup(ConfigBuilder::new("bob"));
    for _ in 0..3 {
        expect_line(&mut server).await;
    }

    handle
        .submit(Action::Topic {
            channel: "#a".into(),
            text: Some("a\nb".into()),
        })
        .unwrap();
    handle.send_raw("WHO #a\r\nQUIT").unwrap();
    handle.submit(Action::privmsg("#a", "after")).unwrap();
    assert_eq!(expect_line(&mut server).await, "PRIVMSG #a :after");

    drop(server);
    task.await.unwrap().unwrap();
}

#[tokio::test]
async fn test_oversized_line_is_skipped() {
    let (mut server, _handle, task) = setup(ConfigBuilder::new("bob"));
    for _ in 0..3 {
        expect_line(&mut server).await;
    }

    let flood = format!(":alice!a@h PRIVMSG #a :{}", "x".repeat(10_000));
    send(&mut server, &flood).await;
    send(&mut server, "PING :still-alive").await;
    assert_eq!(expect_line(&mut server).await, "PONG still-alive");

    drop(server);
    task.await.unwrap().unwrap();
}
