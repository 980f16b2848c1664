use futures::io::{AsyncReadExt, AsyncWriteExt};
use rshell_core::{CancelToken, ClientSession, ServerSession, StreamKind};

#[tokio::test]
async fn client_opens_streams_server_tags_them() {
    let (a, b) = tokio::io::duplex(64 * 1024);
    let cancel = CancelToken::new();
    let mut client = ClientSession::new(a, cancel.clone());
    let mut server = ServerSession::new(b);

    let mut pty = client.open_stream(StreamKind::Pty).await.unwrap();
    let accepted = tokio::spawn(async move { server.accept_stream().await });

    pty.write_all(b"echo hi").await.unwrap();
    let (kind, mut stream) = accepted.await.unwrap().unwrap().unwrap();
    assert_eq!(kind, StreamKind::Pty);

    let mut buf = [0u8; 7];
    stream.read_exact(&mut buf).await.unwrap();
    assert_eq!(&buf, b"echo hi");
}
