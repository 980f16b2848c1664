use rshell_proto::resize::{ResizeRecord, read_resize, write_resize};
use rshell_proto::establish;
use tokio::io::{AsyncReadExt, AsyncWriteExt};

#[tokio::test]
async fn establish_then_carry_resize_records() {
    let (a, b) = tokio::io::duplex(16 * 1024);
    let (ra, rb) = tokio::join!(establish(a, "correct horse"), establish(b, "correct horse"));
    let mut shell_side = ra.unwrap();
    let mut listener_side = rb.unwrap();

    let record = ResizeRecord { rows: 40, cols: 120, x_pixels: 0, y_pixels: 0 };
    write_resize(&mut listener_side, record).await.unwrap();
    let got = read_resize(&mut shell_side).await.unwrap().unwrap();
    assert_eq!(got, record);

    shell_side.write_all(b"$ ").await.unwrap();
    let mut buf = [0u8; 2];
    listener_side.read_exact(&mut buf).await.unwrap();
    assert_eq!(&buf, b"$ ");
}

#[tokio::test]
async fn wrong_password_never_pumps_bytes() {
    let (a, b) = tokio::io::duplex(16 * 1024);
    let (ra, rb) = tokio::join!(establish(a, "correct horse"), establish(b, "battery staple"));
    assert!(ra.is_err());
    assert!(rb.is_err());
}
