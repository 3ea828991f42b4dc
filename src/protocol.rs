//! FastDFS packet header framing
//!
//! Every FastDFS packet starts with a 10-byte header:
//!
//! ```text
//! +----------------------+-----+--------+
//! | body length (i64 BE) | cmd | status |
//! +----------------------+-----+--------+
//!        8 bytes          1 B     1 B
//! ```
//!
//! The pool only needs the body-less ACTIVE_TEST and QUIT exchanges, so only
//! the header is modelled here.

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::connection_error::ConnectionError;
use crate::constants::protocol::{
    CMD_ACTIVE_TEST, CMD_QUIT, CMD_RESP, HEADER_SIZE, PKG_LEN_SIZE, STATUS_OK,
};

/// A decoded packet header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    pub body_len: i64,
    pub cmd: u8,
    pub status: u8,
}

impl Header {
    /// Header for a request without a body
    #[must_use]
    pub const fn request(cmd: u8) -> Self {
        Self {
            body_len: 0,
            cmd,
            status: STATUS_OK,
        }
    }

    /// Encode into the on-wire representation
    #[must_use]
    pub fn encode(&self) -> [u8; HEADER_SIZE] {
        let mut buf = [0u8; HEADER_SIZE];
        buf[..PKG_LEN_SIZE].copy_from_slice(&self.body_len.to_be_bytes());
        buf[PKG_LEN_SIZE] = self.cmd;
        buf[PKG_LEN_SIZE + 1] = self.status;
        buf
    }

    /// Decode from the on-wire representation
    #[must_use]
    pub fn decode(buf: &[u8; HEADER_SIZE]) -> Self {
        let mut len = [0u8; PKG_LEN_SIZE];
        len.copy_from_slice(&buf[..PKG_LEN_SIZE]);
        Self {
            body_len: i64::from_be_bytes(len),
            cmd: buf[PKG_LEN_SIZE],
            status: buf[PKG_LEN_SIZE + 1],
        }
    }

    /// Whether this is a successful, body-less response
    #[must_use]
    pub const fn is_empty_ok_response(&self) -> bool {
        self.cmd == CMD_RESP && self.status == STATUS_OK && self.body_len == 0
    }
}

/// Read one header from the stream
pub async fn read_header<S>(stream: &mut S) -> Result<Header, ConnectionError>
where
    S: AsyncRead + Unpin,
{
    let mut buf = [0u8; HEADER_SIZE];
    stream.read_exact(&mut buf).await?;
    Ok(Header::decode(&buf))
}

/// Run one ACTIVE_TEST exchange
///
/// Succeeds only on a `RESP` header with status 0 and an empty body.
/// The caller bounds the exchange with a timeout.
pub async fn active_test<S>(stream: &mut S) -> Result<(), ConnectionError>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    stream
        .write_all(&Header::request(CMD_ACTIVE_TEST).encode())
        .await?;
    stream.flush().await?;

    let header = read_header(stream).await?;
    if header.is_empty_ok_response() {
        Ok(())
    } else {
        Err(ConnectionError::UnexpectedResponse {
            cmd: header.cmd,
            status: header.status,
            body_len: header.body_len,
        })
    }
}

/// Tell the tracker the session is going away (no response is expected)
pub async fn send_quit<S>(stream: &mut S) -> std::io::Result<()>
where
    S: AsyncWrite + Unpin,
{
    stream.write_all(&Header::request(CMD_QUIT).encode()).await?;
    stream.flush().await
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::duplex;

    #[test]
    fn test_request_header_encoding() {
        let bytes = Header::request(CMD_ACTIVE_TEST).encode();
        assert_eq!(bytes, [0, 0, 0, 0, 0, 0, 0, 0, 111, 0]);
    }

    #[test]
    fn test_decode_big_endian_length() {
        let mut bytes = [0u8; HEADER_SIZE];
        bytes[6] = 0x01;
        bytes[7] = 0x02;
        bytes[8] = CMD_RESP;
        bytes[9] = 2;
        let header = Header::decode(&bytes);
        assert_eq!(header.body_len, 0x0102);
        assert_eq!(header.cmd, CMD_RESP);
        assert_eq!(header.status, 2);
        assert!(!header.is_empty_ok_response());
    }

    #[test]
    fn test_empty_ok_response() {
        let ok = Header {
            body_len: 0,
            cmd: CMD_RESP,
            status: STATUS_OK,
        };
        assert!(ok.is_empty_ok_response());

        let with_body = Header { body_len: 4, ..ok };
        assert!(!with_body.is_empty_ok_response());
    }

    #[tokio::test]
    async fn test_active_test_success() {
        let (mut client, mut server) = duplex(64);

        let server_task = tokio::spawn(async move {
            let request = read_header(&mut server).await.unwrap();
            assert_eq!(request.cmd, CMD_ACTIVE_TEST);
            server
                .write_all(
                    &Header {
                        body_len: 0,
                        cmd: CMD_RESP,
                        status: STATUS_OK,
                    }
                    .encode(),
                )
                .await
                .unwrap();
        });

        assert!(active_test(&mut client).await.is_ok());
        server_task.await.unwrap();
    }

    #[tokio::test]
    async fn test_active_test_error_status() {
        let (mut client, mut server) = duplex(64);

        tokio::spawn(async move {
            let _ = read_header(&mut server).await;
            let _ = server
                .write_all(
                    &Header {
                        body_len: 0,
                        cmd: CMD_RESP,
                        status: 2,
                    }
                    .encode(),
                )
                .await;
        });

        let err = active_test(&mut client).await.unwrap_err();
        assert!(matches!(
            err,
            ConnectionError::UnexpectedResponse { status: 2, .. }
        ));
    }

    #[tokio::test]
    async fn test_active_test_peer_closed() {
        let (mut client, server) = duplex(64);
        drop(server);

        let err = active_test(&mut client).await.unwrap_err();
        assert!(matches!(err, ConnectionError::Io(_)));
    }

    #[tokio::test]
    async fn test_send_quit_bytes() {
        let (mut client, mut server) = duplex(64);
        send_quit(&mut client).await.unwrap();
        let header = read_header(&mut server).await.unwrap();
        assert_eq!(header, Header::request(CMD_QUIT));
    }
}
