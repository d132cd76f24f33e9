//! Message framing for the host/client stream.
//!
//! Every message is a big-endian `u32` payload length followed by the
//! payload. Host→client payloads are bincode [`crate::Snapshot`]s,
//! client→host payloads are a single direction symbol or nothing at all.

use crate::INPUT_SYMBOLS;
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// Largest payload either side will accept.
pub const MAX_FRAME_LEN: usize = 64 * 1024;

#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("connection error: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed snapshot: {0}")]
    Codec(#[from] bincode::Error),
    #[error("frame of {len} bytes exceeds the {max} byte limit")]
    FrameTooLarge { len: usize, max: usize },
    #[error("invalid input symbol {0:#04x}")]
    InvalidSymbol(u8),
    #[error("input message must be at most one byte, got {0}")]
    InputTooLong(usize),
}

/// Writes one length-prefixed frame and flushes it.
pub async fn write_frame<W>(writer: &mut W, payload: &[u8]) -> Result<(), ProtocolError>
where
    W: AsyncWrite + Unpin,
{
    if payload.len() > MAX_FRAME_LEN {
        return Err(ProtocolError::FrameTooLarge {
            len: payload.len(),
            max: MAX_FRAME_LEN,
        });
    }

    writer.write_u32(payload.len() as u32).await?;
    writer.write_all(payload).await?;
    writer.flush().await?;
    Ok(())
}

/// Reads one length-prefixed frame, waiting until all of it has arrived.
pub async fn read_frame<R>(reader: &mut R) -> Result<Vec<u8>, ProtocolError>
where
    R: AsyncRead + Unpin,
{
    let len = reader.read_u32().await? as usize;
    if len > MAX_FRAME_LEN {
        return Err(ProtocolError::FrameTooLarge {
            len,
            max: MAX_FRAME_LEN,
        });
    }

    let mut payload = vec![0u8; len];
    reader.read_exact(&mut payload).await?;
    Ok(payload)
}

/// Payload for a client's per-tick input. `None` means "no change".
pub fn encode_input(symbol: Option<u8>) -> Vec<u8> {
    symbol.map(|s| vec![s]).unwrap_or_default()
}

pub fn decode_input(payload: &[u8]) -> Result<Option<u8>, ProtocolError> {
    match payload {
        [] => Ok(None),
        [symbol] if INPUT_SYMBOLS.contains(symbol) => Ok(Some(*symbol)),
        [symbol] => Err(ProtocolError::InvalidSymbol(*symbol)),
        _ => Err(ProtocolError::InputTooLong(payload.len())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::duplex;

    #[tokio::test]
    async fn test_frames_arrive_whole_and_in_order() {
        let (mut near, mut far) = duplex(64);

        let writer = tokio::spawn(async move {
            write_frame(&mut near, b"first").await.unwrap();
            write_frame(&mut near, &[]).await.unwrap();
            // Bigger than the duplex buffer, so it is split across reads.
            write_frame(&mut near, &[7u8; 500]).await.unwrap();
        });

        assert_eq!(read_frame(&mut far).await.unwrap(), b"first");
        assert!(read_frame(&mut far).await.unwrap().is_empty());
        assert_eq!(read_frame(&mut far).await.unwrap(), vec![7u8; 500]);
        writer.await.unwrap();
    }

    #[test]
    fn test_read_frame_from_scripted_stream() {
        let mut stream = tokio_test::io::Builder::new()
            .read(&[0, 0, 0, 1])
            .read(b"W")
            .build();

        let payload = tokio_test::block_on(read_frame(&mut stream)).unwrap();
        assert_eq!(payload, b"W");
    }

    #[test]
    fn test_oversized_length_prefix_is_rejected() {
        let len = (MAX_FRAME_LEN as u32 + 1).to_be_bytes();
        let mut stream = tokio_test::io::Builder::new().read(&len).build();

        let result = tokio_test::block_on(read_frame(&mut stream));
        assert!(matches!(
            result,
            Err(ProtocolError::FrameTooLarge { len, .. }) if len == MAX_FRAME_LEN + 1
        ));
    }

    #[test]
    fn test_truncated_frame_is_an_io_error() {
        let mut stream = tokio_test::io::Builder::new()
            .read(&[0, 0, 0, 4])
            .read(b"ab")
            .build();

        let result = tokio_test::block_on(read_frame(&mut stream));
        assert!(matches!(result, Err(ProtocolError::Io(_))));
    }

    #[test]
    fn test_input_payloads() {
        assert_eq!(encode_input(None), Vec::<u8>::new());
        assert_eq!(encode_input(Some(b'A')), vec![b'A']);

        assert_eq!(decode_input(&[]).unwrap(), None);
        for symbol in INPUT_SYMBOLS {
            assert_eq!(decode_input(&[symbol]).unwrap(), Some(symbol));
        }
        assert!(matches!(
            decode_input(b"x"),
            Err(ProtocolError::InvalidSymbol(b'x'))
        ));
        assert!(matches!(
            decode_input(b"WW"),
            Err(ProtocolError::InputTooLong(2))
        ));
    }
}
