use bytes::BytesMut;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::time::{Duration, timeout};

/// Per-read scratch buffer size.
const READ_CHUNK: usize = 4096;

/// Upper bound on the request head; anything larger is cut off and the
/// request line parsed from what arrived.
const MAX_REQUEST_HEAD: usize = 16 * 1024;

/// First line of an inbound request, split into its three tokens.
/// Everything after the request line is read and discarded.
#[derive(Debug, PartialEq, Eq)]
pub struct RequestLine {
    pub method: String,
    pub target: String,
    pub version: String,
}

/// Reads the request head (up to the blank line, EOF, or the size cap) from
/// the client. Returns `None` when the client disconnects or stalls without
/// sending anything.
pub async fn read_request_head<S>(
    stream: &mut S,
    read_timeout: Duration,
) -> anyhow::Result<Option<BytesMut>>
where
    S: AsyncRead + Unpin + ?Sized,
{
    let mut buf = BytesMut::new();
    let mut tmp = [0u8; READ_CHUNK];

    loop {
        if find_head_end(&buf).is_some() || buf.len() > MAX_REQUEST_HEAD {
            break;
        }

        match timeout(read_timeout, stream.read(&mut tmp)).await {
            Ok(res) => {
                let n = res?;
                if n == 0 {
                    break;
                }
                buf.extend_from_slice(&tmp[..n]);
            }
            // Stalled client: parse whatever arrived so far.
            Err(_) => break,
        }
    }

    if buf.is_empty() {
        Ok(None)
    } else {
        Ok(Some(buf))
    }
}

/// Splits the first line of the head into method/target/version.
/// The line must contain exactly three whitespace-separated tokens.
pub fn parse_request_line(head: &[u8]) -> Option<RequestLine> {
    let first = head.split(|&b| b == b'\n').next()?;
    let line = String::from_utf8_lossy(first);
    let line = line.trim();

    let mut parts = line.split_whitespace();
    let method = parts.next()?;
    let target = parts.next()?;
    let version = parts.next()?;
    if parts.next().is_some() {
        return None;
    }

    Some(RequestLine {
        method: method.to_string(),
        target: target.to_string(),
        version: version.to_string(),
    })
}

fn find_head_end(buf: &BytesMut) -> Option<usize> {
    buf.windows(4).position(|w| w == b"\r\n\r\n")
}

#[cfg(test)]
mod tests {
    use super::{parse_request_line, read_request_head};
    use tokio::time::Duration;

    #[test]
    fn parse_request_line_accepts_three_tokens() {
        let line = parse_request_line(b"GET http://example.com/ HTTP/1.1\r\n\r\n")
            .expect("expected ok");
        assert_eq!(line.method, "GET");
        assert_eq!(line.target, "http://example.com/");
        assert_eq!(line.version, "HTTP/1.1");
    }

    #[test]
    fn parse_request_line_ignores_header_lines() {
        let head = b"GET / HTTP/1.1\r\nHost: example\r\nAccept: */*\r\n\r\n";
        let line = parse_request_line(head).expect("expected ok");
        assert_eq!(line.target, "/");
    }

    #[test]
    fn parse_request_line_rejects_garbage() {
        assert!(parse_request_line(b"GARBAGE\r\n\r\n").is_none());
    }

    #[test]
    fn parse_request_line_rejects_extra_tokens() {
        assert!(parse_request_line(b"GET / HTTP/1.1 extra\r\n\r\n").is_none());
    }

    #[tokio::test]
    async fn read_request_head_empty_stream_is_none() {
        let mut input: &[u8] = b"";
        let head = read_request_head(&mut input, Duration::from_secs(1))
            .await
            .expect("expected ok");
        assert!(head.is_none());
    }

    #[tokio::test]
    async fn read_request_head_stops_at_blank_line() {
        let mut input: &[u8] = b"GET / HTTP/1.1\r\nHost: example\r\n\r\n";
        let head = read_request_head(&mut input, Duration::from_secs(1))
            .await
            .expect("expected ok")
            .expect("expected head");
        assert!(head.ends_with(b"\r\n\r\n"));
    }
}
