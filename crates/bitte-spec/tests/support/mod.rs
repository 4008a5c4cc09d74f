//! Minimal loopback HTTP responder for exercising the fetcher against real sockets.

use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};
use tokio::{
    io::{AsyncReadExt as _, AsyncWriteExt as _},
    net::{TcpListener, TcpStream},
};

#[derive(Debug, Clone)]
pub struct Reply {
    pub status: u16,
    pub content_type: &'static str,
    pub body: String,
}

impl Reply {
    pub fn json(body: impl Into<String>) -> Self {
        Self {
            status: 200,
            content_type: "application/json",
            body: body.into(),
        }
    }

    pub fn status(status: u16) -> Self {
        Self {
            status,
            content_type: "text/plain",
            body: String::new(),
        }
    }
}

pub struct Responder {
    pub url: String,
    hits: Arc<AtomicUsize>,
}

impl Responder {
    /// Requests received so far.
    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }
}

/// Serve `replies[n]` for the n-th request; the last reply repeats once the list runs out.
pub async fn spawn(replies: Vec<Reply>) -> eyre::Result<Responder> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let hits = Arc::new(AtomicUsize::new(0));
    let hits2 = Arc::clone(&hits);
    let replies = Arc::new(replies);

    tokio::spawn(async move {
        while let Ok((stream, _)) = listener.accept().await {
            let hits3 = Arc::clone(&hits2);
            let replies2 = Arc::clone(&replies);
            tokio::spawn(async move {
                drop(serve(stream, &hits3, &replies2).await);
            });
        }
    });

    Ok(Responder {
        url: format!("http://{addr}/openapi.json"),
        hits,
    })
}

async fn serve(mut stream: TcpStream, hits: &AtomicUsize, replies: &[Reply]) -> std::io::Result<()> {
    let mut buf = Vec::new();
    let mut chunk = [0_u8; 1024];
    loop {
        let n = stream.read(&mut chunk).await?;
        if n == 0 {
            return Ok(());
        }
        buf.extend_from_slice(chunk.get(..n).unwrap_or_default());
        if buf.windows(4).any(|w| w == b"\r\n\r\n") {
            break;
        }
    }

    let n = hits.fetch_add(1, Ordering::SeqCst);
    let fallback = Reply::status(500);
    let reply = replies
        .get(n)
        .or_else(|| replies.last())
        .unwrap_or(&fallback);

    let head = format!(
        "HTTP/1.1 {} X\r\ncontent-type: {}\r\ncontent-length: {}\r\nconnection: close\r\n\r\n",
        reply.status,
        reply.content_type,
        reply.body.len()
    );
    stream.write_all(head.as_bytes()).await?;
    stream.write_all(reply.body.as_bytes()).await?;
    stream.shutdown().await
}
