//! Duplex websocket link to the transcription collaborator.
//!
//! Audio chunks flow out as binary frames, transcript fragments flow back as
//! text frames, one fragment per message. The link lives exactly as long as
//! the mic session that opened it.

use anyhow::Result;
use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;

/// Run one duplex exchange until either side goes away.
///
/// Returns when the audio channel closes (a close frame is sent first), the
/// server closes, or the fragment receiver is dropped. Transport errors
/// bubble up for the caller to log.
pub async fn run_duplex(
    url: &str,
    mut audio: UnboundedReceiver<Vec<u8>>,
    fragments: UnboundedSender<String>,
) -> Result<()> {
    let (socket, _) = connect_async(url).await?;
    tracing::debug!("transcription link open: {url}");
    let (mut sink, mut source) = socket.split();

    loop {
        tokio::select! {
            chunk = audio.recv() => match chunk {
                Some(chunk) if !chunk.is_empty() => sink.send(Message::Binary(chunk)).await?,
                Some(_) => {}
                None => {
                    // Capture side is gone; tell the server we are done.
                    let _ = sink.send(Message::Close(None)).await;
                    break;
                }
            },
            inbound = source.next() => match inbound {
                Some(Ok(Message::Text(fragment))) => {
                    if fragments.send(fragment).is_err() {
                        break;
                    }
                }
                Some(Ok(Message::Close(_))) | None => {
                    tracing::debug!("transcription link closed by server");
                    break;
                }
                Some(Ok(_)) => {}
                Some(Err(err)) => return Err(err.into()),
            },
        }
    }

    Ok(())
}
