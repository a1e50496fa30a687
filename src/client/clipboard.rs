use std::sync::{Arc, Mutex as StdMutex};

use tokio::io::AsyncWrite;
use tokio::sync::Mutex;

use crate::protocol::messages::ClientMsg;
use crate::protocol::wire;
use crate::VncError;

/// The shared clipboard.
///
/// The message loop stores incoming server cut text here; [`write`]
/// sends ClientCutText the other way. RFB cut text is Latin-1 in both
/// directions.
///
/// [`write`]: Clipboard::write
pub struct Clipboard<W> {
    writer: Arc<Mutex<W>>,
    text: Arc<StdMutex<String>>,
}

impl<W> Clone for Clipboard<W> {
    fn clone(&self) -> Self {
        Self {
            writer: self.writer.clone(),
            text: self.text.clone(),
        }
    }
}

impl<W> Clipboard<W>
where
    W: AsyncWrite + Unpin,
{
    pub(crate) fn new(writer: Arc<Mutex<W>>) -> Self {
        Self {
            writer,
            text: Arc::new(StdMutex::new(String::new())),
        }
    }

    /// The most recent cut text received from the server.
    pub fn text(&self) -> String {
        self.text.lock().unwrap().clone()
    }

    /// Sends clipboard text to the server. Fails on characters outside
    /// Latin-1.
    pub async fn write(&self, text: &str) -> Result<(), VncError> {
        let data = wire::to_latin1(text)?;
        ClientMsg::ClientCutText(data)
            .write(&mut *self.writer.lock().await)
            .await
    }

    pub(crate) fn set_text(&self, text: String) {
        *self.text.lock().unwrap() = text;
    }
}
