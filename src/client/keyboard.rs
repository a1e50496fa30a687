use std::future::Future;
use std::sync::{Arc, Mutex as StdMutex};

use tokio::io::AsyncWrite;
use tokio::sync::Mutex;

use crate::protocol::keysym;
use crate::protocol::messages::ClientMsg;
use crate::VncError;

/// The virtual keyboard.
///
/// Cheaply cloneable; all clones share the session's write lock and the
/// held-key list, so the session can release anything left pressed at
/// teardown.
pub struct Keyboard<W> {
    writer: Arc<Mutex<W>>,
    held: Arc<StdMutex<Vec<u32>>>,
}

impl<W> Clone for Keyboard<W> {
    fn clone(&self) -> Self {
        Self {
            writer: self.writer.clone(),
            held: self.held.clone(),
        }
    }
}

impl<W> Keyboard<W>
where
    W: AsyncWrite + Unpin,
{
    pub(crate) fn new(writer: Arc<Mutex<W>>) -> Self {
        Self {
            writer,
            held: Arc::new(StdMutex::new(Vec::new())),
        }
    }

    async fn key_event(&self, down: bool, keysym: u32) -> Result<(), VncError> {
        ClientMsg::KeyEvent { down, keysym }
            .write(&mut *self.writer.lock().await)
            .await?;
        let mut held = self.held.lock().unwrap();
        if down {
            held.push(keysym);
        } else if let Some(at) = held.iter().rposition(|&k| k == keysym) {
            held.remove(at);
        }
        Ok(())
    }

    fn resolve(keys: &[&str]) -> Result<Vec<u32>, VncError> {
        keys.iter()
            .map(|&name| keysym::lookup(name).ok_or_else(|| VncError::UnknownKey(name.into())))
            .collect()
    }

    fn shift_held(&self) -> bool {
        self.held
            .lock()
            .unwrap()
            .iter()
            .any(|&k| k == keysym::SHIFT_L || k == keysym::SHIFT_R)
    }

    /// Presses the named keys in order, then releases them in reverse.
    ///
    /// ```no_run
    /// # async fn go(keyboard: rfb::Keyboard<tokio::io::WriteHalf<tokio::net::TcpStream>>) {
    /// keyboard.press(&["Ctrl", "Alt", "Delete"]).await.unwrap();
    /// # }
    /// ```
    pub async fn press(&self, keys: &[&str]) -> Result<(), VncError> {
        let syms = Self::resolve(keys)?;
        for &sym in &syms {
            self.key_event(true, sym).await?;
        }
        for &sym in syms.iter().rev() {
            self.key_event(false, sym).await?;
        }
        Ok(())
    }

    /// Holds the named keys for the duration of `scope`, releasing them
    /// in reverse order afterwards.
    ///
    /// The keys are released whether `scope` succeeds or fails; a
    /// release failure only surfaces when the scope itself succeeded.
    pub async fn hold<T, Fut>(
        &self,
        keys: &[&str],
        scope: impl FnOnce(Keyboard<W>) -> Fut,
    ) -> Result<T, VncError>
    where
        Fut: Future<Output = Result<T, VncError>>,
    {
        let syms = Self::resolve(keys)?;
        for &sym in &syms {
            self.key_event(true, sym).await?;
        }
        let result = scope(self.clone()).await;
        let mut release_failure = None;
        for &sym in syms.iter().rev() {
            if let Err(e) = self.key_event(false, sym).await {
                release_failure.get_or_insert(e);
            }
        }
        match (result, release_failure) {
            (Err(e), _) => Err(e),
            (Ok(_), Some(e)) => Err(e),
            (Ok(value), None) => Ok(value),
        }
    }

    /// Types text: one press/release per character, bracketed by a
    /// Shift press/release where the character needs it and Shift is
    /// not already held.
    pub async fn write(&self, text: &str) -> Result<(), VncError> {
        for c in text.chars() {
            let (sym, shifted) =
                keysym::for_char(c).ok_or_else(|| VncError::UnknownKey(c.to_string()))?;
            let bracket = shifted && !self.shift_held();
            if bracket {
                self.key_event(true, keysym::SHIFT_L).await?;
            }
            self.key_event(true, sym).await?;
            self.key_event(false, sym).await?;
            if bracket {
                self.key_event(false, keysym::SHIFT_L).await?;
            }
        }
        Ok(())
    }

    /// The keysyms currently held down, oldest first.
    pub fn held(&self) -> Vec<u32> {
        self.held.lock().unwrap().clone()
    }

    /// Releases everything still held, most recent first, ignoring
    /// write failures. Used at session teardown.
    pub(crate) async fn release_all(&self) {
        let held = std::mem::take(&mut *self.held.lock().unwrap());
        for &sym in held.iter().rev() {
            let msg = ClientMsg::KeyEvent { down: false, keysym: sym };
            let _ = msg.write(&mut *self.writer.lock().await).await;
        }
    }
}
