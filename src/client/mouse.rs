use std::future::Future;
use std::sync::{Arc, Mutex as StdMutex};

use tokio::io::AsyncWrite;
use tokio::sync::Mutex;

use crate::protocol::messages::ClientMsg;
use crate::VncError;

/// Pointer buttons as PointerEvent mask bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum MouseButton {
    Left = 1,
    Middle = 2,
    Right = 4,
    ScrollUp = 8,
    ScrollDown = 16,
}

impl MouseButton {
    fn mask(self) -> u8 {
        self as u8
    }
}

#[derive(Debug, Default, Clone, Copy)]
struct PointerState {
    x: u16,
    y: u16,
    buttons: u8,
}

/// The virtual mouse.
///
/// Cheaply cloneable; clones share position and button state so holds
/// and teardown see a single mask.
pub struct Mouse<W> {
    writer: Arc<Mutex<W>>,
    state: Arc<StdMutex<PointerState>>,
}

impl<W> Clone for Mouse<W> {
    fn clone(&self) -> Self {
        Self {
            writer: self.writer.clone(),
            state: self.state.clone(),
        }
    }
}

impl<W> Mouse<W>
where
    W: AsyncWrite + Unpin,
{
    pub(crate) fn new(writer: Arc<Mutex<W>>) -> Self {
        Self {
            writer,
            state: Arc::new(StdMutex::new(PointerState::default())),
        }
    }

    /// Applies `change` to the pointer state and sends the resulting
    /// PointerEvent.
    async fn update(&self, change: impl FnOnce(&mut PointerState)) -> Result<(), VncError> {
        let state = {
            let mut state = self.state.lock().unwrap();
            change(&mut state);
            *state
        };
        ClientMsg::PointerEvent {
            buttons: state.buttons,
            x: state.x,
            y: state.y,
        }
        .write(&mut *self.writer.lock().await)
        .await
    }

    /// Moves the pointer to the given co-ordinates.
    pub async fn move_to(&self, x: u16, y: u16) -> Result<(), VncError> {
        self.update(|s| {
            s.x = x;
            s.y = y;
        })
        .await
    }

    /// Presses and releases a button at the current position.
    pub async fn click(&self, button: MouseButton) -> Result<(), VncError> {
        self.update(|s| s.buttons |= button.mask()).await?;
        self.update(|s| s.buttons &= !button.mask()).await
    }

    /// Presses and releases the left button.
    pub async fn left_click(&self) -> Result<(), VncError> {
        self.click(MouseButton::Left).await
    }

    /// Presses and releases the middle button.
    pub async fn middle_click(&self) -> Result<(), VncError> {
        self.click(MouseButton::Middle).await
    }

    /// Presses and releases the right button.
    pub async fn right_click(&self) -> Result<(), VncError> {
        self.click(MouseButton::Right).await
    }

    /// Scrolls up one notch.
    pub async fn scroll_up(&self) -> Result<(), VncError> {
        self.click(MouseButton::ScrollUp).await
    }

    /// Scrolls down one notch.
    pub async fn scroll_down(&self) -> Result<(), VncError> {
        self.click(MouseButton::ScrollDown).await
    }

    /// Holds the given buttons for the duration of `scope`, clearing
    /// them afterwards on every path.
    pub async fn hold<T, Fut>(
        &self,
        buttons: &[MouseButton],
        scope: impl FnOnce(Mouse<W>) -> Fut,
    ) -> Result<T, VncError>
    where
        Fut: Future<Output = Result<T, VncError>>,
    {
        for &button in buttons {
            self.update(|s| s.buttons |= button.mask()).await?;
        }
        let result = scope(self.clone()).await;
        let mut release_failure = None;
        for &button in buttons.iter().rev() {
            if let Err(e) = self.update(|s| s.buttons &= !button.mask()).await {
                release_failure.get_or_insert(e);
            }
        }
        match (result, release_failure) {
            (Err(e), _) => Err(e),
            (Ok(_), Some(e)) => Err(e),
            (Ok(value), None) => Ok(value),
        }
    }

    /// The currently pressed button mask.
    pub fn buttons(&self) -> u8 {
        self.state.lock().unwrap().buttons
    }

    /// Clears any pressed buttons, ignoring write failures. Used at
    /// session teardown.
    pub(crate) async fn release_all(&self) {
        let pressed = {
            let mut state = self.state.lock().unwrap();
            let pressed = state.buttons != 0;
            state.buttons = 0;
            pressed
        };
        if pressed {
            let _ = self.update(|_| {}).await;
        }
    }
}
