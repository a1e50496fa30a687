/// An update received from the server by [`crate::Session::read`].
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerEvent {
    /// One FramebufferUpdate was applied to the framebuffer.
    Framebuffer {
        /// Number of rectangles the update carried.
        rects: u16,
    },
    /// The server rang the bell.
    Bell,
    /// The server cut buffer changed; the new text is also available via
    /// [`crate::Clipboard::text`].
    Clipboard(String),
}
