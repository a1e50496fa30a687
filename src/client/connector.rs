use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::{TcpStream, ToSocketAddrs};
use tracing::{debug, info, trace};

use crate::client::auth::VncChallenge;
use crate::client::{security, Credentials, Session};
use crate::protocol::messages::ClientMsg;
use crate::protocol::{wire, Encoding, PixelFormat, ProtocolVersion, SecurityType};
use crate::VncError;

/// Opens a plain TCP connection and returns a [`Connector`] for it.
///
/// To tunnel over SSH or any other transport, open the stream yourself
/// and hand it to [`Connector::new`] instead.
pub async fn connect(addr: impl ToSocketAddrs) -> Result<Connector<TcpStream>, VncError> {
    let stream = TcpStream::connect(addr).await?;
    stream.set_nodelay(true)?;
    Ok(Connector::new(stream))
}

/// Configures and performs the RFB handshake over any async stream.
///
/// ```no_run
/// use tokio::net::TcpStream;
/// use rfb::{Connector, Credentials};
///
/// #[tokio::main]
/// async fn main() -> Result<(), rfb::VncError> {
///     let tcp = TcpStream::connect("127.0.0.1:5900").await?;
///     let session = Connector::new(tcp)
///         .set_credentials(Credentials::user_password("admin", "secret"))
///         .allow_shared(true)
///         .handshake()
///         .await?;
///     println!("connected to {:?}", session.name());
///     Ok(())
/// }
/// ```
pub struct Connector<S> {
    stream: S,
    credentials: Credentials,
    allow_shared: bool,
}

impl<S> Connector<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    pub fn new(stream: S) -> Self {
        Self {
            stream,
            credentials: Credentials::default(),
            allow_shared: true,
        }
    }

    /// Credentials for the security handshake. The default is no
    /// authentication.
    pub fn set_credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = credentials;
        self
    }

    /// Shared-flag for ClientInit: true leaves other clients connected,
    /// false asks the server to disconnect them. Defaults to true.
    pub fn allow_shared(mut self, allow_shared: bool) -> Self {
        self.allow_shared = allow_shared;
        self
    }

    /// Runs the RFB 3.8 handshake and hands back a ready [`Session`].
    pub async fn handshake(mut self) -> Result<Session<S>, VncError> {
        let stream = &mut self.stream;

        // Protocol version exchange. Whatever the server announces, we
        // answer 3.8 and hold it to 3.8 semantics from here on.
        let server_version = ProtocolVersion::read(stream).await?;
        trace!("Server version {server_version:?}");
        ProtocolVersion::RFB38.write(stream).await?;

        // Security negotiation.
        let offers = SecurityType::read_offers(stream).await?;
        let security = select_security(&offers, &self.credentials)?;
        debug!("Selected security type {security:?} from {offers:?}");
        security.write(stream).await?;

        match security {
            SecurityType::None => {}
            SecurityType::VncAuth => {
                // Selection guarantees the password is present.
                let password = self.credentials.password.as_deref().unwrap_or_default();
                let challenge = VncChallenge::read(stream, password).await?;
                challenge.respond(stream).await?;
            }
            SecurityType::AppleRemoteDesktop => {
                let username = self.credentials.username.as_deref().unwrap_or_default();
                let password = self.credentials.password.as_deref().unwrap_or_default();
                security::apple::authenticate(stream, username, password).await?;
            }
        }

        // SecurityResult ends every 3.8 security type; a nonzero status
        // is followed by a reason string.
        let status = stream.read_u32().await?;
        if status != 0 {
            let reason = wire::read_string(stream).await?;
            return Err(VncError::AuthFailed(reason));
        }
        info!("Authenticated with {security:?}");

        // ClientInit.
        stream.write_u8(self.allow_shared.into()).await?;

        // ServerInit.
        let width = stream.read_u16().await?;
        let height = stream.read_u16().await?;
        let server_format = PixelFormat::read(stream).await?;
        let name = wire::read_string(stream).await?;
        info!("Connected to {name:?}: {width}x{height}, {server_format:?}");

        // Override the server's choice with the canonical 32-bit RGBA
        // format and advertise the encodings we decode, preferred first.
        let format = PixelFormat::rgba();
        ClientMsg::SetPixelFormat(format).write(stream).await?;
        ClientMsg::SetEncodings(vec![Encoding::Zlib, Encoding::Raw])
            .write(stream)
            .await?;

        Ok(Session::new(self.stream, format, width, height, name))
    }
}

/// Picks a security type from the server's offers: a username mandates
/// the Apple scheme (and needs the password too), a bare password
/// prefers VNC authentication and falls back to None, no credentials
/// require None.
fn select_security(offers: &[u8], credentials: &Credentials) -> Result<SecurityType, VncError> {
    let offered = |t: SecurityType| offers.contains(&t.into());
    if credentials.username.is_some() {
        if credentials.password.is_none() {
            return Err(VncError::CredentialsRequired);
        }
        if offered(SecurityType::AppleRemoteDesktop) {
            return Ok(SecurityType::AppleRemoteDesktop);
        }
        return Err(VncError::AuthUnsupported);
    }
    if credentials.password.is_some() && offered(SecurityType::VncAuth) {
        return Ok(SecurityType::VncAuth);
    }
    if offered(SecurityType::None) {
        return Ok(SecurityType::None);
    }
    Err(VncError::AuthUnsupported)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn username_requires_apple() {
        let creds = Credentials::user_password("admin", "secret");
        assert_eq!(
            select_security(&[30, 2, 1], &creds).unwrap(),
            SecurityType::AppleRemoteDesktop
        );
        assert!(matches!(
            select_security(&[2, 1], &creds),
            Err(VncError::AuthUnsupported)
        ));
    }

    #[test]
    fn username_without_password_is_rejected() {
        let creds = Credentials {
            username: Some("admin".into()),
            password: None,
        };
        assert!(matches!(
            select_security(&[30], &creds),
            Err(VncError::CredentialsRequired)
        ));
    }

    #[test]
    fn password_prefers_vnc_auth() {
        let creds = Credentials::password("secret");
        assert_eq!(select_security(&[1, 2], &creds).unwrap(), SecurityType::VncAuth);
        // Falls back to None when VNC auth is not on offer.
        assert_eq!(select_security(&[1, 16], &creds).unwrap(), SecurityType::None);
        assert!(matches!(
            select_security(&[16, 19], &creds),
            Err(VncError::AuthUnsupported)
        ));
    }

    #[test]
    fn no_credentials_require_none() {
        let creds = Credentials::none();
        assert_eq!(select_security(&[2, 1], &creds).unwrap(), SecurityType::None);
        assert!(matches!(
            select_security(&[2], &creds),
            Err(VncError::AuthUnsupported)
        ));
    }
}
