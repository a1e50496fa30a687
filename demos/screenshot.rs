use anyhow::{Context, Result};
use argh::FromArgs;
use rfb::{connect, Credentials, ServerEvent};
use std::fs::File;
use std::io::Write;
use tracing::Level;

#[derive(FromArgs)]
#[argh(description = "Take a screenshot of a VNC server and save it as a PPM file")]
struct Args {
    #[argh(option, short = 'h')]
    #[argh(default = "String::from(\"127.0.0.1:5900\")")]
    #[argh(description = "VNC server host and port")]
    host: String,

    #[argh(option, short = 'u')]
    #[argh(description = "username for Apple authentication")]
    username: Option<String>,

    #[argh(option, short = 'p')]
    #[argh(description = "password for authentication")]
    password: Option<String>,

    #[argh(option, short = 'o')]
    #[argh(default = "String::from(\"screenshot.ppm\")")]
    #[argh(description = "output file")]
    output: String,
}

fn credentials(args: &Args) -> Credentials {
    match (&args.username, &args.password) {
        (Some(user), Some(pass)) => Credentials::user_password(user, pass),
        (None, Some(pass)) => Credentials::password(pass),
        _ => Credentials::none(),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(Level::INFO)
        .init();

    let args: Args = argh::from_env();
    let mut session = connect(args.host.as_str())
        .await
        .with_context(|| format!("Unable to connect to {}", args.host))?
        .set_credentials(credentials(&args))
        .handshake()
        .await
        .context("Handshake failed")?;

    let video = session.video();
    video.refresh(false).await?;
    loop {
        match session.read().await? {
            ServerEvent::Framebuffer { .. } => break,
            other => tracing::debug!("Skipping {other:?}"),
        }
    }

    let (width, height) = video.size();
    let rgba = video.as_rgba();
    let mut file = File::create(&args.output)
        .with_context(|| format!("Unable to create {}", args.output))?;
    write!(file, "P6\n{width} {height}\n255\n")?;
    for px in rgba.chunks_exact(4) {
        file.write_all(&px[..3])?;
    }
    println!("Saved {width}x{height} screenshot to {}", args.output);

    session.close().await?;
    Ok(())
}
