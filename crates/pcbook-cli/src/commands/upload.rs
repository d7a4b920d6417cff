// crates/pcbook-cli/src/commands/upload.rs
//
// `pcbook upload`: stream a laptop image to the server in small chunks.

use std::path::{Path, PathBuf};

use clap::Args;
use tokio::io::AsyncReadExt;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tonic::transport::Channel;

use pcbook_core::sample;
use pcbook_rpc::proto::{LaptopServiceClient, UploadImageRequest, UploadImageResponse};
use pcbook_rpc::AuthChannel;

use crate::commands::create::create_laptop;
use crate::config::Settings;
use crate::session::Session;

/// Bytes per chunk message.
const CHUNK_SIZE: usize = 1024;

#[derive(Debug, Args)]
pub struct UploadCmd {
    /// Image file to upload.
    #[arg(long)]
    pub image: PathBuf,

    /// Laptop to attach the image to. A sample laptop is created when omitted.
    #[arg(long)]
    pub laptop_id: Option<String>,
}

/// Image type sent to the server: the file extension with a leading dot,
/// or empty when the file has none.
pub fn image_type(path: &Path) -> String {
    path.extension()
        .map(|ext| format!(".{}", ext.to_string_lossy()))
        .unwrap_or_default()
}

/// Send the info message followed by the file contents.
///
/// The file is read on a separate task so chunks are produced while the
/// server consumes them. If the server ends the call early the reader stops
/// at the next send.
pub async fn upload_image(
    client: &mut LaptopServiceClient<AuthChannel<Channel>>,
    laptop_id: &str,
    path: &Path,
) -> Result<UploadImageResponse, Box<dyn std::error::Error>> {
    let mut file = tokio::fs::File::open(path).await?;

    let (tx, rx) = mpsc::channel(16);
    tx.send(UploadImageRequest::info(laptop_id, &image_type(path)))
        .await?;

    let reader = tokio::spawn(async move {
        let mut buffer = vec![0u8; CHUNK_SIZE];
        loop {
            let n = file.read(&mut buffer).await?;
            if n == 0 {
                break;
            }
            if tx
                .send(UploadImageRequest::chunk(buffer[..n].to_vec()))
                .await
                .is_err()
            {
                break;
            }
        }
        Ok::<(), std::io::Error>(())
    });

    let response = client.upload_image(ReceiverStream::new(rx)).await;
    reader.await??;

    let response = response?.into_inner();
    tracing::info!(
        "image uploaded with id: {}, size: {}",
        response.id,
        response.size
    );
    Ok(response)
}

pub async fn run(cmd: &UploadCmd, settings: &Settings) -> Result<(), Box<dyn std::error::Error>> {
    let mut session = Session::open(settings).await?;

    let laptop_id = match &cmd.laptop_id {
        Some(id) => id.clone(),
        None => create_laptop(&mut session.laptops, sample::new_laptop()).await?,
    };

    let response = upload_image(&mut session.laptops, &laptop_id, &cmd.image).await?;
    println!("Uploaded image {} ({} bytes) for laptop {}", response.id, response.size, laptop_id);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_type() {
        assert_eq!(image_type(Path::new("tmp/laptop.jpg")), ".jpg");
        assert_eq!(image_type(Path::new("photo.tar.png")), ".png");
        assert_eq!(image_type(Path::new("README")), "");
    }
}
