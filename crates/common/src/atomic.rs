use std::io;
use std::path::Path;

use tokio::io::{AsyncRead, AsyncWriteExt, BufReader};

use crate::hidden::PARTIAL_FILE_PREFIX;

/// Bytes held in memory per in-flight write.
pub(crate) const COPY_BUFFER_SIZE: usize = 64 * 1024;

/// Stream `reader` into `dest`, replacing it in one rename.
///
/// Data lands in a hidden temp file next to `dest` first. If anything fails
/// before the rename, dropping the temp path removes the partial file, so
/// `dest` either keeps its old contents or gets the complete new ones.
pub(crate) async fn stream_to<R>(dest: &Path, reader: R) -> io::Result<u64>
where
    R: AsyncRead,
{
    let dir = dest
        .parent()
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "destination has no parent"))?;

    let temp = tempfile::Builder::new()
        .prefix(PARTIAL_FILE_PREFIX)
        .tempfile_in(dir)?;
    let (file, temp_path) = temp.into_parts();
    let mut file = tokio::fs::File::from_std(file);

    tokio::pin!(reader);
    let mut reader = BufReader::with_capacity(COPY_BUFFER_SIZE, reader);
    let written = tokio::io::copy_buf(&mut reader, &mut file).await?;
    file.flush().await?;
    file.sync_all().await?;
    drop(file);

    let dest = dest.to_path_buf();
    tokio::task::spawn_blocking(move || temp_path.persist(&dest))
        .await
        .map_err(io::Error::other)?
        .map_err(|e| e.error)?;

    Ok(written)
}

/// Replace `dest` with `contents` in one rename.
pub(crate) async fn write_to(dest: &Path, contents: &[u8]) -> io::Result<()> {
    stream_to(dest, contents).await.map(|_| ())
}
