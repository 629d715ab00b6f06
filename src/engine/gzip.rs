//! Gzip file decompression: the concrete transformer used by the CLI.

use flate2::read::MultiGzDecoder;
use std::fs::File;
use std::io::{BufReader, Read};

use crate::engine::transform::ItemTransformer;
use crate::error::TransformError;
use crate::types::WorkItem;
use crate::utils::config::GzipConsts;

/// Decompresses the whole gzip file named by the item. File and decoder live only for
/// the duration of one call and are dropped on every return path.
///
/// Concatenated members are all decoded; bytes after a member that are not a gzip
/// header fail the item.
#[derive(Clone, Copy, Debug, Default)]
pub struct GzipTransformer;

impl ItemTransformer for GzipTransformer {
    type Payload = Vec<u8>;

    fn transform(&self, item: &WorkItem) -> Result<Vec<u8>, TransformError> {
        decompress_file(item)
    }
}

pub fn decompress_file(item: &WorkItem) -> Result<Vec<u8>, TransformError> {
    let file = File::open(item.path()).map_err(|source| TransformError::Open {
        path: item.path().to_path_buf(),
        source,
    })?;
    let reader = BufReader::with_capacity(GzipConsts::READ_BUFFER_SIZE, file);
    let mut decoder = MultiGzDecoder::new(reader);
    let mut data = Vec::new();
    decoder
        .read_to_end(&mut data)
        .map_err(|source| TransformError::from_read(item.path().to_path_buf(), source))?;
    Ok(data)
}
