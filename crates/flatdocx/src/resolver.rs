//! Image resolution
//!
//! The serializer never reads images itself. It asks an [`ImageResolver`]
//! for the bytes behind an image source and only decodes the intrinsic size.

use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use base64::Engine;
use futures::future::{self, FutureExt, LocalBoxFuture};
use image::ImageReader;

use crate::Result;

/// Fetches image bytes for an image source.
///
/// Synchronous resolvers return a ready future; resolvers backed by I/O may
/// suspend. The serializer awaits each image before it visits the next
/// sibling.
pub trait ImageResolver {
    /// Resolves `src` to the raw image bytes.
    fn resolve<'a>(&'a self, src: &'a str) -> LocalBoxFuture<'a, Result<Arc<[u8]>>>;
}

/// A resolver that runs a synchronous closure.
pub struct FnResolver<F>(pub F);

impl<F> ImageResolver for FnResolver<F>
where
    F: Fn(&str) -> Result<Vec<u8>>,
{
    fn resolve<'a>(&'a self, src: &'a str) -> LocalBoxFuture<'a, Result<Arc<[u8]>>> {
        future::ready((self.0)(src).map(Arc::from)).boxed_local()
    }
}

/// A resolver for documents without images. Every lookup fails.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoImages;

impl ImageResolver for NoImages {
    fn resolve<'a>(&'a self, src: &'a str) -> LocalBoxFuture<'a, Result<Arc<[u8]>>> {
        future::ready(Err(format!("no image resolver for `{src}`").into())).boxed_local()
    }
}

/// Resolves `data:` URLs inline and everything else as a path relative to a
/// base directory.
#[derive(Debug, Clone)]
pub struct FileResolver {
    base: PathBuf,
}

impl FileResolver {
    /// Creates a resolver for paths relative to `base`.
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self { base: base.into() }
    }

    fn load(&self, src: &str) -> Result<Vec<u8>> {
        if let Some(data) = src.strip_prefix("data:") {
            return decode_data_url(data);
        }

        let path = self.base.join(Path::new(src));
        std::fs::read(&path).map_err(|err| format!("cannot read image {path:?}: {err}").into())
    }
}

impl ImageResolver for FileResolver {
    fn resolve<'a>(&'a self, src: &'a str) -> LocalBoxFuture<'a, Result<Arc<[u8]>>> {
        future::ready(self.load(src).map(Arc::from)).boxed_local()
    }
}

/// Decodes the part of a data URL after `data:`.
fn decode_data_url(data: &str) -> Result<Vec<u8>> {
    let Some((meta, payload)) = data.split_once(',') else {
        return Err("data URL without payload".into());
    };
    if !meta.ends_with(";base64") {
        return Err(format!("unsupported data URL encoding `{meta}`").into());
    }

    base64::engine::general_purpose::STANDARD
        .decode(payload.trim())
        .map_err(|err| format!("invalid base64 in data URL: {err}").into())
}

/// Get image dimensions
///
/// Only the image header is read. Returns `None` for bytes that are not a
/// recognizable image.
pub fn image_size(data: &[u8]) -> Option<(u32, u32)> {
    ImageReader::new(Cursor::new(data))
        .with_guessed_format()
        .ok()?
        .into_dimensions()
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn png(width: u32, height: u32) -> Vec<u8> {
        let mut buffer = Vec::new();
        image::DynamicImage::new_rgb8(width, height)
            .write_to(&mut Cursor::new(&mut buffer), image::ImageFormat::Png)
            .unwrap();
        buffer
    }

    #[test]
    fn decodes_image_size() {
        assert_eq!(image_size(&png(40, 20)), Some((40, 20)));
        assert_eq!(image_size(b"not an image"), None);
    }

    #[test]
    fn size_comes_from_the_header() {
        let mut data = png(400, 200);
        data.truncate(data.len() - 20);
        assert_eq!(image_size(&data), Some((400, 200)));
    }

    #[test]
    fn resolves_data_urls() {
        let data = png(3, 2);
        let url = format!(
            "data:image/png;base64,{}",
            base64::engine::general_purpose::STANDARD.encode(&data)
        );

        let resolver = FileResolver::new(".");
        let bytes = futures::executor::block_on(resolver.resolve(&url)).unwrap();
        assert_eq!(&*bytes, data.as_slice());
    }

    #[test]
    fn rejects_plain_data_urls() {
        let resolver = FileResolver::new(".");
        let res = futures::executor::block_on(resolver.resolve("data:text/plain,hello"));
        assert!(res.is_err());
    }

    #[test]
    fn fn_resolver_is_ready_immediately() {
        let resolver = FnResolver(|src: &str| -> Result<Vec<u8>> { Ok(src.as_bytes().to_vec()) });
        let bytes = resolver.resolve("abc").now_or_never().unwrap().unwrap();
        assert_eq!(&*bytes, b"abc");
    }
}
