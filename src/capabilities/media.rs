use crux_core::capability::{Capability, CapabilityContext, Operation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_PICK_QUALITY: u8 = 80;

/// Where a photo comes from. Permissions are tracked per source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PhotoSource {
    Camera,
    Gallery,
}

impl PhotoSource {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            PhotoSource::Camera => "camera",
            PhotoSource::Gallery => "gallery",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PickConfig {
    pub quality: u8,
}

impl Default for PickConfig {
    fn default() -> Self {
        Self {
            quality: DEFAULT_PICK_QUALITY,
        }
    }
}

impl PickConfig {
    #[must_use]
    pub fn validated(mut self) -> Self {
        self.quality = self.quality.min(100);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum MediaOperation {
    RequestPermission {
        source: PhotoSource,
    },
    PickImage {
        source: PhotoSource,
        config: PickConfig,
    },
}

impl Operation for MediaOperation {
    type Output = MediaResult;
}

/// An image handed over by the shell picker, still in whatever encoding the
/// platform produced. Normalization happens in the core.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PickedImage {
    pub uri: String,
    #[serde(with = "serde_bytes")]
    pub data: Vec<u8>,
    pub mime_type: Option<String>,
}

impl PickedImage {
    /// Last non-empty path segment of the URI, used as the upload filename.
    #[must_use]
    pub fn file_name(&self) -> String {
        self.uri
            .rsplit('/')
            .find(|segment| !segment.is_empty())
            .unwrap_or("photo.jpg")
            .to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum MediaOutput {
    Permission { granted: bool },
    Image(PickedImage),
    Cancelled,
}

#[derive(Debug, Clone, Error, Serialize, Deserialize, PartialEq, Eq)]
pub enum MediaError {
    #[error("{source:?} permission denied")]
    PermissionDenied { source: PhotoSource },

    #[error("picker unavailable: {reason}")]
    Unavailable { reason: String },

    #[error("pick failed: {reason}")]
    PickFailed { reason: String },
}

pub type MediaResult = Result<MediaOutput, MediaError>;

#[derive(Debug, Clone)]
pub struct MediaPicker<E> {
    context: CapabilityContext<MediaOperation, E>,
}

impl<Ev> Capability<Ev> for MediaPicker<Ev> {
    type Operation = MediaOperation;
    type MappedSelf<MappedEv> = MediaPicker<MappedEv>;

    fn map_event<F, NewEv>(&self, f: F) -> Self::MappedSelf<NewEv>
    where
        F: Fn(NewEv) -> Ev + Send + Sync + 'static,
        Ev: 'static,
        NewEv: 'static + Send,
    {
        MediaPicker::new(self.context.map_event(f))
    }
}

impl<E> MediaPicker<E>
where
    E: Send + 'static,
{
    pub fn new(context: CapabilityContext<MediaOperation, E>) -> Self {
        Self { context }
    }

    pub fn request_permission<F>(&self, source: PhotoSource, make_event: F)
    where
        F: FnOnce(MediaResult) -> E + Send + 'static,
    {
        self.request(MediaOperation::RequestPermission { source }, make_event);
    }

    pub fn pick_image<F>(&self, source: PhotoSource, config: PickConfig, make_event: F)
    where
        F: FnOnce(MediaResult) -> E + Send + 'static,
    {
        let config = config.validated();
        self.request(MediaOperation::PickImage { source, config }, make_event);
    }

    fn request<F>(&self, operation: MediaOperation, make_event: F)
    where
        F: FnOnce(MediaResult) -> E + Send + 'static,
    {
        let context = self.context.clone();
        self.context.spawn(async move {
            let result = context.request_from_shell(operation).await;
            context.update_app(make_event(result));
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_name_takes_last_segment() {
        let image = PickedImage {
            uri: "file:///data/user/0/cache/ImagePicker/abc-123.jpg".to_string(),
            data: vec![1, 2, 3],
            mime_type: Some("image/jpeg".to_string()),
        };
        assert_eq!(image.file_name(), "abc-123.jpg");
    }

    #[test]
    fn test_file_name_skips_trailing_slash() {
        let image = PickedImage {
            uri: "file:///photos/".to_string(),
            data: vec![],
            mime_type: None,
        };
        assert_eq!(image.file_name(), "photos");
    }

    #[test]
    fn test_file_name_falls_back_when_uri_is_empty() {
        let image = PickedImage {
            uri: String::new(),
            data: vec![],
            mime_type: None,
        };
        assert_eq!(image.file_name(), "photo.jpg");
    }

    #[test]
    fn test_pick_config_clamps_quality() {
        let config = PickConfig { quality: 250 }.validated();
        assert_eq!(config.quality, 100);
        assert_eq!(PickConfig::default().quality, DEFAULT_PICK_QUALITY);
    }
}
